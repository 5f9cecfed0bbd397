//! The rule registry: every validation rule the pipeline can raise.
//!
//! Rules are static data. Each rule key maps to exactly one [`RuleDef`]
//! holding its identity, issue taxonomy, severity and stage-dependent
//! attributes (value source, annotated field path, source columns). The
//! evaluators in [`crate::validate`] compute one boolean column per key;
//! everything reported downstream joins back to these definitions, so a
//! rule that is not registered here cannot appear in any artifact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Evaluation stage of a rule application: before or after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Pre,
    Post,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pre => "pre",
            Stage::Post => "post",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule severity. Declaration order is rank order: reports sort high
/// before medium before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue taxonomy a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Completeness,
    Validity,
    Consistency,
    #[serde(rename = "Cross-field logic")]
    CrossFieldLogic,
    Plausibility,
    Uniqueness,
    #[serde(rename = "Synthetic indicator")]
    SyntheticIndicator,
    #[serde(rename = "KPI")]
    Kpi,
}

impl IssueKind {
    pub fn label(self) -> &'static str {
        match self {
            IssueKind::Completeness => "Completeness",
            IssueKind::Validity => "Validity",
            IssueKind::Consistency => "Consistency",
            IssueKind::CrossFieldLogic => "Cross-field logic",
            IssueKind::Plausibility => "Plausibility",
            IssueKind::Uniqueness => "Uniqueness",
            IssueKind::SyntheticIndicator => "Synthetic indicator",
            IssueKind::Kpi => "KPI",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which table family a rule evaluates over. Catalog rows sort by family
/// within a stage, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleFamily {
    Application,
    Spending,
    Duplicate,
}

impl RuleFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleFamily::Application => "application",
            RuleFamily::Spending => "spending",
            RuleFamily::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the values a rule inspects come from at a given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Raw,
    Clean,
    Derived,
    Metadata,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueSource::Raw => "raw",
            ValueSource::Clean => "clean",
            ValueSource::Derived => "derived",
            ValueSource::Metadata => "metadata",
        }
    }
}

/// Which table a rule's counts are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetScope {
    Applications,
    SpendingItems,
}

impl DatasetScope {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetScope::Applications => "applications",
            DatasetScope::SpendingItems => "spending_items",
        }
    }

    /// Name of the denominator used when turning counts into percentages.
    pub fn denominator(self) -> &'static str {
        match self {
            DatasetScope::Applications => "application_rows",
            DatasetScope::SpendingItems => "spending_rows",
        }
    }
}

/// What one unit of a rule's count means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    Rows,
    DistinctApplicationIds,
    DistinctSsnValues,
}

impl CountUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            CountUnit::Rows => "rows",
            CountUnit::DistinctApplicationIds => "distinct_application_ids",
            CountUnit::DistinctSsnValues => "distinct_ssn_values",
        }
    }
}

/// Definition of one row-level validation rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub rule_id: &'static str,
    pub rule_key: &'static str,
    pub family: RuleFamily,
    pub issue: IssueKind,
    /// Logical path of the field in the source document.
    pub field_path: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub value_source_pre: ValueSource,
    pub value_source_post: ValueSource,
    /// Stage-specific annotated paths for rules whose post-clean check
    /// reads a different column than its pre-clean check.
    pub annotated_pre: Option<&'static str>,
    pub annotated_post: Option<&'static str>,
    /// Concrete columns the evaluator reads at each stage, pipe-delimited.
    pub source_columns_pre: &'static str,
    pub source_columns_post: &'static str,
}

impl RuleDef {
    pub fn value_source(&self, stage: Stage) -> ValueSource {
        match stage {
            Stage::Pre => self.value_source_pre,
            Stage::Post => self.value_source_post,
        }
    }

    /// Annotated field path for a stage, falling back to the plain path.
    pub fn annotated_field_path(&self, stage: Stage) -> &'static str {
        match stage {
            Stage::Pre => self.annotated_pre,
            Stage::Post => self.annotated_post,
        }
        .unwrap_or(self.field_path)
    }

    pub fn source_columns(&self, stage: Stage) -> &'static str {
        match stage {
            Stage::Pre => self.source_columns_pre,
            Stage::Post => self.source_columns_post,
        }
    }
}

/// Keys of the application-level rules, in rule-id order.
///
/// The discriminant indexes [`APPLICATION_RULES`], so the enum and the
/// table must stay in lockstep (guarded by a test below).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApplicationRuleKey {
    MissingProcessingTimestamp,
    MissingRequiredApplicantField,
    MissingSsnAndIp,
    BlankEmail,
    InvalidEmail,
    GenderNeedsNormalisation,
    InvalidGender,
    DobNonIsoFormat,
    DobAmbiguousFormat,
    AnnualIncomeStringType,
    FinancialFieldDriftSalary,
    CreditHistoryNegative,
    SavingsNegative,
    DtiOutOfRange,
    ApprovedMissingRequiredFields,
    RejectedMissingReason,
    ApprovedCreditHistoryZero,
    ApprovedCreditHistoryLt6,
    PrivateIpAddress,
}

impl ApplicationRuleKey {
    pub const ALL: [ApplicationRuleKey; 19] = [
        ApplicationRuleKey::MissingProcessingTimestamp,
        ApplicationRuleKey::MissingRequiredApplicantField,
        ApplicationRuleKey::MissingSsnAndIp,
        ApplicationRuleKey::BlankEmail,
        ApplicationRuleKey::InvalidEmail,
        ApplicationRuleKey::GenderNeedsNormalisation,
        ApplicationRuleKey::InvalidGender,
        ApplicationRuleKey::DobNonIsoFormat,
        ApplicationRuleKey::DobAmbiguousFormat,
        ApplicationRuleKey::AnnualIncomeStringType,
        ApplicationRuleKey::FinancialFieldDriftSalary,
        ApplicationRuleKey::CreditHistoryNegative,
        ApplicationRuleKey::SavingsNegative,
        ApplicationRuleKey::DtiOutOfRange,
        ApplicationRuleKey::ApprovedMissingRequiredFields,
        ApplicationRuleKey::RejectedMissingReason,
        ApplicationRuleKey::ApprovedCreditHistoryZero,
        ApplicationRuleKey::ApprovedCreditHistoryLt6,
        ApplicationRuleKey::PrivateIpAddress,
    ];

    pub fn def(self) -> &'static RuleDef {
        &APPLICATION_RULES[self as usize]
    }
}

/// Keys of the spending-level rules, in rule-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpendingRuleKey {
    MissingCategory,
    AmountNonNumeric,
    AmountNegative,
}

impl SpendingRuleKey {
    pub const ALL: [SpendingRuleKey; 3] = [
        SpendingRuleKey::MissingCategory,
        SpendingRuleKey::AmountNonNumeric,
        SpendingRuleKey::AmountNegative,
    ];

    pub fn def(self) -> &'static RuleDef {
        &SPENDING_RULES[self as usize]
    }
}

pub static APPLICATION_RULES: [RuleDef; 19] = [
    RuleDef {
        rule_id: "R_APP_001",
        rule_key: "flag_missing_processing_timestamp",
        family: RuleFamily::Application,
        issue: IssueKind::Completeness,
        field_path: "processing_timestamp",
        severity: Severity::High,
        description: "Missing or blank processing timestamp.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_processing_timestamp",
        source_columns_post: "clean_processing_timestamp",
    },
    RuleDef {
        rule_id: "R_APP_002",
        rule_key: "flag_missing_required_applicant_field",
        family: RuleFamily::Application,
        issue: IssueKind::Completeness,
        field_path: "applicant_info.*",
        severity: Severity::High,
        description: "One or more required applicant fields missing or blank.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_full_name|raw_applicant_email|raw_applicant_ssn|raw_applicant_ip_address|raw_applicant_gender|raw_applicant_date_of_birth|raw_applicant_zip_code",
        source_columns_post: "raw_applicant_full_name|clean_email|raw_applicant_ssn|raw_applicant_ip_address|clean_gender|clean_date_of_birth|clean_zip_code",
    },
    RuleDef {
        rule_id: "R_APP_003",
        rule_key: "flag_missing_ssn_and_ip",
        family: RuleFamily::Application,
        issue: IssueKind::Completeness,
        field_path: "applicant_info.ssn|applicant_info.ip_address",
        severity: Severity::High,
        description: "Both SSN and IP address are missing or blank.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Raw,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_ssn|raw_applicant_ip_address",
        source_columns_post: "raw_applicant_ssn|raw_applicant_ip_address",
    },
    RuleDef {
        rule_id: "R_APP_004",
        rule_key: "flag_blank_email",
        family: RuleFamily::Application,
        issue: IssueKind::Completeness,
        field_path: "applicant_info.email",
        severity: Severity::Medium,
        description: "Email is missing or blank.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_email",
        source_columns_post: "clean_email",
    },
    RuleDef {
        rule_id: "R_APP_005",
        rule_key: "flag_invalid_email",
        family: RuleFamily::Application,
        issue: IssueKind::Validity,
        field_path: "applicant_info.email",
        severity: Severity::Medium,
        description: "Email does not match the expected format.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_email",
        source_columns_post: "clean_email",
    },
    RuleDef {
        rule_id: "R_APP_006",
        rule_key: "flag_gender_needs_normalisation",
        family: RuleFamily::Application,
        issue: IssueKind::Consistency,
        field_path: "applicant_info.gender",
        severity: Severity::Low,
        description: "Gender is not already in canonical form.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: Some("applicant_info.gender_raw"),
        annotated_post: Some("applicant_info.gender_clean"),
        source_columns_pre: "raw_applicant_gender",
        source_columns_post: "clean_gender",
    },
    RuleDef {
        rule_id: "R_APP_007",
        rule_key: "flag_invalid_gender",
        family: RuleFamily::Application,
        issue: IssueKind::Validity,
        field_path: "applicant_info.gender",
        severity: Severity::Medium,
        description: "Gender is outside the allowed values.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_gender",
        source_columns_post: "clean_gender",
    },
    RuleDef {
        rule_id: "R_APP_008",
        rule_key: "flag_dob_non_iso_format",
        family: RuleFamily::Application,
        issue: IssueKind::Consistency,
        field_path: "applicant_info.date_of_birth",
        severity: Severity::Low,
        description: "Date of birth is not in canonical YYYY-MM-DD form.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: Some("applicant_info.date_of_birth_raw"),
        annotated_post: Some("applicant_info.date_of_birth_clean"),
        source_columns_pre: "raw_applicant_date_of_birth",
        source_columns_post: "clean_date_of_birth",
    },
    RuleDef {
        rule_id: "R_APP_009",
        rule_key: "flag_dob_ambiguous_format",
        family: RuleFamily::Application,
        issue: IssueKind::Consistency,
        field_path: "applicant_info.date_of_birth",
        severity: Severity::Medium,
        description: "Date of birth matches the ambiguous NN/NN/YYYY pattern. When DOB is NN/NN/YYYY and both NN <= 12, parse as MM/DD/YYYY.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Derived,
        annotated_pre: Some("applicant_info.date_of_birth_raw"),
        annotated_post: Some("applicant_info.date_of_birth_raw"),
        source_columns_pre: "raw_applicant_date_of_birth",
        source_columns_post: "dob_ambiguous_flag",
    },
    RuleDef {
        rule_id: "R_APP_010",
        rule_key: "flag_annual_income_string_type",
        family: RuleFamily::Application,
        issue: IssueKind::Consistency,
        field_path: "financials.annual_income",
        severity: Severity::Low,
        description: "Annual income is stored as a string or cannot be coerced cleanly.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Derived,
        annotated_pre: Some("financials.annual_income_raw"),
        annotated_post: Some("financials.annual_income_clean"),
        source_columns_pre: "raw_financial_annual_income",
        source_columns_post: "clean_annual_income|raw_financial_annual_income|raw_financial_annual_salary",
    },
    RuleDef {
        rule_id: "R_APP_011",
        rule_key: "flag_financial_field_drift_salary",
        family: RuleFamily::Application,
        issue: IssueKind::Consistency,
        field_path: "financials.annual_salary",
        severity: Severity::Medium,
        description: "Annual salary is populated instead of annual income.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Derived,
        annotated_pre: Some("financials.annual_salary_raw"),
        annotated_post: Some("financials.annual_income_clean"),
        source_columns_pre: "raw_financial_annual_income|raw_financial_annual_salary",
        source_columns_post: "annual_income_from_salary_flag",
    },
    RuleDef {
        rule_id: "R_APP_012",
        rule_key: "flag_credit_history_negative",
        family: RuleFamily::Application,
        issue: IssueKind::Validity,
        field_path: "financials.credit_history_months",
        severity: Severity::High,
        description: "Credit history months is negative.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_financial_credit_history_months",
        source_columns_post: "clean_credit_history_months",
    },
    RuleDef {
        rule_id: "R_APP_013",
        rule_key: "flag_savings_negative",
        family: RuleFamily::Application,
        issue: IssueKind::Validity,
        field_path: "financials.savings_balance",
        severity: Severity::High,
        description: "Savings balance is negative.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_financial_savings_balance",
        source_columns_post: "clean_savings_balance",
    },
    RuleDef {
        rule_id: "R_APP_014",
        rule_key: "flag_dti_out_of_range",
        family: RuleFamily::Application,
        issue: IssueKind::Validity,
        field_path: "financials.debt_to_income",
        severity: Severity::High,
        description: "Debt-to-income is outside the allowed range [0, 1].",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_financial_debt_to_income",
        source_columns_post: "clean_debt_to_income",
    },
    RuleDef {
        rule_id: "R_APP_015",
        rule_key: "flag_approved_missing_required_fields",
        family: RuleFamily::Application,
        issue: IssueKind::CrossFieldLogic,
        field_path: "decision.loan_approved",
        severity: Severity::High,
        description: "Approved loan is missing interest_rate and/or approved_amount.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_decision_loan_approved|raw_decision_interest_rate|raw_decision_approved_amount",
        source_columns_post: "approved_missing_terms_flag",
    },
    RuleDef {
        rule_id: "R_APP_016",
        rule_key: "flag_rejected_missing_reason",
        family: RuleFamily::Application,
        issue: IssueKind::CrossFieldLogic,
        field_path: "decision.rejection_reason",
        severity: Severity::Medium,
        description: "Rejected loan is missing rejection_reason.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_decision_loan_approved|raw_decision_rejection_reason",
        source_columns_post: "rejected_missing_reason_flag",
    },
    RuleDef {
        rule_id: "R_APP_017",
        rule_key: "flag_approved_credit_history_zero",
        family: RuleFamily::Application,
        issue: IssueKind::Plausibility,
        field_path: "financials.credit_history_months",
        severity: Severity::Medium,
        description: "Loan approved with zero months of credit history.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_decision_loan_approved|raw_financial_credit_history_months",
        source_columns_post: "clean_loan_approved|clean_credit_history_months",
    },
    RuleDef {
        rule_id: "R_APP_018",
        rule_key: "flag_approved_credit_history_lt6",
        family: RuleFamily::Application,
        issue: IssueKind::Plausibility,
        field_path: "financials.credit_history_months",
        severity: Severity::Medium,
        description: "Loan approved with less than 6 months of credit history.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_decision_loan_approved|raw_financial_credit_history_months",
        source_columns_post: "clean_loan_approved|clean_credit_history_months",
    },
    RuleDef {
        rule_id: "R_APP_019",
        rule_key: "flag_private_ip_address",
        family: RuleFamily::Application,
        issue: IssueKind::SyntheticIndicator,
        field_path: "applicant_info.ip_address",
        severity: Severity::Low,
        description: "IP address is in a private range and likely masked or synthetic.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Raw,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_applicant_ip_address",
        source_columns_post: "raw_applicant_ip_address",
    },
];

pub static SPENDING_RULES: [RuleDef; 3] = [
    RuleDef {
        rule_id: "R_SPN_001",
        rule_key: "flag_spending_missing_category",
        family: RuleFamily::Spending,
        issue: IssueKind::Completeness,
        field_path: "spending_behavior[].category",
        severity: Severity::Medium,
        description: "Spending category is missing or blank.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: None,
        annotated_post: None,
        source_columns_pre: "raw_category",
        source_columns_post: "category_missing_flag",
    },
    RuleDef {
        rule_id: "R_SPN_002",
        rule_key: "flag_spending_amount_non_numeric",
        family: RuleFamily::Spending,
        issue: IssueKind::Validity,
        field_path: "spending_behavior[].amount",
        severity: Severity::High,
        description: "Spending amount cannot be parsed as numeric.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Derived,
        annotated_pre: Some("spending_behavior[].amount_raw"),
        annotated_post: Some("spending_behavior[].amount_clean"),
        source_columns_pre: "raw_amount",
        source_columns_post: "amount_invalid_flag",
    },
    RuleDef {
        rule_id: "R_SPN_003",
        rule_key: "flag_spending_amount_negative",
        family: RuleFamily::Spending,
        issue: IssueKind::Validity,
        field_path: "spending_behavior[].amount",
        severity: Severity::High,
        description: "Spending amount is negative.",
        value_source_pre: ValueSource::Raw,
        value_source_post: ValueSource::Clean,
        annotated_pre: Some("spending_behavior[].amount_raw"),
        annotated_post: Some("spending_behavior[].amount_clean"),
        source_columns_pre: "raw_amount",
        source_columns_post: "amount_negative_flag",
    },
];

/// Definition of one duplicate-analysis metric.
///
/// These are tabulated from the duplicate resolver's outputs rather than
/// from per-row boolean columns, so they carry their own count unit and,
/// for the two KPI metrics, a post-stage-only marker.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateRuleDef {
    pub rule_id: &'static str,
    pub rule_key: &'static str,
    pub issue: IssueKind,
    pub field_path: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub value_source: ValueSource,
    pub source_columns: &'static str,
    pub count_unit: CountUnit,
    /// KPI metrics only make sense after canonical selection has run.
    pub post_only: bool,
}

pub static DUPLICATE_RULES: [DuplicateRuleDef; 6] = [
    DuplicateRuleDef {
        rule_id: "R_DUP_001",
        rule_key: "duplicate_id_rows",
        issue: IssueKind::Uniqueness,
        field_path: "_id",
        severity: Severity::High,
        description: "Rows with duplicated application_id values.",
        value_source: ValueSource::Metadata,
        source_columns: "application_id",
        count_unit: CountUnit::Rows,
        post_only: false,
    },
    DuplicateRuleDef {
        rule_id: "R_DUP_002",
        rule_key: "duplicate_id_keys",
        issue: IssueKind::Uniqueness,
        field_path: "_id",
        severity: Severity::High,
        description: "Distinct application_id values that are duplicated.",
        value_source: ValueSource::Metadata,
        source_columns: "application_id",
        count_unit: CountUnit::DistinctApplicationIds,
        post_only: false,
    },
    DuplicateRuleDef {
        rule_id: "R_DUP_003",
        rule_key: "repeated_ssn_rows",
        issue: IssueKind::Uniqueness,
        field_path: "applicant_info.ssn",
        severity: Severity::High,
        description: "Rows where SSN repeats across one or more records.",
        value_source: ValueSource::Raw,
        source_columns: "raw_applicant_ssn",
        count_unit: CountUnit::Rows,
        post_only: false,
    },
    DuplicateRuleDef {
        rule_id: "R_DUP_004",
        rule_key: "cross_application_ssn_values",
        issue: IssueKind::Uniqueness,
        field_path: "applicant_info.ssn",
        severity: Severity::High,
        description: "Distinct SSN values that appear across different application IDs.",
        value_source: ValueSource::Raw,
        source_columns: "raw_applicant_ssn",
        count_unit: CountUnit::DistinctSsnValues,
        post_only: false,
    },
    DuplicateRuleDef {
        rule_id: "R_DUP_CONFLICT",
        rule_key: "duplicate_conflict_ids",
        issue: IssueKind::Kpi,
        field_path: "_id",
        severity: Severity::High,
        description: "Duplicated application IDs classified as conflicts.",
        value_source: ValueSource::Metadata,
        source_columns: "application_id",
        count_unit: CountUnit::DistinctApplicationIds,
        post_only: true,
    },
    DuplicateRuleDef {
        rule_id: "R_DUP_CANONICAL",
        rule_key: "canonical_rows_retained",
        issue: IssueKind::Kpi,
        field_path: "_id",
        severity: Severity::Medium,
        description: "Canonical application rows retained for downstream analysis.",
        value_source: ValueSource::Metadata,
        source_columns: "application_id",
        count_unit: CountUnit::Rows,
        post_only: true,
    },
];

/// Look up a duplicate metric definition by rule id.
pub fn duplicate_rule(rule_id: &str) -> Option<&'static DuplicateRuleDef> {
    DUPLICATE_RULES.iter().find(|rule| rule.rule_id == rule_id)
}
