//! Application-level rule evaluation, before and after cleaning.
//!
//! Both passes compute the same logical predicates; the post-clean pass
//! reads standardised columns and remediation flags where they exist, so a
//! rule whose count drops to zero after cleaning demonstrates remediation
//! rather than a different check.

use crate::records::{ApplicationRow, CleanApplicationRow};
use crate::rules::ApplicationRuleKey;
use crate::settings::PipelineSettings;

use super::matrix::FlagMatrix;
use super::scalars::{
    is_ambiguous_slash_date, is_blank, is_non_iso_date, is_non_numeric_text, is_private_ip,
    parse_bool, parse_number,
};

/// Raw gender spellings that normalise without judgement calls.
const SHORT_GENDER_KEYS: [&str; 2] = ["m", "f"];

/// Evaluates the application rule set against a configured policy.
pub struct ApplicationValidator<'a> {
    settings: &'a PipelineSettings,
}

impl<'a> ApplicationValidator<'a> {
    pub fn new(settings: &'a PipelineSettings) -> Self {
        Self { settings }
    }

    /// Evaluate every application rule over raw rows.
    pub fn preclean(&self, rows: &[ApplicationRow]) -> FlagMatrix<ApplicationRuleKey> {
        use ApplicationRuleKey as Key;

        let mut matrix = FlagMatrix::new(rows.len());
        let required = &self.settings.required_applicant_columns;
        let email_regex = self.settings.email_regex();

        matrix.set_column(
            Key::MissingProcessingTimestamp,
            rows.iter()
                .map(|row| is_blank(row.raw_processing_timestamp.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::MissingRequiredApplicantField,
            rows.iter()
                .map(|row| {
                    required
                        .iter()
                        .any(|column| is_blank(row.raw_value(column).flatten()))
                })
                .collect(),
        );
        matrix.set_column(
            Key::MissingSsnAndIp,
            rows.iter()
                .map(|row| {
                    is_blank(row.raw_applicant_ssn.as_deref())
                        && is_blank(row.raw_applicant_ip_address.as_deref())
                })
                .collect(),
        );
        matrix.set_column(
            Key::BlankEmail,
            rows.iter()
                .map(|row| is_blank(row.raw_applicant_email.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::InvalidEmail,
            rows.iter()
                .map(|row| {
                    let email = row.raw_applicant_email.as_deref();
                    !is_blank(email) && !email_regex.is_match(email.unwrap_or("").trim())
                })
                .collect(),
        );
        matrix.set_column(
            Key::GenderNeedsNormalisation,
            rows.iter()
                .map(|row| {
                    let key = gender_key(row.raw_applicant_gender.as_deref());
                    SHORT_GENDER_KEYS.contains(&key.as_str())
                })
                .collect(),
        );
        matrix.set_column(
            Key::InvalidGender,
            rows.iter()
                .map(|row| {
                    let key = gender_key(row.raw_applicant_gender.as_deref());
                    !key.is_empty() && !self.settings.gender_map.contains_key(&key)
                })
                .collect(),
        );
        matrix.set_column(
            Key::DobNonIsoFormat,
            rows.iter()
                .map(|row| is_non_iso_date(row.raw_applicant_date_of_birth.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::DobAmbiguousFormat,
            rows.iter()
                .map(|row| is_ambiguous_slash_date(row.raw_applicant_date_of_birth.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::AnnualIncomeStringType,
            rows.iter()
                .map(|row| is_non_numeric_text(row.raw_financial_annual_income.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::FinancialFieldDriftSalary,
            rows.iter()
                .map(|row| {
                    is_blank(row.raw_financial_annual_income.as_deref())
                        && !is_blank(row.raw_financial_annual_salary.as_deref())
                })
                .collect(),
        );
        matrix.set_column(
            Key::CreditHistoryNegative,
            rows.iter()
                .map(|row| {
                    parse_number(row.raw_financial_credit_history_months.as_deref())
                        .map_or(false, |months| months < 0.0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::SavingsNegative,
            rows.iter()
                .map(|row| {
                    parse_number(row.raw_financial_savings_balance.as_deref())
                        .map_or(false, |balance| balance < 0.0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::DtiOutOfRange,
            rows.iter()
                .map(|row| {
                    parse_number(row.raw_financial_debt_to_income.as_deref())
                        .map_or(false, |ratio| !(0.0..=1.0).contains(&ratio))
                })
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedMissingRequiredFields,
            rows.iter()
                .map(|row| {
                    parse_bool(row.raw_decision_loan_approved.as_deref()) == Some(true)
                        && (is_blank(row.raw_decision_interest_rate.as_deref())
                            || is_blank(row.raw_decision_approved_amount.as_deref()))
                })
                .collect(),
        );
        matrix.set_column(
            Key::RejectedMissingReason,
            rows.iter()
                .map(|row| {
                    parse_bool(row.raw_decision_loan_approved.as_deref()) == Some(false)
                        && is_blank(row.raw_decision_rejection_reason.as_deref())
                })
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedCreditHistoryZero,
            rows.iter()
                .map(|row| {
                    parse_bool(row.raw_decision_loan_approved.as_deref()) == Some(true)
                        && parse_number(row.raw_financial_credit_history_months.as_deref())
                            == Some(0.0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedCreditHistoryLt6,
            rows.iter()
                .map(|row| {
                    parse_bool(row.raw_decision_loan_approved.as_deref()) == Some(true)
                        && parse_number(row.raw_financial_credit_history_months.as_deref())
                            .map_or(false, |months| months < 6.0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::PrivateIpAddress,
            rows.iter()
                .map(|row| is_private_ip(row.raw_applicant_ip_address.as_deref()))
                .collect(),
        );

        matrix
    }

    /// Evaluate every application rule over cleaned rows.
    pub fn postclean(&self, rows: &[CleanApplicationRow]) -> FlagMatrix<ApplicationRuleKey> {
        use ApplicationRuleKey as Key;

        let mut matrix = FlagMatrix::new(rows.len());
        let canonical = self.settings.canonical_genders();
        let email_regex = self.settings.email_regex();

        matrix.set_column(
            Key::MissingProcessingTimestamp,
            rows.iter()
                .map(|row| is_blank(row.clean_processing_timestamp.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::MissingRequiredApplicantField,
            rows.iter().map(post_missing_required).collect(),
        );
        matrix.set_column(
            Key::MissingSsnAndIp,
            rows.iter()
                .map(|row| {
                    is_blank(row.source.raw_applicant_ssn.as_deref())
                        && is_blank(row.source.raw_applicant_ip_address.as_deref())
                })
                .collect(),
        );
        matrix.set_column(
            Key::BlankEmail,
            rows.iter()
                .map(|row| is_blank(row.clean_email.as_deref()))
                .collect(),
        );
        matrix.set_column(
            Key::InvalidEmail,
            rows.iter()
                .map(|row| {
                    let email = row.clean_email.as_deref();
                    !is_blank(email) && !email_regex.is_match(email.unwrap_or("").trim())
                })
                .collect(),
        );
        // After cleaning, both gender rules reduce to "present but not in
        // the canonical vocabulary": normalisation already happened, so any
        // non-canonical leftover needs attention either way.
        for key in [Key::GenderNeedsNormalisation, Key::InvalidGender] {
            matrix.set_column(
                key,
                rows.iter()
                    .map(|row| {
                        let gender = row.clean_gender.as_deref();
                        !is_blank(gender) && !canonical.contains(gender.unwrap_or("").trim())
                    })
                    .collect(),
            );
        }
        matrix.set_column(
            Key::DobNonIsoFormat,
            rows.iter()
                .map(|row| {
                    let rendered = row.clean_date_of_birth.map(|date| date.to_string());
                    is_non_iso_date(rendered.as_deref())
                })
                .collect(),
        );
        matrix.set_column(
            Key::DobAmbiguousFormat,
            rows.iter().map(|row| row.dob_ambiguous_flag).collect(),
        );
        matrix.set_column(
            Key::AnnualIncomeStringType,
            rows.iter()
                .map(|row| {
                    row.clean_annual_income.is_none()
                        && !(is_blank(row.source.raw_financial_annual_income.as_deref())
                            && is_blank(row.source.raw_financial_annual_salary.as_deref()))
                })
                .collect(),
        );
        matrix.set_column(
            Key::FinancialFieldDriftSalary,
            rows.iter()
                .map(|row| row.annual_income_from_salary_flag)
                .collect(),
        );
        matrix.set_column(
            Key::CreditHistoryNegative,
            rows.iter()
                .map(|row| {
                    row.clean_credit_history_months
                        .map_or(false, |months| months < 0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::SavingsNegative,
            rows.iter()
                .map(|row| {
                    row.clean_savings_balance
                        .map_or(false, |balance| balance < 0.0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::DtiOutOfRange,
            rows.iter()
                .map(|row| {
                    row.clean_debt_to_income
                        .map_or(false, |ratio| !(0.0..=1.0).contains(&ratio))
                })
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedMissingRequiredFields,
            rows.iter().map(|row| row.approved_missing_terms_flag).collect(),
        );
        matrix.set_column(
            Key::RejectedMissingReason,
            rows.iter()
                .map(|row| row.rejected_missing_reason_flag)
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedCreditHistoryZero,
            rows.iter()
                .map(|row| {
                    row.clean_loan_approved == Some(true)
                        && row.clean_credit_history_months == Some(0)
                })
                .collect(),
        );
        matrix.set_column(
            Key::ApprovedCreditHistoryLt6,
            rows.iter()
                .map(|row| {
                    row.clean_loan_approved == Some(true)
                        && row
                            .clean_credit_history_months
                            .map_or(false, |months| months < 6)
                })
                .collect(),
        );
        matrix.set_column(
            Key::PrivateIpAddress,
            rows.iter()
                .map(|row| is_private_ip(row.source.raw_applicant_ip_address.as_deref()))
                .collect(),
        );

        matrix
    }
}

fn gender_key(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

/// Post-clean required fields: clean counterparts where cleaning produced
/// one, raw identity columns otherwise.
fn post_missing_required(row: &CleanApplicationRow) -> bool {
    is_blank(row.source.raw_applicant_full_name.as_deref())
        || is_blank(row.clean_email.as_deref())
        || is_blank(row.source.raw_applicant_ssn.as_deref())
        || is_blank(row.source.raw_applicant_ip_address.as_deref())
        || is_blank(row.clean_gender.as_deref())
        || row.clean_date_of_birth.is_none()
        || is_blank(row.clean_zip_code.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn settings() -> PipelineSettings {
        PipelineSettings::default()
    }

    fn complete_row() -> ApplicationRow {
        ApplicationRow {
            application_row_id: 0,
            application_id: Some("APP-100".to_string()),
            raw_processing_timestamp: Some("2024-03-01T10:00:00Z".to_string()),
            raw_applicant_full_name: Some("Jane Roe".to_string()),
            raw_applicant_email: Some("jane@example.com".to_string()),
            raw_applicant_ssn: Some("123-45-6789".to_string()),
            raw_applicant_ip_address: Some("8.8.8.8".to_string()),
            raw_applicant_gender: Some("Female".to_string()),
            raw_applicant_date_of_birth: Some("1990-05-13".to_string()),
            raw_applicant_zip_code: Some("60601".to_string()),
            raw_financial_annual_income: Some("52000".to_string()),
            raw_financial_credit_history_months: Some("48".to_string()),
            raw_financial_debt_to_income: Some("0.3".to_string()),
            raw_financial_savings_balance: Some("1200".to_string()),
            raw_decision_loan_approved: Some("true".to_string()),
            raw_decision_interest_rate: Some("0.08".to_string()),
            raw_decision_approved_amount: Some("15000".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_row_raises_no_flags() {
        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[complete_row()]);
        for key in ApplicationRuleKey::ALL {
            assert_eq!(matrix.count(key), 0, "unexpected flag for {key:?}");
        }
    }

    #[test]
    fn test_completeness_flags() {
        let mut row = complete_row();
        row.raw_processing_timestamp = Some("   ".to_string());
        row.raw_applicant_ssn = None;
        row.raw_applicant_ip_address = Some("".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[row]);

        assert_eq!(matrix.count(ApplicationRuleKey::MissingProcessingTimestamp), 1);
        assert_eq!(matrix.count(ApplicationRuleKey::MissingSsnAndIp), 1);
        assert_eq!(
            matrix.count(ApplicationRuleKey::MissingRequiredApplicantField),
            1
        );
    }

    #[test]
    fn test_email_rules_are_disjoint() {
        let mut blank = complete_row();
        blank.raw_applicant_email = Some("  ".to_string());
        let mut invalid = complete_row();
        invalid.raw_applicant_email = Some("nope@invalid".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[blank, invalid]);

        assert_eq!(matrix.flagged_rows(ApplicationRuleKey::BlankEmail), vec![0]);
        assert_eq!(matrix.flagged_rows(ApplicationRuleKey::InvalidEmail), vec![1]);
    }

    #[test]
    fn test_gender_rules_preclean() {
        let mut short = complete_row();
        short.raw_applicant_gender = Some(" F ".to_string());
        let mut unknown = complete_row();
        unknown.raw_applicant_gender = Some("nonbinary".to_string());
        let mut blank = complete_row();
        blank.raw_applicant_gender = None;

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[short, unknown, blank]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::GenderNeedsNormalisation),
            vec![0]
        );
        assert_eq!(matrix.flagged_rows(ApplicationRuleKey::InvalidGender), vec![1]);
    }

    #[test]
    fn test_dob_format_rules() {
        let mut slash = complete_row();
        slash.raw_applicant_date_of_birth = Some("05/06/1990".to_string());
        let mut day_first = complete_row();
        day_first.raw_applicant_date_of_birth = Some("13/05/1990".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[slash, day_first]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::DobNonIsoFormat),
            vec![0, 1]
        );
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::DobAmbiguousFormat),
            vec![0]
        );
    }

    #[test]
    fn test_income_drift_and_string_type() {
        let mut drift = complete_row();
        drift.raw_financial_annual_income = None;
        drift.raw_financial_annual_salary = Some("61000".to_string());
        let mut text_income = complete_row();
        text_income.raw_financial_annual_income = Some("52,000".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[drift, text_income]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::FinancialFieldDriftSalary),
            vec![0]
        );
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::AnnualIncomeStringType),
            vec![1]
        );
    }

    #[test]
    fn test_range_rules_ignore_unparseable_values() {
        let mut row = complete_row();
        row.raw_financial_credit_history_months = Some("-3".to_string());
        row.raw_financial_debt_to_income = Some("1.5".to_string());
        row.raw_financial_savings_balance = Some("not-a-number".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[row]);

        assert_eq!(matrix.count(ApplicationRuleKey::CreditHistoryNegative), 1);
        assert_eq!(matrix.count(ApplicationRuleKey::DtiOutOfRange), 1);
        assert_eq!(matrix.count(ApplicationRuleKey::SavingsNegative), 0);
    }

    #[test]
    fn test_decision_cross_field_rules() {
        let mut approved_bare = complete_row();
        approved_bare.raw_decision_loan_approved = Some("YES".to_string());
        approved_bare.raw_decision_interest_rate = None;
        let mut rejected_silent = complete_row();
        rejected_silent.raw_decision_loan_approved = Some("0".to_string());
        rejected_silent.raw_decision_rejection_reason = Some(" ".to_string());
        let mut undecided = complete_row();
        undecided.raw_decision_loan_approved = Some("maybe".to_string());
        undecided.raw_decision_interest_rate = None;

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[approved_bare, rejected_silent, undecided]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::ApprovedMissingRequiredFields),
            vec![0]
        );
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::RejectedMissingReason),
            vec![1]
        );
    }

    #[test]
    fn test_plausibility_rules() {
        let mut zero = complete_row();
        zero.raw_financial_credit_history_months = Some("0.0".to_string());
        let mut thin = complete_row();
        thin.raw_financial_credit_history_months = Some("5.5".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[zero, thin]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::ApprovedCreditHistoryZero),
            vec![0]
        );
        // Zero months is also below six months.
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::ApprovedCreditHistoryLt6),
            vec![0, 1]
        );
    }

    #[test]
    fn test_private_ip_rule() {
        let mut private = complete_row();
        private.raw_applicant_ip_address = Some("192.168.1.5".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.preclean(&[private, complete_row()]);

        assert_eq!(matrix.flagged_rows(ApplicationRuleKey::PrivateIpAddress), vec![0]);
    }

    #[test]
    fn test_postclean_reads_clean_columns() {
        let clean = CleanApplicationRow {
            source: complete_row(),
            clean_email: Some("jane@example.com".to_string()),
            clean_gender: Some("Female".to_string()),
            clean_date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 13),
            clean_processing_timestamp: Some("2024-03-01T10:00:00Z".to_string()),
            clean_zip_code: Some("60601".to_string()),
            clean_annual_income: Some(52000.0),
            clean_credit_history_months: Some(48),
            clean_debt_to_income: Some(0.3),
            clean_savings_balance: Some(1200.0),
            clean_loan_approved: Some(true),
            clean_interest_rate: Some(0.08),
            clean_approved_amount: Some(15000.0),
            ..Default::default()
        };

        let mut flagged = clean.clone();
        flagged.dob_ambiguous_flag = true;
        flagged.annual_income_from_salary_flag = true;
        flagged.clean_gender = Some("Unknown".to_string());

        let settings = settings();
        let validator = ApplicationValidator::new(&settings);
        let matrix = validator.postclean(&[clean, flagged]);

        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::DobAmbiguousFormat),
            vec![1]
        );
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::FinancialFieldDriftSalary),
            vec![1]
        );
        assert_eq!(matrix.flagged_rows(ApplicationRuleKey::InvalidGender), vec![1]);
        assert_eq!(
            matrix.flagged_rows(ApplicationRuleKey::GenderNeedsNormalisation),
            vec![1]
        );
        // Cleaned dates always render canonically.
        assert_eq!(matrix.count(ApplicationRuleKey::DobNonIsoFormat), 0);
    }

    #[test]
    fn test_post_required_mixes_raw_and_clean_columns() {
        let mut row = CleanApplicationRow {
            source: complete_row(),
            clean_email: Some("jane@example.com".to_string()),
            clean_gender: Some("Female".to_string()),
            clean_date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 13),
            clean_zip_code: Some("60601".to_string()),
            clean_processing_timestamp: Some("2024-03-01T10:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(!post_missing_required(&row));

        // A raw email that failed cleaning leaves the clean column empty.
        row.clean_email = None;
        assert!(post_missing_required(&row));
    }

    #[test]
    fn test_custom_required_columns_respected() {
        let settings = PipelineSettings::default()
            .with_required_columns(vec!["raw_applicant_zip_code".to_string()]);
        let validator = ApplicationValidator::new(&settings);

        let mut row = complete_row();
        row.raw_applicant_email = None;
        row.raw_applicant_zip_code = Some("60601".to_string());

        let matrix = validator.preclean(&[row]);
        assert_eq!(
            matrix.count(ApplicationRuleKey::MissingRequiredApplicantField),
            0
        );
    }
}
