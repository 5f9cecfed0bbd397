//! Descriptive fairness statistics over the analysis dataset.
//!
//! Everything here reports observed disparities; nothing infers cause or
//! fits a model. The four-fifths rule threshold comes from the pipeline
//! settings so policy changes never require a code change.

pub mod metrics;
pub mod summary;
pub mod tables;

pub use metrics::{approval_rate, disparate_impact, DisparateImpact};
pub use summary::{build_fairness_summary, FairnessSummaryRow};
pub use tables::{
    age_approval_table, age_di_table, gender_approval_table, interaction_table,
    interest_rate_by_gender, rejection_reason_by_gender, AgeApprovalRow, GenderApprovalRow,
    InteractionRow, InterestRateGap, RejectionReasonRow, PRIME_AGE_REFERENCE,
};
