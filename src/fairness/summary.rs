//! The compiled fairness summary table.

use serde::{Deserialize, Serialize};

use super::metrics::DisparateImpact;
use super::tables::{InterestRateGap, PRIME_AGE_REFERENCE};

/// One labeled fairness finding. `metric_value` is pre-formatted text so
/// the summary reads the same in JSONL and in the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessSummaryRow {
    pub analysis: String,
    pub metric_value: String,
    pub four_fifths_flag: Option<bool>,
    pub note: String,
}

/// Compile the gender result, the per-band age results and the interest
/// gap into one table.
pub fn build_fairness_summary(
    gender_di: &DisparateImpact,
    age_di: &[DisparateImpact],
    interest_rate_gap: Option<&InterestRateGap>,
) -> Vec<FairnessSummaryRow> {
    let mut rows = vec![
        FairnessSummaryRow {
            analysis: "Gender — Disparate Impact Ratio".to_string(),
            metric_value: format_ratio(gender_di.disparate_impact),
            four_fifths_flag: Some(gender_di.four_fifths_flag),
            note: format!(
                "Female rate {} vs Male {}",
                format_percent(gender_di.unprivileged_rate),
                format_percent(gender_di.privileged_rate)
            ),
        },
        FairnessSummaryRow {
            analysis: "Gender — Demographic Parity Difference".to_string(),
            metric_value: format_signed(gender_di.demographic_parity_difference),
            four_fifths_flag: None,
            note: "Negative = Female approval rate below Male".to_string(),
        },
    ];

    for band_result in age_di {
        rows.push(FairnessSummaryRow {
            analysis: format!(
                "Age — DI ratio ({} vs {})",
                band_result.unprivileged_group, PRIME_AGE_REFERENCE
            ),
            metric_value: format_ratio(band_result.disparate_impact),
            four_fifths_flag: Some(band_result.four_fifths_flag),
            note: format!("n={}", band_result.unprivileged_n),
        });
    }

    if let Some(gap) = interest_rate_gap {
        rows.push(FairnessSummaryRow {
            analysis: "Interest Rate — Gender gap (approved only)".to_string(),
            metric_value: format!(
                "Male={} Female={}",
                format_ratio(gap.male_median_rate),
                format_ratio(gap.female_median_rate)
            ),
            four_fifths_flag: None,
            note: format!("n Male={}, n Female={}", gap.male_n, gap.female_n),
        });
    }

    rows
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |ratio| format!("{ratio:.4}"))
}

fn format_signed(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |diff| format!("{diff:+.4}"))
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |rate| format!("{:.1}%", rate * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn di(
        privileged: &str,
        unprivileged: &str,
        rates: Option<(f64, f64)>,
        threshold: f64,
    ) -> DisparateImpact {
        let ratio = rates.map(|(priv_rate, unpriv_rate)| unpriv_rate / priv_rate);
        DisparateImpact {
            privileged_group: privileged.to_string(),
            unprivileged_group: unprivileged.to_string(),
            privileged_n: 10,
            unprivileged_n: 8,
            privileged_rate: rates.map(|(priv_rate, _)| priv_rate),
            unprivileged_rate: rates.map(|(_, unpriv_rate)| unpriv_rate),
            disparate_impact: ratio,
            demographic_parity_difference: rates
                .map(|(priv_rate, unpriv_rate)| unpriv_rate - priv_rate),
            four_fifths_flag: ratio.map_or(false, |value| value < threshold),
        }
    }

    #[test]
    fn test_summary_shape_and_formatting() {
        let gender = di("Male", "Female", Some((0.8, 0.5)), 0.80);
        let age = vec![di("25-34", "65+", Some((0.8, 0.72)), 0.80)];
        let gap = InterestRateGap {
            male_n: 6,
            female_n: 4,
            male_median_rate: Some(0.051),
            female_median_rate: Some(0.0625),
            male_mean_rate: Some(0.05),
            female_mean_rate: Some(0.06),
        };

        let summary = build_fairness_summary(&gender, &age, Some(&gap));

        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].analysis, "Gender — Disparate Impact Ratio");
        assert_eq!(summary[0].metric_value, "0.6250");
        assert_eq!(summary[0].four_fifths_flag, Some(true));
        assert_eq!(summary[0].note, "Female rate 50.0% vs Male 80.0%");
        assert_eq!(summary[1].metric_value, "-0.3000");
        assert_eq!(summary[1].four_fifths_flag, None);
        assert_eq!(summary[2].analysis, "Age — DI ratio (65+ vs 25-34)");
        assert_eq!(summary[2].four_fifths_flag, Some(false));
        assert_eq!(summary[2].note, "n=8");
        assert_eq!(summary[3].metric_value, "Male=0.0510 Female=0.0625");
        assert_eq!(summary[3].note, "n Male=6, n Female=4");
    }

    #[test]
    fn test_missing_metrics_render_as_na() {
        let gender = di("Male", "Female", None, 0.80);
        let summary = build_fairness_summary(&gender, &[], None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].metric_value, "n/a");
        assert_eq!(summary[0].note, "Female rate n/a vs Male n/a");
        assert_eq!(summary[1].metric_value, "n/a");
    }
}
