//! Pipeline settings with environment and YAML overrides.
//!
//! Every knob that changes validation or curation behaviour lives here:
//! the email pattern, the gender normalisation map, the required applicant
//! columns, the pseudonymisation salt and the age-band reference date.
//! Defaults match the NovaCred curation policy; overrides come from a YAML
//! file (`--settings`) or `CREDFORGE_*` environment variables.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::records::application::ApplicationRow;

const DEFAULT_EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const DEFAULT_HASH_SALT: &str = "novacred_static_salt_v1";
const DEFAULT_FOUR_FIFTHS_THRESHOLD: f64 = 0.80;

/// Raw applicant columns that must be populated for a row to count as complete.
pub const REQUIRED_APPLICANT_RAW_COLUMNS: [&str; 7] = [
    "raw_applicant_full_name",
    "raw_applicant_email",
    "raw_applicant_ssn",
    "raw_applicant_ip_address",
    "raw_applicant_gender",
    "raw_applicant_date_of_birth",
    "raw_applicant_zip_code",
];

/// Errors that can occur while building or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid email pattern '{pattern}': {message}")]
    InvalidEmailPattern { pattern: String, message: String },

    #[error("Unknown column(s) in required_applicant_columns: {0}")]
    UnknownRequiredColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration for a curation run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Anchored pattern a cleaned email must match to count as valid.
    pub email_pattern: String,
    /// Lowercased raw gender value to canonical label (e.g. "m" -> "Male").
    pub gender_map: BTreeMap<String, String>,
    /// Raw columns checked by the missing-required-field rule.
    pub required_applicant_columns: Vec<String>,
    /// Static salt mixed into every pseudonym hash. Changing it rotates
    /// every pseudonym in the analysis dataset.
    pub hash_salt: String,
    /// Date ages are computed against when banding dates of birth.
    pub analysis_reference_date: NaiveDate,
    /// Disparate-impact ratio below which the four-fifths flag raises.
    pub four_fifths_threshold: f64,
    email_regex: Regex,
}

/// Optional overrides loaded from a YAML settings file. Absent keys keep
/// their defaults.
#[derive(Debug, Default, Deserialize)]
struct SettingsOverlay {
    email_pattern: Option<String>,
    gender_map: Option<BTreeMap<String, String>>,
    required_applicant_columns: Option<Vec<String>>,
    hash_salt: Option<String>,
    analysis_reference_date: Option<NaiveDate>,
    four_fifths_threshold: Option<f64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let mut gender_map = BTreeMap::new();
        for (key, label) in [
            ("m", "Male"),
            ("male", "Male"),
            ("f", "Female"),
            ("female", "Female"),
        ] {
            gender_map.insert(key.to_string(), label.to_string());
        }

        Self {
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            gender_map,
            required_applicant_columns: REQUIRED_APPLICANT_RAW_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
            hash_salt: DEFAULT_HASH_SALT.to_string(),
            analysis_reference_date: default_reference_date(),
            four_fifths_threshold: DEFAULT_FOUR_FIFTHS_THRESHOLD,
            email_regex: Regex::new(DEFAULT_EMAIL_PATTERN)
                .expect("Invalid default email pattern"),
        }
    }
}

fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("Invalid default reference date")
}

impl PipelineSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create settings from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Ok(pattern) = env::var("CREDFORGE_EMAIL_PATTERN") {
            settings = settings.with_email_pattern(pattern)?;
        }
        if let Ok(salt) = env::var("CREDFORGE_HASH_SALT") {
            settings.hash_salt = salt;
        }
        if let Some(date) = parse_env_value::<NaiveDate>("CREDFORGE_REFERENCE_DATE") {
            settings.analysis_reference_date = date;
        }
        if let Some(threshold) = parse_env_value::<f64>("CREDFORGE_FOUR_FIFTHS_THRESHOLD") {
            settings.four_fifths_threshold = threshold;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file, applying its keys over the defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let overlay: SettingsOverlay = serde_yaml::from_str(&text)?;

        let mut settings = Self::default();
        if let Some(pattern) = overlay.email_pattern {
            settings = settings.with_email_pattern(pattern)?;
        }
        if let Some(map) = overlay.gender_map {
            settings.gender_map = map;
        }
        if let Some(columns) = overlay.required_applicant_columns {
            settings.required_applicant_columns = columns;
        }
        if let Some(salt) = overlay.hash_salt {
            settings.hash_salt = salt;
        }
        if let Some(date) = overlay.analysis_reference_date {
            settings.analysis_reference_date = date;
        }
        if let Some(threshold) = overlay.four_fifths_threshold {
            settings.four_fifths_threshold = threshold;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings consistency.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hash_salt.trim().is_empty() {
            return Err(SettingsError::ValidationFailed(
                "hash_salt must not be empty".to_string(),
            ));
        }

        if !(self.four_fifths_threshold > 0.0 && self.four_fifths_threshold <= 1.0) {
            return Err(SettingsError::ValidationFailed(format!(
                "four_fifths_threshold must be in (0, 1], got {}",
                self.four_fifths_threshold
            )));
        }

        if self.gender_map.is_empty() {
            return Err(SettingsError::ValidationFailed(
                "gender_map must not be empty".to_string(),
            ));
        }

        if self.required_applicant_columns.is_empty() {
            return Err(SettingsError::ValidationFailed(
                "required_applicant_columns must not be empty".to_string(),
            ));
        }

        let unknown: Vec<&str> = self
            .required_applicant_columns
            .iter()
            .filter(|column| !ApplicationRow::is_named_raw_column(column))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(SettingsError::UnknownRequiredColumn(unknown.join(", ")));
        }

        Ok(())
    }

    /// Compiled form of [`Self::email_pattern`].
    pub fn email_regex(&self) -> &Regex {
        &self.email_regex
    }

    /// Distinct canonical labels produced by the gender map.
    pub fn canonical_genders(&self) -> BTreeSet<&str> {
        self.gender_map.values().map(String::as_str).collect()
    }

    /// Builder: replace the email pattern, recompiling it.
    pub fn with_email_pattern(mut self, pattern: impl Into<String>) -> Result<Self, SettingsError> {
        let pattern = pattern.into();
        self.email_regex =
            Regex::new(&pattern).map_err(|err| SettingsError::InvalidEmailPattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
        self.email_pattern = pattern;
        Ok(self)
    }

    /// Builder: set the pseudonymisation salt.
    pub fn with_hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.hash_salt = salt.into();
        self
    }

    /// Builder: set the age-band reference date.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.analysis_reference_date = date;
        self
    }

    /// Builder: replace the required applicant column list.
    pub fn with_required_columns(mut self, columns: Vec<String>) -> Self {
        self.required_applicant_columns = columns;
        self
    }

    /// Builder: set the four-fifths threshold.
    pub fn with_four_fifths_threshold(mut self, threshold: f64) -> Self {
        self.four_fifths_threshold = threshold;
        self
    }
}

fn parse_env_value<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}
