use crate::model::EnrollmentStatus;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fill out your username and/or password")]
    MissingCredentials,
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// Strings written to the export for each enrollment state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub not_applicable: String,
    pub available: String,
    pub enrolled: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            not_applicable: "N/A".into(),
            available: "AVAILABLE".into(),
            enrolled: "ENROLLED".into(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, status: EnrollmentStatus) -> &str {
        match status {
            EnrollmentStatus::NotApplicable => &self.not_applicable,
            EnrollmentStatus::Available => &self.available,
            EnrollmentStatus::Enrolled => &self.enrolled,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_seconds: u64,
    /// Number of offers to process/write between progress log lines.
    #[serde(default = "default_notification_threshold")]
    pub notification_threshold: usize,
    /// Fixed date used instead of the local clock.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub status_labels: StatusLabels,
}

fn default_base_url() -> String {
    "https://global.americanexpress.com".into()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("offers.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_notification_threshold() -> usize {
    10
}

impl AppConfig {
    /// Checks everything that must hold before a session is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        self.delimiter_byte()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter))
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
