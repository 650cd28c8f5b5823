//! Program configuration
//!
//! Loaded once from a TOML file, then selected fields are overridden from
//! the environment. No hot reload.

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::ExperienceLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How free-text questions without a stored answer are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Ask the operator on stdin
    Prompt,
    /// Profile keywords, then `default_answer`
    Auto,
}

/// Program configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    /// Asked on stdin when empty
    pub password: String,
    pub phone_number: String,
    /// Salary expectation
    pub salary: String,
    /// Desired hourly rate
    pub rate: String,
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    pub experience_level: Vec<ExperienceLevel>,
    /// Company blacklist
    pub blacklist: Vec<String>,
    pub blacklist_titles: Vec<String>,
    /// Uncheck "follow company" before submitting
    pub unfollow_companies: bool,
    /// Applied-job ledger
    pub output_file: PathBuf,
    /// Question / answer store
    pub qa_file: PathBuf,
    pub log_dir: PathBuf,
    pub answer_mode: AnswerMode,
    pub default_answer: String,
    pub uploads: Uploads,
    pub browser: BrowserSettings,
    pub limits: Limits,
    pub pacing: PacingSettings,
}

/// Upload paths keyed by document type
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Uploads {
    pub resume: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Attach to a running browser instead of launching one
    pub debug_port: Option<u16>,
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub login_url: String,
    pub search_url: String,
    pub job_url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub combo_budget_minutes: u64,
    pub max_combos: usize,
    pub max_steps: usize,
    pub step_timeout_secs: u64,
    pub page_load_timeout_secs: u64,
    pub dedup_window_days: i64,
    pub jobs_per_page: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub enabled: bool,
    /// Between field interactions, milliseconds [min, max]
    pub short_ms: [u64; 2],
    /// After navigation and between jobs, milliseconds [min, max]
    pub long_ms: [u64; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            phone_number: String::new(),
            salary: String::new(),
            rate: String::new(),
            positions: Vec::new(),
            locations: Vec::new(),
            experience_level: vec![ExperienceLevel::EntryLevel, ExperienceLevel::Associate],
            blacklist: Vec::new(),
            blacklist_titles: Vec::new(),
            unfollow_companies: true,
            output_file: PathBuf::from("output.csv"),
            qa_file: PathBuf::from("qa.csv"),
            log_dir: PathBuf::from("logs"),
            answer_mode: AnswerMode::Prompt,
            default_answer: "Yes".to_string(),
            uploads: Uploads::default(),
            browser: BrowserSettings::default(),
            limits: Limits::default(),
            pacing: PacingSettings::default(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            debug_port: None,
            headless: false,
            executable: None,
            login_url: "https://www.linkedin.com/login".to_string(),
            search_url: "https://www.linkedin.com/jobs/search/".to_string(),
            job_url: "https://www.linkedin.com/jobs/view/".to_string(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            combo_budget_minutes: 60,
            max_combos: 500,
            max_steps: 25,
            step_timeout_secs: 30,
            page_load_timeout_secs: 30,
            dedup_window_days: 2,
            jobs_per_page: 25,
        }
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            short_ms: [300, 900],
            long_ms: [1500, 2900],
        }
    }
}

impl Limits {
    pub fn combo_budget(&self) -> Duration {
        Duration::from_secs(self.combo_budget_minutes * 60)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn dedup_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.dedup_window_days)
    }
}

impl Config {
    /// Read the TOML file, apply environment overrides and validate
    ///
    /// # Arguments
    /// - `path`: the TOML config file
    ///
    /// # Returns
    /// `FileError::NotFound` for a missing file, `ConfigError` for bad values
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::File(FileError::NotFound {
                    path: path.display().to_string(),
                })
            } else {
                AppError::file_read_failed(path.display().to_string(), e)
            }
        })?;

        let mut config = Self::from_toml(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Environment overrides for credentials, files and browser port
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("EASY_APPLY_USERNAME") {
            self.username = v;
        }
        if let Ok(v) = std::env::var("EASY_APPLY_PASSWORD") {
            self.password = v;
        }
        if let Ok(v) = std::env::var("EASY_APPLY_OUTPUT_FILE") {
            self.output_file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("EASY_APPLY_QA_FILE") {
            self.qa_file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BROWSER_DEBUG_PORT") {
            let port = v.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "BROWSER_DEBUG_PORT".to_string(),
                value: v.clone(),
                expected_type: "u16".to_string(),
            })?;
            self.browser.debug_port = Some(port);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        if self.positions.is_empty() {
            return Err(ConfigError::EmptyList { field: "positions" });
        }
        if self.locations.is_empty() {
            return Err(ConfigError::EmptyList { field: "locations" });
        }
        for (slot, path) in [
            ("resume", &self.uploads.resume),
            ("cover_letter", &self.uploads.cover_letter),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(ConfigError::UploadMissing {
                        slot,
                        path: path.display().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
