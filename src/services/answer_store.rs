//! Question / answer store - business capability layer
//!
//! Only knows how to remember answers and where to get new ones; it does not
//! know anything about forms.

use crate::config::{AnswerMode, Config};
use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const HEADER: [&str; 2] = ["Question", "Answer"];

/// Where answers to unknown questions come from
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn answer(&self, question: &str) -> AppResult<String>;
}

/// Answers learned across runs
///
/// The file is only ever appended to; the in-memory map is authoritative
/// for the rest of the run.
pub struct AnswerStore {
    path: PathBuf,
    answers: HashMap<String, String>,
}

impl AnswerStore {
    /// Load the store, creating an empty file with a header on first run
    ///
    /// A corrupt file is logged and treated as empty.
    ///
    /// # Arguments
    /// - `path`: the `Question,Answer` CSV file
    ///
    /// # Returns
    /// The store, or `WriteFailed` if a new file could not be created
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        if !path.is_file() {
            info!("📄 creating answer store {}", path.display());
            let shown = path.display().to_string();
            let mut writer = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_path(&path)
                .map_err(|e| AppError::file_write_failed(shown.as_str(), e))?;
            writer
                .write_record(HEADER)
                .map_err(|e| AppError::file_write_failed(shown.as_str(), e))?;
            writer
                .flush()
                .map_err(|e| AppError::file_write_failed(shown.as_str(), e))?;
            return Ok(Self {
                path,
                answers: HashMap::new(),
            });
        }

        let answers = match read_pairs(&path) {
            Ok(answers) => {
                info!("✓ {} stored answers loaded", answers.len());
                answers
            }
            Err(e) => {
                warn!(
                    "⚠️ answer store {} could not be read: {} (starting empty)",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Ok(Self { path, answers })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.answers.get(question).map(String::as_str)
    }

    /// Remember an answer, appending it to the file when it is new or changed
    ///
    /// # Arguments
    /// - `question`: label text exactly as the form shows it
    /// - `answer`: value to reuse next time
    ///
    /// # Returns
    /// `WriteFailed` if the append fails; the in-memory map is then unchanged
    pub fn record(&mut self, question: &str, answer: &str) -> AppResult<()> {
        if self.get(question) == Some(answer) {
            return Ok(());
        }
        self.append(question, answer)?;
        self.answers
            .insert(question.to_string(), answer.to_string());
        Ok(())
    }

    /// Known answer, or ask `source` and persist what it says
    ///
    /// # Arguments
    /// - `question`: label text exactly as the form shows it
    /// - `source`: asked only when the store has no answer
    ///
    /// # Returns
    /// The answer to type or select
    pub async fn get_or_prompt(
        &mut self,
        question: &str,
        source: &dyn AnswerSource,
    ) -> AppResult<String> {
        if let Some(answer) = self.get(question) {
            debug!("stored answer for '{}'", question);
            return Ok(answer.to_string());
        }

        let answer = source.answer(question).await?;
        self.record(question, &answer)?;
        info!(
            "📝 learned answer: {} -> {}",
            truncate_text(question, 60),
            answer
        );
        Ok(answer)
    }

    fn append(&self, question: &str, answer: &str) -> AppResult<()> {
        let path = self.path.display().to_string();
        let write_err = |e: std::io::Error| AppError::file_write_failed(path.as_str(), e);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record([question, answer])
            .map_err(|e| AppError::file_write_failed(path.as_str(), e))?;
        let line = writer
            .into_inner()
            .map_err(|e| AppError::file_write_failed(path.as_str(), e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(&line).map_err(write_err)?;
        file.sync_data().map_err(write_err)?;
        Ok(())
    }
}

fn read_pairs(path: &Path) -> AppResult<HashMap<String, String>> {
    let read_err = |e: csv::Error| AppError::file_read_failed(path.display().to_string(), e);
    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    if headers.iter().map(str::trim).ne(HEADER) {
        return Err(AppError::Other(format!(
            "unexpected header {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut answers = HashMap::new();
    for row in reader.records() {
        let row = row.map_err(read_err)?;
        // later rows win, so a hand-edited correction appended at the end applies
        answers.insert(row[0].to_string(), row[1].to_string());
    }
    Ok(answers)
}

// ========== answer sources ==========

/// Answers from the operator's profile by keyword, else a fixed fallback
pub struct ProfileAnswers {
    rules: Vec<(Regex, String)>,
    fallback: String,
}

impl ProfileAnswers {
    pub fn new(phone: &str, salary: &str, rate: &str, fallback: &str) -> Self {
        let mut rules = Vec::new();
        for (pattern, value) in [
            (r"(?i)\b(phone|mobile)\b", phone),
            (r"(?i)\b(hourly|per hour|rate)\b", rate),
            (r"(?i)\b(salary|compensation|pay expectations?)\b", salary),
        ] {
            if value.trim().is_empty() {
                continue;
            }
            if let Ok(re) = Regex::new(pattern) {
                rules.push((re, value.to_string()));
            }
        }
        Self {
            rules,
            fallback: fallback.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.phone_number,
            &config.salary,
            &config.rate,
            &config.default_answer,
        )
    }

    /// Profile value whose keyword appears in the question
    pub fn suggest(&self, question: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(question))
            .map(|(_, value)| value.as_str())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

#[async_trait]
impl AnswerSource for ProfileAnswers {
    async fn answer(&self, question: &str) -> AppResult<String> {
        Ok(self.suggest(question).unwrap_or(&self.fallback).to_string())
    }
}

/// Asks the operator on stdin when the profile has nothing to offer
pub struct OperatorPrompt {
    profile: ProfileAnswers,
}

impl OperatorPrompt {
    pub fn new(profile: ProfileAnswers) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl AnswerSource for OperatorPrompt {
    async fn answer(&self, question: &str) -> AppResult<String> {
        if let Some(answer) = self.profile.suggest(question) {
            return Ok(answer.to_string());
        }

        let prompt = format!(
            "\n❓ {}\n   answer (empty = \"{}\"): ",
            question,
            self.profile.fallback()
        );
        let reply = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stdout = std::io::stdout();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| AppError::Other(format!("prompt task failed: {}", e)))??;

        let reply = reply.trim();
        if reply.is_empty() {
            Ok(self.profile.fallback().to_string())
        } else {
            Ok(reply.to_string())
        }
    }
}

/// Source selected by `answer_mode`
pub fn source_from_config(config: &Config) -> Box<dyn AnswerSource> {
    let profile = ProfileAnswers::from_config(config);
    match config.answer_mode {
        AnswerMode::Prompt => Box::new(OperatorPrompt::new(profile)),
        AnswerMode::Auto => Box::new(profile),
    }
}
