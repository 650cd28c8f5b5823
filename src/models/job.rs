//! Job postings and application records

use chrono::NaiveDateTime;
use std::fmt::Display;
use std::str::FromStr;

/// Timestamp format of the ledger file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A posting found on a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    /// Site-assigned id, unique
    pub job_id: String,
    pub title: String,
    pub company: String,
}

impl JobPosting {
    pub fn new(
        job_id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            title: title.into(),
            company: company.into(),
        }
    }
}

/// Final result column of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Success,
    Failure,
    Skipped,
}

impl ApplyResult {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplyResult::Success => "success",
            ApplyResult::Failure => "failure",
            ApplyResult::Skipped => "skipped",
        }
    }
}

impl Display for ApplyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplyResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(ApplyResult::Success),
            "failure" => Ok(ApplyResult::Failure),
            "skipped" => Ok(ApplyResult::Skipped),
            other => Err(format!("unknown result '{}'", other)),
        }
    }
}

/// One line of the applied-job ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRecord {
    pub timestamp: NaiveDateTime,
    pub job_id: String,
    pub title: String,
    pub company: String,
    /// The apply dialog was opened
    pub attempted: bool,
    pub result: ApplyResult,
}

impl AppliedRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        job: &JobPosting,
        attempted: bool,
        result: ApplyResult,
    ) -> Self {
        Self {
            timestamp,
            job_id: job.job_id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            attempted,
            result,
        }
    }

    /// Columns in file order: timestamp, jobID, job, company, attempted, result
    pub fn to_row(&self) -> [String; 6] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.job_id.clone(),
            self.title.clone(),
            self.company.clone(),
            if self.attempted { "True" } else { "False" }.to_string(),
            self.result.as_str().to_string(),
        ]
    }

    /// Parse one ledger row
    pub fn from_row(row: &csv::StringRecord) -> Result<Self, String> {
        if row.len() != 6 {
            return Err(format!("expected 6 columns, found {}", row.len()));
        }
        let timestamp = NaiveDateTime::parse_from_str(row[0].trim(), TIMESTAMP_FORMAT)
            .map_err(|e| format!("bad timestamp '{}': {}", &row[0], e))?;
        let attempted = match row[4].trim() {
            "True" | "true" => true,
            "False" | "false" => false,
            other => return Err(format!("bad attempted flag '{}'", other)),
        };
        Ok(Self {
            timestamp,
            job_id: row[1].trim().to_string(),
            title: row[2].to_string(),
            company: row[3].to_string(),
            attempted,
            result: row[5].parse()?,
        })
    }
}

/// One (position, location) search pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchCombo {
    pub position: String,
    pub location: String,
}

impl SearchCombo {
    pub fn new(position: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            location: location.into(),
        }
    }
}

impl Display for SearchCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_uses_ledger_column_order() {
        let ts = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", TIMESTAMP_FORMAT).unwrap();
        let job = JobPosting::new("123", "Engineer", "Acme");
        let record = AppliedRecord::new(ts, &job, true, ApplyResult::Success);

        assert_eq!(
            record.to_row(),
            [
                "2024-01-01 10:00:00".to_string(),
                "123".to_string(),
                "Engineer".to_string(),
                "Acme".to_string(),
                "True".to_string(),
                "success".to_string(),
            ]
        );
    }

    #[test]
    fn from_row_rejects_short_and_malformed_rows() {
        let short = csv::StringRecord::from(vec!["2024-01-01 10:00:00", "123"]);
        assert!(AppliedRecord::from_row(&short).is_err());

        let bad_ts = csv::StringRecord::from(vec![
            "yesterday", "123", "Engineer", "Acme", "True", "success",
        ]);
        assert!(AppliedRecord::from_row(&bad_ts).is_err());

        let bad_result = csv::StringRecord::from(vec![
            "2024-01-01 10:00:00", "123", "Engineer", "Acme", "True", "maybe",
        ]);
        assert!(AppliedRecord::from_row(&bad_result).is_err());
    }
}
