//! Ignore and restore requests

use std::fmt;
use std::str::FromStr;

/// What to do with the selected detections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Suppress the detections until the reopen date
    Ignore,
    /// Reinstate previously ignored detections
    Restore,
}

impl Action {
    /// Value of the `action` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ignore => "ignore",
            Action::Restore => "restore",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator typed something other than ignore/restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParseError(pub String);

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected ignore or restore, got '{}'", self.0)
    }
}

impl std::error::Error for ActionParseError {}

impl FromStr for Action {
    type Err = ActionParseError;

    /// Accepts "ignore"/"restore" or their first letter, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "i" | "ignore" => Ok(Action::Ignore),
            "r" | "restore" => Ok(Action::Restore),
            other => Err(ActionParseError(other.to_string())),
        }
    }
}

/// Parameters of one `action=ignore` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRequest {
    /// Comma-separated QIDs, passed through verbatim
    pub qids: String,
    /// Comma-joined target IP expressions
    pub ips: String,
    pub comments: String,
    /// Date the detections reopen, in the upstream format (mm/dd/yyyy)
    pub reopen_date: String,
}

impl IgnoreRequest {
    /// Form fields for the request
    pub fn params(&self) -> [(&'static str, &str); 5] {
        [
            ("action", Action::Ignore.as_str()),
            ("qids", &self.qids),
            ("ips", &self.ips),
            ("comments", &self.comments),
            ("reopen_ignored_date", &self.reopen_date),
        ]
    }
}

/// Parameters of one `action=restore` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub qids: String,
    pub ips: String,
    pub comments: String,
}

impl RestoreRequest {
    /// Form fields for the request
    pub fn params(&self) -> [(&'static str, &str); 4] {
        [
            ("action", Action::Restore.as_str()),
            ("qids", &self.qids),
            ("ips", &self.ips),
            ("comments", &self.comments),
        ]
    }
}

/// Split a comma-separated target list, dropping blanks
pub fn split_targets(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
