//! Scope anomalies
//!
//! Checks raised while reading:
//! - begin/end pairing and naming
//! - files that leave the context deeper or shallower than they found it
//! - includes without a target
//!
//! None of these stop a traversal.

use serde::Serialize;
use std::fmt;

/// Anomaly severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Anomaly code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyCode {
    EmptyBegin,
    EmptyEnd,
    MismatchedEnd,
    UnbalancedEnd,
    UnbalancedFile,
    EmptyInclude,
}

impl AnomalyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyCode::EmptyBegin => "EMPTY_BEGIN",
            AnomalyCode::EmptyEnd => "EMPTY_END",
            AnomalyCode::MismatchedEnd => "MISMATCHED_END",
            AnomalyCode::UnbalancedEnd => "UNBALANCED_END",
            AnomalyCode::UnbalancedFile => "UNBALANCED_FILE",
            AnomalyCode::EmptyInclude => "EMPTY_INCLUDE",
        }
    }
}

/// A problem found in the source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub severity: Severity,
    pub code: AnomalyCode,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl Anomaly {
    pub fn error(code: AnomalyCode, message: impl Into<String>, file: &str, line: u32) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            file: file.to_string(),
            line,
        }
    }

    pub fn warning(code: AnomalyCode, message: impl Into<String>, file: &str, line: u32) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            file: file.to_string(),
            line,
        }
    }

    pub fn empty_begin(file: &str, line: u32) -> Self {
        Self::warning(
            AnomalyCode::EmptyBegin,
            format!("empty BEGIN statement at line {} in {}", line, file),
            file,
            line,
        )
    }

    pub fn empty_end(file: &str, line: u32) -> Self {
        Self::warning(
            AnomalyCode::EmptyEnd,
            format!("empty END statement at line {} in {}", line, file),
            file,
            line,
        )
    }

    pub fn mismatched_end(file: &str, line: u32, opened: &str, closed: &str) -> Self {
        Self::warning(
            AnomalyCode::MismatchedEnd,
            format!(
                "mismatched BEGIN and END statements: END {} at line {} in {} closes BEGIN {}",
                closed, line, file, opened
            ),
            file,
            line,
        )
    }

    pub fn unbalanced_end(file: &str, line: u32, closed: &str) -> Self {
        Self::error(
            AnomalyCode::UnbalancedEnd,
            format!(
                "END {} at line {} in {} has no matching BEGIN",
                closed, line, file
            ),
            file,
            line,
        )
    }

    pub fn unbalanced_file(file: &str, line: u32, entered: usize, left: usize) -> Self {
        Self::error(
            AnomalyCode::UnbalancedFile,
            format!(
                "{} entered at survey depth {} but left at depth {}",
                file, entered, left
            ),
            file,
            line,
        )
    }

    pub fn empty_include(file: &str, line: u32) -> Self {
        Self::error(
            AnomalyCode::EmptyInclude,
            format!("INCLUDE without a file name at line {} in {}", line, file),
            file,
            line,
        )
    }

    /// One-line form printed by `--warn` and `lint`
    pub fn render(&self) -> String {
        match self.severity {
            Severity::Warning => format!("WARNING: {}", self.message),
            Severity::Error => format!("ERROR: {}", self.message),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.file,
            self.line,
            self.code.as_str(),
            self.message
        )
    }
}
