//! Traversal errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("survey file not found: {}", .path.display())]
    RootNotFound { path: PathBuf },

    #[error("cannot open {} included from {}:{line}", .path.display(), .from.display())]
    IncludeNotFound {
        path: PathBuf,
        from: PathBuf,
        line: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("inclusion cycle: {}", format_chain(.chain))]
    IncludeCycle { chain: Vec<PathBuf> },

    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SurveyError>;

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
