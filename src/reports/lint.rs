//! Lint command: read the whole tree and report scope anomalies

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::core::paths::normalize_path;
use crate::core::render::{RenderConfig, Renderer};
use crate::survex::lint::Anomaly;
use crate::survex::reader::{traverse, ReaderConfig};

/// Outcome of a complete traversal
#[derive(Debug)]
pub struct LintReport {
    pub top: String,
    pub files: usize,
    /// In the order they were found
    pub anomalies: Vec<Anomaly>,
}

pub fn lint_tree(root: &Path, config: ReaderConfig) -> Result<LintReport> {
    let mut reader = traverse(root, config)?;
    for record in reader.records() {
        record?;
    }
    Ok(LintReport {
        top: normalize_path(reader.root()),
        files: reader.files_visited(),
        anomalies: reader.take_anomalies(),
    })
}

/// Run the lint command; exit status 1 when anything was found
pub fn run_lint(
    root: &Path,
    config: ReaderConfig,
    quiet: bool,
    render_config: RenderConfig,
) -> Result<ExitCode> {
    let report = lint_tree(root, config)?;
    if report.anomalies.is_empty() {
        if !quiet {
            println!("{}: {} files read, no anomalies", report.top, report.files);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let output = Renderer::with_config(render_config).render_anomalies(&report.anomalies);
    writeln!(io::stdout().lock(), "{}", output)?;
    Ok(ExitCode::from(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survex::lint::AnomalyCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lint_clean_tree() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("top.svx"), "*begin a\n*begin b\n*end b\n*end a\n").unwrap();

        let report = lint_tree(&dir.path().join("top"), ReaderConfig::default()).unwrap();
        assert!(report.anomalies.is_empty());
        assert_eq!(report.files, 1);
    }

    #[test]
    fn test_lint_reports_scope_problems() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("top.svx"),
            "*begin\n*begin a\n*end b\n*end c\n*include\n",
        )
        .unwrap();

        let codes: Vec<AnomalyCode> = lint_tree(&dir.path().join("top"), ReaderConfig::default())
            .unwrap()
            .anomalies
            .into_iter()
            .map(|a| a.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                AnomalyCode::EmptyBegin,
                AnomalyCode::MismatchedEnd,
                AnomalyCode::UnbalancedEnd,
                AnomalyCode::EmptyInclude,
            ]
        );
    }
}
