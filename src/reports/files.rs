//! Visited-file listing

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::core::model::{SourceFile, Visit};
use crate::core::render::{RenderConfig, Renderer};
use crate::reports::warn_anomalies;
use crate::survex::reader::{traverse, ReaderConfig, SurveyReader};

/// Files of the tree in visitation order, one entry per inclusion
pub fn collect_files(reader: &mut SurveyReader) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for visit in reader.by_ref() {
        if let Visit::Enter(file) = visit? {
            files.push(file.as_ref().clone());
        }
    }
    Ok(files)
}

/// Run the files command
pub fn run_files(
    root: &Path,
    config: ReaderConfig,
    tree: bool,
    warn: bool,
    render_config: RenderConfig,
) -> Result<ExitCode> {
    let mut reader = traverse(root, config)?;
    let files = collect_files(&mut reader)?;

    if warn {
        warn_anomalies(&render_config, reader.anomalies());
    }

    let output = Renderer::with_config(render_config).render_files(&files, tree);
    if !output.is_empty() {
        writeln!(io::stdout().lock(), "{}", output)?;
    }
    Ok(ExitCode::SUCCESS)
}
