//! Pattern search
//!
//! Searches every line of the tree. Text and jsonl hits are written as they
//! are found; json and tsv wait for the whole traversal.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use std::process::ExitCode;

use crate::core::render::{RenderConfig, Renderer};
use crate::reports::{warn_anomalies, write_line};
use crate::survex::extract::PatternSearch;
use crate::survex::reader::{traverse, ReaderConfig};

/// Run the grep command; exit status 1 when nothing matched
pub fn run_grep(
    root: &Path,
    config: ReaderConfig,
    pattern: &str,
    ignore_case: bool,
    warn: bool,
    render_config: RenderConfig,
) -> Result<ExitCode> {
    let search = PatternSearch::new(pattern, ignore_case)
        .with_context(|| format!("invalid pattern: {}", pattern))?;
    let renderer = Renderer::with_config(render_config);
    let mut reader = traverse(root, config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut batch = Vec::new();
    let mut grep = search.search(reader.by_ref());

    for hit in grep.by_ref() {
        let hit = hit?;
        match renderer.render_streaming(&hit) {
            Some(line) => {
                if !write_line(&mut out, &line)? {
                    return Ok(ExitCode::SUCCESS);
                }
            }
            None => batch.push(hit),
        }
    }
    let matched = grep.matched();

    renderer.render_to(&batch, &mut out)?;

    if warn {
        warn_anomalies(&render_config, reader.anomalies());
    }

    Ok(if matched == 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
