//! Reports module - command handlers built on the record sequence
//!
//! Provides:
//! - keywords: keyword listing, totals, summary and export
//! - grep: pattern search with grep-like exit status
//! - files: the files visited by a traversal
//! - lint: scope anomalies of a whole tree

pub mod files;
pub mod grep;
pub mod keywords;
pub mod lint;

use std::io::{self, Write};

use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::survex::lint::Anomaly;

/// Print anomalies to stderr as warnings
pub fn warn_anomalies(config: &RenderConfig, anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        return;
    }
    let renderer = Renderer::with_config(config.with_format(OutputFormat::Text));
    eprintln!("{}", renderer.render_anomalies(anomalies));
}

/// Write one line to stdout; false once the reader has gone away
pub fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{}", line) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e),
    }
}
