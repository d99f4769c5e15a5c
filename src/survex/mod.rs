//! Survex source-tree reading
//!
//! Provides:
//! - directive: directive recognition
//! - context: the begin/end naming stack
//! - reader: lazy recursive traversal of included files
//! - extract: keyword extraction and pattern search over records
//! - lint: scope anomalies raised while reading

pub mod context;
pub mod directive;
pub mod extract;
pub mod lint;
pub mod reader;
