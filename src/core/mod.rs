//! Core module - data model, errors, file reading, paths and rendering
//!
//! This module provides:
//! - Record model shared by every report
//! - Survey error type
//! - Encoding detection and line reading
//! - Path resolution for includes
//! - Rendering to text/jsonl/json/tsv

pub mod error;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
