//! Recursive source-tree reader
//!
//! `traverse` returns a lazy iterator over every line of a survey tree in
//! depth-first order: when line N of a file includes another file, the whole
//! included file is yielded before line N+1. Each open file is a frame owning
//! its decoded lines; the file handle itself is closed as soon as the content
//! has been read. Dropping the reader (or hitting an error) releases every
//! frame still open.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::error::{Result, SurveyError};
use crate::core::file_reader::{open_survey_file, LineReader};
use crate::core::model::{IncludeSite, Keyword, Record, SourceFile, Visit};
use crate::core::paths::{self, include_target, resolve_include, with_default_extension};
use crate::survex::context::ContextStack;
use crate::survex::directive::{recognize, Markers};
use crate::survex::lint::Anomaly;

/// Configuration for a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub markers: Markers,

    /// Extension appended to file references that have none
    pub extension: String,

    /// Record absolute file paths instead of paths relative to the working directory
    pub absolute_paths: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            extension: paths::SVX_EXTENSION.to_string(),
            absolute_paths: false,
        }
    }
}

/// An open file
#[derive(Debug)]
struct Frame {
    file: Arc<SourceFile>,
    display: String,
    canonical: PathBuf,
    lines: LineReader,
    line_number: u32,
    depth_on_entry: usize,
}

/// A file waiting to be opened on the next call
#[derive(Debug)]
struct PendingFile {
    path: PathBuf,
    depth: usize,
    included_from: Option<IncludeSite>,
}

/// Lazy traversal of a survey source tree
#[derive(Debug)]
pub struct SurveyReader {
    config: ReaderConfig,
    root: PathBuf,
    frames: Vec<Frame>,
    context: ContextStack,
    pending: Option<PendingFile>,
    anomalies: Vec<Anomaly>,
    files_visited: usize,
    finished: bool,
}

/// Start a traversal at `root`, appending the configured extension if it has none
pub fn traverse(root: impl AsRef<Path>, config: ReaderConfig) -> Result<SurveyReader> {
    let mut path = with_default_extension(root.as_ref(), &config.extension);
    if !path.is_file() {
        return Err(SurveyError::RootNotFound { path });
    }
    if config.absolute_paths {
        let absolute = paths::absolute(&path).map_err(|source| SurveyError::Io {
            path: path.clone(),
            source,
        })?;
        path = absolute;
    }

    Ok(SurveyReader {
        config,
        root: path.clone(),
        frames: Vec::new(),
        context: ContextStack::new(),
        pending: Some(PendingFile {
            path,
            depth: 0,
            included_from: None,
        }),
        anomalies: Vec::new(),
        files_visited: 0,
        finished: false,
    })
}

impl SurveyReader {
    /// Resolved root file
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Anomalies found so far
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn take_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    /// Number of files opened so far
    pub fn files_visited(&self) -> usize {
        self.files_visited
    }

    /// Number of files currently open
    pub fn open_files(&self) -> usize {
        self.frames.len()
    }

    /// Survey path in effect after the last yielded line
    pub fn context(&self) -> &ContextStack {
        &self.context
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Only the line records of this traversal, leaving the reader usable
    /// for its anomalies afterwards
    pub fn records(&mut self) -> impl Iterator<Item = Result<Record>> + '_ {
        self.by_ref()
            .filter_map(|visit| visit.map(Visit::into_record).transpose())
    }

    fn open(&mut self, pending: PendingFile) -> Result<Arc<SourceFile>> {
        let PendingFile {
            path,
            depth,
            included_from,
        } = pending;

        let canonical = std::fs::canonicalize(&path)
            .map_err(|e| open_error(&path, included_from.as_ref(), e))?;

        if let Some(pos) = self.frames.iter().position(|f| f.canonical == canonical) {
            let chain = self.frames[pos..]
                .iter()
                .map(|f| f.file.path.clone())
                .chain(std::iter::once(path))
                .collect();
            return Err(SurveyError::IncludeCycle { chain });
        }

        let lines =
            open_survey_file(&path).map_err(|e| open_error(&path, included_from.as_ref(), e))?;
        let encoding = lines.encoding();

        let file = Arc::new(SourceFile {
            path,
            encoding,
            depth,
            included_from,
        });
        let shown = file.display_path();
        info!(path = %shown, %encoding, depth, "entering file");

        self.files_visited += 1;
        self.frames.push(Frame {
            file: Arc::clone(&file),
            display: shown,
            canonical,
            lines,
            line_number: 0,
            depth_on_entry: self.context().depth(),
        });
        Ok(file)
    }

    /// Apply the line's directive, if any, after its context was captured
    fn apply_directive(&mut self, mut record: Record) -> Record {
        let directive = recognize(&record.text, &self.config().markers);
        let (keyword, spelling, argument, name) = match directive {
            Some(d) => {
                let name = d.first_argument().map(str::to_lowercase);
                (d.keyword, d.spelling.to_string(), d.argument.to_string(), name)
            }
            None => return record,
        };

        match keyword {
            Keyword::Begin => match name {
                Some(name) => self.context.push(&name),
                None => self.report(Anomaly::empty_begin(&record.file, record.line)),
            },
            Keyword::End => match name {
                Some(name) => match self.context.peek() {
                    Some(opened) => {
                        if opened != name {
                            let opened = opened.to_string();
                            self.report(Anomaly::mismatched_end(
                                &record.file,
                                record.line,
                                &opened,
                                &name,
                            ));
                        }
                        self.context.pop();
                    }
                    None => self.report(Anomaly::unbalanced_end(&record.file, record.line, &name)),
                },
                None => self.report(Anomaly::empty_end(&record.file, record.line)),
            },
            Keyword::Include => {
                if include_target(&argument).is_empty() {
                    self.report(Anomaly::empty_include(&record.file, record.line));
                } else if let Some(frame) = self.frames.last() {
                    let path = resolve_include(&frame.file.path, &argument, &self.config.extension);
                    debug!(include = %argument, resolved = %path.display(), "include");
                    self.pending = Some(PendingFile {
                        path,
                        depth: self.frames.len(),
                        included_from: Some(IncludeSite {
                            file: record.file.clone(),
                            line: record.line,
                        }),
                    });
                }
            }
            _ => {}
        }

        record.keyword = Some(keyword);
        record.spelling = Some(spelling);
        record.argument = argument;
        record
    }

    fn leave_file(&mut self) {
        if let Some(frame) = self.frames.pop() {
            let depth = self.context.depth();
            if depth != frame.depth_on_entry {
                self.report(Anomaly::unbalanced_file(
                    &frame.display,
                    frame.line_number,
                    frame.depth_on_entry,
                    depth,
                ));
            }
            debug!(path = %frame.display, lines = frame.line_number, "leaving file");
        }
    }

    fn report(&mut self, anomaly: Anomaly) {
        debug!(
            code = anomaly.code.as_str(),
            file = %anomaly.file,
            line = anomaly.line,
            "{}",
            anomaly.message
        );
        self.anomalies.push(anomaly);
    }

    /// Stop the traversal, closing every open file
    fn fail(&mut self, err: SurveyError) -> SurveyError {
        debug!(open = self.open_files(), error = %err, "traversal stopped");
        self.finished = true;
        self.pending = None;
        self.frames.clear();
        err
    }
}

fn open_error(path: &Path, site: Option<&IncludeSite>, source: std::io::Error) -> SurveyError {
    match site {
        Some(site) => SurveyError::IncludeNotFound {
            path: path.to_path_buf(),
            from: PathBuf::from(&site.file),
            line: site.line,
            source,
        },
        None => SurveyError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

impl Iterator for SurveyReader {
    type Item = Result<Visit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(pending) = self.pending.take() {
            return Some(match self.open(pending) {
                Ok(file) => Ok(Visit::Enter(file)),
                Err(err) => Err(self.fail(err)),
            });
        }

        loop {
            let frame = match self.frames.last_mut() {
                Some(frame) => frame,
                None => {
                    self.finished = true;
                    return None;
                }
            };

            match frame.lines.next_line() {
                Some(text) => {
                    frame.line_number += 1;
                    let record = Record {
                        file: frame.display.clone(),
                        encoding: frame.file.encoding,
                        line: frame.line_number,
                        context: self.context.snapshot(),
                        keyword: None,
                        spelling: None,
                        argument: String::new(),
                        text,
                    };
                    return Some(Ok(Visit::Line(self.apply_directive(record))));
                }
                None => self.leave_file(),
            }
        }
    }
}

impl FusedIterator for SurveyReader {}
