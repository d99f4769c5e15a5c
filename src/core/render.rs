//! Renderer module
//!
//! Renders hits, visited files and anomalies to text, jsonl, json or tsv.

use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use crate::core::model::{Hit, HitKind, KeywordSet, SourceFile};
use crate::survex::lint::Anomaly;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
    Json,
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "tsv" | "table" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Export format implied by a file name, TSV unless it says otherwise
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => OutputFormat::Json,
            Some("jsonl") => OutputFormat::Jsonl,
            Some("txt") => OutputFormat::Text,
            _ => OutputFormat::Tsv,
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub color: bool,

    /// Show the survey path in text listings
    pub paths: bool,

    pub pretty: bool,

    /// Directive marker, highlighted with its keyword
    pub marker: char,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: false,
            paths: false,
            pretty: false,
            marker: '*',
        }
    }
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }
}

const TSV_COLUMNS: [&str; 7] = ["file", "encoding", "line", "path", "keyword", "argument", "full"];

/// Renderer for hits, files and anomalies
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render hits in the configured format
    pub fn render(&self, hits: &[Hit]) -> String {
        match self.config.format {
            OutputFormat::Text => hits
                .iter()
                .map(|hit| self.render_line(hit))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Jsonl => self.render_jsonl(hits),
            OutputFormat::Json => self.render_json(hits),
            OutputFormat::Tsv => self.render_tsv(hits),
        }
    }

    /// Render to a writer, ending with a newline when anything was written
    pub fn render_to<W: Write>(&self, hits: &[Hit], mut writer: W) -> std::io::Result<()> {
        let output = self.render(hits);
        if !output.is_empty() {
            writer.write_all(output.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// A single hit for line-oriented formats, None for json and tsv
    pub fn render_streaming(&self, hit: &Hit) -> Option<String> {
        match self.config.format {
            OutputFormat::Text => Some(self.render_line(hit)),
            OutputFormat::Jsonl => Some(render_items_jsonl(
                std::slice::from_ref(hit),
                self.config.pretty,
            )),
            OutputFormat::Json | OutputFormat::Tsv => None,
        }
    }

    /// One listing line: `file:line:text`, or `file:line:path:text` with paths on
    pub fn render_line(&self, hit: &Hit) -> String {
        let record = &hit.record;
        let text = record.display_text();
        let span = self.highlight_span(hit, &text);

        if !self.config.color {
            return if self.config.paths {
                format!("{}:{}:{}:{}", record.file, record.line, record.context, text)
            } else {
                format!("{}:{}:{}", record.file, record.line, text)
            };
        }

        let sep = ":".cyan();
        let body = match span {
            Some(r) => format!("{}{}{}", &text[..r.start], text[r.clone()].red(), &text[r.end..]),
            None => text.clone(),
        };
        if self.config.paths {
            format!(
                "{}{}{}{}{}{}{}",
                record.file.purple(),
                sep,
                record.line.to_string().green(),
                sep,
                record.context.to_string().blue(),
                sep,
                body
            )
        } else {
            format!(
                "{}{}{}{}{}",
                record.file.purple(),
                sep,
                record.line.to_string().green(),
                sep,
                body
            )
        }
    }

    /// Byte range to highlight inside the display text
    fn highlight_span(&self, hit: &Hit, text: &str) -> Option<Range<usize>> {
        match hit.kind {
            HitKind::Keyword => {
                let spelling = hit.record.spelling.as_deref()?;
                let rest = text.strip_prefix(self.config.marker)?;
                let gap = rest.len() - rest.trim_start().len();
                let end = self.config.marker.len_utf8() + gap + spelling.len();
                (end <= text.len() && text.is_char_boundary(end)).then_some(0..end)
            }
            HitKind::Pattern => {
                if hit.label.is_empty() {
                    return None;
                }
                let start = text.find(&hit.label)?;
                Some(start..start + hit.label.len())
            }
        }
    }

    fn render_jsonl(&self, hits: &[Hit]) -> String {
        render_items_jsonl(hits, self.config.pretty)
    }

    fn render_json(&self, hits: &[Hit]) -> String {
        render_items_json(hits, self.config.pretty)
    }

    /// Tab-separated table with a header row
    fn render_tsv(&self, hits: &[Hit]) -> String {
        let mut rows = vec![TSV_COLUMNS.join("\t")];
        for hit in hits {
            let record = &hit.record;
            let fields = [
                record.file.clone(),
                record.encoding.to_string(),
                record.line.to_string(),
                record.context.to_string(),
                hit.label.clone(),
                record.argument.clone(),
                record.display_text(),
            ];
            rows.push(
                fields
                    .iter()
                    .map(|f| tsv_field(f))
                    .collect::<Vec<_>>()
                    .join("\t"),
            );
        }
        rows.join("\n")
    }

    /// Per-keyword counts, most frequent first: `top:KEYWORD:count`
    pub fn render_totals(&self, top: &str, hits: &[Hit]) -> String {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for hit in hits {
            *counts.entry(hit.label.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        counts
            .into_iter()
            .map(|(keyword, total)| {
                if self.config.color {
                    format!(
                        "{}{}{}{}{}",
                        top.purple(),
                        ":".cyan(),
                        keyword.red(),
                        ":".cyan(),
                        total
                    )
                } else {
                    format!("{}:{}:{}", top, keyword, total)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `top:K1|K2: N records found`, with an optional suffix
    pub fn render_summary(
        &self,
        top: &str,
        keywords: &KeywordSet,
        count: usize,
        extra: Option<&str>,
    ) -> String {
        let joined = keywords.joined();
        let mut summary = if self.config.color {
            format!(
                "{}{}{}{} {} records found",
                top.purple(),
                ":".cyan(),
                joined.red(),
                ":".cyan(),
                count
            )
        } else {
            format!("{}:{}: {} records found", top, joined, count)
        };
        if let Some(extra) = extra {
            if self.config.color {
                summary.push_str(&extra.yellow().to_string());
            } else {
                summary.push_str(extra);
            }
        }
        summary
    }

    /// Visited files in visitation order
    pub fn render_files(&self, files: &[SourceFile], tree: bool) -> String {
        match self.config.format {
            OutputFormat::Jsonl => render_items_jsonl(files, self.config.pretty),
            OutputFormat::Json => render_items_json(files, self.config.pretty),
            OutputFormat::Tsv => {
                let mut rows = vec!["file\tencoding\tdepth\tincluded_from".to_string()];
                for file in files {
                    let site = file
                        .included_from
                        .as_ref()
                        .map(|s| format!("{}:{}", s.file, s.line))
                        .unwrap_or_default();
                    rows.push(format!(
                        "{}\t{}\t{}\t{}",
                        tsv_field(&file.display_path()),
                        file.encoding,
                        file.depth,
                        tsv_field(&site)
                    ));
                }
                rows.join("\n")
            }
            OutputFormat::Text => files
                .iter()
                .map(|file| {
                    let indent = if tree {
                        "  ".repeat(file.depth)
                    } else {
                        String::new()
                    };
                    if self.config.color {
                        format!(
                            "{}{} ({})",
                            indent,
                            file.display_path().purple(),
                            file.encoding.to_string().green()
                        )
                    } else {
                        format!("{}{} ({})", indent, file.display_path(), file.encoding)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Anomalies, one per line
    pub fn render_anomalies(&self, anomalies: &[Anomaly]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => render_items_jsonl(anomalies, self.config.pretty),
            OutputFormat::Json => render_items_json(anomalies, self.config.pretty),
            OutputFormat::Text | OutputFormat::Tsv => anomalies
                .iter()
                .map(|anomaly| {
                    if self.config.color {
                        anomaly.render().yellow().to_string()
                    } else {
                        anomaly.render()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn render_items_jsonl<T: Serialize>(items: &[T], pretty: bool) -> String {
    items
        .iter()
        .filter_map(|item| {
            if pretty {
                serde_json::to_string_pretty(item).ok()
            } else {
                serde_json::to_string(item).ok()
            }
        })
        .collect::<Vec<_>>()
        .join(if pretty { "\n\n" } else { "\n" })
}

fn render_items_json<T: Serialize>(items: &[T], pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
    } else {
        serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Keep a field on one line and inside one column
fn tsv_field(field: &str) -> String {
    field.replace(&['\t', '\n', '\r'][..], " ")
}
