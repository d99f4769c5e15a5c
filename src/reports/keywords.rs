//! Keyword listing
//!
//! Lists tracked keywords across the tree, with optional per-keyword
//! totals, a one-line summary, and an export file.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::core::model::{default_keywords, Hit, KeywordSet};
use crate::core::paths::normalize_path;
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::reports::warn_anomalies;
use crate::survex::extract::KeywordExtractor;
use crate::survex::lint::Anomaly;
use crate::survex::reader::{traverse, ReaderConfig};

/// What the keyword command should print or write
#[derive(Debug, Clone, Default)]
pub struct KeywordOptions {
    pub keywords: KeywordSet,
    pub totals: bool,
    pub summarize: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub warn: bool,
}

/// Build the keyword set from replace/add/exclude lists
pub fn select_keywords(
    replace: Option<&str>,
    add: Option<&str>,
    exclude: Option<&str>,
) -> KeywordSet {
    let mut keywords = match replace {
        Some(list) => KeywordSet::parse_list(list),
        None => default_keywords(),
    };
    if let Some(list) = add {
        keywords = keywords.union(&KeywordSet::parse_list(list));
    }
    if let Some(list) = exclude {
        keywords = keywords.difference(&KeywordSet::parse_list(list));
    }
    keywords
}

/// Hits and anomalies of one traversal
#[derive(Debug)]
pub struct KeywordReport {
    /// Resolved root file
    pub top: String,
    pub hits: Vec<Hit>,
    pub anomalies: Vec<Anomaly>,
}

/// Traverse the tree and keep the records whose keyword is tracked
pub fn scan_keywords(
    root: &Path,
    config: ReaderConfig,
    extractor: &KeywordExtractor,
) -> Result<KeywordReport> {
    let mut reader = traverse(root, config)?;
    let top = normalize_path(reader.root());
    let hits = extractor
        .extract(reader.by_ref())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(KeywordReport {
        top,
        hits,
        anomalies: reader.take_anomalies(),
    })
}

/// Run the keywords command
pub fn run_keywords(
    root: &Path,
    config: ReaderConfig,
    options: &KeywordOptions,
    render_config: RenderConfig,
) -> Result<ExitCode> {
    // Keyword spelling is only kept for the listing, where it is highlighted
    let preserve_case = options.output.is_none() && !options.totals && !options.summarize;
    let extractor = KeywordExtractor::new(options.keywords.clone(), preserve_case);
    let report = scan_keywords(root, config, &extractor)?;

    if options.warn {
        warn_anomalies(&render_config, &report.anomalies);
    }

    let renderer = Renderer::with_config(render_config);
    let keywords = extractor.keywords();

    if report.hits.is_empty() {
        if !options.quiet {
            println!(
                "{}",
                renderer.render_summary(&report.top, keywords, 0, None)
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    if options.totals {
        println!("{}", renderer.render_totals(&report.top, &report.hits));
    }

    match &options.output {
        Some(path) => {
            write_export(path, &report.hits, render_config)?;
            if !options.quiet || options.summarize {
                let extra = format!(" > {}", path.display());
                println!(
                    "{}",
                    renderer.render_summary(
                        &report.top,
                        keywords,
                        report.hits.len(),
                        Some(&extra)
                    )
                );
            }
        }
        None => {
            if options.summarize {
                println!(
                    "{}",
                    renderer.render_summary(&report.top, keywords, report.hits.len(), None)
                );
            }
            if !options.totals && !options.summarize {
                renderer.render_to(&report.hits, io::stdout().lock())?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Write hits to a file, format chosen by extension
fn write_export(path: &Path, hits: &[Hit], render_config: RenderConfig) -> Result<()> {
    let config = RenderConfig {
        format: OutputFormat::from_path(path),
        color: false,
        ..render_config
    };
    let mut content = Renderer::with_config(config).render(hits);
    content.push('\n');
    fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Keyword;
    use tempfile::TempDir;

    fn sample_tree(dir: &TempDir) -> PathBuf {
        fs::write(
            dir.path().join("top.svx"),
            "*begin dowprov\n*cs OSGB:SD\n*include dowcave\n*end dowprov\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("dowcave.svx"),
            "*begin dowcave\n*Fix entrance 98378 74300 334\n*entrance entrance\n1 2 3.0 090 0\n*end dowcave\n",
        )
        .unwrap();
        dir.path().join("top")
    }

    #[test]
    fn test_select_keywords_default() {
        assert_eq!(select_keywords(None, None, None), default_keywords());
    }

    #[test]
    fn test_select_keywords_replace_add_exclude() {
        let set = select_keywords(Some("fix,cs"), Some("data"), Some("CS"));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Keyword::Fix));
        assert!(set.contains(&Keyword::Other("DATA".to_string())));
    }

    #[test]
    fn test_scan_keywords() {
        let dir = TempDir::new().unwrap();
        let root = sample_tree(&dir);
        let extractor = KeywordExtractor::new(KeywordSet::parse_list("fix,entrance"), true);

        let report = scan_keywords(&root, ReaderConfig::default(), &extractor).unwrap();
        assert!(report.top.ends_with("top.svx"));
        let labels: Vec<&str> = report.hits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Fix", "entrance"]);
        assert_eq!(report.hits[0].record.context.to_string(), "dowprov.dowcave");
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_write_export_tsv() {
        let dir = TempDir::new().unwrap();
        let root = sample_tree(&dir);
        let extractor = KeywordExtractor::new(default_keywords(), false);
        let report = scan_keywords(&root, ReaderConfig::default(), &extractor).unwrap();

        let out = dir.path().join("keywords.tsv");
        write_export(&out, &report.hits, RenderConfig::default()).unwrap();
        let content = fs::read_to_string(&out).unwrap();
        // header + begin, cs, include, begin, fix, entrance, end, end
        assert_eq!(content.lines().count(), 9);
        assert!(content.contains("\tFIX\tentrance 98378 74300 334\t"));
    }
}
