//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::core::paths::SVX_EXTENSION;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::reports::keywords::{select_keywords, KeywordOptions};
use crate::survex::directive::Markers;
use crate::survex::reader::ReaderConfig;

/// svx-keywords - list keywords and search lines across a Survex source tree.
#[derive(Parser, Debug)]
#[command(name = "svx-keywords")]
#[command(
    author,
    version,
    about,
    long_about = r#"svx-keywords reads a Survex (.svx) file together with every file it
includes, in the order Survex itself would read them, and reports on the lines.

Every line is tagged with its file, line number, source encoding and survey path
(the dot-joined names of the *begin blocks enclosing it).

Output formats:
- text: file:line:text listings (default)
- jsonl: one JSON object per line
- json: a single JSON array
- tsv: tab-separated table with a header row

Examples:
    svx-keywords keywords dowprov
    svx-keywords keywords dowprov -k fix,entrance --paths
    svx-keywords keywords dowprov -a data -o keywords.tsv
    svx-keywords grep "OSGB" dowprov -i
    svx-keywords files dowprov --tree
    svx-keywords lint dowprov
"#
)]
pub struct Cli {
    /// Output format (text/jsonl/json/tsv).
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_name = "FORMAT",
        value_parser = ["text", "jsonl", "json", "tsv"],
        long_help = "Select the output format.\n\n\
Supported values:\n\
- text (default)\n\
- jsonl\n\
- json\n\
- tsv\n\n\
Files written with -o pick their format from the file extension instead."
    )]
    pub format: String,

    /// Colorize text output.
    #[arg(
        short,
        long,
        global = true,
        long_help = "Colorize text output: file names, line numbers, survey paths and the\n\
matched keyword or pattern. Forces color even when stdout is not a terminal."
    )]
    pub color: bool,

    /// Show the survey path in text listings.
    #[arg(short, long, global = true)]
    pub paths: bool,

    /// Record absolute file paths.
    #[arg(
        short = 'd',
        long,
        global = true,
        long_help = "Record absolute file paths instead of paths relative to the\n\
current directory."
    )]
    pub absolute: bool,

    /// Directive marker character.
    #[arg(long, global = true, default_value_t = '*', value_name = "CHAR")]
    pub marker: char,

    /// Comment marker character.
    #[arg(long, global = true, default_value_t = ';', value_name = "CHAR")]
    pub comment: char,

    /// Extension appended to file names that have none.
    #[arg(long, global = true, default_value = SVX_EXTENSION, value_name = "EXT")]
    pub extension: String,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress summaries. Listings and search results are still printed."
    )]
    pub quiet: bool,

    /// Verbose mode (trace files as they are read).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log each file as it is entered, with its encoding, on stderr.\n\n\
RUST_LOG overrides the log filter when set, e.g. RUST_LOG=debug also logs\n\
includes and anomalies as they are found."
    )]
    pub verbose: bool,

    /// Print scope anomalies as warnings on stderr.
    #[arg(
        short,
        long,
        global = true,
        long_help = "Print begin/end and include anomalies found while reading as warnings\n\
on stderr. They never stop the traversal."
    )]
    pub warn: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List lines carrying tracked keywords.
    #[command(
        long_about = "List every line of the tree whose directive keyword is tracked.\n\n\
The default set is BEGIN, CS, END, ENTRANCE, EQUATE, FIX and INCLUDE. Keyword\n\
lists are comma separated and case insensitive.\n\n\
Examples:\n\
  svx-keywords keywords dowprov\n\
  svx-keywords keywords dowprov -k fix -t\n\
  svx-keywords keywords dowprov -e begin,end -o keywords.json\n"
    )]
    Keywords {
        /// Top-level survey file (extension optional).
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Replace the default keyword set.
        #[arg(short, long, env = "SVX_KEYWORDS", value_name = "LIST")]
        keywords: Option<String>,

        /// Add keywords to the set.
        #[arg(short, long, value_name = "LIST")]
        add: Option<String>,

        /// Remove keywords from the set.
        #[arg(short, long, value_name = "LIST")]
        exclude: Option<String>,

        /// Print per-keyword totals instead of the listing.
        #[arg(short, long)]
        totals: bool,

        /// Print a one-line summary instead of the listing.
        #[arg(short, long)]
        summarize: bool,

        /// Write results to a file (.json, .jsonl, .txt, otherwise tsv).
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Search every line of the tree with a regular expression.
    #[command(
        long_about = "Search the text of every line of the tree, trimmed of surrounding\n\
whitespace, with a regular expression. Exits with status 1 when nothing matches.\n\n\
Examples:\n\
  svx-keywords grep \"\\*fix\" dowprov -i\n\
  svx-keywords grep \"^1 \" dowprov --format jsonl\n"
    )]
    Grep {
        /// Regular expression to search for.
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Top-level survey file (extension optional).
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Case-insensitive matching.
        #[arg(short, long)]
        ignore_case: bool,
    },

    /// List the files read, in reading order.
    Files {
        /// Top-level survey file (extension optional).
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Indent each file by its include depth.
        #[arg(long)]
        tree: bool,
    },

    /// Report begin/end and include anomalies. Exits with status 1 when any are found.
    Lint {
        /// Top-level survey file (extension optional).
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Execute the CLI command
pub fn run(cli: Cli) -> Result<ExitCode> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    if cli.color {
        colored::control::set_override(true);
    }
    let render_config = RenderConfig {
        color: cli.color,
        paths: cli.paths,
        pretty: cli.pretty,
        marker: cli.marker,
        ..RenderConfig::new(format)
    };
    let reader_config = ReaderConfig {
        markers: Markers {
            directive: cli.marker,
            comment: cli.comment,
        },
        extension: cli.extension,
        absolute_paths: cli.absolute,
    };

    match cli.command {
        Commands::Keywords {
            file,
            keywords,
            add,
            exclude,
            totals,
            summarize,
            output,
        } => {
            let options = KeywordOptions {
                keywords: select_keywords(keywords.as_deref(), add.as_deref(), exclude.as_deref()),
                totals,
                summarize,
                output,
                quiet: cli.quiet,
                warn: cli.warn,
            };
            crate::reports::keywords::run_keywords(&file, reader_config, &options, render_config)
        }

        Commands::Grep {
            pattern,
            file,
            ignore_case,
        } => crate::reports::grep::run_grep(
            &file,
            reader_config,
            &pattern,
            ignore_case,
            cli.warn,
            render_config,
        ),

        Commands::Files { file, tree } => {
            crate::reports::files::run_files(&file, reader_config, tree, cli.warn, render_config)
        }

        Commands::Lint { file } => {
            crate::reports::lint::run_lint(&file, reader_config, cli.quiet, render_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_keywords_with_globals() {
        let cli = Cli::try_parse_from([
            "svx-keywords",
            "keywords",
            "dowprov",
            "-k",
            "fix,cs",
            "--paths",
            "--marker",
            "#",
            "--format",
            "jsonl",
        ])
        .unwrap();
        assert!(cli.paths);
        assert_eq!(cli.marker, '#');
        assert_eq!(cli.format, "jsonl");
        match cli.command {
            Commands::Keywords { file, keywords, .. } => {
                assert_eq!(file, PathBuf::from("dowprov"));
                assert_eq!(keywords.as_deref(), Some("fix,cs"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reject_unknown_format() {
        assert!(Cli::try_parse_from(["svx-keywords", "--format", "xml", "files", "x"]).is_err());
    }
}
