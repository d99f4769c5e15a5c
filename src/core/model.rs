//! Survey record model
//!
//! Every report (keyword listing, grep, file trace, export) consumes the same
//! values defined here.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Text encoding detected for one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "ISO-8859-1")]
    Latin1,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directive keyword, canonicalized to uppercase
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Keyword {
    Include,
    Begin,
    End,
    Fix,
    Entrance,
    Equate,
    Cs,
    /// Any other directive, stored uppercase
    Other(String),
}

impl Keyword {
    /// Parse a keyword token, ignoring case
    pub fn parse(token: &str) -> Self {
        let upper = token.trim().to_uppercase();
        match upper.as_str() {
            "INCLUDE" => Keyword::Include,
            "BEGIN" => Keyword::Begin,
            "END" => Keyword::End,
            "FIX" => Keyword::Fix,
            "ENTRANCE" => Keyword::Entrance,
            "EQUATE" => Keyword::Equate,
            "CS" => Keyword::Cs,
            _ => Keyword::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Keyword::Include => "INCLUDE",
            Keyword::Begin => "BEGIN",
            Keyword::End => "END",
            Keyword::Fix => "FIX",
            Keyword::Entrance => "ENTRANCE",
            Keyword::Equate => "EQUATE",
            Keyword::Cs => "CS",
            Keyword::Other(name) => name,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Keyword {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Keyword::parse(&s))
    }
}

/// Keywords tracked by default
pub const DEFAULT_KEYWORDS: [Keyword; 7] = [
    Keyword::Include,
    Keyword::Begin,
    Keyword::End,
    Keyword::Fix,
    Keyword::Entrance,
    Keyword::Equate,
    Keyword::Cs,
];

/// A set of canonical keywords
///
/// Entries are normalized on insertion, so membership is a plain lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordSet {
    keywords: BTreeSet<Keyword>,
}

impl KeywordSet {
    /// Parse a comma-separated list such as `fix,Entrance, cs`
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Keyword::parse)
            .collect()
    }

    pub fn contains(&self, keyword: &Keyword) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn union(&self, other: &KeywordSet) -> KeywordSet {
        self.keywords.union(&other.keywords).cloned().collect()
    }

    pub fn difference(&self, other: &KeywordSet) -> KeywordSet {
        self.keywords.difference(&other.keywords).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Names sorted alphabetically and joined with `|`
    pub fn joined(&self) -> String {
        let mut names: Vec<&str> = self.keywords.iter().map(Keyword::as_str).collect();
        names.sort_unstable();
        names.join("|")
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<T: IntoIterator<Item = Keyword>>(iter: T) -> Self {
        Self {
            keywords: iter.into_iter().collect(),
        }
    }
}

/// The keyword set used when the caller names none
pub fn default_keywords() -> KeywordSet {
    DEFAULT_KEYWORDS.iter().cloned().collect()
}

/// Location of an include directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSite {
    pub file: String,
    pub line: u32,
}

/// One file opened during a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path as resolved (relative to the working directory unless absolute paths were requested)
    pub path: PathBuf,

    pub encoding: Encoding,

    /// Inclusion depth, 0 for the root file
    pub depth: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_from: Option<IncludeSite>,
}

impl SourceFile {
    /// Path with '/' separators, as shown in every report
    pub fn display_path(&self) -> String {
        crate::core::paths::normalize_path(&self.path)
    }
}

/// Snapshot of the survey naming context at one line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Vec<String>);

impl Context {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dotted survey path, e.g. `dowprov.dowcave`
impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One line of one visited file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub file: String,
    pub encoding: Encoding,

    /// 1-based line number
    pub line: u32,

    /// Context in force while the line is read, before its own begin/end takes effect
    pub context: Context,

    /// Recognized directive, if the line carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Keyword>,

    /// Keyword as written in the source
    #[serde(skip)]
    pub spelling: Option<String>,

    pub argument: String,

    /// The full line, without its terminator
    pub text: String,
}

impl Record {
    /// Trimmed text with tabs expanded to 8-column stops
    pub fn display_text(&self) -> String {
        expand_tabs(self.text.trim(), 8)
    }
}

/// Expand tabs to the given stop width
pub fn expand_tabs(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = width - column % width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// One step of a traversal
#[derive(Debug, Clone)]
pub enum Visit {
    /// A file was opened
    Enter(Arc<SourceFile>),
    /// A line was read
    Line(Record),
}

impl Visit {
    pub fn into_record(self) -> Option<Record> {
        match self {
            Visit::Line(record) => Some(record),
            Visit::Enter(_) => None,
        }
    }
}

/// What a consumer highlights inside a hit's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// From the directive marker through the keyword
    Keyword,
    /// The matched text
    Pattern,
}

/// A record selected by a consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    #[serde(flatten)]
    pub record: Record,

    /// Keyword (canonical or as written) or matched text
    pub label: String,

    #[serde(skip)]
    pub kind: HitKind,
}
