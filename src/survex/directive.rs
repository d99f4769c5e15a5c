//! Directive recognition
//!
//! A directive line looks like `*begin dowcave ; comment`: the directive
//! marker, optional whitespace, a keyword and free argument text.

use crate::core::model::Keyword;

/// Marker characters of the survey language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub directive: char,
    pub comment: char,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            directive: '*',
            comment: ';',
        }
    }
}

/// A recognized directive, borrowing from its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub keyword: Keyword,

    /// Keyword token as written
    pub spelling: &'a str,

    /// Remainder after the keyword, trimmed
    pub argument: &'a str,
}

impl<'a> Directive<'a> {
    /// Whitespace-separated argument words
    pub fn words(&self) -> impl Iterator<Item = &'a str> {
        self.argument.split_whitespace()
    }

    /// First argument word, if any
    pub fn first_argument(&self) -> Option<&'a str> {
        self.words().next()
    }
}

/// Remove a trailing comment and surrounding whitespace
pub fn strip_comment(line: &str, comment: char) -> &str {
    match line.find(comment) {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Recognize a directive on a decoded line
pub fn recognize<'a>(line: &'a str, markers: &Markers) -> Option<Directive<'a>> {
    let clean = strip_comment(line, markers.comment);
    let rest = clean.strip_prefix(markers.directive)?.trim_start();

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (spelling, argument) = rest.split_at(end);
    if spelling.is_empty() {
        return None;
    }

    Some(Directive {
        keyword: Keyword::parse(spelling),
        spelling,
        argument: argument.trim(),
    })
}
