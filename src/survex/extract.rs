//! Consumers of the record sequence: keyword extraction and pattern search

use regex::{Regex, RegexBuilder};

use crate::core::error::Result;
use crate::core::model::{Hit, HitKind, KeywordSet, Record, Visit};

/// Selects records whose keyword is in a set
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    keywords: KeywordSet,
    preserve_case: bool,
}

impl KeywordExtractor {
    pub fn new(keywords: KeywordSet, preserve_case: bool) -> Self {
        Self {
            keywords,
            preserve_case,
        }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Turn a record into a hit if its keyword is tracked
    pub fn hit(&self, record: Record) -> Option<Hit> {
        let keyword = record.keyword.as_ref()?;
        if !self.keywords.contains(keyword) {
            return None;
        }

        let label = match (&record.spelling, self.preserve_case) {
            (Some(spelling), true) => spelling.clone(),
            _ => keyword.to_string(),
        };
        Some(Hit {
            record,
            label,
            kind: HitKind::Keyword,
        })
    }

    /// Filter a traversal down to keyword hits, passing errors through
    pub fn extract<'a, I>(&'a self, visits: I) -> impl Iterator<Item = Result<Hit>> + 'a
    where
        I: IntoIterator<Item = Result<Visit>>,
        I::IntoIter: 'a,
    {
        visits.into_iter().filter_map(move |visit| match visit {
            Ok(Visit::Line(record)) => self.hit(record).map(Ok),
            Ok(Visit::Enter(_)) => None,
            Err(err) => Some(Err(err)),
        })
    }
}

/// Regex search over trimmed line text
#[derive(Debug, Clone)]
pub struct PatternSearch {
    regex: Regex,
}

impl PatternSearch {
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Self { regex })
    }

    pub fn hit(&self, record: Record) -> Option<Hit> {
        let label = self.regex.find(record.text.trim())?.as_str().to_string();
        Some(Hit {
            record,
            label,
            kind: HitKind::Pattern,
        })
    }

    pub fn search<I>(&self, visits: I) -> Grep<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Visit>>,
    {
        Grep {
            search: self,
            visits: visits.into_iter(),
            matched: 0,
        }
    }
}

/// Iterator over pattern hits that counts what it found
#[derive(Debug)]
pub struct Grep<'a, I> {
    search: &'a PatternSearch,
    visits: I,
    matched: usize,
}

impl<I> Grep<'_, I> {
    /// Hits yielded so far
    pub fn matched(&self) -> usize {
        self.matched
    }
}

impl<I> Iterator for Grep<'_, I>
where
    I: Iterator<Item = Result<Visit>>,
{
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.visits.next()? {
                Ok(Visit::Line(record)) => {
                    if let Some(hit) = self.search.hit(record) {
                        self.matched += 1;
                        return Some(Ok(hit));
                    }
                }
                Ok(Visit::Enter(_)) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
