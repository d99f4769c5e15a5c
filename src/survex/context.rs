//! Survey naming context
//!
//! `*begin name` opens a naming scope and `*end name` closes it. The stack is
//! owned by one traversal and mutated only by its reader.

use crate::core::model::Context;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    segments: Vec<String>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a segment, lowercased
    pub fn push(&mut self, segment: &str) {
        self.segments.push(segment.to_lowercase());
    }

    /// Pop the innermost segment; popping an empty stack does nothing
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Innermost open segment
    pub fn peek(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Copy of the current context
    pub fn snapshot(&self) -> Context {
        Context::new(self.segments.clone())
    }
}
