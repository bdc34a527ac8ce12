// ABOUTME: Scored candidate records and the structural NodePath used for containment tests.
// ABOUTME: Candidates borrow their element from the parsed document and are never mutated.

use std::collections::BTreeSet;
use std::fmt;

use scraper::ElementRef;

const PATH_SEPARATOR: char = '/';

/// Slash-delimited location of a node in the document tree, e.g. `0/1/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build a path from child indices, root first.
    pub fn from_indices(indices: &[usize]) -> Self {
        let segments: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
        Self(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `self` is `ancestor` itself or lies beneath it.
    ///
    /// Matching is per segment, so `1/10` is not inside `1/1`.
    pub fn is_within(&self, ancestor: &NodePath) -> bool {
        match self.0.strip_prefix(ancestor.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(PATH_SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One scored DOM node considered for inclusion in the article.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub path: NodePath,
    /// Rank in document pre-order.
    pub order_index: usize,
    pub depth: usize,
    pub score: f64,
    /// Normalized id/class words; empty for comment-like regions.
    pub tokens: BTreeSet<String>,
    pub element: ElementRef<'a>,
}
