#![forbid(unsafe_code)]

//! Search-result data model.
//!
//! These types are produced by an external ranking service and consumed
//! read-only by the surface. A new query always yields a wholly new result
//! array; nothing here is mutated in place.

use std::fmt;
use std::time::{Duration, SystemTime};

/// How a result matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Verbatim text match.
    Exact,
    /// Edit-distance match.
    Fuzzy,
    /// Embedding-similarity match.
    Semantic,
    /// Match produced by an AI reranker.
    Ai,
    /// Matched on the entry category.
    Category,
    /// Matched on an entry tag.
    Tag,
}

impl MatchType {
    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Semantic => "semantic",
            Self::Ai => "ai",
            Self::Category => "category",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A highlighted span within one field of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Field the span belongs to ("title", "problem", "solution").
    pub field: String,
    /// Byte offset where the span starts.
    pub start: usize,
    /// Byte offset one past the end of the span.
    pub end: usize,
    /// The highlighted text itself.
    pub text: String,
}

/// Diagnostics attached by the ranking service.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMetadata {
    /// How long ranking took for this result.
    pub processing_time: Duration,
    /// Which ranking backend produced it ("fts", "semantic", "ai").
    pub source: String,
    /// Backend confidence in [0, 1].
    pub confidence: f32,
    /// Whether a fallback backend was used.
    pub fallback: bool,
}

/// A knowledge-base entry. Owned by the external store; the list only ever
/// holds read references through [`SearchResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct KBEntry {
    /// Unique entry id.
    pub id: String,
    /// Short title shown in the list.
    pub title: String,
    /// Problem description.
    pub problem: String,
    /// Known solution.
    pub solution: String,
    /// Category ("COBOL", "JCL", "VSAM", "DB2", ...).
    pub category: String,
    /// Ordered tags; duplicates allowed.
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: SystemTime,
    /// Last-update time.
    pub updated_at: SystemTime,
    /// How many times the entry was applied.
    pub usage_count: u32,
    /// How many applications were confirmed helpful.
    pub success_count: u32,
    /// How many applications were confirmed unhelpful.
    pub failure_count: u32,
}

impl KBEntry {
    /// Minimal constructor; counters start at zero, timestamps at `now`.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            id: id.into(),
            title: title.into(),
            problem: String::new(),
            solution: String::new(),
            category: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            usage_count: 0,
            success_count: 0,
            failure_count: 0,
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// One ranked search result.
///
/// `entry` is `None` when the ranking service handed over a malformed row;
/// the surface renders those as degraded placeholders rather than failing
/// the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched entry, or `None` for a malformed row.
    pub entry: Option<KBEntry>,
    /// Relevance score, clamped to [0, 100].
    pub score: f32,
    /// How the match was produced.
    pub match_type: MatchType,
    /// Highlighted spans, possibly empty.
    pub highlights: Vec<Highlight>,
    /// Optional human-readable ranking explanation.
    pub explanation: Option<String>,
    /// Optional ranking diagnostics.
    pub metadata: Option<ResultMetadata>,
}

impl SearchResult {
    /// Create a result for an entry with a score.
    #[must_use]
    pub fn new(entry: KBEntry, score: f32, match_type: MatchType) -> Self {
        Self {
            entry: Some(entry),
            score: score.clamp(0.0, 100.0),
            match_type,
            highlights: Vec::new(),
            explanation: None,
            metadata: None,
        }
    }

    /// Create a malformed placeholder row.
    #[must_use]
    pub fn malformed(match_type: MatchType) -> Self {
        Self {
            entry: None,
            score: 0.0,
            match_type,
            highlights: Vec::new(),
            explanation: None,
            metadata: None,
        }
    }

    /// Id of the underlying entry, if the row is well-formed.
    #[must_use]
    pub fn entry_id(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.id.as_str())
    }

    /// Title of the underlying entry, if the row is well-formed.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped() {
        let r = SearchResult::new(KBEntry::new("kb-1", "VSAM File Access Error"), 250.0, MatchType::Exact);
        assert_eq!(r.score, 100.0);
        let r = SearchResult::new(KBEntry::new("kb-1", "t"), -3.0, MatchType::Fuzzy);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn malformed_row_has_no_identity() {
        let r = SearchResult::malformed(MatchType::Semantic);
        assert!(r.entry_id().is_none());
        assert!(r.title().is_none());
    }

    #[test]
    fn match_type_labels() {
        assert_eq!(MatchType::Ai.as_str(), "ai");
        assert_eq!(MatchType::Category.to_string(), "category");
    }
}
