//! Keyword retriever over the knowledge base.
//!
//! Scoring is a weighted count of literal overlaps between the query and a
//! chunk. There is no stemming, no embedding and no IDF: the knowledge base
//! is small and hand-curated, so keywords carry the signal.
//!
//! ## Scoring
//!
//! The query is lower-cased; its tokens are the whitespace-separated words
//! longer than two characters. Per chunk:
//!
//! | Part     | Points | Rule |
//! |----------|--------|------|
//! | keyword  | 10     | per keyword contained in the query |
//! | partial  | 3      | per (keyword, token) pair where either contains the other |
//! | title    | 5      | per token contained in the title |
//! | content  | 1      | per token contained in the content |
//! | category | 8      | per category trigger contained in the query |
//!
//! Chunks scoring zero are dropped. Results are ordered by descending score;
//! equal scores keep profile order.

use std::sync::Arc;

use serde::Serialize;

use crate::knowledge::{KnowledgeBase, KnowledgeChunk};

/// Points per keyword contained in the query.
pub const KEYWORD_WEIGHT: u32 = 10;
/// Points per keyword/token substring pair.
pub const PARTIAL_WEIGHT: u32 = 3;
/// Points per token found in the title.
pub const TITLE_WEIGHT: u32 = 5;
/// Points per token found in the content.
pub const CONTENT_WEIGHT: u32 = 1;
/// Points per category trigger found in the query.
pub const CATEGORY_WEIGHT: u32 = 8;

/// Tokens must be longer than this many characters.
const MIN_TOKEN_CHARS: usize = 2;

// ============================================================================
// Score types
// ============================================================================

/// Points contributed by each scoring rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub keyword: u32,
    pub partial: u32,
    pub title: u32,
    pub content: u32,
    pub category: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.keyword + self.partial + self.title + self.content + self.category
    }
}

/// A chunk selected for a query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a KnowledgeChunk,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
}

/// A lower-cased query split into scoring tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub lower: String,
    pub tokens: Vec<String>,
}

impl Query {
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        let tokens = lower
            .split_whitespace()
            .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
            .map(str::to_string)
            .collect();
        Self { lower, tokens }
    }
}

// ============================================================================
// Retriever
// ============================================================================

/// Lower-cased searchable text of one chunk.
#[derive(Debug, Clone)]
struct IndexedChunk {
    title: String,
    content: String,
}

/// Scores chunks of a [`KnowledgeBase`] against free-text queries.
///
/// Retrieval is pure: it performs no I/O and never fails.
#[derive(Debug, Clone)]
pub struct Retriever {
    kb: Arc<KnowledgeBase>,
    indexed: Vec<IndexedChunk>,
}

impl Retriever {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let indexed = kb
            .chunks()
            .iter()
            .map(|c| IndexedChunk {
                title: c.title.to_lowercase(),
                content: c.content.to_lowercase(),
            })
            .collect();
        Self { kb, indexed }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Return up to `top_k` chunks scoring above zero, best first.
    ///
    /// `top_k == 0` yields an empty result.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredChunk<'_>> {
        if top_k == 0 {
            return Vec::new();
        }

        let mut results = self.score_all(query);
        results.retain(|r| r.score > 0);
        // Stable sort: ties keep profile order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(top_k);

        tracing::debug!(
            query = %query,
            top_k,
            hits = results.len(),
            "Retrieved {}",
            results
                .iter()
                .map(|r| format!("{}={}", r.chunk.id, r.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        results
    }

    /// Score every chunk, in profile order, including zero scores.
    pub fn score_all(&self, query: &str) -> Vec<ScoredChunk<'_>> {
        let query = Query::parse(query);
        self.kb
            .chunks()
            .iter()
            .zip(&self.indexed)
            .map(|(chunk, indexed)| {
                let breakdown = score_chunk(&query, chunk, indexed);
                ScoredChunk {
                    chunk,
                    score: breakdown.total(),
                    breakdown,
                }
            })
            .collect()
    }
}

fn score_chunk(query: &Query, chunk: &KnowledgeChunk, indexed: &IndexedChunk) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    for keyword in &chunk.keywords {
        if query.lower.contains(keyword.as_str()) {
            breakdown.keyword += KEYWORD_WEIGHT;
        }
        for token in &query.tokens {
            if keyword.contains(token.as_str()) || token.contains(keyword.as_str()) {
                breakdown.partial += PARTIAL_WEIGHT;
            }
        }
    }

    for token in &query.tokens {
        if indexed.title.contains(token.as_str()) {
            breakdown.title += TITLE_WEIGHT;
        }
        if indexed.content.contains(token.as_str()) {
            breakdown.content += CONTENT_WEIGHT;
        }
    }

    for trigger in chunk.category.triggers() {
        if query.lower.contains(trigger) {
            breakdown.category += CATEGORY_WEIGHT;
        }
    }

    breakdown
}
