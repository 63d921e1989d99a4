//! Fuzzy matching of search queries against complaint labels.
//!
//! All scores live in [0, 1]. Inputs are normalized with
//! [`crate::text::normalize_text`] before scoring, so matching is case- and
//! accent-insensitive everywhere.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::{normalize_text, similarity, tokenize};

/// Default weight of the prefix signal in [`composite_match`].
pub const DEFAULT_PREFIX_WEIGHT: f64 = 0.3;
/// Default weight of the edit-distance signal in [`composite_match`].
pub const DEFAULT_FUZZY_WEIGHT: f64 = 0.5;
/// Default weight of the token-overlap signal in [`composite_match`].
pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.2;

/// Score at or above which a match is shown to the user.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.6;
/// Floor below which [`find_best_match_index`] reports no match.
pub const MIN_MATCH_SCORE: f64 = 0.35;

#[derive(Error, Debug, PartialEq)]
pub enum MatchError {
    #[error("Invalid {0} weight: {1} (must be finite and non-negative)")]
    InvalidWeight(&'static str, f64),

    #[error("All match weights are zero")]
    ZeroWeights,
}

/// Weights of the three signals combined by [`composite_match_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub prefix: f64,
    pub fuzzy: f64,
    pub token: f64,
}

impl MatchWeights {
    pub fn new(prefix: f64, fuzzy: f64, token: f64) -> Result<Self, MatchError> {
        for (name, value) in [("prefix", prefix), ("fuzzy", fuzzy), ("token", token)] {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::InvalidWeight(name, value));
            }
        }
        if prefix + fuzzy + token == 0.0 {
            return Err(MatchError::ZeroWeights);
        }
        Ok(Self {
            prefix,
            fuzzy,
            token,
        })
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX_WEIGHT,
            fuzzy: DEFAULT_FUZZY_WEIGHT,
            token: DEFAULT_TOKEN_WEIGHT,
        }
    }
}

/// A label scored against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub label: String,
    pub score: f64,
    pub is_quality: bool,
}

// ── Scorers ─────────────────────────────────────────────────

/// Edit-distance similarity between query and candidate.
///
/// `1 - levenshtein / max_len` over the normalized strings. Pure scorer: no
/// threshold is applied here (see [`is_quality_match`]).
pub fn fuzzy_match(query: &str, candidate: &str) -> f64 {
    similarity(query, candidate)
}

/// True if the normalized candidate starts with the normalized query.
/// An empty query matches everything.
pub fn prefix_match(query: &str, candidate: &str) -> bool {
    normalize_text(candidate).starts_with(&normalize_text(query))
}

/// Fraction of distinct query tokens found in the candidate's token set.
/// 0.0 when the query has no tokens.
pub fn token_overlap_match(query: &str, candidate: &str) -> f64 {
    let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let candidate_tokens: HashSet<String> = tokenize(candidate).into_iter().collect();
    let present = query_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(*t))
        .count();
    present as f64 / query_tokens.len() as f64
}

/// Composite score with the default weights.
pub fn composite_match(query: &str, candidate: &str) -> f64 {
    composite_match_with(query, candidate, &MatchWeights::default())
}

/// Weighted sum of prefix (1.0 when true), fuzzy and token-overlap scores,
/// clamped to [0, 1]. An empty query scores 0.
pub fn composite_match_with(query: &str, candidate: &str, weights: &MatchWeights) -> f64 {
    let q = normalize_text(query);
    if q.is_empty() {
        return 0.0;
    }
    let c = normalize_text(candidate);

    let prefix = if c.starts_with(&q) { 1.0 } else { 0.0 };
    let fuzzy = similarity(&q, &c);
    let token = token_overlap_match(&q, &c);

    (weights.prefix * prefix + weights.fuzzy * fuzzy + weights.token * token).clamp(0.0, 1.0)
}

/// Central quality bar for search results.
pub fn is_quality_match(score: f64, threshold: f64) -> bool {
    score >= threshold
}

// ── Selection ───────────────────────────────────────────────

/// Index of the best candidate under [`composite_match`].
///
/// Lowest index wins on exact ties. `None` when `candidates` is empty or no
/// candidate reaches [`MIN_MATCH_SCORE`].
pub fn find_best_match_index<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = composite_match(query, candidate.as_ref());
        if score < MIN_MATCH_SCORE {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }

    tracing::trace!(
        candidates = candidates.len(),
        best = ?best.map(|(idx, _)| idx),
        "Best match lookup"
    );

    best.map(|(idx, _)| idx)
}

/// Score every candidate and order by descending score.
/// Equal scores keep their input order.
pub fn rank_candidates<S: AsRef<str>>(
    query: &str,
    candidates: &[S],
    threshold: f64,
) -> Vec<MatchCandidate> {
    let mut ranked: Vec<MatchCandidate> = candidates
        .iter()
        .map(|c| {
            let score = composite_match(query, c.as_ref());
            MatchCandidate {
                label: c.as_ref().to_string(),
                score,
                is_quality: is_quality_match(score, threshold),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Char offset of the query inside the normalized target, for highlighting.
/// `None` when the query is empty or absent.
pub fn best_match_offset(query: &str, target: &str) -> Option<usize> {
    let q = normalize_text(query);
    if q.is_empty() {
        return None;
    }
    let t = normalize_text(target);
    let byte_idx = t.find(&q)?;
    Some(t[..byte_idx].chars().count())
}
