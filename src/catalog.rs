//! Chief complaint catalog and complaint search.
//!
//! Loaded once at startup from `complaints.json` and shared read-only.
//! A trigram index over label and synonym tokens gives search a recall
//! path for misspelled queries.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::{
    composite_match, find_best_match_index, is_quality_match, prefix_match,
    DEFAULT_QUALITY_THRESHOLD,
};
use crate::models::{Complaint, MatchKind};
use crate::text::{char_ngrams, normalize_text, tokenize};

/// Score floor for a label that starts with the query.
pub const LABEL_PREFIX_SCORE: f64 = 0.85;
/// Score floor for a synonym that starts with the query.
pub const SYNONYM_PREFIX_SCORE: f64 = 0.75;
/// Share of the query's trigrams a complaint must contain to be recalled.
pub const NGRAM_MIN_OVERLAP: f64 = 0.6;
/// Suggestions need at least this many normalized characters.
pub const MIN_SUGGESTION_CHARS: usize = 2;

const NGRAM_SIZE: usize = 3;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Complaint catalog load failed ({0}): {1}")]
    Load(String, String),

    #[error("Complaint catalog parse failed ({0}): {1}")]
    Parse(String, String),

    #[error("Duplicate complaint code: {0}")]
    DuplicateCode(String),
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub code: String,
    pub label: String,
    pub score: f64,
    pub match_kind: MatchKind,
}

#[derive(Debug, Clone, Default)]
pub struct ComplaintCatalog {
    complaints: Vec<Complaint>,
    by_code: HashMap<String, usize>,
    /// Trigram → indices into `complaints`, ascending.
    ngrams: HashMap<String, Vec<usize>>,
}

impl ComplaintCatalog {
    /// Load the catalog from a JSON array of complaints.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(path.display().to_string(), e.to_string()))?;
        let complaints: Vec<Complaint> = serde_json::from_str(&json)
            .map_err(|e| CatalogError::Parse(path.display().to_string(), e.to_string()))?;
        let catalog = Self::from_complaints(complaints)?;
        tracing::info!(
            complaints = catalog.len(),
            ngrams = catalog.ngrams.len(),
            path = %path.display(),
            "Complaint catalog loaded"
        );
        Ok(catalog)
    }

    /// Build from in-memory complaints. Codes must be unique.
    pub fn from_complaints(complaints: Vec<Complaint>) -> Result<Self, CatalogError> {
        let mut by_code = HashMap::with_capacity(complaints.len());
        for (idx, complaint) in complaints.iter().enumerate() {
            if by_code.insert(complaint.code.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateCode(complaint.code.clone()));
            }
        }
        let ngrams = build_ngram_index(&complaints);
        Ok(Self {
            complaints,
            by_code,
            ngrams,
        })
    }

    pub fn get(&self, code: &str) -> Option<&Complaint> {
        self.by_code.get(code).map(|&idx| &self.complaints[idx])
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Complaint> {
        self.complaints.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.complaints.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.complaints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complaints.is_empty()
    }

    /// Autocomplete: the single best complaint for the query, by label.
    pub fn best_match(&self, query: &str) -> Option<&Complaint> {
        find_best_match_index(query, &self.labels()).map(|idx| &self.complaints[idx])
    }

    /// Autocomplete terms: distinct labels and synonyms starting with the
    /// query, catalog order. Queries under two characters yield nothing.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<&str> {
        if normalize_text(query).chars().count() < MIN_SUGGESTION_CHARS {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.complaints
            .iter()
            .flat_map(|c| std::iter::once(&c.label).chain(&c.synonyms))
            .filter(|term| prefix_match(query, term))
            .filter(|term| seen.insert(normalize_text(term)))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// Rank complaints against a free-text query.
    ///
    /// Each complaint scores the best composite match over its label and
    /// synonyms, with prefix hits lifted to a fixed floor. A complaint is
    /// returned when it starts with the query, clears the quality bar, or
    /// shares most of the query's trigrams. Highest score first; equal
    /// scores keep catalog order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let q = normalize_text(query);
        if q.is_empty() || limit == 0 {
            return Vec::new();
        }

        let overlap = self.ngram_overlap(&q);
        let mut hits: Vec<SearchHit> = self
            .complaints
            .iter()
            .enumerate()
            .filter_map(|(idx, complaint)| {
                let hit = score_complaint(&q, complaint);
                let anchored = matches!(hit.match_kind, MatchKind::Exact | MatchKind::Prefix);
                if anchored || is_quality_match(hit.score, DEFAULT_QUALITY_THRESHOLD) {
                    return Some(hit);
                }
                let shared = overlap.get(&idx).copied().unwrap_or(0.0);
                (shared >= NGRAM_MIN_OVERLAP).then_some(SearchHit {
                    match_kind: MatchKind::Ngram,
                    ..hit
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);

        tracing::debug!(hits = hits.len(), "Complaint search");
        hits
    }

    /// Complaints in the same group or sharing a symptom tag, catalog order.
    pub fn related(&self, code: &str, limit: usize) -> Vec<&Complaint> {
        let Some(complaint) = self.get(code) else {
            return Vec::new();
        };
        let tags: HashSet<String> = complaint.symptom_tags.iter().map(|t| normalize_text(t)).collect();

        self.complaints
            .iter()
            .filter(|other| other.code != complaint.code)
            .filter(|other| {
                let same_group = complaint.group.is_some() && other.group == complaint.group;
                same_group
                    || other
                        .symptom_tags
                        .iter()
                        .any(|t| tags.contains(&normalize_text(t)))
            })
            .take(limit)
            .collect()
    }

    /// Fraction of the query's distinct trigrams found per complaint index.
    fn ngram_overlap(&self, q: &str) -> HashMap<usize, f64> {
        let grams: HashSet<String> = tokenize(q)
            .iter()
            .flat_map(|token| char_ngrams(token, NGRAM_SIZE))
            .collect();
        if grams.is_empty() {
            return HashMap::new();
        }

        let mut shared: HashMap<usize, usize> = HashMap::new();
        for gram in &grams {
            for &idx in self.ngrams.get(gram).into_iter().flatten() {
                *shared.entry(idx).or_default() += 1;
            }
        }
        shared
            .into_iter()
            .map(|(idx, n)| (idx, n as f64 / grams.len() as f64))
            .collect()
    }

    /// Create a catalog for tests (no file I/O).
    pub fn load_test() -> Self {
        fn complaint(
            code: &str,
            label: &str,
            group: &str,
            synonyms: &[&str],
            tags: &[&str],
            red_flags: &[&str],
        ) -> Complaint {
            Complaint {
                code: code.into(),
                label: label.into(),
                symptom_tags: tags.iter().map(|s| s.to_string()).collect(),
                syndrome: None,
                group: Some(group.into()),
                synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
                red_flags: red_flags.iter().map(|s| s.to_string()).collect(),
            }
        }
        let complaints = vec![
            complaint(
                "dor_toracica",
                "Dor torácica",
                "cardiovascular",
                &["dor no peito", "precordialgia"],
                &["dor_toracica", "sudorese", "sincope"],
                &["Dor precordial em aperto > 20 min", "Sudorese fria profusa"],
            ),
            complaint(
                "febre",
                "Febre",
                "infeccioso",
                &["hipertermia"],
                &["febre_alta", "tosse"],
                &["Febre + rigidez de nuca"],
            ),
            complaint(
                "dor_abdominal",
                "Dor abdominal",
                "gastrointestinal",
                &[],
                &["defesa_abdominal", "hematemese"],
                &["Defesa abdominal / abdome em tábua", "Hematêmese"],
            ),
            complaint(
                "cefaleia",
                "Cefaleia",
                "neurologico",
                &["dor de cabeça"],
                &["deficit_focal", "alteracao_consciencia"],
                &["Déficit neurológico focal"],
            ),
            complaint(
                "dispneia",
                "Dispneia",
                "respiratorio",
                &["falta de ar"],
                &["dispneia", "cianose"],
                &["SpO2 < 90% em ar ambiente"],
            ),
            complaint(
                "sincope",
                "Síncope",
                "cardiovascular",
                &["desmaio"],
                &["sincope"],
                &["Síncope ou pré-síncope"],
            ),
        ];

        let by_code = complaints
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.code.clone(), idx))
            .collect();
        let ngrams = build_ngram_index(&complaints);

        Self {
            complaints,
            by_code,
            ngrams,
        }
    }
}

fn build_ngram_index(complaints: &[Complaint]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, complaint) in complaints.iter().enumerate() {
        let tokens = std::iter::once(&complaint.label)
            .chain(&complaint.synonyms)
            .flat_map(|term| tokenize(term));
        for token in tokens {
            for gram in char_ngrams(&token, NGRAM_SIZE) {
                let ids = index.entry(gram).or_default();
                if ids.last() != Some(&idx) {
                    ids.push(idx);
                }
            }
        }
    }
    index
}

fn score_complaint(q: &str, complaint: &Complaint) -> SearchHit {
    let (label_score, label_kind) = if normalize_text(&complaint.label) == q {
        (1.0, MatchKind::Exact)
    } else if prefix_match(q, &complaint.label) {
        (
            composite_match(q, &complaint.label).max(LABEL_PREFIX_SCORE),
            MatchKind::Prefix,
        )
    } else {
        (composite_match(q, &complaint.label), MatchKind::Fuzzy)
    };

    let synonym_score = complaint
        .synonyms
        .iter()
        .map(|s| {
            let score = composite_match(q, s);
            if prefix_match(q, s) {
                score.max(SYNONYM_PREFIX_SCORE)
            } else {
                score
            }
        })
        .fold(0.0_f64, f64::max);

    let (score, match_kind) = if synonym_score > label_score {
        (synonym_score, MatchKind::Synonym)
    } else {
        (label_score, label_kind)
    };

    SearchHit {
        code: complaint.code.clone(),
        label: complaint.label.clone(),
        score,
        match_kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_code() {
        let catalog = ComplaintCatalog::load_test();
        assert_eq!(catalog.get("febre").unwrap().label, "Febre");
        assert!(catalog.get("unknown").is_none());
        assert_eq!(catalog.len(), 6);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn labels_in_catalog_order() {
        let catalog = ComplaintCatalog::load_test();
        let labels = catalog.labels();
        assert_eq!(labels[0], "Dor torácica");
        assert_eq!(labels[5], "Síncope");
        assert_eq!(catalog.iter().count(), labels.len());
    }

    #[test]
    fn duplicate_codes_rejected() {
        let err = ComplaintCatalog::from_complaints(vec![
            Complaint::new("febre", "Febre"),
            Complaint::new("febre", "Febre alta"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode(code) if code == "febre"));
    }

    #[test]
    fn search_exact_label_first() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("FEBRE", 5);
        assert_eq!(hits[0].code, "febre");
        assert_eq!(hits[0].match_kind, MatchKind::Exact);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn search_prefix() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("dor abd", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "dor_abdominal");
        assert_eq!(hits[0].match_kind, MatchKind::Prefix);
    }

    #[test]
    fn search_through_synonyms() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("desmaio", 5);
        assert_eq!(hits[0].code, "sincope");
        assert_eq!(hits[0].match_kind, MatchKind::Synonym);

        let hits = catalog.search("falta de ar", 5);
        assert_eq!(hits[0].code, "dispneia");
    }

    #[test]
    fn search_accent_insensitive() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("sincope", 5);
        assert_eq!(hits[0].code, "sincope");
        assert_eq!(hits[0].match_kind, MatchKind::Exact);
    }

    #[test]
    fn search_respects_limit_and_order() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("dor", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].code, "dor_toracica");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn search_no_results() {
        let catalog = ComplaintCatalog::load_test();
        assert!(catalog.search("xyz", 5).is_empty());
        assert!(catalog.search("", 5).is_empty());
        assert!(catalog.search("febre", 0).is_empty());
    }

    #[test]
    fn search_short_prefix_of_label() {
        let catalog = ComplaintCatalog::load_test();
        let cases = [
            ("cef", "cefaleia"),
            ("disp", "dispneia"),
            ("sinc", "sincope"),
            ("feb", "febre"),
        ];
        for (query, code) in cases {
            let hits = catalog.search(query, 5);
            assert!(!hits.is_empty(), "no hits for {query}");
            assert_eq!(hits[0].code, code);
            assert_eq!(hits[0].match_kind, MatchKind::Prefix);
            assert!(hits[0].score >= LABEL_PREFIX_SCORE);
        }
    }

    #[test]
    fn search_synonym_prefix() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("precord", 5);
        assert_eq!(hits[0].code, "dor_toracica");
        assert_eq!(hits[0].match_kind, MatchKind::Synonym);
        assert!(hits[0].score >= SYNONYM_PREFIX_SCORE);
    }

    #[test]
    fn search_recalls_misspelling_through_trigrams() {
        let catalog = ComplaintCatalog::load_test();
        let hits = catalog.search("cefaleai", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "cefaleia");
        assert_eq!(hits[0].match_kind, MatchKind::Ngram);
        assert!(hits[0].score < DEFAULT_QUALITY_THRESHOLD);
    }

    #[test]
    fn ngram_index_built_from_labels_and_synonyms() {
        let catalog = ComplaintCatalog::load_test();
        let cefaleia = catalog.by_code["cefaleia"];
        assert_eq!(catalog.ngrams["cef"], vec![cefaleia]);
        // "dor" appears in three complaints, once each.
        assert_eq!(catalog.ngrams["dor"].len(), 3);
    }

    #[test]
    fn suggestions_by_prefix_in_catalog_order() {
        let catalog = ComplaintCatalog::load_test();
        assert_eq!(
            catalog.suggestions("do", 10),
            vec!["Dor torácica", "dor no peito", "Dor abdominal", "dor de cabeça"]
        );
        assert_eq!(catalog.suggestions("DES", 10), vec!["desmaio"]);
        assert_eq!(catalog.suggestions("do", 2), vec!["Dor torácica", "dor no peito"]);
    }

    #[test]
    fn suggestions_need_two_chars() {
        let catalog = ComplaintCatalog::load_test();
        assert!(catalog.suggestions("d", 10).is_empty());
        assert!(catalog.suggestions(" d ", 10).is_empty());
        assert!(catalog.suggestions("", 10).is_empty());
    }

    #[test]
    fn suggestions_are_distinct() {
        let mut febre = Complaint::new("febre", "Febre");
        febre.synonyms = vec!["febre".into(), "febril".into()];
        let catalog = ComplaintCatalog::from_complaints(vec![febre]).unwrap();
        assert_eq!(catalog.suggestions("feb", 10), vec!["Febre", "febril"]);
    }

    #[test]
    fn load_test_matches_from_complaints() {
        let fixture = ComplaintCatalog::load_test();
        let rebuilt = ComplaintCatalog::from_complaints(fixture.complaints().to_vec()).unwrap();
        assert_eq!(rebuilt.by_code, fixture.by_code);
        assert_eq!(rebuilt.ngrams, fixture.ngrams);
    }

    #[test]
    fn best_match_by_label() {
        let catalog = ComplaintCatalog::load_test();
        assert_eq!(catalog.best_match("cefaleia").unwrap().code, "cefaleia");
        assert_eq!(catalog.best_match("dispnea").unwrap().code, "dispneia");
        assert!(catalog.best_match("zzzz").is_none());
    }

    #[test]
    fn related_by_group_and_tags() {
        let catalog = ComplaintCatalog::load_test();
        let related: Vec<&str> = catalog
            .related("dor_toracica", 5)
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(related, vec!["sincope"]);
        assert!(catalog.related("unknown", 5).is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("complaints.json");
        let catalog = ComplaintCatalog::load_test();
        std::fs::write(&path, serde_json::to_string(catalog.complaints()).unwrap()).unwrap();

        let loaded = ComplaintCatalog::load(&path).unwrap();
        assert_eq!(loaded.complaints(), catalog.complaints());
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("complaints.json");
        assert!(matches!(ComplaintCatalog::load(&path), Err(CatalogError::Load(..))));

        std::fs::write(&path, "[{\"code\": 1}]").unwrap();
        assert!(matches!(ComplaintCatalog::load(&path), Err(CatalogError::Parse(..))));
    }

    #[test]
    fn bundled_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join(crate::config::COMPLAINT_CATALOG_FILE);
        let catalog = ComplaintCatalog::load(&path).unwrap();
        assert!(catalog.get("dor_toracica").is_some());
    }
}
