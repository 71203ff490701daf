//! Secondary relevance scoring
//!
//! Blends the vector similarity score with a lexical term-density signal.
//! Reranking reorders the candidate set only; it never injects or drops
//! passages.

use cognita_common::models::RetrievedPassage;
use std::collections::HashSet;

const SIMILARITY_WEIGHT: f32 = 0.7;
const DENSITY_WEIGHT: f32 = 0.3;

/// Fraction of distinct query terms that appear in the passage content.
fn term_density(query_terms: &HashSet<String>, content: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let content_lower = content.to_lowercase();
    let hits = query_terms
        .iter()
        .filter(|term| content_lower.contains(term.as_str()))
        .count();
    hits as f32 / query_terms.len() as f32
}

fn tokenize(query: &str) -> HashSet<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Rerank passages in place by blended score.
///
/// Each passage's score is replaced with
/// `0.7 * similarity + 0.3 * term_density`. The sort is stable, so equal
/// blended scores keep their pre-rerank order.
pub fn rerank(query: &str, passages: &mut [RetrievedPassage]) {
    let query_terms = tokenize(query);

    for passage in passages.iter_mut() {
        let density = term_density(&query_terms, &passage.content);
        passage.score = SIMILARITY_WEIGHT * passage.score + DENSITY_WEIGHT * density;
    }

    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_common::models::{RecordMetadata, SourceType};

    fn passage(chunk_id: &str, content: &str, score: f32) -> RetrievedPassage {
        RetrievedPassage {
            chunk_id: chunk_id.to_string(),
            content: content.to_string(),
            score,
            source_type: SourceType::InternalDocument,
            title: chunk_id.to_string(),
            metadata: RecordMetadata::default(),
        }
    }

    #[test]
    fn test_term_density_promotes_lexical_match() {
        let mut passages = vec![
            passage("a", "completely unrelated text", 0.80),
            passage("b", "rust ownership and borrowing rules", 0.78),
        ];
        rerank("rust ownership", &mut passages);
        assert_eq!(passages[0].chunk_id, "b");
    }

    #[test]
    fn test_rerank_never_changes_set_size() {
        let mut passages = vec![
            passage("a", "one", 0.5),
            passage("b", "two", 0.4),
            passage("c", "three", 0.3),
        ];
        rerank("query terms", &mut passages);
        assert_eq!(passages.len(), 3);
    }

    #[test]
    fn test_empty_query_preserves_order() {
        let mut passages = vec![passage("a", "x", 0.9), passage("b", "y", 0.5)];
        rerank("", &mut passages);
        assert_eq!(passages[0].chunk_id, "a");
        assert_eq!(passages[1].chunk_id, "b");
    }

    #[test]
    fn test_blended_score_formula() {
        let mut passages = vec![passage("a", "alpha beta", 1.0)];
        rerank("alpha beta", &mut passages);
        // density 1.0: 0.7 * 1.0 + 0.3 * 1.0
        assert!((passages[0].score - 1.0).abs() < 1e-6);

        let mut passages = vec![passage("a", "alpha only", 1.0)];
        rerank("alpha beta", &mut passages);
        // density 0.5
        assert!((passages[0].score - 0.85).abs() < 1e-6);
    }
}
