//! Reasoning stage
//!
//! Heuristic analysis of the collected evidence: the query is decomposed
//! into sub-questions at conjunction boundaries, and per-evidence insights
//! are extracted by query-term-overlap sentence selection. Best effort, no
//! model call involved.

use std::collections::HashSet;

use cognita_common::errors::Result;
use cognita_common::models::{Insight, ReasoningOutput, RetrievedPassage, SourceType};

use super::StageContext;

const MAX_SUB_QUESTIONS: usize = 4;

pub struct ReasoningStage;

impl ReasoningStage {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(
        &self,
        ctx: &StageContext,
        evidence: &[RetrievedPassage],
    ) -> Result<ReasoningOutput> {
        let sub_questions = decompose(&ctx.query);
        let query_terms = tokenize(&ctx.query);

        let insights: Vec<Insight> = evidence
            .iter()
            .filter_map(|p| extract_insight(&query_terms, p))
            .collect();

        let confidence = if insights.is_empty() {
            0.0
        } else {
            insights.iter().map(|i| i.confidence).sum::<f32>() / insights.len() as f32
        };

        tracing::debug!(
            sub_questions = sub_questions.len(),
            insights = insights.len(),
            confidence,
            "Reasoning stage complete"
        );

        Ok(ReasoningOutput {
            sub_questions,
            insights,
            confidence,
        })
    }
}

impl Default for ReasoningStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a query into sub-questions at conjunction boundaries.
///
/// "how does X work and why is Y slow" becomes two sub-questions. Single
/// clause queries yield themselves. Purely lexical, no semantic parsing.
fn decompose(query: &str) -> Vec<String> {
    let clauses: Vec<String> = query
        .split(" and ")
        .flat_map(|part| part.split(';'))
        .map(|clause| clause.trim().trim_end_matches('?').trim().to_string())
        .filter(|clause| !clause.is_empty())
        .take(MAX_SUB_QUESTIONS)
        .map(|clause| format!("{}?", clause))
        .collect();

    if clauses.is_empty() {
        vec![query.trim().to_string()]
    } else {
        clauses
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(String::from)
        .collect()
}

/// Pick the sentence of the passage with the highest query-term overlap.
///
/// Returns `None` when no sentence shares a term with the query.
fn extract_insight(query_terms: &HashSet<String>, passage: &RetrievedPassage) -> Option<Insight> {
    if query_terms.is_empty() {
        return None;
    }

    let mut best: Option<(usize, &str)> = None;
    for sentence in split_sentences(&passage.content) {
        let sentence_terms = tokenize(sentence);
        let overlap = sentence_terms.intersection(query_terms).count();
        if overlap > 0 && best.map(|(n, _)| overlap > n).unwrap_or(true) {
            best = Some((overlap, sentence));
        }
    }

    best.map(|(overlap, sentence)| Insight {
        text: sentence.trim().to_string(),
        source_chunk_id: match passage.source_type {
            SourceType::InternalDocument => Some(passage.chunk_id.clone()),
            SourceType::ExternalSearch => None,
        },
        confidence: (overlap as f32 / query_terms.len() as f32).min(1.0),
    })
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_common::models::{RecordMetadata, StylePreferences};

    fn ctx(query: &str) -> StageContext {
        StageContext {
            query: query.to_string(),
            max_documents: 5,
            include_web_search: false,
            style: StylePreferences::default(),
        }
    }

    fn passage(chunk_id: &str, content: &str) -> RetrievedPassage {
        RetrievedPassage {
            chunk_id: chunk_id.to_string(),
            content: content.to_string(),
            score: 0.8,
            source_type: SourceType::InternalDocument,
            title: chunk_id.to_string(),
            metadata: RecordMetadata::default(),
        }
    }

    #[test]
    fn test_decompose_conjunctive_query() {
        let subs = decompose("how does chunking work and why does overlap matter?");
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0], "how does chunking work?");
        assert_eq!(subs[1], "why does overlap matter?");
    }

    #[test]
    fn test_decompose_single_clause() {
        let subs = decompose("what is retrieval?");
        assert_eq!(subs, vec!["what is retrieval?".to_string()]);
    }

    #[tokio::test]
    async fn test_insights_select_overlapping_sentence() {
        let stage = ReasoningStage::new();
        let evidence = vec![passage(
            "doc.txt_chunk_0",
            "Completely unrelated opener. Chunking splits documents into windows. Trailing note.",
        )];
        let output = stage
            .run(&ctx("how does chunking work"), &evidence)
            .await
            .unwrap();

        assert_eq!(output.insights.len(), 1);
        assert!(output.insights[0].text.contains("Chunking splits"));
        assert_eq!(
            output.insights[0].source_chunk_id.as_deref(),
            Some("doc.txt_chunk_0")
        );
        assert!(output.confidence > 0.0);
    }

    #[tokio::test]
    async fn test_no_overlap_yields_no_insights() {
        let stage = ReasoningStage::new();
        let evidence = vec![passage("doc.txt_chunk_0", "zebra quagga okapi")];
        let output = stage
            .run(&ctx("how does chunking work"), &evidence)
            .await
            .unwrap();
        assert!(output.insights.is_empty());
        assert_eq!(output.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_empty_evidence_is_ok() {
        let stage = ReasoningStage::new();
        let output = stage.run(&ctx("anything at all"), &[]).await.unwrap();
        assert!(output.insights.is_empty());
        assert_eq!(output.sub_questions.len(), 1);
    }
}
