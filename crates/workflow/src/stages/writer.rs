//! Writer stage
//!
//! Builds a grounded prompt from the accumulated evidence and reasoning,
//! invokes the generator, then rewrites the generator's context markers
//! into citation ids and appends a Sources section.

use std::sync::Arc;

use cognita_common::citations::CitationTracker;
use cognita_common::errors::Result;
use cognita_common::generation::Generator;
use cognita_common::models::{ReasoningOutput, RetrievedPassage};
use regex_lite::Regex;

use super::{StageContext, WriterOutput};

pub struct WriterStage {
    generator: Arc<dyn Generator>,
}

impl WriterStage {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn run(
        &self,
        ctx: &StageContext,
        evidence: &[RetrievedPassage],
        research_summary: Option<&str>,
        reasoning: Option<&ReasoningOutput>,
    ) -> Result<WriterOutput> {
        let prompt = build_prompt(ctx, research_summary, reasoning);
        let contexts: Vec<String> = evidence.iter().map(|p| p.content.clone()).collect();

        let raw_answer = self.generator.generate(&prompt, &contexts).await?;

        let mut tracker = CitationTracker::new();
        let mut answer = bind_citations(&raw_answer, evidence, &mut tracker);

        if !tracker.is_empty() {
            answer.push_str("\n\nSources:\n");
            for citation in tracker.citations() {
                answer.push_str(&format!(
                    "{} {}\n",
                    citation.in_text_reference, citation.title
                ));
            }
        }

        tracing::debug!(citations = tracker.len(), "Writer stage complete");
        Ok(WriterOutput {
            answer,
            citations: tracker.into_citations(),
        })
    }
}

fn build_prompt(
    ctx: &StageContext,
    research_summary: Option<&str>,
    reasoning: Option<&ReasoningOutput>,
) -> String {
    let mut prompt = format!(
        "Write a {} {}-length answer for a {} audience.\n",
        ctx.style.tone, ctx.style.length, ctx.style.audience
    );

    if let Some(summary) = research_summary {
        prompt.push_str("Research notes:\n");
        prompt.push_str(summary);
        prompt.push('\n');
    }

    if let Some(reasoning) = reasoning {
        if !reasoning.sub_questions.is_empty() {
            prompt.push_str("Address these sub-questions:\n");
            for question in &reasoning.sub_questions {
                prompt.push_str(&format!("- {}\n", question));
            }
        }
        for insight in &reasoning.insights {
            prompt.push_str(&format!("Key point: {}\n", insight.text));
        }
    }

    prompt.push_str(&format!("\nQuestion: {}", ctx.query.trim()));
    prompt
}

/// Rewrite `[n]` context markers into citation ids.
///
/// The generator numbers contexts in evidence order; the tracker assigns
/// ids in first-use order, so markers are remapped when the generator
/// cites out of order. Markers pointing outside the context range are left
/// untouched.
fn bind_citations(
    answer: &str,
    evidence: &[RetrievedPassage],
    tracker: &mut CitationTracker,
) -> String {
    let marker = Regex::new(r"\[(\d+)\]").expect("static marker pattern");

    marker
        .replace_all(answer, |caps: &regex_lite::Captures| {
            let n: usize = caps[1].parse().unwrap_or(0);
            if n >= 1 && n <= evidence.len() {
                let id = tracker.cite(&evidence[n - 1]);
                format!("[{}]", id)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_common::generation::MockGenerator;
    use cognita_common::models::{RecordMetadata, SourceType, StylePreferences};

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
            title: format!("title of {}", chunk_id),
            metadata: RecordMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_answer_carries_citations_and_sources() {
        let stage = WriterStage::new(Arc::new(MockGenerator));
        let evidence = vec![
            passage("doc.txt_chunk_0", "first passage"),
            passage("doc.txt_chunk_1", "second passage"),
        ];

        let output = stage
            .run(&ctx("what is this about"), &evidence, None, None)
            .await
            .unwrap();

        assert_eq!(output.citations.len(), 2);
        assert!(output.answer.contains("[1]"));
        assert!(output.answer.contains("[2]"));
        assert!(output.answer.contains("Sources:"));
        assert_eq!(output.citations[0].id, 1);
    }

    #[tokio::test]
    async fn test_no_evidence_no_citations() {
        let stage = WriterStage::new(Arc::new(MockGenerator));
        let output = stage
            .run(&ctx("anything"), &[], None, None)
            .await
            .unwrap();
        assert!(output.citations.is_empty());
        assert!(!output.answer.contains("Sources:"));
    }

    #[test]
    fn test_out_of_order_markers_remapped_to_first_use_ids() {
        let evidence = vec![
            passage("doc.txt_chunk_0", "alpha"),
            passage("doc.txt_chunk_1", "beta"),
        ];
        let mut tracker = CitationTracker::new();
        let bound = bind_citations("claims [2] then [1] then [2] again", &evidence, &mut tracker);

        // First-use order: context 2 becomes citation 1
        assert_eq!(bound, "claims [1] then [2] then [1] again");
        assert_eq!(tracker.citations()[0].citation_info["chunk_id"], "doc.txt_chunk_1");
    }

    #[test]
    fn test_out_of_range_markers_left_alone() {
        let evidence = vec![passage("doc.txt_chunk_0", "alpha")];
        let mut tracker = CitationTracker::new();
        let bound = bind_citations("see [1] and [7]", &evidence, &mut tracker);
        assert_eq!(bound, "see [1] and [7]");
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_prompt_includes_style_and_reasoning() {
        let reasoning = ReasoningOutput {
            sub_questions: vec!["what is chunking?".to_string()],
            insights: vec![],
            confidence: 0.5,
        };
        let prompt = build_prompt(&ctx("how does it work"), Some("notes"), Some(&reasoning));
        assert!(prompt.contains("professional"));
        assert!(prompt.contains("notes"));
        assert!(prompt.contains("what is chunking?"));
        assert!(prompt.contains("Question: how does it work"));
    }
}
