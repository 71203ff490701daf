//! Research stage
//!
//! Gathers evidence from the internal corpus and, optionally, the external
//! searcher. The two arms run concurrently; if one fails the other's
//! results are kept. Both failing is a stage error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cognita_common::config::WebSearchConfig;
use cognita_common::errors::{AppError, Result};
use cognita_common::models::{RetrievedPassage, SearchRequest};
use cognita_retrieval::RetrievalEngine;

use crate::websearch::WebSearcher;

use super::{ResearchOutput, StageContext};

const STAGE_NAME: &str = "research";
const SUMMARY_PASSAGES: usize = 3;
const SUMMARY_EXCERPT_CHARS: usize = 200;

pub struct ResearchStage {
    retrieval: Arc<RetrievalEngine>,
    searcher: Arc<dyn WebSearcher>,
    web_config: WebSearchConfig,
}

impl ResearchStage {
    pub fn new(
        retrieval: Arc<RetrievalEngine>,
        searcher: Arc<dyn WebSearcher>,
        web_config: WebSearchConfig,
    ) -> Self {
        Self {
            retrieval,
            searcher,
            web_config,
        }
    }

    pub async fn run(&self, ctx: &StageContext) -> Result<ResearchOutput> {
        let internal_request = SearchRequest {
            query: ctx.query.clone(),
            k: ctx.max_documents,
            rerank: true,
        };

        let use_web = ctx.include_web_search && self.searcher.is_enabled();
        let web_timeout = Duration::from_secs(self.web_config.timeout_secs);

        let (internal, external) = tokio::join!(
            self.retrieval.retrieve(&internal_request),
            async {
                if !use_web {
                    return Ok(Vec::new());
                }
                match tokio::time::timeout(
                    web_timeout,
                    self.searcher.search(&ctx.query, self.web_config.max_results),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(AppError::stage(STAGE_NAME, "external search timed out")),
                }
            }
        );

        // Partial retention: one failed arm degrades, both failing aborts
        let (internal, external) = match (internal, external) {
            (Ok(i), Ok(e)) => (i, e),
            (Ok(i), Err(e)) => {
                tracing::warn!(error = %e, "External search failed, keeping internal evidence");
                (i, Vec::new())
            }
            (Err(e), Ok(x)) if !x.is_empty() => {
                tracing::warn!(error = %e, "Internal retrieval failed, keeping external evidence");
                (Vec::new(), x)
            }
            (Err(e), _) => {
                return Err(AppError::stage(
                    STAGE_NAME,
                    format!("no evidence source available: {}", e),
                ))
            }
        };

        let evidence = merge_evidence(internal, external);
        let summary = summarize(&ctx.query, &evidence);

        tracing::debug!(
            evidence = evidence.len(),
            "Research stage collected evidence"
        );
        Ok(ResearchOutput { evidence, summary })
    }
}

/// Merge the two evidence arms: dedup by source key keeping the first
/// (higher scored) occurrence, then sort by descending score. The sort is
/// stable so equal scores keep merge order, internal before external.
fn merge_evidence(
    internal: Vec<RetrievedPassage>,
    external: Vec<RetrievedPassage>,
) -> Vec<RetrievedPassage> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<RetrievedPassage> = Vec::new();

    for passage in internal.into_iter().chain(external) {
        if seen.insert(passage.chunk_id.clone()) {
            merged.push(passage);
        }
    }

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged
}

/// Extractive summary: lead excerpt of the top passages.
fn summarize(query: &str, evidence: &[RetrievedPassage]) -> String {
    if evidence.is_empty() {
        return format!("No evidence found for \"{}\".", query.trim());
    }

    let mut summary = format!(
        "Found {} relevant passage(s) for \"{}\":\n",
        evidence.len(),
        query.trim()
    );
    for passage in evidence.iter().take(SUMMARY_PASSAGES) {
        let excerpt: String = passage.content.chars().take(SUMMARY_EXCERPT_CHARS).collect();
        summary.push_str(&format!("- {} ({})\n", excerpt.trim(), passage.title));
    }
    summary
}
