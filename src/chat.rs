//! Chat answers by single best-match retrieval.
//!
//! Used by both the `churnwise chat` CLI command and `GET /chat`. A query
//! with no matching document, or an empty corpus, is answered with the
//! configured fallback message rather than an error.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use churnwise_core::retrieve::retrieve;

use crate::config::Config;
use crate::context::AppContext;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Answer `query` with the content of the best-matching document.
pub fn answer(ctx: &AppContext, query: &str) -> ServiceResult<ChatResponse> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::bad_request("Query cannot be empty."));
    }

    tracing::info!(query, "Received chat query");

    let retrieval = &ctx.config.retrieval;
    let response = match retrieve(query, &ctx.index, &retrieval.bm25_params()) {
        Some(m) => {
            tracing::debug!(document = %m.document.id, score = m.score, "Matched document");
            m.document.content.clone()
        }
        None => {
            tracing::debug!(corpus = ctx.index.len(), "No matching document");
            retrieval.fallback_message.clone()
        }
    };

    Ok(ChatResponse { response })
}

/// CLI entry point: load the context and print the answer.
pub fn run_chat(config: &Config, query: &str) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let reply = answer(&ctx, query)?;
    println!("{}", reply.response);
    Ok(())
}
