//! AssistantProvider trait — the abstraction over the remote language model.
//!
//! The provider is an opaque remote function: bounded scrubbed context plus
//! a question in, free text out. Implementations: OpenAI-compatible HTTP,
//! scripted (tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::ScrubbedContext;
use crate::error::GatewayError;

/// A single completion request to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Serialized scrubbed context, already bounded.
    pub context_text: String,
    /// The caller's question, verbatim.
    pub question: String,
}

impl AskRequest {
    /// Build a request from a scrubbed context. Taking the context by
    /// reference here is the trust boundary: there is no constructor from
    /// raw records.
    pub fn new(context: &ScrubbedContext, question: impl Into<String>) -> Self {
        Self {
            context_text: context.render_text(),
            question: question.into(),
        }
    }
}

/// The core AssistantProvider trait.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// One completion attempt. Retry and timeout policy live in the bridge,
    /// not in implementations.
    async fn complete(&self, request: &AskRequest) -> Result<String, GatewayError>;
}
