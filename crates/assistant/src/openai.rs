//! OpenAI-compatible chat-completions provider.
//!
//! One attempt per call; retry and timeout policy belong to the bridge.
//! The scrubbed context arrives pre-serialized inside the `AskRequest` —
//! this module never sees a record type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use medgate_core::assistant::{AskRequest, AssistantProvider};
use medgate_core::error::GatewayError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// The fixed system prompt: the model is a clinical assistant bound to the
/// supplied PATIENT_CONTEXT and nothing else.
const SYSTEM_PROMPT: &str = "You are a clinical assistant supporting a doctor during a \
consultation. Provide medically accurate, evidence-backed suggestions strictly based on the \
PATIENT_CONTEXT provided. Only use information contained in PATIENT_CONTEXT. If the data is \
insufficient to draw conclusions, clearly state so. Do not guess and do not invent symptoms or \
conditions not explicitly supported by the data. Present suggestions concisely, grouped by \
category (questions to ask the patient, investigations, possible diagnoses, treatment options).";

/// OpenAI-compatible chat-completions provider.
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a custom base URL (proxies, compatible providers, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn to_api_request(&self, request: &AskRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            temperature: 0.6,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "system".into(),
                    content: format!("PATIENT_CONTEXT = {}", request.context_text),
                },
                ChatMessage {
                    role: "user".into(),
                    content: request.question.clone(),
                },
            ],
        }
    }
}

#[async_trait]
impl AssistantProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &AskRequest) -> Result<String, GatewayError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_api_request(request))
            .send()
            .await
            .map_err(|e| GatewayError::ProviderUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderUnavailable(format!(
                "provider returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderUnavailable(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::ProviderUnavailable("response had no choices".into()))
    }
}

// ── API types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_request_carries_context_and_question() {
        let provider = OpenAiProvider::new("sk-test", "gpt-4o");
        let request = AskRequest {
            context_text: r#"{"medications":[{"drug":"Metformin"}]}"#.into(),
            question: "Any interactions?".into(),
        };

        let api = provider.to_api_request(&request);
        assert_eq!(api.messages.len(), 3);
        assert!(api.messages[1].content.starts_with("PATIENT_CONTEXT = "));
        assert!(api.messages[1].content.contains("Metformin"));
        assert_eq!(api.messages[2].content, "Any interactions?");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            OpenAiProvider::new("sk-test", "gpt-4o").with_base_url("http://localhost:9999/");
        assert_eq!(provider.base_url, "http://localhost:9999");
    }

    #[test]
    fn response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"No red flags."}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "No red flags.");
    }
}
