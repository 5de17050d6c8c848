//! Ask the assistant a question about one patient.
//!
//! The full pipeline: authorize, select the minimal relevant categories,
//! scrub them, and only then let the bridge forward the bundle to the
//! model. The answer comes back with the categories that were consulted so
//! the caller can see what the model was shown.

use async_trait::async_trait;
use std::sync::Arc;

use medgate_core::error::Result;
use medgate_core::record::RecordCategory;
use medgate_core::tool::Tool;

use crate::pipeline::{ToolPipeline, optional_str, require_str};

pub struct AskAboutPatientTool {
    pipeline: Arc<ToolPipeline>,
}

impl AskAboutPatientTool {
    pub fn new(pipeline: Arc<ToolPipeline>) -> Self {
        Self { pipeline }
    }

    async fn run(&self, patient_id: &str, question: &str) -> Result<serde_json::Value> {
        let context = self.pipeline.selector().select(patient_id, question).await?;
        let categories: Vec<RecordCategory> = context.categories();

        self.pipeline.record_assistant_call(patient_id);
        let answer = self.pipeline.bridge().ask(&context, question).await?;

        Ok(serde_json::json!({
            "answer": answer,
            "categories": categories,
        }))
        // `context` drops here: the scrubbed bundle lives exactly as long
        // as the request that produced it.
    }
}

#[async_trait]
impl Tool for AskAboutPatientTool {
    fn name(&self) -> &str {
        "ask_about_patient"
    }

    fn description(&self) -> &str {
        "Ask the clinical assistant a question about a patient. Only the minimal \
         scrubbed context relevant to the question is sent to the model."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_id": {
                    "type": "string",
                    "description": "The patient identifier"
                },
                "question": {
                    "type": "string",
                    "description": "The question to ask about this patient. \
                     May be empty: a default context bundle is consulted."
                },
                "credential": {
                    "type": "string",
                    "description": "Caller credential"
                }
            },
            "required": ["patient_id", "credential"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        self.pipeline.authorize(self.name(), &arguments)?;
        let patient_id = require_str(&arguments, "patient_id")?;
        // An empty or absent question is fine: the selector falls back to
        // its default category bundle.
        let question = optional_str(&arguments, "question", "")?;

        let result = self.run(patient_id, question).await;
        self.pipeline
            .record_outcome(self.name(), Some(patient_id), &result);
        result
    }
}
