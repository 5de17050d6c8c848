//! Medication entries for one patient, scrubbed.

use async_trait::async_trait;
use std::sync::Arc;

use medgate_core::error::Result;
use medgate_core::store::CategoryRecords;
use medgate_core::tool::Tool;

use crate::pipeline::{ToolPipeline, require_str};

pub struct MedicationsTool {
    pipeline: Arc<ToolPipeline>,
}

impl MedicationsTool {
    pub fn new(pipeline: Arc<ToolPipeline>) -> Self {
        Self { pipeline }
    }

    async fn run(&self, patient_id: &str) -> Result<serde_json::Value> {
        let rows = self.pipeline.store().medications(patient_id).await?;
        let medications = self
            .pipeline
            .scrubber()
            .scrub(&CategoryRecords::Medications(rows))?;
        Ok(serde_json::json!({ "medications": medications }))
    }
}

#[async_trait]
impl Tool for MedicationsTool {
    fn name(&self) -> &str {
        "get_medications"
    }

    fn description(&self) -> &str {
        "All medication entries for a patient; entries without a stop date are ongoing."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_id": {
                    "type": "string",
                    "description": "The patient identifier"
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

        let result = self.run(patient_id).await;
        self.pipeline
            .record_outcome(self.name(), Some(patient_id), &result);
        result
    }
}
