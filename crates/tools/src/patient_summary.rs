//! Scrubbed demographics summary for one patient.

use async_trait::async_trait;
use std::sync::Arc;

use medgate_core::error::Result;
use medgate_core::store::CategoryRecords;
use medgate_core::tool::Tool;

use crate::pipeline::{ToolPipeline, require_str};

pub struct PatientSummaryTool {
    pipeline: Arc<ToolPipeline>,
}

impl PatientSummaryTool {
    pub fn new(pipeline: Arc<ToolPipeline>) -> Self {
        Self { pipeline }
    }

    async fn run(&self, patient_id: &str) -> Result<serde_json::Value> {
        let patient = self.pipeline.store().demographics(patient_id).await?;
        let summary = self
            .pipeline
            .scrubber()
            .scrub(&CategoryRecords::Demographics(patient))?;
        Ok(serde_json::json!({ "summary": summary }))
    }
}

#[async_trait]
impl Tool for PatientSummaryTool {
    fn name(&self) -> &str {
        "get_patient_summary"
    }

    fn description(&self) -> &str {
        "Get core demographics for a patient, with identifying fields removed \
         and date of birth reduced to an age band."
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
