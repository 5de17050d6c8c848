//! Latest vitals for one patient, scrubbed.

use async_trait::async_trait;
use std::sync::Arc;

use medgate_core::error::Result;
use medgate_core::store::{CategoryRecords, DEFAULT_VITALS_LIMIT};
use medgate_core::tool::Tool;

use crate::pipeline::{ToolPipeline, optional_limit, require_str};

pub struct VitalsTool {
    pipeline: Arc<ToolPipeline>,
}

impl VitalsTool {
    pub fn new(pipeline: Arc<ToolPipeline>) -> Self {
        Self { pipeline }
    }

    async fn run(&self, patient_id: &str, limit: usize) -> Result<serde_json::Value> {
        let rows = self.pipeline.store().vitals(patient_id, limit).await?;
        let vitals = self
            .pipeline
            .scrubber()
            .scrub(&CategoryRecords::Vitals(rows))?;
        Ok(serde_json::json!({ "vitals": vitals }))
    }
}

#[async_trait]
impl Tool for VitalsTool {
    fn name(&self) -> &str {
        "get_vitals"
    }

    fn description(&self) -> &str {
        "Latest vitals for a patient, newest first (default limit 3)."
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
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of entries (default 3)",
                    "default": DEFAULT_VITALS_LIMIT
                }
            },
            "required": ["patient_id", "credential"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        self.pipeline.authorize(self.name(), &arguments)?;
        let patient_id = require_str(&arguments, "patient_id")?;
        let limit = optional_limit(&arguments, "limit", DEFAULT_VITALS_LIMIT)?;

        let result = self.run(patient_id, limit).await;
        self.pipeline
            .record_outcome(self.name(), Some(patient_id), &result);
        result
    }
}
