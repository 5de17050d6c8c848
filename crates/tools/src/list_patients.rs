//! List all patient identifiers.

use async_trait::async_trait;
use std::sync::Arc;

use medgate_core::error::Result;
use medgate_core::tool::Tool;

use crate::pipeline::ToolPipeline;

pub struct ListPatientsTool {
    pipeline: Arc<ToolPipeline>,
}

impl ListPatientsTool {
    pub fn new(pipeline: Arc<ToolPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Tool for ListPatientsTool {
    fn name(&self) -> &str {
        "list_patients"
    }

    fn description(&self) -> &str {
        "List all patient IDs."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "credential": {
                    "type": "string",
                    "description": "Caller credential"
                }
            },
            "required": ["credential"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        self.pipeline.authorize(self.name(), &arguments)?;

        let result = self
            .pipeline
            .store()
            .list_patients()
            .await
            .map(|ids| serde_json::json!({ "patients": ids }));
        self.pipeline.record_outcome(self.name(), None, &result);
        result
    }
}
