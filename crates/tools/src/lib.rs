//! The closed tool surface of the Medgate gateway.
//!
//! Six named operations and nothing else: no raw queries, no arbitrary
//! field paths. Every tool shares one [`ToolPipeline`] and runs
//! authorize → select/fetch → scrub → return, with an audit entry at the
//! boundary.

pub mod ask_about_patient;
pub mod history;
pub mod list_patients;
pub mod medications;
pub mod patient_summary;
pub mod pipeline;
pub mod vitals;

use std::sync::Arc;

use medgate_core::tool::ToolRegistry;

pub use pipeline::ToolPipeline;

/// Create the registry with the full tool set.
pub fn default_registry(pipeline: Arc<ToolPipeline>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(list_patients::ListPatientsTool::new(
        pipeline.clone(),
    )));
    registry.register(Box::new(patient_summary::PatientSummaryTool::new(
        pipeline.clone(),
    )));
    registry.register(Box::new(vitals::VitalsTool::new(pipeline.clone())));
    registry.register(Box::new(medications::MedicationsTool::new(
        pipeline.clone(),
    )));
    registry.register(Box::new(history::HistoryTool::new(pipeline.clone())));
    registry.register(Box::new(ask_about_patient::AskAboutPatientTool::new(
        pipeline,
    )));
    registry
}
