//! Application layer - the guarantee pipeline orchestrator.
//!
//! Wires the collaborator ports to the domain stages and is the single
//! error boundary for a run.

mod guarantee;
mod health;
mod orchestrator;

pub use guarantee::{
    GuaranteeRequest, GuaranteeResponse, GuaranteeSummary, PipelineComponents, ResponseMetadata,
};
pub use health::{ComponentHealth, HealthReport, HealthStatus};
pub use orchestrator::{BaapOrchestrator, PipelineError};
