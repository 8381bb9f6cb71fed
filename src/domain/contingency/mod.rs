//! Contingency Planning - pre-authored responses to the assessed risks.

mod catalog;
mod planner;
mod values;

pub use planner::ContingencyPlanner;
pub use values::{
    CommunicationPlan, ContingencyAction, ContingencyPlan, ContingencyPlanningResult,
    EmergencyProtocol, MonitoringTrigger, RequiredResources, ResourceAllocation, ResourceShares,
    ResponseTime, SuccessMetrics, Urgency,
};
