//! BaaP Guarantee - Budget-as-a-Plan travel guarantees
//!
//! This crate scores how likely a traveler is to stay within a trip budget,
//! optimizes the plan toward a guaranteed adherence level, assesses operational
//! risks, prepares contingencies, and packages the result as a signed travel
//! contract.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
