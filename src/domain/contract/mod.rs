//! Travel Contract - the immutable document that packages a guarantee.
//!
//! The provider signs at generation time with HMAC-SHA256 over the contract
//! body. The customer signs later through [`sign`], which returns a new
//! contract and leaves the original untouched.

mod errors;
mod generator;
mod status;
mod values;

pub use errors::ContractError;
pub use generator::{sign, ContractGenerator, ContractInputs};
pub use status::{status, status_at, validate_contract, ContractStatus, ContractValidation};
pub use values::{
    ContingencySection, ContractTerms, CustomerParty, GuaranteeSection, LegalTerms, Parties,
    PerformanceSnapshot, PlanSection, ProviderTerms, RiskManagementSection, Signature, Signatures,
    TravelContract,
};
