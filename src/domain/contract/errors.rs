//! Contract generation and signing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Invalid contract terms: {0}")]
    InvalidTerms(String),

    #[error("Failed to serialize contract body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Signing key rejected: {0}")]
    SigningKey(String),

    #[error("Customer signature must not be empty")]
    EmptySignature,

    #[error("Contract {0} is already signed by the customer")]
    AlreadySigned(String),

    #[error("Provider signature does not match contract body")]
    InvalidSignature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_contract() {
        let err = ContractError::AlreadySigned("BaaP-1-000001".to_string());
        assert_eq!(
            err.to_string(),
            "Contract BaaP-1-000001 is already signed by the customer"
        );
    }
}
