use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of why a session operation did not advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Wallet missing or pointed at the wrong network. Shown to the user.
    Environment,
    /// The user declined a wallet prompt.
    Rejected,
    /// Wallet or RPC failure.
    Transport,
    /// Contract call failed or the transaction reverted.
    Contract,
    /// Operation not valid for the current session state.
    State,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must not be empty")]
    Empty,
    #[error("address '{0}' contains whitespace")]
    Whitespace(String),
    #[error("address '{0}' is not valid hex")]
    InvalidHex(String),
}
