use shared::{
    domain::{Address, ChainId, TxHash},
    error::FailureKind,
};
use thiserror::Error;

use crate::wallet::WalletRejection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no wallet provider detected; install a wallet extension")]
    WalletMissing,
    #[error("wallet is on network {actual}, expected network {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },
    #[error("no wallet account is connected")]
    NotConnected,
    #[error("account {0} has already joined the allow-list")]
    AlreadyJoined(Address),
    #[error("a join transaction is already being submitted")]
    SubmissionInProgress,
    #[error("wallet request was rejected by the user")]
    Rejected,
    #[error("wallet provider error: {0}")]
    Provider(String),
    #[error("allow-list contract error: {0}")]
    Contract(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

impl SessionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::WalletMissing | Self::WrongNetwork { .. } => FailureKind::Environment,
            Self::NotConnected | Self::AlreadyJoined(_) | Self::SubmissionInProgress => {
                FailureKind::State
            }
            Self::Rejected => FailureKind::Rejected,
            Self::Provider(_) => FailureKind::Transport,
            Self::Contract(_) | Self::Reverted(_) => FailureKind::Contract,
        }
    }

    pub(crate) fn from_wallet(err: &anyhow::Error) -> Self {
        if is_user_rejection(err) {
            Self::Rejected
        } else {
            Self::Provider(format!("{err:#}"))
        }
    }

    /// Contract writes go through a signing prompt, so a rejection can
    /// surface here as well.
    pub(crate) fn from_contract(err: &anyhow::Error) -> Self {
        if is_user_rejection(err) {
            Self::Rejected
        } else {
            Self::Contract(format!("{err:#}"))
        }
    }
}

fn is_user_rejection(err: &anyhow::Error) -> bool {
    if err.chain().any(|cause| cause.is::<WalletRejection>()) {
        return true;
    }
    let lower = err.to_string().to_ascii_lowercase();
    lower.contains("user rejected") || lower.contains("user denied")
}
