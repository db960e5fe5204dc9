use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{Address, ChainId};
use thiserror::Error;

/// EIP-1193 code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user rejected the request (code {code})")]
pub struct WalletRejection {
    pub code: i64,
}

impl Default for WalletRejection {
    fn default() -> Self {
        Self {
            code: USER_REJECTED_CODE,
        }
    }
}

/// A signing capability bound to one account on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerHandle {
    pub chain_id: ChainId,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainHandle {
    ReadOnly { chain_id: ChainId },
    Signer(SignerHandle),
}

impl ChainHandle {
    pub fn chain_id(&self) -> ChainId {
        match self {
            Self::ReadOnly { chain_id } => *chain_id,
            Self::Signer(signer) => signer.chain_id,
        }
    }

    pub fn into_signer(self) -> Option<SignerHandle> {
        match self {
            Self::Signer(signer) => Some(signer),
            Self::ReadOnly { .. } => None,
        }
    }
}

/// The wallet injected into the page.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn is_present(&self) -> bool;
    /// Accounts already authorized for this site. Never prompts.
    async fn accounts(&self) -> Result<Vec<Address>>;
    /// Asks the user to authorize accounts. May prompt.
    async fn request_access(&self) -> Result<Vec<Address>>;
    async fn chain_id(&self) -> Result<ChainId>;
    async fn signer(&self) -> Result<SignerHandle>;
}

pub struct MissingWallet;

#[async_trait]
impl WalletProvider for MissingWallet {
    fn is_present(&self) -> bool {
        false
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Err(anyhow!("wallet provider unavailable"))
    }

    async fn request_access(&self) -> Result<Vec<Address>> {
        Err(anyhow!("wallet provider unavailable"))
    }

    async fn chain_id(&self) -> Result<ChainId> {
        Err(anyhow!("wallet provider unavailable"))
    }

    async fn signer(&self) -> Result<SignerHandle> {
        Err(anyhow!("wallet provider unavailable"))
    }
}
