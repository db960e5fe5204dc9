use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Address, ChainId, TxHash, TxReceipt},
    error::AddressError,
};

use crate::wallet::{ChainHandle, SignerHandle};

/// Network the deployed allow-list contract lives on.
pub const REQUIRED_CHAIN_ID: ChainId = ChainId(4);

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x8d9e1b9e2f3a4c5d6e7f8091a2b3c4d5e6f70819";

/// Human-readable ABI of the allow-list contract.
pub const ALLOWLIST_ABI: &[&str] = &[
    "constructor(uint8 _maxAllowlistedAddresses)",
    "function maxAllowlistedAddresses() view returns (uint8)",
    "function numberOfAllowlistedAddresses() view returns (uint8)",
    "function isAddressAllowlisted(address) view returns (bool)",
    "function allowlistAddress()",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    pub address: Address,
    pub abi: &'static [&'static str],
}

impl ContractBinding {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            abi: ALLOWLIST_ABI,
        }
    }

    pub fn deployed() -> Result<Self, AddressError> {
        Ok(Self::new(Address::parse(DEFAULT_CONTRACT_ADDRESS)?))
    }

    pub fn has_function(&self, name: &str) -> bool {
        let prefix = format!("function {name}(");
        self.abi.iter().any(|entry| entry.starts_with(&prefix))
    }
}

#[async_trait]
pub trait PendingTransaction: Send {
    fn hash(&self) -> &TxHash;
    /// Suspends until the transaction is mined. No timeout is applied.
    async fn wait(&mut self) -> Result<TxReceipt>;
}

#[async_trait]
pub trait AllowlistContract: Send + Sync {
    fn binding(&self) -> &ContractBinding;
    async fn number_of_allowlisted_addresses(&self, handle: &ChainHandle) -> Result<u64>;
    async fn is_address_allowlisted(&self, handle: &ChainHandle, address: &Address)
        -> Result<bool>;
    /// Submits a transaction adding the signer's own address.
    async fn allowlist_address(&self, signer: &SignerHandle)
        -> Result<Box<dyn PendingTransaction>>;
}
