//! In-memory wallet and allow-list contract sharing one ledger.
//!
//! Stands in for a browser wallet and a deployed contract in the demo binary
//! and in tests. Writes are applied when the transaction is mined, after the
//! configured number of confirmation ticks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use shared::domain::{Address, BlockNumber, ChainId, TxHash, TxReceipt};
use tokio::sync::Notify;
use tracing::debug;

use crate::{
    contract::{AllowlistContract, ContractBinding, PendingTransaction},
    wallet::{ChainHandle, SignerHandle, WalletProvider, WalletRejection},
};

pub const DEFAULT_MAX_ALLOWLISTED: u64 = 10;

#[derive(Debug)]
struct Ledger {
    present: bool,
    chain_id: ChainId,
    wallet_accounts: Vec<Address>,
    authorized: bool,
    reject_access: bool,
    allowlisted: Vec<Address>,
    max_allowlisted: u64,
    block: u64,
    nonce: u64,
    confirm_ticks: u32,
    read_failure: Option<String>,
    submit_failure: Option<String>,
    confirm_failure: Option<String>,
    contract_calls: u64,
}

impl Ledger {
    fn contains(&self, address: &Address) -> bool {
        self.allowlisted.iter().any(|a| a.same_account(address))
    }

    fn check_network(&self, chain_id: ChainId) -> Result<()> {
        if chain_id != self.chain_id {
            bail!(
                "handle is for network {chain_id} but the contract is read on network {}",
                self.chain_id
            );
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SimulatedChain {
    ledger: Arc<Mutex<Ledger>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
    binding: ContractBinding,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedChain {
    pub fn new(chain_id: ChainId, binding: ContractBinding) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger {
                present: true,
                chain_id,
                wallet_accounts: Vec::new(),
                authorized: false,
                reject_access: false,
                allowlisted: Vec::new(),
                max_allowlisted: DEFAULT_MAX_ALLOWLISTED,
                block: 0,
                nonce: 0,
                confirm_ticks: 0,
                read_failure: None,
                submit_failure: None,
                confirm_failure: None,
                contract_calls: 0,
            })),
            gate: Arc::new(Mutex::new(None)),
            binding,
        }
    }

    /// Adds an account to the wallet. It is not authorized for the site yet.
    pub fn with_account(self, address: Address) -> Self {
        lock(&self.ledger).wallet_accounts.push(address);
        self
    }

    /// Marks the wallet's accounts as already authorized for the site.
    pub fn authorized(self) -> Self {
        lock(&self.ledger).authorized = true;
        self
    }

    pub fn without_wallet(self) -> Self {
        lock(&self.ledger).present = false;
        self
    }

    pub fn rejecting_access(self) -> Self {
        lock(&self.ledger).reject_access = true;
        self
    }

    pub fn with_max_allowlisted(self, max: u64) -> Self {
        lock(&self.ledger).max_allowlisted = max;
        self
    }

    /// Seeds the allow-list with `count` unrelated addresses.
    pub fn with_preloaded(self, count: u64) -> Self {
        {
            let mut ledger = lock(&self.ledger);
            for i in 0..count {
                if let Ok(address) = Address::parse(format!("0x{:040x}", 0xa11ce_u64 + i)) {
                    ledger.allowlisted.push(address);
                }
            }
        }
        self
    }

    pub fn with_allowlisted(self, address: Address) -> Self {
        lock(&self.ledger).allowlisted.push(address);
        self
    }

    /// Number of scheduler yields a submitted transaction takes to be mined.
    pub fn with_confirm_ticks(self, ticks: u32) -> Self {
        lock(&self.ledger).confirm_ticks = ticks;
        self
    }

    pub fn failing_reads(self, message: impl Into<String>) -> Self {
        lock(&self.ledger).read_failure = Some(message.into());
        self
    }

    pub fn failing_submission(self, message: impl Into<String>) -> Self {
        lock(&self.ledger).submit_failure = Some(message.into());
        self
    }

    pub fn failing_confirmation(self, message: impl Into<String>) -> Self {
        lock(&self.ledger).confirm_failure = Some(message.into());
        self
    }

    /// Holds every pending transaction until the returned handle is notified.
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *lock(&self.gate) = Some(notify.clone());
        notify
    }

    pub fn switch_network(&self, chain_id: ChainId) {
        lock(&self.ledger).chain_id = chain_id;
    }

    pub fn allowlisted_count(&self) -> u64 {
        lock(&self.ledger).allowlisted.len() as u64
    }

    pub fn contract_calls(&self) -> u64 {
        lock(&self.ledger).contract_calls
    }

    fn begin_read(&self, handle: &ChainHandle) -> Result<MutexGuard<'_, Ledger>> {
        let mut ledger = lock(&self.ledger);
        ledger.contract_calls += 1;
        if let Some(message) = &ledger.read_failure {
            return Err(anyhow!(message.clone()));
        }
        ledger.check_network(handle.chain_id())?;
        Ok(ledger)
    }
}

#[async_trait]
impl WalletProvider for SimulatedChain {
    fn is_present(&self) -> bool {
        lock(&self.ledger).present
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        let ledger = lock(&self.ledger);
        if !ledger.present {
            bail!("wallet provider unavailable");
        }
        if ledger.authorized {
            Ok(ledger.wallet_accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_access(&self) -> Result<Vec<Address>> {
        let mut ledger = lock(&self.ledger);
        if !ledger.present {
            bail!("wallet provider unavailable");
        }
        if ledger.reject_access {
            return Err(WalletRejection::default().into());
        }
        ledger.authorized = true;
        Ok(ledger.wallet_accounts.clone())
    }

    async fn chain_id(&self) -> Result<ChainId> {
        let ledger = lock(&self.ledger);
        if !ledger.present {
            bail!("wallet provider unavailable");
        }
        Ok(ledger.chain_id)
    }

    async fn signer(&self) -> Result<SignerHandle> {
        let ledger = lock(&self.ledger);
        if !ledger.authorized {
            bail!("no authorized account to sign with");
        }
        let address = ledger
            .wallet_accounts
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("wallet has no accounts"))?;
        Ok(SignerHandle {
            chain_id: ledger.chain_id,
            address,
        })
    }
}

#[async_trait]
impl AllowlistContract for SimulatedChain {
    fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    async fn number_of_allowlisted_addresses(&self, handle: &ChainHandle) -> Result<u64> {
        let ledger = self.begin_read(handle)?;
        Ok(ledger.allowlisted.len() as u64)
    }

    async fn is_address_allowlisted(
        &self,
        handle: &ChainHandle,
        address: &Address,
    ) -> Result<bool> {
        let ledger = self.begin_read(handle)?;
        Ok(ledger.contains(address))
    }

    async fn allowlist_address(
        &self,
        signer: &SignerHandle,
    ) -> Result<Box<dyn PendingTransaction>> {
        if !self.binding.has_function("allowlistAddress") {
            bail!("allowlistAddress is not part of the bound ABI");
        }
        let mut ledger = lock(&self.ledger);
        ledger.contract_calls += 1;
        if let Some(message) = &ledger.submit_failure {
            return Err(anyhow!(message.clone()));
        }
        ledger.check_network(signer.chain_id)?;
        if ledger.contains(&signer.address) {
            bail!("execution reverted: sender has already been allow-listed");
        }
        if ledger.allowlisted.len() as u64 >= ledger.max_allowlisted {
            bail!("execution reverted: more addresses can't be added, limit reached");
        }
        ledger.nonce += 1;
        let hash = TxHash(format!("0x{:064x}", ledger.nonce));
        debug!(tx = %hash, from = %signer.address, "simulated transaction submitted");

        Ok(Box::new(SimulatedTransaction {
            ledger: self.ledger.clone(),
            gate: lock(&self.gate).clone(),
            hash,
            from: signer.address.clone(),
            ticks: ledger.confirm_ticks,
        }))
    }
}

struct SimulatedTransaction {
    ledger: Arc<Mutex<Ledger>>,
    gate: Option<Arc<Notify>>,
    hash: TxHash,
    from: Address,
    ticks: u32,
}

#[async_trait]
impl PendingTransaction for SimulatedTransaction {
    fn hash(&self) -> &TxHash {
        &self.hash
    }

    async fn wait(&mut self) -> Result<TxReceipt> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        for _ in 0..self.ticks {
            tokio::task::yield_now().await;
        }

        let mut ledger = lock(&self.ledger);
        if let Some(message) = &ledger.confirm_failure {
            return Err(anyhow!(message.clone()));
        }
        ledger.block += 1;
        let block_number = BlockNumber(ledger.block);
        // Re-checked at inclusion: another join may have filled the list.
        let succeeded = !ledger.contains(&self.from)
            && (ledger.allowlisted.len() as u64) < ledger.max_allowlisted;
        if succeeded {
            ledger.allowlisted.push(self.from.clone());
        }
        debug!(tx = %self.hash, block = block_number.0, succeeded, "simulated transaction mined");

        Ok(TxReceipt {
            hash: self.hash.clone(),
            block_number,
            succeeded,
        })
    }
}

#[cfg(test)]
#[path = "tests/sim_tests.rs"]
mod tests;
