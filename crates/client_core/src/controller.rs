use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{Address, ChainId, TxReceipt};
use tracing::{debug, error, info, warn};

use crate::{
    contract::{AllowlistContract, REQUIRED_CHAIN_ID},
    error::SessionError,
    session::{Notice, Session},
    view::{self, View},
    wallet::{ChainHandle, SignerHandle, WalletProvider},
};

/// Result of asking the wallet for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    NoAccounts,
    Unchanged(Address),
    Changed(Address),
}

pub struct SessionController {
    wallet: Arc<dyn WalletProvider>,
    contract: Arc<dyn AllowlistContract>,
    required_chain_id: ChainId,
    state: Mutex<Session>,
    notices: Mutex<Vec<Notice>>,
}

/// Holds `is_submitting` for the lifetime of one join attempt.
struct SubmittingGuard<'a> {
    state: &'a Mutex<Session>,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(state: &'a Mutex<Session>) -> Result<(Self, Address), SessionError> {
        let mut session = lock(state);
        let Some(address) = session.connected_address.clone() else {
            return Err(SessionError::NotConnected);
        };
        if session.is_joined {
            return Err(SessionError::AlreadyJoined(address));
        }
        if session.is_submitting {
            return Err(SessionError::SubmissionInProgress);
        }
        session.is_submitting = true;
        Ok((Self { state }, address))
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).is_submitting = false;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionController {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn AllowlistContract>,
        required_chain_id: ChainId,
    ) -> Self {
        debug!(
            contract = %contract.binding().address,
            required_chain_id = required_chain_id.0,
            "session controller created"
        );
        Self {
            wallet,
            contract,
            required_chain_id,
            state: Mutex::new(Session::default()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_network(
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn AllowlistContract>,
    ) -> Self {
        Self::new(wallet, contract, REQUIRED_CHAIN_ID)
    }

    pub fn required_chain_id(&self) -> ChainId {
        self.required_chain_id
    }

    pub fn snapshot(&self) -> Session {
        lock(&self.state).clone()
    }

    pub fn render(&self) -> View {
        view::render(&self.snapshot())
    }

    /// Drains notices raised since the last call.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *lock(&self.notices))
    }

    fn raise(&self, notice: Notice) {
        warn!(notice = %notice.message(), "notice raised");
        lock(&self.notices).push(notice);
    }

    pub fn detect_wallet(&self) -> Result<(), SessionError> {
        let present = self.wallet.is_present();
        lock(&self.state).is_wallet_detected = present;
        if !present {
            self.raise(Notice::InstallWallet);
            return Err(SessionError::WalletMissing);
        }
        info!("wallet provider detected");
        Ok(())
    }

    /// Picks up an account the user authorized on an earlier visit.
    pub async fn detect_connected_account(&self) -> Result<AccountOutcome, SessionError> {
        if !lock(&self.state).is_wallet_detected {
            return Err(SessionError::WalletMissing);
        }
        let accounts = self.wallet.accounts().await.map_err(|err| {
            error!("failed to read authorized accounts: {err:#}");
            SessionError::from_wallet(&err)
        })?;
        debug!(count = accounts.len(), "authorized accounts");
        Ok(self.adopt_first(accounts))
    }

    pub async fn connect_wallet(&self) -> Result<AccountOutcome, SessionError> {
        if !lock(&self.state).is_wallet_detected {
            return Err(SessionError::WalletMissing);
        }
        let accounts = self.wallet.request_access().await.map_err(|err| {
            let mapped = SessionError::from_wallet(&err);
            match mapped {
                SessionError::Rejected => warn!("wallet connection rejected by user"),
                _ => error!("wallet connection failed: {err:#}"),
            }
            mapped
        })?;
        info!(count = accounts.len(), "wallet access granted");
        Ok(self.adopt_first(accounts))
    }

    fn adopt_first(&self, accounts: Vec<Address>) -> AccountOutcome {
        let Some(first) = accounts.into_iter().next() else {
            return AccountOutcome::NoAccounts;
        };
        if lock(&self.state).adopt_account(first.clone()) {
            info!(address = %first, "account connected");
            AccountOutcome::Changed(first)
        } else {
            AccountOutcome::Unchanged(first)
        }
    }

    /// Wraps the wallet in a handle for contract calls, refusing to hand one
    /// out while the wallet is on another network.
    pub async fn resolve_provider_or_signer(
        &self,
        needs_signing: bool,
    ) -> Result<ChainHandle, SessionError> {
        let actual = self.wallet.chain_id().await.map_err(|err| {
            error!("failed to read active network: {err:#}");
            SessionError::from_wallet(&err)
        })?;
        if actual != self.required_chain_id {
            self.raise(Notice::WrongNetwork {
                expected: self.required_chain_id,
                actual,
            });
            return Err(SessionError::WrongNetwork {
                expected: self.required_chain_id,
                actual,
            });
        }
        if !needs_signing {
            return Ok(ChainHandle::ReadOnly { chain_id: actual });
        }
        let signer = self.wallet.signer().await.map_err(|err| {
            error!("failed to obtain signer: {err:#}");
            SessionError::from_wallet(&err)
        })?;
        Ok(ChainHandle::Signer(signer))
    }

    async fn signer_handle(&self) -> Result<SignerHandle, SessionError> {
        self.resolve_provider_or_signer(true)
            .await?
            .into_signer()
            .ok_or_else(|| SessionError::Provider("wallet returned a read-only handle".into()))
    }

    pub async fn refresh_allowlist_status(&self) -> Result<bool, SessionError> {
        if !lock(&self.state).is_connected() {
            return Err(SessionError::NotConnected);
        }
        let signer = self.signer_handle().await?;
        let address = signer.address.clone();
        let joined = self
            .contract
            .is_address_allowlisted(&ChainHandle::Signer(signer), &address)
            .await
            .map_err(|err| {
                error!(address = %address, "allow-list membership read failed: {err:#}");
                SessionError::from_contract(&err)
            })?;

        let mut session = lock(&self.state);
        match &session.connected_address {
            Some(current) if current.same_account(&address) => session.is_joined = joined,
            _ => debug!(address = %address, "account changed during membership read"),
        }
        debug!(address = %address, joined, "allow-list membership");
        Ok(joined)
    }

    pub async fn refresh_allowlist_count(&self) -> Result<u64, SessionError> {
        let handle = self.resolve_provider_or_signer(false).await?;
        let count = self
            .contract
            .number_of_allowlisted_addresses(&handle)
            .await
            .map_err(|err| {
                error!("allow-list count read failed: {err:#}");
                SessionError::from_contract(&err)
            })?;
        lock(&self.state).allowlisted_count = count;
        debug!(count, "allow-list count");
        Ok(count)
    }

    /// Submits the join transaction and waits for it to be mined.
    ///
    /// Only one join runs at a time; `is_submitting` stays set until the
    /// post-confirmation refreshes finish and is cleared on every exit path.
    /// Membership is re-read from the chain after confirmation and falls back
    /// to the successful receipt if that read fails, as long as the signing
    /// account is still the connected one. A failed count refresh does not
    /// fail the join.
    pub async fn join_allowlist(&self) -> Result<TxReceipt, SessionError> {
        let (guard, address) = SubmittingGuard::acquire(&self.state)?;

        let signer = self.signer_handle().await?;
        let mut pending = self
            .contract
            .allowlist_address(&signer)
            .await
            .map_err(|err| {
                error!(address = %address, "join transaction submission failed: {err:#}");
                SessionError::from_contract(&err)
            })?;
        info!(address = %address, tx = %pending.hash(), "join transaction submitted");

        let receipt = pending.wait().await.map_err(|err| {
            error!(tx = %pending.hash(), "join transaction confirmation failed: {err:#}");
            SessionError::from_contract(&err)
        })?;
        if !receipt.succeeded {
            error!(tx = %receipt.hash, "join transaction reverted");
            return Err(SessionError::Reverted(receipt.hash));
        }
        info!(
            tx = %receipt.hash,
            block = receipt.block_number.0,
            "join transaction confirmed"
        );

        if let Err(err) = self.refresh_allowlist_count().await {
            debug!("count refresh after join failed: {err}");
        }
        if let Err(err) = self.refresh_allowlist_status().await {
            let mut session = lock(&self.state);
            match &session.connected_address {
                Some(current) if current.same_account(&address) => {
                    warn!("membership re-check failed, trusting receipt: {err}");
                    session.is_joined = true;
                }
                _ => debug!(address = %address, "account changed before membership re-check"),
            }
        }
        drop(guard);
        Ok(receipt)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
