use serde::Serialize;
use shared::domain::{Address, ChainId};

/// Client-side view state for one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub connected_address: Option<Address>,
    pub is_wallet_detected: bool,
    pub is_joined: bool,
    pub is_submitting: bool,
    pub allowlisted_count: u64,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.connected_address.is_some()
    }

    /// Adopts `address` as the connected account. Returns `true` when it
    /// differs from the previous one, in which case membership is unknown
    /// again and `is_joined` is cleared.
    pub(crate) fn adopt_account(&mut self, address: Address) -> bool {
        match &self.connected_address {
            Some(current) if current.same_account(&address) => false,
            _ => {
                self.connected_address = Some(address);
                self.is_joined = false;
                true
            }
        }
    }
}

/// Blocking message for the user. Only environment problems produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    InstallWallet,
    WrongNetwork { expected: ChainId, actual: ChainId },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::InstallWallet => {
                "No wallet detected. Install a wallet extension to continue.".to_string()
            }
            Self::WrongNetwork { expected, actual } => format!(
                "Your wallet is connected to network {actual}. Switch to network {expected}."
            ),
        }
    }
}
