//! Wallet session orchestration for the allow-list front end.
//!
//! [`SessionController`] owns the view state and sequences calls into two
//! injected collaborators: a [`WalletProvider`] and an [`AllowlistContract`].
//! [`dispatch`] drives the controller through named [`SessionEvent`]s and
//! [`view::render`] turns a [`Session`] snapshot into what the page shows.

pub mod contract;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod sim;
pub mod view;
pub mod wallet;

pub use contract::{AllowlistContract, ContractBinding, PendingTransaction, REQUIRED_CHAIN_ID};
pub use controller::{AccountOutcome, SessionController};
pub use dispatcher::{dispatch, DispatchReport, DispatchStep, SessionEvent};
pub use error::SessionError;
pub use session::{Notice, Session};
pub use sim::SimulatedChain;
pub use view::{render, PrimaryAction, View};
pub use wallet::{ChainHandle, MissingWallet, SignerHandle, WalletProvider, WalletRejection};
