//! Named transitions that drive the session controller.
//!
//! Each event runs its operation to completion and may queue follow-up
//! events; nothing is triggered by diffing state.

use std::collections::VecDeque;

use shared::domain::Address;
use tracing::debug;

use crate::{
    controller::{AccountOutcome, SessionController},
    error::SessionError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Mounted,
    WalletDetected,
    AccountKnown(Address),
    ConnectClicked,
    JoinClicked,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::WalletDetected => "wallet_detected",
            Self::AccountKnown(_) => "account_known",
            Self::ConnectClicked => "connect_clicked",
            Self::JoinClicked => "join_clicked",
        }
    }
}

/// One operation run while handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStep {
    pub event: &'static str,
    pub operation: &'static str,
    pub error: Option<SessionError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub steps: Vec<DispatchStep>,
}

impl DispatchReport {
    pub fn ran(&self, operation: &str) -> bool {
        self.steps.iter().any(|step| step.operation == operation)
    }

    pub fn errors(&self) -> impl Iterator<Item = &SessionError> {
        self.steps.iter().filter_map(|step| step.error.as_ref())
    }

    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }

    fn record<T>(
        &mut self,
        event: &'static str,
        operation: &'static str,
        result: &Result<T, SessionError>,
    ) {
        self.steps.push(DispatchStep {
            event,
            operation,
            error: result.as_ref().err().cloned(),
        });
    }
}

/// Handles `event` and every follow-up it causes.
pub async fn dispatch(controller: &SessionController, event: SessionEvent) -> DispatchReport {
    let mut report = DispatchReport::default();
    let mut queue = VecDeque::from([event]);

    while let Some(event) = queue.pop_front() {
        let name = event.name();
        debug!(event = name, "dispatching session event");
        match event {
            SessionEvent::Mounted => {
                let result = controller.detect_wallet();
                report.record(name, "detect_wallet", &result);
                if result.is_ok() {
                    queue.push_back(SessionEvent::WalletDetected);
                }
            }
            SessionEvent::WalletDetected => {
                let result = controller.detect_connected_account().await;
                report.record(name, "detect_connected_account", &result);
                if let Ok(AccountOutcome::Changed(address)) = result {
                    queue.push_back(SessionEvent::AccountKnown(address));
                }
            }
            SessionEvent::AccountKnown(_) => {
                let (status, count) = futures::join!(
                    controller.refresh_allowlist_status(),
                    controller.refresh_allowlist_count()
                );
                report.record(name, "refresh_allowlist_status", &status);
                report.record(name, "refresh_allowlist_count", &count);
            }
            SessionEvent::ConnectClicked => {
                if controller.snapshot().is_connected() {
                    debug!(event = name, "already connected; ignoring");
                    continue;
                }
                let result = controller.connect_wallet().await;
                report.record(name, "connect_wallet", &result);
                if let Ok(AccountOutcome::Changed(address)) = result {
                    queue.push_back(SessionEvent::AccountKnown(address));
                }
            }
            SessionEvent::JoinClicked => {
                let result = controller.join_allowlist().await;
                report.record(name, "join_allowlist", &result);
            }
        }
    }

    report
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
