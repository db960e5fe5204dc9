use super::*;
use std::sync::Arc;

use crate::{
    contract::{ContractBinding, REQUIRED_CHAIN_ID},
    sim::SimulatedChain,
};

fn addr(raw: &str) -> Address {
    Address::parse(raw).expect("address")
}

fn controller_for(chain: &SimulatedChain) -> SessionController {
    SessionController::with_default_network(Arc::new(chain.clone()), Arc::new(chain.clone()))
}

fn chain() -> SimulatedChain {
    SimulatedChain::new(
        REQUIRED_CHAIN_ID,
        ContractBinding::deployed().expect("binding"),
    )
}

#[test]
fn event_names_are_stable() {
    assert_eq!(SessionEvent::Mounted.name(), "mounted");
    assert_eq!(SessionEvent::WalletDetected.name(), "wallet_detected");
    assert_eq!(
        SessionEvent::AccountKnown(addr("0xabc")).name(),
        "account_known"
    );
    assert_eq!(SessionEvent::ConnectClicked.name(), "connect_clicked");
    assert_eq!(SessionEvent::JoinClicked.name(), "join_clicked");
}

#[tokio::test]
async fn mount_without_wallet_stops_after_detection() {
    let chain = chain().without_wallet();
    let controller = controller_for(&chain);

    let report = dispatch(&controller, SessionEvent::Mounted).await;
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].operation, "detect_wallet");
    assert_eq!(
        report.errors().cloned().collect::<Vec<_>>(),
        vec![SessionError::WalletMissing]
    );
    assert!(!report.ran("detect_connected_account"));
}

#[tokio::test]
async fn mount_with_authorized_account_cascades_into_refresh() {
    let chain = chain()
        .with_account(addr("0xabc"))
        .authorized()
        .with_preloaded(4);
    let controller = controller_for(&chain);

    let report = dispatch(&controller, SessionEvent::Mounted).await;
    let operations: Vec<_> = report.steps.iter().map(|step| step.operation).collect();
    assert_eq!(
        operations,
        vec![
            "detect_wallet",
            "detect_connected_account",
            "refresh_allowlist_status",
            "refresh_allowlist_count",
        ]
    );
    assert!(report.is_clean());
    assert_eq!(controller.snapshot().allowlisted_count, 4);
}

#[tokio::test]
async fn mount_without_authorized_account_does_not_refresh() {
    let chain = chain().with_account(addr("0xabc"));
    let controller = controller_for(&chain);

    let report = dispatch(&controller, SessionEvent::Mounted).await;
    assert!(report.is_clean());
    assert!(report.ran("detect_connected_account"));
    assert!(!report.ran("refresh_allowlist_count"));
    assert_eq!(chain.contract_calls(), 0);
}

#[tokio::test]
async fn refreshes_run_independently() {
    let chain = chain().with_account(addr("0xabc")).failing_reads("rpc down");
    let controller = controller_for(&chain);
    dispatch(&controller, SessionEvent::Mounted).await;

    let report = dispatch(&controller, SessionEvent::ConnectClicked).await;
    assert!(report.ran("refresh_allowlist_status"));
    assert!(report.ran("refresh_allowlist_count"));
    assert_eq!(report.errors().count(), 2);
    assert_eq!(chain.contract_calls(), 2);
}

#[tokio::test]
async fn connect_click_while_connected_is_ignored() {
    let chain = chain().with_account(addr("0xabc")).authorized();
    let controller = controller_for(&chain);
    dispatch(&controller, SessionEvent::Mounted).await;

    let report = dispatch(&controller, SessionEvent::ConnectClicked).await;
    assert!(report.steps.is_empty());
}

#[tokio::test]
async fn rejected_connect_records_failure_without_cascade() {
    let chain = chain().with_account(addr("0xabc")).rejecting_access();
    let controller = controller_for(&chain);
    dispatch(&controller, SessionEvent::Mounted).await;

    let report = dispatch(&controller, SessionEvent::ConnectClicked).await;
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].error, Some(SessionError::Rejected));
    assert!(!report.ran("refresh_allowlist_status"));
}

#[tokio::test]
async fn join_click_while_disconnected_is_rejected() {
    let chain = chain().with_account(addr("0xabc"));
    let controller = controller_for(&chain);
    dispatch(&controller, SessionEvent::Mounted).await;

    let report = dispatch(&controller, SessionEvent::JoinClicked).await;
    assert_eq!(report.steps[0].operation, "join_allowlist");
    assert_eq!(report.steps[0].error, Some(SessionError::NotConnected));
    assert_eq!(chain.allowlisted_count(), 0);
}
