use super::*;

fn addr(raw: &str) -> Address {
    Address::parse(raw).expect("address")
}

fn chain() -> SimulatedChain {
    SimulatedChain::new(ChainId(4), ContractBinding::deployed().expect("binding"))
}

#[tokio::test]
async fn accounts_hidden_until_access_granted() {
    let chain = chain().with_account(addr("0xabc"));
    assert!(chain.accounts().await.expect("accounts").is_empty());
    assert!(chain.signer().await.is_err());

    let granted = chain.request_access().await.expect("access");
    assert_eq!(granted, vec![addr("0xabc")]);
    assert_eq!(chain.accounts().await.expect("accounts"), granted);
}

#[tokio::test]
async fn rejection_carries_wallet_rejection_error() {
    let chain = chain().with_account(addr("0xabc")).rejecting_access();
    let err = chain.request_access().await.expect_err("rejected");
    assert_eq!(
        err.downcast_ref::<WalletRejection>(),
        Some(&WalletRejection::default())
    );
}

#[tokio::test]
async fn join_is_applied_when_mined() {
    let chain = chain().with_account(addr("0xabc")).authorized();
    let signer = chain.signer().await.expect("signer");

    let mut pending = chain.allowlist_address(&signer).await.expect("submit");
    assert_eq!(chain.allowlisted_count(), 0);

    let receipt = pending.wait().await.expect("mined");
    assert!(receipt.succeeded);
    assert_eq!(&receipt.hash, pending.hash());
    assert_eq!(receipt.block_number, BlockNumber(1));
    assert_eq!(chain.allowlisted_count(), 1);

    let handle = ChainHandle::Signer(signer.clone());
    assert!(chain
        .is_address_allowlisted(&handle, &addr("0xABC"))
        .await
        .expect("read"));
}

#[tokio::test]
async fn duplicate_join_reverts_at_inclusion() {
    let chain = chain().with_account(addr("0xabc")).authorized();
    let signer = chain.signer().await.expect("signer");

    let mut first = chain.allowlist_address(&signer).await.expect("first");
    let mut second = chain.allowlist_address(&signer).await.expect("second");
    assert_ne!(first.hash(), second.hash());

    assert!(first.wait().await.expect("first mined").succeeded);
    assert!(!second.wait().await.expect("second mined").succeeded);
    assert_eq!(chain.allowlisted_count(), 1);
}

#[tokio::test]
async fn reads_on_other_network_fail() {
    let chain = chain().with_preloaded(3);
    let stale = ChainHandle::ReadOnly {
        chain_id: ChainId(1),
    };
    assert!(chain.number_of_allowlisted_addresses(&stale).await.is_err());

    chain.switch_network(ChainId(1));
    assert_eq!(
        chain
            .number_of_allowlisted_addresses(&stale)
            .await
            .expect("count"),
        3
    );
}
