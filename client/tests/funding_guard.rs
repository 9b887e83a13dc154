use std::time::Duration;

use client::{
    e2e_helpers::local_client,
    error::ClientError,
    local_cluster::{
        FaucetBehavior,
        LocalCluster,
    },
    transactions::{
        ChainClient,
        FundingConfig,
        SendTransactionConfig,
        CONFIRMED_CONFIRM_POLLS,
        DEFAULT_FUND_AMOUNT,
        FINALIZED_CONFIRM_POLLS,
    },
};
use favorites_interface::SYSTEM_PROGRAM_ID;
use solana_account::Account;
use solana_address::Address;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signature::Signer,
};

const TOP_UP: u64 = LAMPORTS_PER_SOL / 2;

#[tokio::test]
async fn above_threshold_makes_no_faucet_request() -> anyhow::Result<()> {
    let address = Address::new_unique();
    let cluster = LocalCluster::new().with_accounts([(
        address,
        Account::new(LAMPORTS_PER_SOL, 0, &SYSTEM_PROGRAM_ID),
    )]);
    let rpc = local_client(cluster);

    let balance = rpc
        .airdrop_if_required(&address, TOP_UP, LAMPORTS_PER_SOL)
        .await?;

    assert_eq!(balance, LAMPORTS_PER_SOL);
    assert!(rpc.client.airdrop_requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn below_threshold_requests_the_top_up() -> anyhow::Result<()> {
    let address = Address::new_unique();
    let rpc = local_client(LocalCluster::new());

    let balance = rpc.airdrop_if_required(&address, TOP_UP, TOP_UP).await?;

    assert_eq!(balance, TOP_UP);
    assert_eq!(rpc.client.airdrop_requests(), vec![(address, TOP_UP)]);

    // Now at the threshold, so a second call is a no-op.
    rpc.airdrop_if_required(&address, TOP_UP, TOP_UP).await?;
    assert_eq!(rpc.client.airdrop_requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn rejected_airdrop_is_a_funding_error() -> anyhow::Result<()> {
    let address = Address::new_unique();
    let rpc = local_client(LocalCluster::new().with_faucet(FaucetBehavior::Reject));

    let err = rpc
        .airdrop_if_required(&address, TOP_UP, TOP_UP)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Funding { address: a, .. } if a == address));
    assert_eq!(rpc.balance(&address).await?, 0);
    Ok(())
}

#[tokio::test]
async fn unconfirmed_airdrop_exhausts_the_polls() -> anyhow::Result<()> {
    let address = Address::new_unique();
    let rpc = local_client(LocalCluster::new().with_faucet(FaucetBehavior::NeverConfirm));

    let err = rpc
        .airdrop_if_required(&address, TOP_UP, TOP_UP)
        .await
        .unwrap_err();

    let ClientError::Funding { reason, .. } = &err else {
        panic!("expected a funding error, got {err:?}");
    };
    assert!(reason.contains(&format!("{} polls", rpc.funding.max_confirm_polls)));
    Ok(())
}

#[tokio::test]
async fn fund_new_account_uses_the_default_amount() -> anyhow::Result<()> {
    let rpc = local_client(LocalCluster::new());

    let keypair = rpc.fund_new_account().await?;

    assert_eq!(rpc.balance(&keypair.pubkey()).await?, DEFAULT_FUND_AMOUNT);
    Ok(())
}

#[tokio::test]
async fn slow_finalization_lands_within_the_default_budget() -> anyhow::Result<()> {
    let address = Address::new_unique();
    let cluster = LocalCluster::new().with_faucet(FaucetBehavior::ConfirmAfter(26));
    let config = SendTransactionConfig {
        debug_logs: Some(false),
        ..Default::default()
    };
    let rpc = ChainClient::with_client(cluster, config).with_funding(FundingConfig {
        poll_interval: Duration::ZERO,
        ..Default::default()
    });

    let balance = rpc.airdrop_if_required(&address, TOP_UP, TOP_UP).await?;

    assert_eq!(balance, TOP_UP);
    assert_eq!(rpc.client.airdrop_requests(), vec![(address, TOP_UP)]);
    Ok(())
}

#[test]
fn confirmation_budget_follows_the_commitment() {
    // Finalization trails the tip by 32 slots of roughly 400ms each.
    let finalization = Duration::from_millis(32 * 400);

    let finalized = FundingConfig::for_commitment(CommitmentConfig::finalized());
    assert_eq!(finalized.max_confirm_polls, FINALIZED_CONFIRM_POLLS);
    assert!(finalized.confirm_timeout() > finalization * 2);
    assert_eq!(FundingConfig::default(), finalized);

    let confirmed = FundingConfig::for_commitment(CommitmentConfig::confirmed());
    assert_eq!(confirmed.max_confirm_polls, CONFIRMED_CONFIRM_POLLS);
    assert!(confirmed.confirm_timeout() < finalized.confirm_timeout());
}

#[test]
fn rpc_client_budget_matches_its_commitment() {
    let rpc = ChainClient::new_from_url("http://localhost:8899", Default::default());
    assert_eq!(rpc.funding.max_confirm_polls, FINALIZED_CONFIRM_POLLS);

    let processed = client::config::ClientConfig {
        commitment: CommitmentConfig::processed(),
        ..Default::default()
    };
    assert_eq!(
        ChainClient::from_config(&processed).funding.max_confirm_polls,
        CONFIRMED_CONFIRM_POLLS
    );
}
