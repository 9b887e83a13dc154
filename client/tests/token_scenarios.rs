use client::{
    context::token::{
        MultisigAuthority,
        TokenContext,
    },
    e2e_helpers::local_client,
    error::ClientError,
    local_cluster::LocalCluster,
    transactions::ChainClient,
};
use solana_address::Address;
use solana_sdk::signature::{
    Keypair,
    Signer,
};

async fn funded(rpc: &ChainClient<LocalCluster>) -> anyhow::Result<Keypair> {
    Ok(rpc.fund_new_account().await?)
}

#[tokio::test]
async fn create_mint_and_ata_then_mint() -> anyhow::Result<()> {
    let rpc = local_client(LocalCluster::new());
    let authority = funded(&rpc).await?;
    let owner = authority.pubkey();

    let token = TokenContext::create_new_from_mint(&rpc, authority, &Keypair::new(), 9).await?;
    let ata = token.create_ata_for(&rpc, token.mint_authority()?, &owner).await?;
    assert_eq!(ata, token.get_ata_for(&owner));

    token
        .mint_to(&rpc, token.mint_authority()?, &ata, 10_000_000_000)
        .await?;

    assert_eq!(token.get_balance_for(&rpc, &owner).await?, 10_000_000_000);
    Ok(())
}

#[tokio::test]
async fn token_account_outside_the_ata_scheme() -> anyhow::Result<()> {
    let rpc = local_client(LocalCluster::new());
    let authority = funded(&rpc).await?;
    let token = TokenContext::create_new_from_mint(&rpc, authority, &Keypair::new(), 6).await?;
    let payer = token.mint_authority()?;

    let holder = Address::new_unique();
    let token_account = token
        .create_token_account(&rpc, payer, &holder, &Keypair::new())
        .await?;
    assert_ne!(token_account, token.get_ata_for(&holder));

    token.mint_to(&rpc, payer, &token_account, 42).await?;
    assert_eq!(token.token_balance(&rpc, &token_account).await?, 42);
    Ok(())
}

#[tokio::test]
async fn existing_mint_is_loaded_and_checked() -> anyhow::Result<()> {
    let rpc = local_client(LocalCluster::new());
    let authority = funded(&rpc).await?;
    let mint = Keypair::new();
    let created = TokenContext::create_new_from_mint(&rpc, authority, &mint, 4).await?;

    let loaded = TokenContext::new_from_existing(&rpc, mint.pubkey(), None).await?;
    assert_eq!(loaded.mint_decimals, 4);
    assert_eq!(loaded.token_program, spl_token_interface::ID);
    assert!(matches!(loaded.mint_authority(), Err(ClientError::Token(_))));

    let err = TokenContext::new_from_existing(&rpc, mint.pubkey(), Some(Keypair::new()))
        .await
        .err()
        .expect("Should reject a mismatched mint authority");
    assert!(matches!(err, ClientError::Token(_)));

    let err = TokenContext::new_from_existing(&rpc, created.mint_authority()?.pubkey(), None)
        .await
        .err()
        .expect("Should reject a non-mint account");
    assert!(matches!(err, ClientError::InvalidAccount { .. }));
    Ok(())
}

#[tokio::test]
async fn multisig_mint_needs_both_signers() -> anyhow::Result<()> {
    let rpc = local_client(LocalCluster::new());
    let payer = funded(&rpc).await?;
    let second_signer = Keypair::new();

    let multisig = MultisigAuthority::create(
        &rpc,
        &payer,
        &Keypair::new(),
        vec![payer.pubkey(), second_signer.pubkey()],
        2,
    )
    .await?;
    let token =
        TokenContext::create_new_with_multisig(&rpc, &payer, &multisig, &Keypair::new(), 9)
            .await?;
    let ata = token.create_ata_for(&rpc, &payer, &payer.pubkey()).await?;

    let signers = [&payer, &second_signer];
    token
        .mint_to_with_multisig(&rpc, &payer, &multisig, &signers, &ata, 1_000_000_000)
        .await?;
    assert_eq!(token.token_balance(&rpc, &ata).await?, 1_000_000_000);

    let err = token
        .mint_to_with_multisig(&rpc, &payer, &multisig, &[&payer], &ata, 1)
        .await
        .unwrap_err();
    assert!(err.submission().is_some());
    assert_eq!(token.token_balance(&rpc, &ata).await?, 1_000_000_000);
    Ok(())
}
