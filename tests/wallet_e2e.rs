mod mocks;

use std::time::Duration;

use alloy::primitives::U256;
use crosswallet::{
    SendReceipt, TransferRequest, WalletError, WalletKeeper,
    config::Chain,
    eth::{
        self,
        fee_estimator::{FeeEstimator, FeePolicy},
    },
    keystore::KdfKind,
    mnemonic::{Mnemonic, TEST_MNEMONIC},
    utils,
    xrpl::{self, LedgerReceipt, PollPolicy},
};

use crate::mocks::{
    mock_account_chain::{CHAIN_ID, MockAccountChain},
    mock_ledger::MockLedger,
};

const PASSWORD: &str = "correct-horse";
const GWEI: u128 = 1_000_000_000;

fn keeper(dir: &tempfile::TempDir) -> WalletKeeper {
    WalletKeeper::new(dir.path().join("keystore.json"), KdfKind::Scrypt)
}

fn account_builder(node: MockAccountChain) -> eth::TxBuilder<MockAccountChain> {
    eth::TxBuilder::new(node, FeeEstimator::new(FeePolicy::default()))
}

fn ledger_builder(node: MockLedger, attempts: u32) -> xrpl::TxBuilder<MockLedger> {
    xrpl::TxBuilder::new(
        node,
        PollPolicy {
            interval: Duration::from_millis(1),
            attempts,
        },
    )
}

#[test]
fn keystore_reload_restores_both_addresses() -> anyhow::Result<()> {
    utils::tracing::init_test("debug");
    let dir = tempfile::tempdir()?;
    let keeper = keeper(&dir);
    assert!(!keeper.exists());

    let mnemonic = Mnemonic::generate()?;
    let phrase = mnemonic.phrase();
    let created = keeper.create(&mnemonic, PASSWORD)?;
    let (account_address, ledger_address) = (
        created.account_address(),
        created.ledger_address().to_string(),
    );
    drop(created);
    drop(mnemonic);
    assert!(keeper.exists());

    let unlocked = WalletKeeper::new(keeper.path().to_path_buf(), KdfKind::Scrypt)
        .unlock(PASSWORD)?;
    assert_eq!(unlocked.account_address(), account_address);
    assert_eq!(unlocked.ledger_address(), ledger_address);
    assert_eq!(keeper.reveal_mnemonic(PASSWORD)?.phrase(), phrase);

    assert!(matches!(
        keeper.unlock("wrong-horse"),
        Err(WalletError::AuthenticationFailed)
    ));
    Ok(())
}

#[test]
fn imported_mnemonic_derives_known_account_address() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let keeper = keeper(&dir);
    keeper.create(&Mnemonic::parse(TEST_MNEMONIC)?, PASSWORD)?;
    assert_eq!(
        keeper.unlock(PASSWORD)?.account_address(),
        "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
    );
    Ok(())
}

#[test]
fn change_password_keeps_addresses() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let keeper = WalletKeeper::new(dir.path().join("keystore.json"), KdfKind::Argon2id);
    let created = keeper.create(&Mnemonic::generate()?, PASSWORD)?;

    keeper.change_password(PASSWORD, "battery-staple")?;
    assert!(keeper.unlock(PASSWORD).is_err());
    let unlocked = keeper.unlock("battery-staple")?;
    assert_eq!(unlocked.ledger_address(), created.ledger_address());
    Ok(())
}

#[test]
fn unlock_without_keystore_is_not_found() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(matches!(
        keeper(&dir).unlock(PASSWORD),
        Err(WalletError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn ledger_payment_validates() -> anyhow::Result<()> {
    utils::tracing::init_test("debug");
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let ledger = ledger_builder(MockLedger::validating_on(3), 10);
    let account = account_builder(MockAccountChain::new(GWEI, GWEI));

    let request = TransferRequest::new(Chain::Xrpl, xrpl::wallet::GENESIS_ADDRESS, "2.0");
    let receipt = wallet.send(&request, &account, &ledger).await?;

    let SendReceipt::Ledger(LedgerReceipt::Validated { hash, result }) = receipt else {
        panic!("expected a validated ledger receipt, got {receipt:?}");
    };
    assert_eq!(hash.len(), 64);
    assert_eq!(result.as_deref(), Some("tesSUCCESS"));
    assert_eq!(ledger.rpc().lookups(), 3);
    assert_eq!(ledger.rpc().submitted.lock().unwrap().len(), 1);
    assert!(account.rpc().sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn ledger_payment_poll_budget_exhausted() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let ledger = ledger_builder(MockLedger::never_validating(), 4);
    let account = account_builder(MockAccountChain::new(GWEI, GWEI));

    let request = TransferRequest::new(Chain::Xrpl, xrpl::wallet::GENESIS_ADDRESS, "2.0");
    let receipt = wallet.send(&request, &account, &ledger).await?;

    let SendReceipt::Ledger(LedgerReceipt::Pending { hash }) = &receipt else {
        panic!("expected a pending ledger receipt, got {receipt:?}");
    };
    assert_eq!(hash.len(), 64);
    assert_eq!(receipt.hash(), *hash);
    assert_eq!(ledger.rpc().lookups(), 4);
    Ok(())
}

#[tokio::test]
async fn ledger_rejection_surfaces_engine_result() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let node = MockLedger::validating_on(1);
    *node.engine_result.lock().unwrap() = "temBAD_AMOUNT".into();
    let ledger = ledger_builder(node, 3);
    let account = account_builder(MockAccountChain::new(GWEI, GWEI));

    let request = TransferRequest::new(Chain::Xrpl, xrpl::wallet::GENESIS_ADDRESS, "2.0");
    let err = wallet.send(&request, &account, &ledger).await.unwrap_err();
    assert!(matches!(&err, WalletError::TransactionRejected(m) if m.starts_with("temBAD_AMOUNT")));
    assert_eq!(ledger.rpc().lookups(), 0);
    Ok(())
}

#[tokio::test]
async fn account_chain_nonce_fresh_and_fee_capped() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let account = account_builder(MockAccountChain::new(30 * GWEI, 2 * GWEI));
    let ledger = ledger_builder(MockLedger::never_validating(), 1);

    let request = TransferRequest::new(
        Chain::Ethereum,
        "0x000000000000000000000000000000000000dEaD",
        "0.01",
    );
    let first = wallet.send(&request, &account, &ledger).await?;
    let second = wallet.send(&request, &account, &ledger).await?;
    assert_ne!(first, second);

    let sent = account.rpc().sent();
    assert_eq!(sent.len(), 2);
    for (expected_nonce, envelope) in sent.iter().enumerate() {
        let tx = envelope.as_eip1559().expect("eip-1559 envelope").tx();
        assert_eq!(tx.nonce, expected_nonce as u64);
        assert_eq!(tx.chain_id, CHAIN_ID);
        assert_eq!(tx.gas_limit, 21_000);
        assert_eq!(tx.value, U256::from(10_000_000_000_000_000u64));
        assert_eq!(tx.max_priority_fee_per_gas, 2 * GWEI);
        assert_eq!(tx.max_fee_per_gas, 2 * 30 * GWEI + 2 * GWEI);
        assert!(tx.max_fee_per_gas >= tx.max_priority_fee_per_gas);
    }
    assert_eq!(ledger.rpc().lookups(), 0);
    Ok(())
}

#[tokio::test]
async fn account_chain_rejection_passes_through() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let node = MockAccountChain::new(GWEI, GWEI);
    *node.reject_with.lock().unwrap() = Some("insufficient funds for gas * price + value".into());
    let account = account_builder(node);
    let ledger = ledger_builder(MockLedger::never_validating(), 1);

    let request = TransferRequest::new(
        Chain::Ethereum,
        "0x000000000000000000000000000000000000dEaD",
        "1",
    );
    let err = wallet.send(&request, &account, &ledger).await.unwrap_err();
    assert!(matches!(err, WalletError::TransactionRejected(m) if m.contains("insufficient funds")));
    assert_eq!(account.rpc().nonce.load(std::sync::atomic::Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_request_never_reaches_a_node() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let account = account_builder(MockAccountChain::new(GWEI, GWEI));
    let ledger = ledger_builder(MockLedger::never_validating(), 1);

    for request in [
        TransferRequest::new(Chain::Xrpl, "rNotAnAddress", "1"),
        TransferRequest::new(Chain::Xrpl, xrpl::wallet::GENESIS_ADDRESS, "0"),
        TransferRequest::new(Chain::Ethereum, "0xdead", "1"),
    ] {
        let err = wallet.send(&request, &account, &ledger).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)), "{request:?}");
    }
    assert!(account.rpc().sent().is_empty());
    assert!(ledger.rpc().submitted.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn account_chain_send_runs_on_spawned_task() -> anyhow::Result<()> {
    let wallet = crosswallet::Wallet::from_mnemonic(&Mnemonic::parse(TEST_MNEMONIC)?)?;
    let account = account_builder(MockAccountChain::new(GWEI, GWEI));
    let to = eth::parse_address("0x000000000000000000000000000000000000dEaD")?;

    let (hash, sent) = tokio::spawn(async move {
        let hash = account.send_native(wallet.account_key(), to, "0.5").await?;
        Ok::<_, WalletError>((hash, account.rpc().sent()))
    })
    .await??;
    assert_eq!(sent.len(), 1);
    assert_eq!(*sent[0].tx_hash(), hash);
    Ok(())
}
