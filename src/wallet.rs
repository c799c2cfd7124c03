use std::fmt;

use alloy::primitives::{TxHash, U256};

use crate::{
    error::WalletResult,
    eth::{self, AccountChainRpc, AccountKey},
    mnemonic::Mnemonic,
    transfer::{TransferRequest, ValidatedTransfer},
    xrpl::{self, LedgerKey, LedgerReceipt, LedgerRpc},
};

/// Both chains' keys for one unlocked session, derived once from the
/// mnemonic. Nothing here is persisted.
pub struct Wallet {
    account: AccountKey,
    ledger: LedgerKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReceipt {
    /// Accepted by the node, not yet mined.
    Account(TxHash),
    Ledger(LedgerReceipt),
}

impl SendReceipt {
    pub fn hash(&self) -> String {
        match self {
            SendReceipt::Account(hash) => hash.to_string(),
            SendReceipt::Ledger(receipt) => receipt.hash().to_string(),
        }
    }
}

impl Wallet {
    pub fn from_mnemonic(mnemonic: &Mnemonic) -> WalletResult<Self> {
        let seed = mnemonic.to_seed();
        Ok(Self {
            account: eth::derive_account_chain_key(&seed)?,
            ledger: xrpl::derive_ledger_chain_key(&seed)?,
        })
    }

    pub fn account_key(&self) -> &AccountKey {
        &self.account
    }

    pub fn ledger_key(&self) -> &LedgerKey {
        &self.ledger
    }

    /// EIP-55 checksummed.
    pub fn account_address(&self) -> String {
        self.account.checksum_address()
    }

    pub fn ledger_address(&self) -> &str {
        self.ledger.classic_address()
    }

    /// Native balance in wei.
    pub async fn account_balance<A: AccountChainRpc>(&self, rpc: &A) -> WalletResult<U256> {
        rpc.get_balance(self.account.address()).await
    }

    /// Validated balance in drops, `None` until the account is funded.
    pub async fn ledger_balance<L: LedgerRpc>(&self, rpc: &L) -> WalletResult<Option<u64>> {
        rpc.account_balance(self.ledger_address()).await
    }

    /// Validates the request, then hands it to the builder of its chain.
    pub async fn send<A: AccountChainRpc, L: LedgerRpc>(
        &self,
        request: &TransferRequest,
        account_chain: &eth::TxBuilder<A>,
        ledger_chain: &xrpl::TxBuilder<L>,
    ) -> WalletResult<SendReceipt> {
        match request.validate()? {
            ValidatedTransfer::Ethereum { to, value } => {
                let hash = account_chain.send_wei(&self.account, to, value).await?;
                Ok(SendReceipt::Account(hash))
            }
            ValidatedTransfer::Xrpl {
                destination,
                drops,
                destination_tag,
            } => {
                let receipt = ledger_chain
                    .send_drops(&self.ledger, &destination, drops, destination_tag)
                    .await?;
                Ok(SendReceipt::Ledger(receipt))
            }
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account_address())
            .field("ledger", &self.ledger_address())
            .finish()
    }
}
