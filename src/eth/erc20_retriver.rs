use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol,
    sol_types::SolCall,
};

use crate::{
    error::{WalletError, WalletResult},
    eth::{
        rpc::AccountChainRpc,
        token::{Token, format_units},
        wallet::parse_address,
        watchlist::{WatchlistEntry, WatchlistEntryBalance},
    },
};

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub token: Token,
    pub label: String,
    pub balance_units: U256,
    pub balance_human: String,
}

#[derive(Debug, Clone)]
pub struct Erc20Retriever<R: AccountChainRpc> {
    rpc: R,
}

impl<R: AccountChainRpc> Erc20Retriever<R> {
    pub fn new(rpc: R) -> Self {
        Self { rpc }
    }

    async fn read<C: SolCall>(&self, contract: Address, call: C) -> WalletResult<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(contract)
            .with_input(call.abi_encode());
        let output = self.rpc.call(&tx).await?;
        C::abi_decode_returns(&output).map_err(|e| {
            WalletError::Network(format!(
                "{contract} returned undecodable data for {}: {e}",
                C::SIGNATURE
            ))
        })
    }

    pub async fn token_info(&self, contract: Address) -> WalletResult<Token> {
        let name = self.read(contract, IERC20::nameCall {}).await?;
        let symbol = self.read(contract, IERC20::symbolCall {}).await?;
        let decimals = self.read(contract, IERC20::decimalsCall {}).await?;
        Ok(Token::new(contract, name, symbol, decimals))
    }

    pub async fn balance_of(&self, contract: Address, owner: Address) -> WalletResult<U256> {
        self.read(contract, IERC20::balanceOfCall { account: owner })
            .await
    }

    pub async fn allowance(
        &self,
        contract: Address,
        owner: Address,
        spender: Address,
    ) -> WalletResult<U256> {
        self.read(contract, IERC20::allowanceCall { owner, spender })
            .await
    }

    pub async fn token_balance(
        &self,
        entry: &WatchlistEntry,
        owner: Address,
    ) -> WalletResult<TokenBalance> {
        let contract = parse_address(&entry.address)?;
        let token = self.token_info(contract).await?;
        let balance_units = self.balance_of(contract, owner).await?;
        let balance_human = format_units(balance_units, token.decimals)?;
        let label = entry
            .label
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("{} ({})", token.name, token.symbol));
        Ok(TokenBalance {
            token,
            label,
            balance_units,
            balance_human,
        })
    }

    /// One outcome per entry, in watchlist order. A failing token does not
    /// stop the others.
    pub async fn balances_for_watchlist(
        &self,
        owner: Address,
        watchlist: &[WatchlistEntry],
    ) -> Vec<WatchlistEntryBalance> {
        let balance_futures: Vec<_> = watchlist
            .iter()
            .map(|entry| self.token_balance(entry, owner))
            .collect();
        let results = futures::future::join_all(balance_futures).await;

        watchlist
            .iter()
            .cloned()
            .zip(results)
            .map(|(entry, outcome)| {
                if let Err(e) = &outcome {
                    tracing::warn!("skipping token {}: {e}", entry.address);
                }
                WatchlistEntryBalance { entry, outcome }
            })
            .collect()
    }
}
