use alloy::providers::RootProvider;
use alloy_provider::{DynProvider, Provider};
use reqwest::Url;

use crate::{
    error::{WalletError, WalletResult},
    eth::{
        config::EthereumConfig, erc20_retriver::Erc20Retriever, fee_estimator::FeeEstimator,
        rpc::AlloyRpc, tx_builder::TxBuilder,
    },
};

pub fn new_provider(config: &EthereumConfig) -> WalletResult<DynProvider> {
    let url = Url::parse(&config.rpc_url).map_err(|e| {
        WalletError::InvalidInput(format!("invalid rpc url {}: {e}", config.rpc_url))
    })?;
    Ok(RootProvider::new_http(url).erased())
}

/// One provider per process, shared by the reader and the builder.
pub fn connect(
    config: &EthereumConfig,
) -> WalletResult<(TxBuilder<AlloyRpc>, Erc20Retriever<AlloyRpc>)> {
    let rpc = AlloyRpc::new(new_provider(config)?);
    let tx_builder = TxBuilder::new(rpc.clone(), FeeEstimator::new(config.fee_policy));
    let erc20_retriever = Erc20Retriever::new(rpc);
    Ok((tx_builder, erc20_retriever))
}
