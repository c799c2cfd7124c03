#![allow(dead_code)]

pub mod http_node;
pub mod mock_account_chain;
pub mod mock_ledger;
