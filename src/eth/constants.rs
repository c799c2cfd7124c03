pub const ONE_GWEI: u64 = 1_000_000_000;

/// Gas used by a plain value transfer to an externally owned account.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

pub const ETHER_DECIMALS: u8 = 18;
