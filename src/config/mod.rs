mod config_impl;
pub mod constants;

pub use config_impl::*;
pub use constants::*;
