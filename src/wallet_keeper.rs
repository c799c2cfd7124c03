use std::path::{Path, PathBuf};

use crate::{
    config::KeystoreConfig,
    error::WalletResult,
    keystore::{self, KdfKind},
    mnemonic::Mnemonic,
    wallet::Wallet,
};

/// Owns the keystore location and turns a password into an unlocked wallet.
pub struct WalletKeeper {
    path: PathBuf,
    kdf: KdfKind,
}

impl WalletKeeper {
    pub fn new(path: PathBuf, kdf: KdfKind) -> Self {
        Self { path, kdf }
    }

    pub fn from_config(config: &KeystoreConfig) -> Self {
        Self::new(config.path.clone(), config.kdf)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        keystore::exists(&self.path)
    }

    /// Encrypts `mnemonic` to the keystore path, replacing any previous file.
    pub fn create(&self, mnemonic: &Mnemonic, password: &str) -> WalletResult<Wallet> {
        let wallet = Wallet::from_mnemonic(mnemonic)?;
        keystore::save_mnemonic(mnemonic, password, self.kdf, &self.path)?;
        tracing::info!(
            "Created wallet {} / {}",
            wallet.account_address(),
            wallet.ledger_address()
        );
        Ok(wallet)
    }

    pub fn unlock(&self, password: &str) -> WalletResult<Wallet> {
        let mnemonic = keystore::load_mnemonic(password, &self.path)?;
        Wallet::from_mnemonic(&mnemonic)
    }

    /// Recovery phrase for backup display. Requires the password again.
    pub fn reveal_mnemonic(&self, password: &str) -> WalletResult<Mnemonic> {
        keystore::load_mnemonic(password, &self.path)
    }

    pub fn change_password(&self, old_password: &str, new_password: &str) -> WalletResult<()> {
        keystore::change_password(&self.path, old_password, new_password, self.kdf)
    }
}
