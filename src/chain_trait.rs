/// Trait for secure private key handling across different chains.
/// Implementations should:
/// - Zeroize secret material when the key is dropped
/// - Keep secrets out of `Debug` output
pub trait SecureKey {
    /// The underlying key material type (e.g. PrivateKeySigner for the account chain).
    type Material;

    /// Provides access to the underlying key material.
    ///
    /// The returned reference should have a minimal lifetime to reduce
    /// the window of potential key exposure.
    fn expose(&self) -> &Self::Material;
}

/// Public half of a derived chain key: what may be shown or shared.
pub trait KeyMaterial: SecureKey {
    fn public_key_hex(&self) -> String;

    /// Chain native address encoding.
    fn address(&self) -> String;
}
