//! Password protected storage of the seed phrase.
//!
//! The envelope written to disk is a JSON document:
//! - `version`: always 1
//! - `kdf`: `name` (`scrypt` or `argon2id`), its cost parameters and a base64 `salt`
//! - `cipher`: `name` (`AES-GCM`) and a base64 `nonce`
//! - `ciphertext` and `tag`: base64, the AES-256-GCM output with the tag detached
//!
//! Every call to [`encrypt`] draws a fresh salt and nonce, so a key/nonce pair is
//! never reused. Decryption with a wrong password and decryption of a tampered
//! envelope both fail with [`WalletError::AuthenticationFailed`].
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use aes_gcm::{
    Aes256Gcm, Nonce, Tag,
    aead::{AeadInPlace, KeyInit},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use crate::{
    error::{WalletError, WalletResult},
    mnemonic::Mnemonic,
};

pub const FORMAT_VERSION: u32 = 1;
pub const CIPHER_NAME: &str = "AES-GCM";
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const KEY_SIZE: usize = 32;
pub const SALT_SIZE: usize = 16;

/// Largest KDF working set accepted from a file, in bytes.
pub const MAX_KDF_MEMORY: u64 = 1 << 30;
pub const MAX_SCRYPT_P: u32 = 16;
/// 1 GiB expressed in argon2's KiB unit.
pub const MAX_ARGON2_M_COST: u32 = 1 << 20;
pub const MAX_ARGON2_T_COST: u32 = 16;
pub const MAX_ARGON2_P_COST: u32 = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub kdf: KdfSection,
    pub cipher: CipherSection,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
}

/// KDF name plus whatever parameters that KDF records. Kept loose so an
/// unknown KDF still loads and is reported as unsupported, not corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdfSection {
    pub name: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CipherSection {
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfKind {
    #[default]
    Scrypt,
    Argon2id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScryptParams {
    pub n: u64,
    pub r: u32,
    pub p: u32,
    pub dklen: usize,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
    pub dklen: usize,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
}

/// Parameters of one key derivation, recorded in the envelope so a later
/// decrypt reproduces it even after the defaults change.
#[derive(Debug, Clone, PartialEq)]
pub enum Kdf {
    Scrypt(ScryptParams),
    Argon2id(Argon2Params),
}

impl Kdf {
    pub const SCRYPT_NAME: &'static str = "scrypt";
    pub const ARGON2ID_NAME: &'static str = "argon2id";

    /// Default cost parameters with a freshly drawn salt.
    pub fn fresh(kind: KdfKind) -> Self {
        let salt = rand::random::<[u8; SALT_SIZE]>().to_vec();
        match kind {
            KdfKind::Scrypt => Kdf::Scrypt(ScryptParams {
                n: 1 << 15,
                r: 8,
                p: 1,
                dklen: KEY_SIZE,
                salt,
            }),
            KdfKind::Argon2id => Kdf::Argon2id(Argon2Params {
                m_cost: argon2::Params::DEFAULT_M_COST,
                t_cost: argon2::Params::DEFAULT_T_COST,
                p_cost: argon2::Params::DEFAULT_P_COST,
                dklen: KEY_SIZE,
                salt,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Scrypt(_) => Self::SCRYPT_NAME,
            Kdf::Argon2id(_) => Self::ARGON2ID_NAME,
        }
    }

    fn from_section(section: &KdfSection) -> WalletResult<Self> {
        let params = Value::Object(section.params.clone());
        let kdf = match section.name.as_str() {
            Self::SCRYPT_NAME => Kdf::Scrypt(
                serde_json::from_value(params)
                    .map_err(|e| WalletError::Corrupt(format!("scrypt parameters: {e}")))?,
            ),
            Self::ARGON2ID_NAME => Kdf::Argon2id(
                serde_json::from_value(params)
                    .map_err(|e| WalletError::Corrupt(format!("argon2id parameters: {e}")))?,
            ),
            other => return Err(WalletError::UnsupportedFormat(format!("unknown kdf '{other}'"))),
        };
        Ok(kdf)
    }

    fn to_section(&self) -> WalletResult<KdfSection> {
        let value = match self {
            Kdf::Scrypt(p) => serde_json::to_value(p),
            Kdf::Argon2id(p) => serde_json::to_value(p),
        }
        .map_err(|e| WalletError::Crypto(format!("failed to record kdf parameters: {e}")))?;
        let Value::Object(params) = value else {
            return Err(WalletError::Crypto("kdf parameters are not an object".into()));
        };
        Ok(KdfSection {
            name: self.name().to_string(),
            params,
        })
    }

    /// Rejects cost parameters a file may carry but this process must not run:
    /// scrypt needs `128 * r * n` bytes and argon2id `m_cost` KiB.
    fn check_limits(&self) -> WalletResult<()> {
        let too_costly =
            |what: String| WalletError::UnsupportedFormat(format!("{what} exceeds limit"));
        match self {
            Kdf::Scrypt(p) => {
                if p.dklen != KEY_SIZE {
                    return Err(WalletError::UnsupportedFormat(format!("dklen {}", p.dklen)));
                }
                if !p.n.is_power_of_two() || p.n < 2 {
                    return Err(WalletError::Corrupt(format!(
                        "scrypt n={} is not a power of two",
                        p.n
                    )));
                }
                if p.r == 0 || p.p == 0 {
                    return Err(WalletError::Corrupt("scrypt r and p must be positive".into()));
                }
                let memory = 128u128 * u128::from(p.r) * u128::from(p.n);
                if memory > u128::from(MAX_KDF_MEMORY) {
                    return Err(too_costly(format!("scrypt n={} r={}", p.n, p.r)));
                }
                if p.p > MAX_SCRYPT_P {
                    return Err(too_costly(format!("scrypt p={}", p.p)));
                }
            }
            Kdf::Argon2id(p) => {
                if p.dklen != KEY_SIZE {
                    return Err(WalletError::UnsupportedFormat(format!("dklen {}", p.dklen)));
                }
                if p.m_cost > MAX_ARGON2_M_COST {
                    return Err(too_costly(format!("argon2id m_cost={}", p.m_cost)));
                }
                if p.t_cost > MAX_ARGON2_T_COST {
                    return Err(too_costly(format!("argon2id t_cost={}", p.t_cost)));
                }
                if p.p_cost > MAX_ARGON2_P_COST {
                    return Err(too_costly(format!("argon2id p_cost={}", p.p_cost)));
                }
            }
        }
        Ok(())
    }

    fn derive_key(&self, password: &[u8]) -> WalletResult<Zeroizing<[u8; KEY_SIZE]>> {
        self.check_limits()?;
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        match self {
            Kdf::Scrypt(p) => {
                let log_n = p.n.trailing_zeros() as u8;
                let params = scrypt::Params::new(log_n, p.r, p.p, KEY_SIZE)
                    .map_err(|e| WalletError::Corrupt(format!("scrypt parameters: {e}")))?;
                scrypt::scrypt(password, &p.salt, &params, key.as_mut_slice())
                    .map_err(|e| WalletError::Crypto(format!("KDF failed: {e}")))?;
            }
            Kdf::Argon2id(p) => {
                let params = argon2::Params::new(p.m_cost, p.t_cost, p.p_cost, Some(KEY_SIZE))
                    .map_err(|e| WalletError::Corrupt(format!("argon2id parameters: {e}")))?;
                argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
                    .hash_password_into(password, &p.salt, key.as_mut_slice())
                    .map_err(|e| WalletError::Crypto(format!("KDF failed: {e:?}")))?;
            }
        }
        Ok(key)
    }
}

pub fn encrypt(mnemonic: &Mnemonic, password: &str, kind: KdfKind) -> WalletResult<Envelope> {
    let kdf = Kdf::fresh(kind);
    let key = kdf.derive_key(password.as_bytes())?;
    let nonce = rand::random::<[u8; NONCE_SIZE]>();

    let phrase = mnemonic.phrase();
    let mut buffer = phrase.as_bytes().to_vec();
    let tag = Aes256Gcm::new(&(*key).into())
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| WalletError::Crypto(format!("AES-GCM encryption failed: {e:?}")))?;

    Ok(Envelope {
        version: FORMAT_VERSION,
        kdf: kdf.to_section()?,
        cipher: CipherSection {
            name: CIPHER_NAME.to_string(),
            nonce: nonce.to_vec(),
        },
        ciphertext: buffer,
        tag: tag.to_vec(),
    })
}

pub fn decrypt(envelope: &Envelope, password: &str) -> WalletResult<Mnemonic> {
    if envelope.version != FORMAT_VERSION {
        return Err(WalletError::UnsupportedFormat(format!(
            "version {}",
            envelope.version
        )));
    }
    let kdf = Kdf::from_section(&envelope.kdf)?;
    if envelope.cipher.name != CIPHER_NAME {
        return Err(WalletError::UnsupportedFormat(format!(
            "unknown cipher '{}'",
            envelope.cipher.name
        )));
    }
    if envelope.cipher.nonce.len() != NONCE_SIZE {
        return Err(WalletError::Corrupt(format!(
            "nonce must be {NONCE_SIZE} bytes, got {}",
            envelope.cipher.nonce.len()
        )));
    }
    if envelope.tag.len() != TAG_SIZE {
        return Err(WalletError::AuthenticationFailed);
    }

    let key = kdf.derive_key(password.as_bytes())?;
    let mut buffer = Zeroizing::new(envelope.ciphertext.clone());
    Aes256Gcm::new(&(*key).into())
        .decrypt_in_place_detached(
            Nonce::from_slice(&envelope.cipher.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&envelope.tag),
        )
        .map_err(|_| WalletError::AuthenticationFailed)?;

    let phrase = std::str::from_utf8(&buffer)
        .map_err(|_| WalletError::Corrupt("decrypted phrase is not UTF-8".into()))?;
    Mnemonic::parse(phrase)
}

/// Writes the envelope to a sibling temp file and renames it over `path`, so
/// a reader sees either the previous keystore or the new one.
pub fn save(envelope: &Envelope, path: &Path) -> WalletResult<()> {
    let content = serde_json::to_string(envelope)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    tracing::info!("keystore written to {}", path.display());
    Ok(())
}

pub fn load(path: &Path) -> WalletResult<Envelope> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(WalletError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str::<Envelope>(&content)
        .map_err(|e| WalletError::Corrupt(format!("{}: {e}", path.display())))
}

/// Side-effect-free existence check.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

pub fn save_mnemonic(
    mnemonic: &Mnemonic,
    password: &str,
    kind: KdfKind,
    path: &Path,
) -> WalletResult<()> {
    let envelope = encrypt(mnemonic, password, kind)?;
    save(&envelope, path)
}

pub fn load_mnemonic(password: &str, path: &Path) -> WalletResult<Mnemonic> {
    let envelope = load(path)?;
    let mnemonic = decrypt(&envelope, password)?;
    tracing::info!("keystore at {} unlocked", path.display());
    Ok(mnemonic)
}

/// Re-encrypts under a new password with fresh salt and nonce.
pub fn change_password(
    path: &Path,
    old_password: &str,
    new_password: &str,
    kind: KdfKind,
) -> WalletResult<()> {
    let mnemonic = load_mnemonic(old_password, path)?;
    save_mnemonic(&mnemonic, new_password, kind, path)
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(de::Error::custom)
    }
}
