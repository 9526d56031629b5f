//! Credential storage.
//!
//! The portal collects one credential (network id + secret) and the firmware
//! needs it back after every reboot. Two interchangeable backings implement
//! the [`CredentialStore`] trait: a flat text record (`store::file`) and a
//! fixed-offset byte region (`store::block`, backed by an NVS blob on the
//! device).

pub mod block;
pub mod file;
#[cfg(feature = "esp32")]
pub mod nvs;

pub use block::{BlockStore, MemoryBlock, StorageBlock};
pub use file::FileStore;

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// WiFi credential collected by the portal.
///
/// The secret is zeroed when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    /// Network identifier (SSID).
    pub network_id: String,
    /// Network secret (passphrase; empty for open networks).
    pub secret: String,
}

impl Credential {
    /// Create a credential.
    pub fn new(network_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the secret out of logs and panic messages
        f.debug_struct("Credential")
            .field("network_id", &self.network_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Persistent storage for the credential.
///
/// The controller treats `load` failures as "nothing configured" and keeps
/// running; `save` failures surface to the portal client as a 500.
pub trait CredentialStore {
    /// Load the stored credential, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Persist the credential, replacing any previous record.
    fn save(&mut self, credential: &Credential) -> Result<(), StoreError>;
}

/// Errors that can occur in credential storage.
#[derive(Debug)]
pub enum StoreError {
    /// Value does not fit the record layout.
    ValueTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    /// Value contains bytes the record layout cannot carry.
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// A record is present but cannot be decoded.
    Corrupt(&'static str),
    /// Filesystem failure.
    Io(std::io::Error),
    /// NVS failure.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueTooLong { field, len, max } => {
                write!(f, "{} too long: {} bytes (max {})", field, len, max)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "NVS error: {:?}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for StoreError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}
