//! Non-volatile key-value persistence
//!
//! This module contains the storage side of the stack:
//! - The key-value store interface the medium driver implements
//! - The fixed key namespace shared with the MAC engine
//! - Credential provisioning and session persistence on top of a store
//! - An in-memory store for bring-up and tests

use core::fmt;

/// In-memory key-value store
pub mod ram;

/// OTAA/ABP credential provisioning
pub mod provisioning;

/// Versioned session persistence
pub mod session;

pub use provisioning::{CredentialField, CredentialStore, ProvisionError};
pub use ram::RamStore;
pub use session::{SessionError, SessionInfo, SessionStore, SessionValidity};

/// Key namespace
///
/// EUIs and keys are raw bytes in typed order. Scalars are 4 bytes,
/// little-endian.
pub mod keys {
    /// Application EUI (8 bytes)
    pub const APP_EUI: &str = "APPEUI";
    /// Device EUI (8 bytes)
    pub const DEV_EUI: &str = "DEVEUI";
    /// Application key (16 bytes)
    pub const APP_KEY: &str = "APPKEY";
    /// Network session key (16 bytes)
    pub const NWK_SKEY: &str = "NWKSKEY";
    /// Application session key (16 bytes)
    pub const APP_SKEY: &str = "APPSKEY";
    /// Device address (u32)
    pub const DEV_ADDR: &str = "DEVADDR";
    /// Network id (u32)
    pub const NET_ID: &str = "NETID";
    /// Uplink frame counter (u32)
    pub const FCNT_UP: &str = "FCNTUP";
    /// Downlink frame counter (u32)
    pub const FCNT_DOWN: &str = "FCNTDN";
}

/// Store operation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No value stored under the key
    NotFound,
    /// Stored value has a different length than requested
    SizeMismatch {
        /// Requested length
        expected: usize,
        /// Stored length
        actual: usize,
    },
    /// Medium or capacity failure
    Io,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {} bytes, stored {}", expected, actual)
            }
            Self::Io => write!(f, "storage I/O failure"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

/// Key-value store interface
///
/// Methods take `&self` so the provisioning side and the engine adapter can
/// share one store; implementations keep their own interior mutability and
/// are used from a single execution context.
pub trait KeyValueStore {
    /// Read the value under `key` into `buf`
    ///
    /// The stored value must be exactly `buf.len()` bytes, otherwise
    /// `SizeMismatch` is returned and `buf` is left untouched.
    fn get(&self, key: &str, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Read a 32-bit scalar
    fn get_u32(&self, key: &str) -> Result<u32, StoreError> {
        let mut buf = [0u8; 4];
        self.get(key, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Write a 32-bit scalar
    fn set_u32(&self, key: &str, value: u32) -> Result<(), StoreError> {
        self.set(key, &value.to_le_bytes())
    }
}
