use core::fmt;

use super::{keys, KeyValueStore, StoreError};
use crate::config::device::{AESKey, AbpCredentials, NetId, OtaaCredentials, EUI64};
use crate::hex::{self, HexError};

/// Credential field named in a format error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialField {
    /// Application EUI
    AppEui,
    /// Device EUI
    DevEui,
    /// Application key
    AppKey,
    /// Device address
    DevAddr,
    /// Network session key
    NwkSKey,
    /// Application session key
    AppSKey,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AppEui => "AppEUI",
            Self::DevEui => "DevEUI",
            Self::AppKey => "AppKey",
            Self::DevAddr => "DevAddr",
            Self::NwkSKey => "NwkSKey",
            Self::AppSKey => "AppSKey",
        };
        f.write_str(name)
    }
}

/// Provisioning error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisionError {
    /// A credential was not valid fixed-length hex; nothing was written
    InvalidCredentialFormat {
        /// Offending field
        field: CredentialField,
        /// Parse failure
        error: HexError,
    },
    /// A write failed; the record must be treated as absent until
    /// provisioning succeeds
    StoreWriteFailed {
        /// First key whose write failed
        key: &'static str,
        /// Store failure
        error: StoreError,
    },
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentialFormat { field, error } => {
                write!(f, "invalid {}: {}", field, error)
            }
            Self::StoreWriteFailed { key, error } => {
                write!(f, "failed to write {}: {}", key, error)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProvisionError {}

fn parse<const N: usize>(field: CredentialField, input: &str) -> Result<[u8; N], ProvisionError> {
    hex::decode_fixed::<N>(input).map_err(|error| {
        debug!("Failed to parse {:?}: {:?}", field, error);
        ProvisionError::InvalidCredentialFormat { field, error }
    })
}

/// Collects the outcome of a batch of writes, keeping the first failure
///
/// Every write in the batch is attempted even after one fails.
struct WriteBatch {
    first_failure: Option<(&'static str, StoreError)>,
}

impl WriteBatch {
    fn new() -> Self {
        Self {
            first_failure: None,
        }
    }

    fn record(&mut self, key: &'static str, result: Result<(), StoreError>) {
        if let Err(error) = result {
            error!("Failed to write {}: {:?}", key, error);
            if self.first_failure.is_none() {
                self.first_failure = Some((key, error));
            }
        }
    }

    fn finish(self) -> Result<(), ProvisionError> {
        match self.first_failure {
            None => Ok(()),
            Some((key, error)) => Err(ProvisionError::StoreWriteFailed { key, error }),
        }
    }
}

/// Credential provisioning over a key-value store
///
/// Writes keep the typed (MSB first) order of EUIs. The byte reversal the
/// engine needs happens in [`CredentialStore::load_otaa`] only.
pub struct CredentialStore<'a, S: KeyValueStore> {
    store: &'a S,
    net_id: NetId,
}

impl<'a, S: KeyValueStore> CredentialStore<'a, S> {
    /// Create a credential store that provisions `net_id` as network id
    pub fn new(store: &'a S, net_id: NetId) -> Self {
        Self { store, net_id }
    }

    /// Store OTAA credentials given as hex (16, 16 and 32 characters)
    pub fn provision_otaa(
        &self,
        app_eui: &str,
        dev_eui: &str,
        app_key: &str,
    ) -> Result<(), ProvisionError> {
        let app_eui: EUI64 = parse(CredentialField::AppEui, app_eui)?;
        let dev_eui: EUI64 = parse(CredentialField::DevEui, dev_eui)?;
        let app_key: AESKey = parse(CredentialField::AppKey, app_key)?;

        let mut batch = WriteBatch::new();
        batch.record(keys::APP_EUI, self.store.set(keys::APP_EUI, &app_eui));
        batch.record(keys::DEV_EUI, self.store.set(keys::DEV_EUI, &dev_eui));
        batch.record(keys::APP_KEY, self.store.set(keys::APP_KEY, &app_key));
        batch.record(keys::NET_ID, self.store.set_u32(keys::NET_ID, self.net_id));
        batch.finish()?;

        info!("OTAA credentials provisioned");
        Ok(())
    }

    /// Store ABP session parameters given as hex (8, 32 and 32 characters)
    ///
    /// `dev_addr` is read most-significant byte first, so `"26011BDA"` is
    /// stored as the scalar `0x2601_1BDA`.
    pub fn personalize_abp(
        &self,
        dev_addr: &str,
        nwk_skey: &str,
        app_skey: &str,
    ) -> Result<(), ProvisionError> {
        let dev_addr = u32::from_be_bytes(parse(CredentialField::DevAddr, dev_addr)?);
        let nwk_skey: AESKey = parse(CredentialField::NwkSKey, nwk_skey)?;
        let app_skey: AESKey = parse(CredentialField::AppSKey, app_skey)?;

        let mut batch = WriteBatch::new();
        batch.record(keys::DEV_ADDR, self.store.set_u32(keys::DEV_ADDR, dev_addr));
        batch.record(keys::NWK_SKEY, self.store.set(keys::NWK_SKEY, &nwk_skey));
        batch.record(keys::APP_SKEY, self.store.set(keys::APP_SKEY, &app_skey));
        batch.record(keys::NET_ID, self.store.set_u32(keys::NET_ID, self.net_id));
        batch.finish()?;

        info!("ABP session personalized for DevAddr {}", dev_addr);
        Ok(())
    }

    /// Load OTAA credentials in engine byte order
    ///
    /// `None` if any of the three fields is missing or unreadable.
    pub fn load_otaa(&self) -> Option<OtaaCredentials> {
        let mut app_eui: EUI64 = [0; 8];
        let mut dev_eui: EUI64 = [0; 8];
        let mut app_key: AESKey = [0; 16];

        let r1 = self.store.get(keys::APP_EUI, &mut app_eui);
        let r2 = self.store.get(keys::DEV_EUI, &mut dev_eui);
        let r3 = self.store.get(keys::APP_KEY, &mut app_key);

        match (r1, r2, r3) {
            (Ok(()), Ok(()), Ok(())) => {
                Some(OtaaCredentials::from_stored(app_eui, dev_eui, app_key))
            }
            (r1, r2, r3) => {
                debug!("No OTAA credentials ({:?} {:?} {:?})", r1, r2, r3);
                None
            }
        }
    }

    /// Load ABP credentials
    ///
    /// The session keys, address and network id are required. Frame
    /// counters that cannot be read default to 0.
    pub fn load_abp(&self) -> Option<AbpCredentials> {
        let mut nwk_skey: AESKey = [0; 16];
        let mut app_skey: AESKey = [0; 16];

        let r1 = self.store.get(keys::NWK_SKEY, &mut nwk_skey);
        if let Err(e) = r1 {
            info!("Failed to load {} ({:?})", keys::NWK_SKEY, e);
        }
        let r2 = self.store.get(keys::APP_SKEY, &mut app_skey);
        if let Err(e) = r2 {
            info!("Failed to load {} ({:?})", keys::APP_SKEY, e);
        }
        let dev_addr = self.store.get_u32(keys::DEV_ADDR);
        if let Err(e) = dev_addr {
            info!("Failed to load {} ({:?})", keys::DEV_ADDR, e);
        }
        let net_id = self.store.get_u32(keys::NET_ID);
        if let Err(e) = net_id {
            info!("Failed to load {} ({:?})", keys::NET_ID, e);
        }

        let fcnt_up = self.store.get_u32(keys::FCNT_UP).unwrap_or_else(|e| {
            info!("Failed to load {} ({:?}), starting at 0", keys::FCNT_UP, e);
            0
        });
        let fcnt_down = self.store.get_u32(keys::FCNT_DOWN).unwrap_or_else(|e| {
            info!("Failed to load {} ({:?}), starting at 0", keys::FCNT_DOWN, e);
            0
        });

        match (r1, r2, dev_addr, net_id) {
            (Ok(()), Ok(()), Ok(dev_addr), Ok(net_id)) => Some(AbpCredentials {
                nwk_skey,
                app_skey,
                dev_addr,
                net_id,
                fcnt_up,
                fcnt_down,
            }),
            _ => None,
        }
    }
}
