use core::fmt;

use super::{keys, KeyValueStore, StoreError};
use crate::config::device::{AESKey, DevAddr, NetId};

/// Tag of the version 1 session record
pub const SESSION_TAG_V1: u8 = 0x01;

/// Byte size of the version 1 session record layout
pub const SESSION_SIZE_V1: u8 = 52;

/// Session state handed between the MAC engine and the store
///
/// `tag` and `size` identify the record schema. Records whose tag or size
/// differ from the current schema are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    /// Schema tag
    pub tag: u8,
    /// Schema size
    pub size: u8,
    /// Reserved, always 0
    pub rsv2: u8,
    /// Reserved, always 0
    pub rsv3: u8,
    /// Network identifier
    pub net_id: NetId,
    /// Device address
    pub dev_addr: DevAddr,
    /// Network session key
    pub nwk_skey: AESKey,
    /// Application session key
    pub app_skey: AESKey,
    /// Uplink frame counter snapshot
    pub fcnt_up: u32,
    /// Downlink frame counter snapshot
    pub fcnt_down: u32,
}

impl SessionInfo {
    /// Create a current-schema session record with zeroed counters
    pub fn new(net_id: NetId, dev_addr: DevAddr, nwk_skey: AESKey, app_skey: AESKey) -> Self {
        Self {
            tag: SESSION_TAG_V1,
            size: SESSION_SIZE_V1,
            rsv2: 0,
            rsv3: 0,
            net_id,
            dev_addr,
            nwk_skey,
            app_skey,
            fcnt_up: 0,
            fcnt_down: 0,
        }
    }

    /// Whether tag and size match the current schema
    pub fn is_current_schema(&self) -> bool {
        self.tag == SESSION_TAG_V1 && self.size == SESSION_SIZE_V1
    }
}

/// Session persistence error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Record tag or size is not the current schema; nothing was written
    SchemaMismatch {
        /// Tag found on the record
        tag: u8,
        /// Size found on the record
        size: u8,
    },
    /// A write failed; keys before `key` were already written
    StoreWriteFailed {
        /// Key whose write failed
        key: &'static str,
        /// Store failure
        error: StoreError,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaMismatch { tag, size } => write!(
                f,
                "unknown session schema (tag {}, size {}), expecting tag {} size {}",
                tag, size, SESSION_TAG_V1, SESSION_SIZE_V1
            ),
            Self::StoreWriteFailed { key, error } => {
                write!(f, "failed to save {}: {}", key, error)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {}

/// Trust in the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionValidity {
    /// Nothing loaded or saved yet
    Unknown,
    /// Last load or save succeeded
    Valid,
    /// A load or save failed; only a successful save recovers
    Invalid,
}

/// Versioned session persistence
pub struct SessionStore<'a, S: KeyValueStore> {
    store: &'a S,
    validity: SessionValidity,
}

impl<'a, S: KeyValueStore> SessionStore<'a, S> {
    /// Create a session store
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            validity: SessionValidity::Unknown,
        }
    }

    /// Current validity
    pub fn validity(&self) -> SessionValidity {
        self.validity
    }

    /// Persist a full session record
    ///
    /// Writes stop at the first failure.
    pub fn save(&mut self, session: &SessionInfo) -> Result<(), SessionError> {
        debug!("Saving session for DevAddr {}", session.dev_addr);
        if !session.is_current_schema() {
            error!(
                "Unknown session info tag {} size {}, expecting tag {} size {}",
                session.tag,
                session.size,
                SESSION_TAG_V1,
                SESSION_SIZE_V1
            );
            self.validity = SessionValidity::Invalid;
            return Err(SessionError::SchemaMismatch {
                tag: session.tag,
                size: session.size,
            });
        }

        match self.write_all(session) {
            Ok(()) => {
                self.validity = SessionValidity::Valid;
                Ok(())
            }
            Err(e) => {
                error!("Session save failed: {:?}", e);
                self.validity = SessionValidity::Invalid;
                Err(e)
            }
        }
    }

    fn write_all(&self, session: &SessionInfo) -> Result<(), SessionError> {
        let failed =
            |key: &'static str| move |error: StoreError| SessionError::StoreWriteFailed { key, error };

        self.store
            .set_u32(keys::NET_ID, session.net_id)
            .map_err(failed(keys::NET_ID))?;
        self.store
            .set_u32(keys::DEV_ADDR, session.dev_addr)
            .map_err(failed(keys::DEV_ADDR))?;
        self.store
            .set(keys::NWK_SKEY, &session.nwk_skey)
            .map_err(failed(keys::NWK_SKEY))?;
        self.store
            .set(keys::APP_SKEY, &session.app_skey)
            .map_err(failed(keys::APP_SKEY))?;
        self.store
            .set_u32(keys::FCNT_UP, session.fcnt_up)
            .map_err(failed(keys::FCNT_UP))?;
        self.store
            .set_u32(keys::FCNT_DOWN, session.fcnt_down)
            .map_err(failed(keys::FCNT_DOWN))?;
        Ok(())
    }

    /// Load the persisted session
    ///
    /// `None` if any field is missing or unreadable, or if the session has
    /// been invalidated since the last successful save.
    pub fn load(&mut self) -> Option<SessionInfo> {
        if self.validity == SessionValidity::Invalid {
            debug!("Session invalidated, not loading");
            return None;
        }

        match self.read_all() {
            Ok(session) => {
                self.validity = SessionValidity::Valid;
                Some(session)
            }
            Err((key, e)) => {
                debug!("No saved session, {} unavailable ({:?})", key, e);
                self.validity = SessionValidity::Invalid;
                None
            }
        }
    }

    fn read_all(&self) -> Result<SessionInfo, (&'static str, StoreError)> {
        let u32_at = |key: &'static str| self.store.get_u32(key).map_err(|e| (key, e));
        let key_at = |key: &'static str| {
            let mut buf: AESKey = [0; 16];
            self.store.get(key, &mut buf).map(|()| buf).map_err(|e| (key, e))
        };

        let net_id = u32_at(keys::NET_ID)?;
        let dev_addr = u32_at(keys::DEV_ADDR)?;
        let nwk_skey = key_at(keys::NWK_SKEY)?;
        let app_skey = key_at(keys::APP_SKEY)?;
        let fcnt_up = u32_at(keys::FCNT_UP)?;
        let fcnt_down = u32_at(keys::FCNT_DOWN)?;

        Ok(SessionInfo {
            fcnt_up,
            fcnt_down,
            ..SessionInfo::new(net_id, dev_addr, nwk_skey, app_skey)
        })
    }

    /// Persist the uplink frame counter
    ///
    /// Failures are logged and dropped so radio traffic is never blocked.
    pub fn save_fcnt_up(&mut self, fcnt_up: u32) {
        debug!("Saving FCntUp {}", fcnt_up);
        if let Err(e) = self.store.set_u32(keys::FCNT_UP, fcnt_up) {
            error!("Failed to save {}: {:?}", keys::FCNT_UP, e);
        }
    }

    /// Persist the downlink frame counter
    ///
    /// Failures are logged and dropped so radio traffic is never blocked.
    pub fn save_fcnt_down(&mut self, fcnt_down: u32) {
        debug!("Saving FCntDown {}", fcnt_down);
        if let Err(e) = self.store.set_u32(keys::FCNT_DOWN, fcnt_down) {
            error!("Failed to save {}: {:?}", keys::FCNT_DOWN, e);
        }
    }
}
