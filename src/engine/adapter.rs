use super::traits::Provisioning;
use crate::config::device::{AbpCredentials, NetId, OtaaCredentials};
use crate::store::{CredentialStore, KeyValueStore, SessionInfo, SessionStore, SessionValidity};

/// [`Provisioning`] backed by a key-value store
pub struct StoreAdapter<'a, S: KeyValueStore> {
    credentials: CredentialStore<'a, S>,
    session: SessionStore<'a, S>,
}

impl<'a, S: KeyValueStore> StoreAdapter<'a, S> {
    /// Create an adapter over `store`
    pub fn new(store: &'a S, net_id: NetId) -> Self {
        Self {
            credentials: CredentialStore::new(store, net_id),
            session: SessionStore::new(store),
        }
    }

    /// Validity of the persisted session
    pub fn session_validity(&self) -> SessionValidity {
        self.session.validity()
    }
}

impl<S: KeyValueStore> Provisioning for StoreAdapter<'_, S> {
    fn otaa_provisioning_info(&mut self) -> Option<OtaaCredentials> {
        debug!("OTAA provisioning info requested");
        self.credentials.load_otaa()
    }

    fn abp_provisioning_info(&mut self) -> Option<AbpCredentials> {
        debug!("ABP provisioning info requested");
        self.credentials.load_abp()
    }

    fn saved_session_info(&mut self) -> Option<SessionInfo> {
        debug!("Saved session info requested");
        self.session.load()
    }

    fn save_session_info(&mut self, session: &SessionInfo) {
        // Already logged by the session store; the engine has no error path.
        let _ = self.session.save(session);
    }

    fn save_fcnt_up(&mut self, fcnt_up: u32) {
        self.session.save_fcnt_up(fcnt_up);
    }

    fn save_fcnt_down(&mut self, fcnt_down: u32) {
        self.session.save_fcnt_down(fcnt_down);
    }
}
