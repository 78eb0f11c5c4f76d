use heapless::Vec;

use crate::config::device::{AbpCredentials, OtaaCredentials};
use crate::config::StackConfig;
use crate::store::SessionInfo;

/// Largest application payload an engine event carries
pub const MAX_PAYLOAD_SIZE: usize = 242;

/// Event raised by the MAC engine from its service step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// OTAA join accepted; the session was handed to `save_session_info`
    Joined,
    /// Join attempt given up
    JoinFailed,
    /// Uplink exchange finished
    TxComplete {
        /// Whether the frame went out (and was acknowledged, if confirmed)
        success: bool,
    },
    /// Application downlink received
    Received {
        /// Application port
        port: u8,
        /// Decrypted payload
        payload: Vec<u8, MAX_PAYLOAD_SIZE>,
    },
}

/// Generic LoRaWAN MAC engine interface
///
/// The engine owns channel plans, timing and retransmission. It pulls
/// credentials and session state from the [`Provisioning`] implementation
/// it was constructed with.
pub trait MacEngine {
    /// Error type for send failures other than "busy"
    type Error;

    /// Start the engine
    ///
    /// Called at most once per stack instance.
    fn begin(&mut self, config: &StackConfig) -> bool;

    /// Start the OTAA join procedure
    ///
    /// Returns `false` if the engine declines (already joined, joining, or
    /// no credentials).
    fn start_joining(&mut self) -> bool;

    /// Queue an uplink
    ///
    /// `WouldBlock` means the engine cannot take a frame right now, for
    /// example while a previous exchange is still pending.
    fn send_buffer(&mut self, payload: &[u8], port: u8, confirmed: bool) -> nb::Result<(), Self::Error>;

    /// Run pending engine work and return the next event, if any
    fn poll(&mut self) -> Option<EngineEvent>;
}

/// Credential and session callbacks the MAC engine requires
///
/// Implemented by [`StoreAdapter`](super::adapter::StoreAdapter) and handed
/// to the engine at construction.
pub trait Provisioning {
    /// OTAA credentials in engine byte order, `None` when not configured
    fn otaa_provisioning_info(&mut self) -> Option<OtaaCredentials>;

    /// ABP credentials, `None` when not configured
    fn abp_provisioning_info(&mut self) -> Option<AbpCredentials>;

    /// Previously saved session, `None` when there is none to trust
    fn saved_session_info(&mut self) -> Option<SessionInfo>;

    /// Persist the session established by a join
    fn save_session_info(&mut self, session: &SessionInfo);

    /// Persist the uplink counter after an accepted uplink
    fn save_fcnt_up(&mut self, fcnt_up: u32);

    /// Persist the downlink counter after an accepted downlink
    fn save_fcnt_down(&mut self, fcnt_down: u32);
}
