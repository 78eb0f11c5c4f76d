//! High-level LoRaWAN stack interface
//!
//! This module ties the MAC engine to credential storage and exposes the
//! application-facing begin/provision/join/send API. All engine events are
//! delivered from [`LoraStack::service`], which the application calls from
//! its main loop.

use core::fmt;

use crate::{
    config::StackConfig,
    engine::{EngineEvent, MacEngine},
    store::{CredentialStore, KeyValueStore, ProvisionError},
};

/// Completion callback for a send, called with the success flag
pub type SendCallback = fn(bool);

/// Completion callback for a join, called with the success flag
pub type JoinCallback = fn(bool);

/// Receive handler, called with the payload and application port
pub type MessageHandler = fn(&[u8], u8);

/// LoRaWAN stack error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackError<E> {
    /// Credential parsing or storage failed
    Provision(ProvisionError),
    /// The engine failed to start; fatal for this stack instance
    JoinInitFailed,
    /// The engine declined to start joining
    JoinNotStarted,
    /// The engine cannot accept a frame right now; retry later
    SendRejected,
    /// Engine send error
    Engine(E),
}

impl<E> From<ProvisionError> for StackError<E> {
    fn from(error: ProvisionError) -> Self {
        StackError::Provision(error)
    }
}

impl<E: fmt::Debug> fmt::Display for StackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provision(e) => write!(f, "provisioning failed: {}", e),
            Self::JoinInitFailed => write!(f, "MAC engine failed to start"),
            Self::JoinNotStarted => write!(f, "MAC engine did not start joining"),
            Self::SendRejected => write!(f, "MAC engine busy, send rejected"),
            Self::Engine(e) => write!(f, "MAC engine error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for StackError<E> {}

/// Stack lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackState {
    /// Engine not started yet
    NotBegun,
    /// The one engine start attempt failed
    BeginFailed,
    /// Engine running, no join in progress
    Begun,
    /// Join requested, waiting for the engine
    Joining,
    /// Joined the network
    Joined,
}

/// LoRaWAN stack
///
/// Holds at most one pending send callback, one pending join callback and
/// one receive handler.
pub struct LoraStack<'a, S: KeyValueStore, E: MacEngine> {
    engine: E,
    credentials: CredentialStore<'a, S>,
    config: StackConfig,
    state: StackState,
    send_callback: Option<SendCallback>,
    join_callback: Option<JoinCallback>,
    message_handler: Option<MessageHandler>,
}

impl<'a, S: KeyValueStore, E: MacEngine> LoraStack<'a, S, E> {
    /// Create a stack around an engine and the store its adapter uses
    pub fn new(engine: E, store: &'a S, config: StackConfig) -> Self {
        Self {
            engine,
            credentials: CredentialStore::new(store, config.net_id),
            config,
            state: StackState::NotBegun,
            send_callback: None,
            join_callback: None,
            message_handler: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> StackState {
        self.state
    }

    /// Stack configuration
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Engine reference
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine reference
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Start the engine
    ///
    /// The engine is started at most once; later calls return the outcome
    /// of that attempt.
    pub fn begin(&mut self) -> Result<(), StackError<E::Error>> {
        match self.state {
            StackState::NotBegun => {
                if self.engine.begin(&self.config) {
                    info!("MAC engine started");
                    self.state = StackState::Begun;
                    Ok(())
                } else {
                    error!("MAC engine failed to start");
                    self.state = StackState::BeginFailed;
                    Err(StackError::JoinInitFailed)
                }
            }
            StackState::BeginFailed => Err(StackError::JoinInitFailed),
            _ => Ok(()),
        }
    }

    /// Store OTAA credentials (hex AppEUI, DevEUI, AppKey)
    pub fn provision(
        &mut self,
        app_eui: &str,
        dev_eui: &str,
        app_key: &str,
    ) -> Result<(), StackError<E::Error>> {
        self.credentials.provision_otaa(app_eui, dev_eui, app_key)?;
        Ok(())
    }

    /// Store ABP session parameters (hex DevAddr, NwkSKey, AppSKey)
    pub fn personalize(
        &mut self,
        dev_addr: &str,
        nwk_skey: &str,
        app_skey: &str,
    ) -> Result<(), StackError<E::Error>> {
        self.credentials.personalize_abp(dev_addr, nwk_skey, app_skey)?;
        Ok(())
    }

    /// Provision fresh OTAA credentials, then join
    ///
    /// The engine is not touched if the credentials do not parse or
    /// cannot be stored.
    pub fn join_with(
        &mut self,
        app_eui: &str,
        dev_eui: &str,
        app_key: &str,
    ) -> Result<(), StackError<E::Error>> {
        self.provision(app_eui, dev_eui, app_key)?;
        self.join()
    }

    /// Join with the stored OTAA credentials
    pub fn join(&mut self) -> Result<(), StackError<E::Error>> {
        self.begin()?;
        if !self.engine.start_joining() {
            warn!("MAC engine did not start joining");
            return Err(StackError::JoinNotStarted);
        }
        info!("Joining");
        self.state = StackState::Joining;
        Ok(())
    }

    /// Register a one-shot join completion callback
    pub fn on_join(&mut self, callback: JoinCallback) {
        self.join_callback = Some(callback);
    }

    /// Queue an uplink on `port`
    ///
    /// Success means the engine accepted the frame, not that it was
    /// delivered. When accepted, `callback` replaces any pending send
    /// callback, so an earlier one that has not fired yet never will.
    pub fn send_bytes(
        &mut self,
        payload: &[u8],
        port: u8,
        confirm: bool,
        callback: Option<SendCallback>,
    ) -> Result<(), StackError<E::Error>> {
        debug!(
            "Sending {} bytes on port {} with {}",
            payload.len(),
            port,
            if confirm { "ack" } else { "no ack" }
        );
        match self.engine.send_buffer(payload, port, confirm) {
            Ok(()) => {
                if self.send_callback.is_some() {
                    warn!("Replacing pending send callback");
                }
                self.send_callback = callback;
                Ok(())
            }
            Err(nb::Error::WouldBlock) => {
                warn!("Send rejected, engine busy");
                Err(StackError::SendRejected)
            }
            Err(nb::Error::Other(e)) => {
                error!("Error sending bytes");
                Err(StackError::Engine(e))
            }
        }
    }

    /// Register the receive handler, replacing any previous one
    pub fn on_message(&mut self, handler: MessageHandler) {
        debug!("Register receive callback");
        self.message_handler = Some(handler);
    }

    /// Run engine work and dispatch its events
    ///
    /// Call often from the main loop.
    pub fn service(&mut self) {
        while let Some(event) = self.engine.poll() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Joined => {
                info!("Joined");
                self.state = StackState::Joined;
                if let Some(cb) = self.join_callback.take() {
                    cb(true);
                }
            }
            EngineEvent::JoinFailed => {
                warn!("Join failed");
                if self.state == StackState::Joining {
                    self.state = StackState::Begun;
                }
                if let Some(cb) = self.join_callback.take() {
                    cb(false);
                }
            }
            EngineEvent::TxComplete { success } => {
                debug!("Transmit complete, success {}", success);
                if let Some(cb) = self.send_callback.take() {
                    cb(success);
                }
            }
            EngineEvent::Received { port, payload } => {
                debug!("Received {} bytes on port {}", payload.len(), port);
                if let Some(handler) = self.message_handler {
                    handler(payload.as_slice(), port);
                }
            }
        }
    }
}
