//! MAC engine contract
//!
//! The radio MAC engine is an external collaborator. This module defines
//! the interface the stack drives it through, the callback interface it
//! pulls credentials and session state from, and the store-backed
//! implementation of that callback interface.

/// Store-backed engine callbacks
pub mod adapter;

/// Engine and callback interfaces
pub mod traits;

pub use adapter::StoreAdapter;
pub use traits::{EngineEvent, MacEngine, Provisioning, MAX_PAYLOAD_SIZE};
