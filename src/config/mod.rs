//! Device credentials and stack configuration
//!
//! This module contains the types handed between the stores and the MAC
//! engine:
//! - OTAA and ABP credential records
//! - Stack configuration (frequency plan, data rate, network id)

/// Credential records
pub mod device;

/// Stack configuration
pub mod stack;

pub use device::{AbpCredentials, OtaaCredentials};
pub use stack::{FrequencyPlan, StackConfig};
