//! LoRaWAN persistence and session lifecycle in Rust
//!
//! This crate sits between a LoRaWAN MAC engine, a non-volatile key-value
//! store and the application. It provisions credentials from hex strings,
//! persists session state and frame counters, and turns the engine's events
//! into one-shot application callbacks.
//!
//! # Features
//! - OTAA provisioning and ABP personalization from hex credentials
//! - Versioned session persistence with a fast frame-counter path
//! - Begin/join/send sequencing with single-slot completion callbacks
//! - `defmt` or `log` logging, selected by feature
//! - No unsafe code
//!
//! # Example
//! ```ignore
//! use lorastack::{
//!     config::{FrequencyPlan, StackConfig},
//!     engine::StoreAdapter,
//!     stack::LoraStack,
//!     store::RamStore,
//! };
//!
//! let store: RamStore<16> = RamStore::new();
//! let config = StackConfig::new(FrequencyPlan::US915);
//!
//! // The engine pulls credentials and session state through the adapter
//! let engine = MyEngine::new(StoreAdapter::new(&store, config.net_id));
//! let mut stack = LoraStack::new(engine, &store, config);
//!
//! stack
//!     .join_with(
//!         "0001020304050607",
//!         "0001020304050607",
//!         "000102030405060708090A0B0C0D0E0F",
//!     )
//!     .unwrap();
//!
//! loop {
//!     stack.service();
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod logging;

/// Credentials and stack configuration
pub mod config;

/// MAC engine contract and store adapter
pub mod engine;

/// Fixed-length hex decoding
pub mod hex;

/// High-level stack interface
pub mod stack;

/// Key-value persistence
pub mod store;
