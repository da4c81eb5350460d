//! Core of the Telegram user-account REST gateway.
//!
//! This crate is framework-agnostic. The MTProto client and the HTTP surface
//! live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod session;
pub mod store;
pub mod views;

pub use errors::{Error, Result};
