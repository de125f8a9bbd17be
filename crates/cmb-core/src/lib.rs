//! Core domain + application logic for the crypto market report bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the market data
//! HTTP APIs live behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod locale;
pub mod logging;
pub mod market;
pub mod messaging;
pub mod ports;
pub mod report;
pub mod scheduler;
pub mod service;

pub use errors::{Error, Result};
