//! Core domain + application logic for the Jobs Watcher Telegram bot.
//!
//! This crate is intentionally framework-agnostic. Telegram, SQLite and the
//! JobSpy HTTP API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod conversation;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod jobs;
pub mod logging;
pub mod messaging;
pub mod ports;

pub use errors::{Error, Result};
