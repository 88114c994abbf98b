//! Core domain + application logic for the Hacker News Telegram bot.
//!
//! This crate is framework-agnostic. Telegram and the Hacker News HTTP API live
//! behind ports (traits) implemented in adapter crates.

pub mod browse;
pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod listing;
pub mod logging;
pub mod messaging;
pub mod pagination;

pub use errors::{Error, Result};
