//! Golem library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod platform;
pub mod repository;
pub mod slack;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use core::{ChatBot, Dispatch};
pub use error::{Error, Result};
