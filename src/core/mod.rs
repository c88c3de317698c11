//! Core module - identity, channels, responses, routing and dispatch.
//!
//! This module contains the heart of Golem's message processing:
//! - Identity and channel resolution at startup
//! - The lock-guarded response table
//! - Addressing, normalization and classification of messages
//! - The structured command grammar
//! - The `ChatBot` dispatcher tying them together

pub mod bot;
pub mod channels;
pub mod command;
pub mod identity;
pub mod responses;
pub mod routing;

pub use bot::{ChatBot, Dispatch};
pub use channels::{Channel, ChannelRegistry};
pub use identity::Identity;
pub use responses::{ResponseTable, Responses};
