//! Slack integration.

pub mod client;
pub mod socket;

pub use client::SlackClient;
pub use socket::run_event_feed;
