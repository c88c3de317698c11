//! Admin web server module (Axum + API).

use std::sync::Arc;

use crate::core::ChatBot;

pub mod api;
pub mod auth;
pub mod router;
pub mod server;

pub use server::{run_server, WebServerConfig};

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub bot: Arc<ChatBot>,
    pub jwt_secret: Arc<str>,
}

impl AdminState {
    pub fn new(bot: Arc<ChatBot>, jwt_secret: &str) -> Self {
        Self {
            bot,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
