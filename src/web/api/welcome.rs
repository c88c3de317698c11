//! API endpoints for the welcome message.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::web::AdminState;

#[derive(Serialize, Deserialize)]
pub struct WelcomeBody {
    pub message: Option<String>,
}

pub async fn get_welcome(State(state): State<AdminState>) -> Json<WelcomeBody> {
    Json(WelcomeBody {
        message: state.bot.welcome_message(),
    })
}

/// Set the welcome text for future joins. `null` or `""` restores the default.
pub async fn set_welcome(
    State(state): State<AdminState>,
    Json(payload): Json<WelcomeBody>,
) -> Json<WelcomeBody> {
    state
        .bot
        .set_welcome_message(payload.message.as_deref().unwrap_or(""));
    Json(WelcomeBody {
        message: state.bot.welcome_message(),
    })
}
