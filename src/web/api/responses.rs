//! API endpoints for the response table.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::Responses;
use crate::error::Error;
use crate::web::AdminState;

/// Full table, or a single key.
#[derive(Serialize, Deserialize)]
pub struct ResponsesBody {
    pub responses: Responses,
}

#[derive(Serialize, Deserialize)]
pub struct KeyResponse {
    pub key: String,
    pub replies: Vec<String>,
}

/// Add response request.
#[derive(Deserialize)]
pub struct AddResponseRequest {
    pub text: String,
}

/// List the whole table.
pub async fn list_responses(State(state): State<AdminState>) -> Json<ResponsesBody> {
    Json(ResponsesBody {
        responses: state.bot.responses().snapshot(),
    })
}

/// Get the replies for one key.
pub async fn get_response(
    State(state): State<AdminState>,
    Path(key): Path<String>,
) -> Result<Json<KeyResponse>, StatusCode> {
    let replies = state.bot.responses().lookup(&key);
    if replies.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(KeyResponse { key, replies }))
}

/// Load or merge a table.
pub async fn set_responses(
    State(state): State<AdminState>,
    Json(payload): Json<ResponsesBody>,
) -> Json<ResponsesBody> {
    state.bot.responses().set_responses(payload.responses);
    Json(ResponsesBody {
        responses: state.bot.responses().snapshot(),
    })
}

/// Add a reply under a new key.
pub async fn add_response(
    State(state): State<AdminState>,
    Path(key): Path<String>,
    Json(payload): Json<AddResponseRequest>,
) -> Result<(StatusCode, Json<KeyResponse>), StatusCode> {
    if key.trim().is_empty() || payload.text.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.bot.responses().add_response(&key, &payload.text) {
        Ok(()) => {
            let replies = state.bot.responses().lookup(&key);
            Ok((StatusCode::CREATED, Json(KeyResponse { key, replies })))
        }
        Err(Error::DuplicateResponseKey(_)) => Err(StatusCode::CONFLICT),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Empty the table so the next load replaces it.
pub async fn clear_responses(State(state): State<AdminState>) -> StatusCode {
    state.bot.responses().clear();
    tracing::info!("Response table cleared");
    StatusCode::NO_CONTENT
}
