//! HTTP handler for the agronomy assistant

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(max = 4000, message = "Message is too long"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub assistant_response: String,
}

/// Answer a free-text question about crop care
pub async fn assistant_text(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    input.validate()?;

    let reply = state.assistant.reply(&input.message).await?;
    Ok(Json(ChatResponse {
        assistant_response: reply,
    }))
}
