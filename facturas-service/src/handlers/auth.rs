use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::dtos::LoginRequest;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Exchange a credential pair for an access token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(response))
}
