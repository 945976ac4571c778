use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{CreateClientRequest, UpdateClientRequest};
use crate::middleware::auth::RequestContext;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedJson(req): ValidatedJson<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .db
        .create_client(ctx.workspace_id, &req.into_input())
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    let clients = state.db.list_clients(ctx.workspace_id).await?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(client_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .db
        .get_client(ctx.workspace_id, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(client_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .db
        .update_client(ctx.workspace_id, client_id, &req.into_input())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;
    Ok(Json(client))
}
