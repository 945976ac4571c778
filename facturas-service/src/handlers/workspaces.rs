use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::CreateWorkspaceRequest;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_workspace(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateWorkspaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.db.create_workspace(&req.into_input()).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

pub async fn list_workspaces(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let workspaces = state.db.list_workspaces().await?;
    Ok(Json(workspaces))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state
        .db
        .get_workspace(workspace_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Workspace not found")))?;
    Ok(Json(workspace))
}
