use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::UpsertCompanyRequest;
use crate::middleware::auth::RequestContext;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn get_company(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    let company = state
        .db
        .get_company_config(ctx.workspace_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company config not set")))?;
    Ok(Json(company))
}

pub async fn upsert_company(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedJson(req): ValidatedJson<UpsertCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let company = state
        .db
        .upsert_company_config(ctx.workspace_id, &req.into_input())
        .await?;
    Ok(Json(company))
}
