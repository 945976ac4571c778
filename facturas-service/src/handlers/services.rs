use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use service_core::error::AppError;

use crate::dtos::{CreateServiceRequest, ListServicesParams, UpdateServiceRequest};
use crate::middleware::auth::RequestContext;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedJson(req): ValidatedJson<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = req.into_input();
    reject_negative_price(input.price.as_ref())?;
    let service = state
        .db
        .create_service_item(ctx.workspace_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn list_services(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<ListServicesParams>,
) -> Result<impl IntoResponse, AppError> {
    let services = state
        .db
        .list_service_items(ctx.workspace_id, params.active)
        .await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let service = state
        .db
        .get_service_item(ctx.workspace_id, service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Service not found")))?;
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(service_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = req.into_input();
    reject_negative_price(input.price.as_ref())?;
    let service = state
        .db
        .update_service_item(ctx.workspace_id, service_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Service not found")))?;
    Ok(Json(service))
}

fn reject_negative_price(price: Option<&Decimal>) -> Result<(), AppError> {
    match price {
        Some(p) if *p < Decimal::ZERO => Err(AppError::BadRequest(anyhow::anyhow!(
            "Price cannot be negative"
        ))),
        _ => Ok(()),
    }
}
