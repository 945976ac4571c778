//! Handlers shared by the invoice and quote subtrees; the kind arrives as an
//! extension set where the routes are mounted.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

use crate::dtos::{
    AddLineRequest, ChangeStatusRequest, CreateDocumentRequest, ListDocumentsParams,
    RenumberRequest, SetVatRequest, UpdateNotesRequest,
};
use crate::middleware::auth::RequestContext;
use crate::models::{DocumentKind, DocumentStatus, ListDocumentsFilter};
use crate::services::AddLineInput;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    ValidatedJson(req): ValidatedJson<CreateDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let document = state
        .lifecycle
        .create_document(
            ctx.workspace_id,
            kind,
            req.client_id,
            req.issue_date,
            req.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Query(params): Query<ListDocumentsParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            DocumentStatus::parse(kind, s).ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!(
                    "'{}' is not a valid {} status",
                    s,
                    kind.as_str()
                ))
            })
        })
        .transpose()?;

    let documents = state
        .lifecycle
        .list_documents(
            ctx.workspace_id,
            kind,
            &ListDocumentsFilter {
                status,
                limit: params.limit,
            },
        )
        .await?;
    Ok(Json(documents))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let document = state
        .lifecycle
        .get_document(ctx.workspace_id, kind, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Document not found")))?;
    Ok(Json(document))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Unknown ids are no-ops; either way there is nothing left to return.
    state
        .lifecycle
        .delete_document(ctx.workspace_id, kind, document_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_line(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<AddLineRequest>,
) -> Result<Response, AppError> {
    let line = state
        .ledger
        .add_line(
            ctx.workspace_id,
            kind,
            document_id,
            AddLineInput {
                service_id: req.service_id,
                description: req.description,
                quantity: req.quantity,
                unit_price: req.unit_price,
            },
        )
        .await?;

    Ok(match line {
        Some(line) => (StatusCode::CREATED, Json(line)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn remove_line(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path((document_id, line_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .ledger
        .remove_line(ctx.workspace_id, kind, document_id, line_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> Result<Response, AppError> {
    let document = state
        .lifecycle
        .change_status(ctx.workspace_id, kind, document_id, &req.status)
        .await?;
    Ok(applied_or_no_op(document))
}

pub async fn renumber(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<RenumberRequest>,
) -> Result<Response, AppError> {
    let document = state
        .lifecycle
        .renumber(ctx.workspace_id, kind, document_id, &req.number)
        .await?;
    Ok(applied_or_no_op(document))
}

pub async fn update_notes(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateNotesRequest>,
) -> Result<Response, AppError> {
    let document = state
        .lifecycle
        .update_notes(ctx.workspace_id, kind, document_id, req.notes)
        .await?;
    Ok(applied_or_no_op(document))
}

pub async fn set_vat(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<DocumentKind>,
    Path(document_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<SetVatRequest>,
) -> Result<Response, AppError> {
    let document = state
        .ledger
        .set_vat_percentage(ctx.workspace_id, kind, document_id, req.vat_percentage)
        .await?;
    Ok(applied_or_no_op(document))
}

/// Mutations on unknown documents are no-ops per the error taxonomy: the
/// applied case returns the fresh document, the no-op case 204.
fn applied_or_no_op<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
