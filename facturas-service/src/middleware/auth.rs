//! Bearer-token authentication and explicit workspace resolution.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::services::Role;
use crate::AppState;

/// Header an admin uses to pick the workspace a request operates on.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";

/// Authenticated identity plus the workspace every tenant-scoped query of
/// the request must filter by.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub subject: String,
    pub role: Role,
    pub workspace_id: i64,
}

/// Middleware requiring a valid bearer token. Resolves the effective
/// workspace in order: the token's workspace claim (client accounts, not
/// overridable), then the `x-workspace-id` header, then the configured
/// default.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state.jwt.validate(token)?;

    let workspace_id = match claims.workspace_id {
        Some(id) if id > 0 => id,
        _ => req
            .headers()
            .get(WORKSPACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .unwrap_or(state.config.tenancy.default_workspace_id),
    };

    req.extensions_mut().insert(RequestContext {
        subject: claims.sub,
        role: claims.role,
        workspace_id,
    });

    Ok(next.run(req).await)
}

/// Middleware gating workspace management behind the admin role. Must run
/// after `auth_middleware`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing request context")))?;

    if ctx.role != Role::Admin {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Workspace management requires the admin role"
        )));
    }

    Ok(next.run(req).await)
}
