pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::models::DocumentKind;
use crate::services::{AuthService, Database, JwtService, LedgerService, LifecycleService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub jwt: JwtService,
    pub auth: AuthService,
    pub ledger: LedgerService,
    pub lifecycle: LifecycleService,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        let jwt = JwtService::new(
            &config.auth.jwt_secret,
            config.auth.access_token_expiry_minutes,
        );
        let auth = AuthService::new(config.auth.clone(), jwt.clone());
        let ledger = LedgerService::new(db.clone());
        let lifecycle = LifecycleService::new(db.clone());
        AppState {
            config,
            db,
            jwt,
            auth,
            ledger,
            lifecycle,
        }
    }
}

/// Routes shared by invoices and quotes; the mounted kind reaches the
/// handlers as an extension.
fn document_routes(kind: DocumentKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/:id",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route("/:id/lines", post(handlers::documents::add_line))
        .route(
            "/:id/lines/:line_id",
            delete(handlers::documents::remove_line),
        )
        .route("/:id/status", put(handlers::documents::change_status))
        .route("/:id/number", put(handlers::documents::renumber))
        .route("/:id/notes", put(handlers::documents::update_notes))
        .route("/:id/vat", put(handlers::documents::set_vat))
        .layer(Extension(kind))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let workspace_routes = Router::new()
        .route(
            "/",
            get(handlers::workspaces::list_workspaces).post(handlers::workspaces::create_workspace),
        )
        .route("/:id", get(handlers::workspaces::get_workspace))
        .layer(from_fn(middleware::auth::require_admin));

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/:id",
            get(handlers::clients::get_client).put(handlers::clients::update_client),
        );

    let service_routes = Router::new()
        .route(
            "/",
            get(handlers::services::list_services).post(handlers::services::create_service),
        )
        .route(
            "/:id",
            get(handlers::services::get_service).put(handlers::services::update_service),
        );

    let company_routes = Router::new().route(
        "/",
        get(handlers::company::get_company).put(handlers::company::upsert_company),
    );

    let protected = Router::new()
        .nest("/workspaces", workspace_routes)
        .nest("/clients", client_routes)
        .nest("/services", service_routes)
        .nest("/company", company_routes)
        .nest("/invoices", document_routes(DocumentKind::Invoice))
        .nest("/quotes", document_routes(DocumentKind::Quote))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness plus a database round-trip.
async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state
        .db
        .health_check()
        .await
        .map_err(|_| AppError::ServiceUnavailable)?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn metrics() -> impl IntoResponse {
    (StatusCode::OK, services::metrics::get_metrics())
}
