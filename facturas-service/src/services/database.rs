//! Database service for facturas-service.

use crate::models::{
    Client, CompanyConfig, CreateClient, CreateDocument, CreateLineItem, CreateServiceItem,
    CreateWorkspace, Document, DocumentKind, DocumentStatus, DocumentTotals, DocumentWithLines, LineItem,
    ListDocumentsFilter, ServiceItem, UpdateClient, UpdateServiceItem, UpsertCompanyConfig,
    Workspace, slugify,
};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "facturas-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Workspace Operations
    // -------------------------------------------------------------------------

    /// Create a workspace. A taken slug gets a numeric suffix until free.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_workspace(&self, input: &CreateWorkspace) -> Result<Workspace, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_workspace"])
            .start_timer();

        let base = input
            .slug
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&input.name));
        let base = if base.is_empty() {
            format!("workspace-{}", Utc::now().timestamp_millis())
        } else {
            base
        };

        let mut slug = base.clone();
        let mut counter = 2;
        while self.slug_exists(&slug).await? {
            slug = format!("{}-{}", base, counter);
            counter += 1;
        }

        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_utc
            "#,
        )
        .bind(&input.name)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Workspace slug '{}' already exists", slug))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create workspace: {}", e)),
        })?;

        timer.observe_duration();

        info!(workspace_id = %workspace.id, slug = %workspace.slug, "Workspace created");

        Ok(workspace)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM workspaces WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check slug: {}", e)))
    }

    /// List all workspaces.
    #[instrument(skip(self))]
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_workspaces"])
            .start_timer();

        let workspaces = sqlx::query_as::<_, Workspace>(
            "SELECT id, name, slug, created_utc FROM workspaces ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list workspaces: {}", e)))?;

        timer.observe_duration();

        Ok(workspaces)
    }

    /// Get a workspace by ID.
    #[instrument(skip(self))]
    pub async fn get_workspace(&self, workspace_id: i64) -> Result<Option<Workspace>, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            "SELECT id, name, slug, created_utc FROM workspaces WHERE id = $1",
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get workspace: {}", e)))?;

        Ok(workspace)
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// Create a client in a workspace.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id))]
    pub async fn create_client(
        &self,
        workspace_id: i64,
        input: &CreateClient,
    ) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (workspace_id, name, tax_id, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, workspace_id, name, tax_id, email, phone, address, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)))?;

        timer.observe_duration();

        info!(client_id = %client.id, "Client created");

        Ok(client)
    }

    /// Get a client by ID.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, client_id = %client_id))]
    pub async fn get_client(
        &self,
        workspace_id: i64,
        client_id: i64,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, workspace_id, name, tax_id, email, phone, address, created_utc
            FROM clients
            WHERE workspace_id = $1 AND id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        Ok(client)
    }

    /// List clients of a workspace.
    #[instrument(skip(self), fields(workspace_id = %workspace_id))]
    pub async fn list_clients(&self, workspace_id: i64) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, workspace_id, name, tax_id, email, phone, address, created_utc
            FROM clients
            WHERE workspace_id = $1
            ORDER BY name
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();

        Ok(clients)
    }

    /// Update a client. `None` fields keep their stored value.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id, client_id = %client_id))]
    pub async fn update_client(
        &self,
        workspace_id: i64,
        client_id: i64,
        input: &UpdateClient,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = COALESCE($3, name),
                tax_id = COALESCE($4, tax_id),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                address = COALESCE($7, address)
            WHERE workspace_id = $1 AND id = $2
            RETURNING id, workspace_id, name, tax_id, email, phone, address, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(client_id)
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    // -------------------------------------------------------------------------
    // Catalog Service Operations
    // -------------------------------------------------------------------------

    /// Create a catalog service.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id))]
    pub async fn create_service_item(
        &self,
        workspace_id: i64,
        input: &CreateServiceItem,
    ) -> Result<ServiceItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_service_item"])
            .start_timer();

        let service = sqlx::query_as::<_, ServiceItem>(
            r#"
            INSERT INTO services (workspace_id, name, description, price, active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id, workspace_id, name, description, price, active, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create service: {}", e)))?;

        timer.observe_duration();

        info!(service_id = %service.id, "Catalog service created");

        Ok(service)
    }

    /// Get a catalog service by ID.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, service_id = %service_id))]
    pub async fn get_service_item(
        &self,
        workspace_id: i64,
        service_id: i64,
    ) -> Result<Option<ServiceItem>, AppError> {
        let service = sqlx::query_as::<_, ServiceItem>(
            r#"
            SELECT id, workspace_id, name, description, price, active, created_utc
            FROM services
            WHERE workspace_id = $1 AND id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get service: {}", e)))?;

        Ok(service)
    }

    /// List catalog services of a workspace, optionally only active ones.
    #[instrument(skip(self), fields(workspace_id = %workspace_id))]
    pub async fn list_service_items(
        &self,
        workspace_id: i64,
        active_only: bool,
    ) -> Result<Vec<ServiceItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_service_items"])
            .start_timer();

        let services = sqlx::query_as::<_, ServiceItem>(
            r#"
            SELECT id, workspace_id, name, description, price, active, created_utc
            FROM services
            WHERE workspace_id = $1
              AND ($2 = FALSE OR active = TRUE)
            ORDER BY name
            "#,
        )
        .bind(workspace_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list services: {}", e)))?;

        timer.observe_duration();

        Ok(services)
    }

    /// Update a catalog service, including the active flag.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id, service_id = %service_id))]
    pub async fn update_service_item(
        &self,
        workspace_id: i64,
        service_id: i64,
        input: &UpdateServiceItem,
    ) -> Result<Option<ServiceItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_service_item"])
            .start_timer();

        let service = sqlx::query_as::<_, ServiceItem>(
            r#"
            UPDATE services
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                active = COALESCE($6, active)
            WHERE workspace_id = $1 AND id = $2
            RETURNING id, workspace_id, name, description, price, active, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(service_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update service: {}", e)))?;

        timer.observe_duration();

        Ok(service)
    }

    // -------------------------------------------------------------------------
    // Company Configuration Operations
    // -------------------------------------------------------------------------

    /// Get the company configuration of a workspace.
    #[instrument(skip(self), fields(workspace_id = %workspace_id))]
    pub async fn get_company_config(
        &self,
        workspace_id: i64,
    ) -> Result<Option<CompanyConfig>, AppError> {
        let company = sqlx::query_as::<_, CompanyConfig>(
            r#"
            SELECT id, workspace_id, name, tax_id, address, postal_code, city, province,
                phone, email, web, iban, language, updated_utc
            FROM company_config
            WHERE workspace_id = $1
            "#,
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get company config: {}", e))
        })?;

        Ok(company)
    }

    /// Create or replace the company configuration of a workspace.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id))]
    pub async fn upsert_company_config(
        &self,
        workspace_id: i64,
        input: &UpsertCompanyConfig,
    ) -> Result<CompanyConfig, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_company_config"])
            .start_timer();

        let company = sqlx::query_as::<_, CompanyConfig>(
            r#"
            INSERT INTO company_config (
                workspace_id, name, tax_id, address, postal_code, city, province,
                phone, email, web, iban, language, updated_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (workspace_id) DO UPDATE
            SET name = EXCLUDED.name,
                tax_id = EXCLUDED.tax_id,
                address = EXCLUDED.address,
                postal_code = EXCLUDED.postal_code,
                city = EXCLUDED.city,
                province = EXCLUDED.province,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                web = EXCLUDED.web,
                iban = EXCLUDED.iban,
                language = EXCLUDED.language,
                updated_utc = NOW()
            RETURNING id, workspace_id, name, tax_id, address, postal_code, city, province,
                phone, email, web, iban, language, updated_utc
            "#,
        )
        .bind(workspace_id)
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.address)
        .bind(&input.postal_code)
        .bind(&input.city)
        .bind(&input.province)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.web)
        .bind(&input.iban)
        .bind(&input.language)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to save company config: {}", e))
        })?;

        timer.observe_duration();

        info!(company_id = %company.id, "Company config saved");

        Ok(company)
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Latest stored number matching a `{prefix}-{year}-%` pattern. String
    /// ordering is safe because the zero-padded sequence keeps lexical and
    /// numeric order aligned within a year.
    #[instrument(skip(self), fields(workspace_id = %workspace_id))]
    pub async fn latest_document_number(
        &self,
        workspace_id: i64,
        pattern: &str,
    ) -> Result<Option<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["latest_document_number"])
            .start_timer();

        let number = sqlx::query_scalar::<_, String>(
            r#"
            SELECT number
            FROM documents
            WHERE workspace_id = $1 AND number LIKE $2
            ORDER BY number DESC
            LIMIT 1
            "#,
        )
        .bind(workspace_id)
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch latest number: {}", e))
        })?;

        timer.observe_duration();

        Ok(number)
    }

    /// Insert a new draft document with zero totals. A duplicate number
    /// within the workspace surfaces as `Conflict` for the caller to retry.
    #[instrument(skip(self, input), fields(workspace_id = %input.workspace_id, number = %number))]
    pub async fn insert_document(
        &self,
        input: &CreateDocument,
        number: &str,
    ) -> Result<Document, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_document"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (workspace_id, kind, number, client_id, issue_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, 'draft', $6)
            RETURNING id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            "#,
        )
        .bind(input.workspace_id)
        .bind(input.kind.as_str())
        .bind(number)
        .bind(input.client_id)
        .bind(input.issue_date)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Document number '{}' already exists in this workspace",
                    number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create document: {}", e)),
        })?;

        timer.observe_duration();

        info!(document_id = %document.id, number = %document.number, "Draft document created");

        Ok(document)
    }

    /// Get a document by ID.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn get_document(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            FROM documents
            WHERE workspace_id = $1 AND kind = $2 AND id = $3
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get document: {}", e)))?;

        Ok(document)
    }

    /// Get a document with its client and line items.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn get_document_with_lines(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        let Some(document) = self.get_document(workspace_id, kind, document_id).await? else {
            return Ok(None);
        };

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, workspace_id, name, tax_id, email, phone, address, created_utc
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(document.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get document client: {}", e))
        })?;

        let lines = self.get_line_items(document.id).await?;

        Ok(Some(DocumentWithLines {
            document,
            client,
            lines,
        }))
    }

    /// List documents of a kind for a workspace, newest first.
    #[instrument(skip(self, filter), fields(workspace_id = %workspace_id))]
    pub async fn list_documents(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_documents"])
            .start_timer();

        let limit = filter.limit.unwrap_or(100).clamp(1, 500);
        let status_str = filter.status.map(|s| s.as_str().to_string());

        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            FROM documents
            WHERE workspace_id = $1
              AND kind = $2
              AND ($3::varchar IS NULL OR status = $3)
            ORDER BY id DESC
            LIMIT $4
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(&status_str)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        timer.observe_duration();

        Ok(documents)
    }

    /// Overwrite a document's status. No transition validation by design.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn update_document_status(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_document_status"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET status = $4
            WHERE workspace_id = $1 AND kind = $2 AND id = $3
            RETURNING id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update status: {}", e)))?;

        timer.observe_duration();

        if let Some(ref doc) = document {
            info!(document_id = %doc.id, status = %doc.status, "Document status changed");
        }

        Ok(document)
    }

    /// Replace a document's notes. `None` clears them.
    #[instrument(skip(self, notes), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn update_document_notes(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        notes: Option<String>,
    ) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET notes = $4
            WHERE workspace_id = $1 AND kind = $2 AND id = $3
            RETURNING id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update notes: {}", e)))?;

        Ok(document)
    }

    /// Overwrite a document's number with a user-chosen one. A duplicate
    /// within the workspace surfaces as `Conflict`; the caller does not retry.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id, number = %number))]
    pub async fn update_document_number(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        number: &str,
    ) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_document_number"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET number = $4
            WHERE workspace_id = $1 AND kind = $2 AND id = $3
            RETURNING id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Document number '{}' already exists in this workspace",
                    number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to renumber document: {}", e)),
        })?;

        timer.observe_duration();

        if let Some(ref doc) = document {
            info!(document_id = %doc.id, number = %doc.number, "Document renumbered");
        }

        Ok(document)
    }

    /// Delete a document and its line items, lines first to respect the
    /// foreign key, in one transaction.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn delete_document(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_document"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE workspace_id = $1 AND kind = $2 AND id = $3)",
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check document: {}", e)))?;

        if !exists {
            return Ok(false);
        }

        sqlx::query("DELETE FROM line_items WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete line items: {}", e))
            })?;

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete document: {}", e))
            })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit delete: {}", e))
        })?;

        timer.observe_duration();

        info!(document_id = %document_id, "Document deleted");

        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Line Item Operations
    // -------------------------------------------------------------------------

    /// Line items of a document, oldest first.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_line_items(&self, document_id: i64) -> Result<Vec<LineItem>, AppError> {
        let lines = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT id, document_id, service_id, description, quantity, unit_price, total_line,
                created_utc
            FROM line_items
            WHERE document_id = $1
            ORDER BY id
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get line items: {}", e)))?;

        Ok(lines)
    }

    /// Insert a line item and recompute the parent aggregate in one
    /// transaction. The subtotal is always re-summed from the line set, the
    /// stored aggregate is never trusted.
    #[instrument(skip(self, input), fields(document_id = %input.document_id))]
    pub async fn insert_line_item_and_recalculate(
        &self,
        input: &CreateLineItem,
    ) -> Result<LineItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_line_item"])
            .start_timer();

        let total_line = Decimal::from(input.quantity) * input.unit_price;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let line = sqlx::query_as::<_, LineItem>(
            r#"
            INSERT INTO line_items (document_id, service_id, description, quantity, unit_price, total_line)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, document_id, service_id, description, quantity, unit_price, total_line,
                created_utc
            "#,
        )
        .bind(input.document_id)
        .bind(input.service_id)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total_line)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to add line item: {}", e)))?;

        self.recalculate_totals(&mut tx, input.document_id)
            .await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit line item: {}", e))
        })?;

        timer.observe_duration();

        info!(line_item_id = %line.id, document_id = %line.document_id, "Line item added");

        Ok(line)
    }

    /// Delete a line item and recompute the parent aggregate in one
    /// transaction. Returns false when the line does not belong to the
    /// document (nothing written).
    #[instrument(skip(self), fields(document_id = %document_id, line_id = %line_id))]
    pub async fn delete_line_item_and_recalculate(
        &self,
        document_id: i64,
        line_id: i64,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_line_item"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let result = sqlx::query("DELETE FROM line_items WHERE id = $1 AND document_id = $2")
            .bind(line_id)
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete line item: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.recalculate_totals(&mut tx, document_id).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit line removal: {}", e))
        })?;

        timer.observe_duration();

        info!(line_item_id = %line_id, document_id = %document_id, "Line item removed");

        Ok(true)
    }

    /// Set a document's VAT percentage and recompute its aggregate in one
    /// transaction.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn set_vat_and_recalculate(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        vat_percentage: Decimal,
    ) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["set_vat_percentage"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let subtotal = Self::line_total_sum(&mut tx, document_id).await?;
        let totals = DocumentTotals::compute(subtotal, vat_percentage);

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET vat_percentage = $4,
                subtotal = $5,
                vat_amount = $6,
                total = $7
            WHERE workspace_id = $1 AND kind = $2 AND id = $3
            RETURNING id, workspace_id, kind, number, client_id, issue_date, status, notes,
                subtotal, vat_percentage, vat_amount, total, created_utc
            "#,
        )
        .bind(workspace_id)
        .bind(kind.as_str())
        .bind(document_id)
        .bind(vat_percentage)
        .bind(totals.subtotal)
        .bind(totals.vat_amount)
        .bind(totals.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update VAT: {}", e)))?;

        if document.is_none() {
            return Ok(None);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit VAT change: {}", e))
        })?;

        timer.observe_duration();

        Ok(document)
    }

    /// Re-sum the line totals of a document and persist the derived
    /// aggregate. Runs inside the caller's transaction so the line mutation
    /// and the aggregate update commit together or not at all.
    async fn recalculate_totals(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        document_id: i64,
    ) -> Result<(), AppError> {
        let subtotal = Self::line_total_sum(tx, document_id).await?;

        // Respect whatever VAT percentage the document currently carries.
        let vat_percentage = sqlx::query_scalar::<_, Decimal>(
            "SELECT vat_percentage FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read VAT percentage: {}", e))
        })?;

        let totals = DocumentTotals::compute(subtotal, vat_percentage);

        sqlx::query(
            r#"
            UPDATE documents
            SET subtotal = $2,
                vat_amount = $3,
                total = $4
            WHERE id = $1
            "#,
        )
        .bind(document_id)
        .bind(totals.subtotal)
        .bind(totals.vat_amount)
        .bind(totals.total)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update totals: {}", e)))?;

        Ok(())
    }

    async fn line_total_sum(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        document_id: i64,
    ) -> Result<Decimal, AppError> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_line), 0) FROM line_items WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum line totals: {}", e)))
    }
}
