//! Document lifecycle: creation with numbering, status changes, renumbering
//! and deletion.

use crate::models::{
    CreateDocument, Document, DocumentKind, DocumentStatus, DocumentWithLines, ListDocumentsFilter,
};
use crate::services::database::Database;
use crate::services::metrics::{DOCUMENTS_CREATED_TOTAL, NUMBERING_COLLISIONS_TOTAL};
use crate::services::numbering::NumberingService;
use chrono::{Datelike, NaiveDate, Utc};
use service_core::error::AppError;
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct LifecycleService {
    db: Database,
    numbering: NumberingService,
}

impl LifecycleService {
    pub fn new(db: Database) -> Self {
        let numbering = NumberingService::new(db.clone());
        Self { db, numbering }
    }

    /// Create a draft document with zero totals. The number comes from the
    /// sequence generator; if another request claimed it first the insert
    /// hits the unique constraint and we retry exactly once with a freshly
    /// computed number before giving up.
    #[instrument(skip(self, notes), fields(workspace_id = %workspace_id, kind = %kind.as_str()))]
    pub async fn create_document(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        client_id: i64,
        issue_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<Document, AppError> {
        if self.db.get_client(workspace_id, client_id).await?.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Client not found in workspace"
            )));
        }

        let issue_date = issue_date.unwrap_or_else(|| Utc::now().date_naive());
        // The sequence always runs on the current year, even for backdated
        // documents.
        let year = Utc::now().year();
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let input = CreateDocument {
            workspace_id,
            kind,
            client_id,
            issue_date,
            notes,
        };

        let number = self
            .numbering
            .next_document_number(workspace_id, kind, year)
            .await?;

        let document = match self.db.insert_document(&input, &number).await {
            Ok(document) => document,
            Err(AppError::Conflict(_)) => {
                NUMBERING_COLLISIONS_TOTAL.inc();
                warn!(number = %number, "Document number collision, regenerating");
                let retry = self
                    .numbering
                    .next_document_number(workspace_id, kind, year)
                    .await?;
                self.db.insert_document(&input, &retry).await?
            }
            Err(e) => return Err(e),
        };

        DOCUMENTS_CREATED_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();

        Ok(document)
    }

    /// Get a document with its client and line items.
    pub async fn get_document(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        self.db
            .get_document_with_lines(workspace_id, kind, document_id)
            .await
    }

    /// List documents of a kind, newest first.
    pub async fn list_documents(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<Document>, AppError> {
        self.db.list_documents(workspace_id, kind, filter).await
    }

    /// Overwrite a document's status. Any status of the kind's set can
    /// replace any other; an unknown status string is a validation error and
    /// an unknown document id a no-op.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id, status = %status))]
    pub async fn change_status(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        status: &str,
    ) -> Result<Option<Document>, AppError> {
        let status = DocumentStatus::parse(kind, status).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "'{}' is not a valid {} status",
                status,
                kind.as_str()
            ))
        })?;

        self.db
            .update_document_status(workspace_id, kind, document_id, status)
            .await
    }

    /// Replace a document's notes; empty input clears them.
    pub async fn update_notes(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        notes: Option<String>,
    ) -> Result<Option<Document>, AppError> {
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.db
            .update_document_notes(workspace_id, kind, document_id, notes)
            .await
    }

    /// Overwrite a document's number with a user-chosen one. A collision is
    /// logged and surfaced as a conflict; there is no retry because the
    /// caller picked the value. An empty number is a no-op.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn renumber(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        new_number: &str,
    ) -> Result<Option<Document>, AppError> {
        let new_number = new_number.trim();
        if new_number.is_empty() {
            return Ok(None);
        }

        self.db
            .update_document_number(workspace_id, kind, document_id, new_number)
            .await
            .map_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    error!(number = %new_number, "Renumbering aborted, number already taken");
                }
                e
            })
    }

    /// Delete a document and all its line items. Unknown id is a no-op.
    pub async fn delete_document(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<bool, AppError> {
        self.db.delete_document(workspace_id, kind, document_id).await
    }
}
