//! Shared harness for the integration suites. These tests need a live
//! PostgreSQL; point TEST_DATABASE_URL (or DATABASE_URL) at one and run
//! with `cargo test -- --ignored`.

use facturas_service::models::{CreateClient, CreateWorkspace, DocumentKind, ListDocumentsFilter};
use facturas_service::services::{
    Database, LedgerService, LifecycleService, NumberingService,
};

pub struct TestApp {
    pub db: Database,
    pub ledger: LedgerService,
    pub lifecycle: LifecycleService,
    pub numbering: NumberingService,
    pub workspace_id: i64,
    pub client_id: i64,
}

impl TestApp {
    /// Connect, migrate, and set up a fresh workspace with one client so
    /// tests never interfere with each other's sequences.
    pub async fn spawn() -> Self {
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL must point at a PostgreSQL instance");

        let db = Database::new(&url, 5, 1).await.expect("Failed to connect");
        db.run_migrations().await.expect("Failed to migrate");

        let workspace = db
            .create_workspace(&CreateWorkspace {
                name: "Workspace de prueba".to_string(),
                slug: None,
            })
            .await
            .expect("Failed to create workspace");

        let client = db
            .create_client(
                workspace.id,
                &CreateClient {
                    name: "Cliente de prueba".to_string(),
                    tax_id: Some("B12345678".to_string()),
                    email: None,
                    phone: None,
                    address: None,
                },
            )
            .await
            .expect("Failed to create client");

        TestApp {
            ledger: LedgerService::new(db.clone()),
            lifecycle: LifecycleService::new(db.clone()),
            numbering: NumberingService::new(db.clone()),
            workspace_id: workspace.id,
            client_id: client.id,
            db,
        }
    }

    /// Remove everything the test created in its workspace.
    pub async fn cleanup(&self) {
        for kind in [DocumentKind::Invoice, DocumentKind::Quote] {
            let documents = self
                .db
                .list_documents(self.workspace_id, kind, &ListDocumentsFilter::default())
                .await
                .unwrap_or_default();
            for document in documents {
                let _ = self
                    .db
                    .delete_document(self.workspace_id, kind, document.id)
                    .await;
            }
        }

        for table in ["services", "clients", "company_config"] {
            let _ = sqlx::query(&format!("DELETE FROM {} WHERE workspace_id = $1", table))
                .bind(self.workspace_id)
                .execute(self.db.pool())
                .await;
        }
        let _ = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(self.workspace_id)
            .execute(self.db.pool())
            .await;
    }
}
