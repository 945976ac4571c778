//! Document lifecycle against a real database.

mod common;

use common::TestApp;
use facturas_service::models::DocumentKind;
use facturas_service::services::AddLineInput;
use rust_decimal::Decimal;
use serial_test::serial;
use service_core::error::AppError;

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn new_documents_start_as_zeroed_drafts() {
    let app = TestApp::spawn().await;

    let invoice = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            Some("  Pago a 30 días  ".to_string()),
        )
        .await
        .expect("Failed to create invoice");

    assert_eq!(invoice.status, "draft");
    assert_eq!(invoice.subtotal, Decimal::ZERO);
    assert_eq!(invoice.vat_amount, Decimal::ZERO);
    assert_eq!(invoice.total, Decimal::ZERO);
    assert_eq!(invoice.notes.as_deref(), Some("Pago a 30 días"));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn status_overwrites_without_transition_rules() {
    let app = TestApp::spawn().await;

    let invoice = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .unwrap();

    // paid straight from draft, then back to draft: both allowed
    let doc = app
        .lifecycle
        .change_status(app.workspace_id, DocumentKind::Invoice, invoice.id, "paid")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.status, "paid");

    let doc = app
        .lifecycle
        .change_status(app.workspace_id, DocumentKind::Invoice, invoice.id, "draft")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.status, "draft");

    // a quote status is invalid for an invoice
    let result = app
        .lifecycle
        .change_status(app.workspace_id, DocumentKind::Invoice, invoice.id, "sent")
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // unknown document: no-op
    let missing = app
        .lifecycle
        .change_status(app.workspace_id, DocumentKind::Invoice, 999_999, "paid")
        .await
        .unwrap();
    assert!(missing.is_none());

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn renumber_collision_is_surfaced_not_retried() {
    let app = TestApp::spawn().await;

    let first = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .unwrap();
    let second = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .unwrap();

    let result = app
        .lifecycle
        .renumber(
            app.workspace_id,
            DocumentKind::Invoice,
            second.id,
            &first.number,
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // a free number is applied verbatim
    let doc = app
        .lifecycle
        .renumber(
            app.workspace_id,
            DocumentKind::Invoice,
            second.id,
            "F-2020-0099",
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.number, "F-2020-0099");

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn delete_removes_lines_then_document() {
    let app = TestApp::spawn().await;

    let invoice = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .unwrap();

    app.ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            AddLineInput {
                description: Some("Trabajo facturable".to_string()),
                quantity: Some(1),
                unit_price: Some("100.00".parse().unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let deleted = app
        .lifecycle
        .delete_document(app.workspace_id, DocumentKind::Invoice, invoice.id)
        .await
        .expect("Failed to delete");
    assert!(deleted);

    let gone = app
        .db
        .get_document(app.workspace_id, DocumentKind::Invoice, invoice.id)
        .await
        .unwrap();
    assert!(gone.is_none());
    assert!(app.db.get_line_items(invoice.id).await.unwrap().is_empty());

    // deleting again: no-op
    let again = app
        .lifecycle
        .delete_document(app.workspace_id, DocumentKind::Invoice, invoice.id)
        .await
        .unwrap();
    assert!(!again);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn create_rejects_clients_from_other_workspaces() {
    let app = TestApp::spawn().await;
    let other = TestApp::spawn().await;

    let result = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            other.client_id,
            None,
            None,
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    other.cleanup().await;
    app.cleanup().await;
}
