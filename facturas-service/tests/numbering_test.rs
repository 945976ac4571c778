//! Sequential numbering against a real database.

mod common;

use chrono::Datelike;
use common::TestApp;
use facturas_service::models::DocumentKind;
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn invoice_sequence_starts_at_one_and_increments() {
    let app = TestApp::spawn().await;
    let year = chrono::Utc::now().year();

    let first = app
        .numbering
        .next_document_number(app.workspace_id, DocumentKind::Invoice, year)
        .await
        .expect("Failed to generate number");
    assert_eq!(first, format!("F-{}-0001", year));

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
        .expect("Failed to create invoice");
    assert_eq!(invoice.number, format!("F-{}-0001", year));

    let second = app
        .numbering
        .next_document_number(app.workspace_id, DocumentKind::Invoice, year)
        .await
        .expect("Failed to generate number");
    assert_eq!(second, format!("F-{}-0002", year));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn interleaved_creation_never_duplicates() {
    let app = TestApp::spawn().await;
    let year = chrono::Utc::now().year();

    let mut numbers = Vec::new();
    for _ in 0..5 {
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
            .expect("Failed to create invoice");
        numbers.push(invoice.number);
    }

    let mut deduped = numbers.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), numbers.len());
    assert_eq!(numbers.last().unwrap(), &format!("F-{}-0005", year));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn quote_sequence_is_independent_of_invoices() {
    let app = TestApp::spawn().await;
    let year = chrono::Utc::now().year();

    app.lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .expect("Failed to create invoice");

    let quote = app
        .lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Quote,
            app.client_id,
            None,
            None,
        )
        .await
        .expect("Failed to create quote");
    assert_eq!(quote.number, format!("P-{}-0001", year));

    app.cleanup().await;
}
