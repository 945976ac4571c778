//! Ledger recomputation scenarios against a real database.

mod common;

use common::TestApp;
use facturas_service::models::{Document, DocumentKind};
use facturas_service::services::AddLineInput;
use rust_decimal::Decimal;
use serial_test::serial;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn create_invoice(app: &TestApp) -> Document {
    app.lifecycle
        .create_document(
            app.workspace_id,
            DocumentKind::Invoice,
            app.client_id,
            None,
            None,
        )
        .await
        .expect("Failed to create invoice")
}

async fn fetch_invoice(app: &TestApp, id: i64) -> Document {
    app.db
        .get_document(app.workspace_id, DocumentKind::Invoice, id)
        .await
        .expect("Failed to fetch invoice")
        .expect("Invoice missing")
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn totals_follow_every_line_mutation() {
    let app = TestApp::spawn().await;
    let invoice = create_invoice(&app).await;
    assert_eq!(invoice.subtotal, Decimal::ZERO);
    assert_eq!(invoice.vat_percentage, dec("21"));

    // qty 2 x 25.00 at the default 21% VAT
    let first_line = app
        .ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            AddLineInput {
                description: Some("Diseño de logotipo".to_string()),
                quantity: Some(2),
                unit_price: Some(dec("25.00")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to add line")
        .expect("Line should be created");
    assert_eq!(first_line.total_line, dec("50.00"));

    let doc = fetch_invoice(&app, invoice.id).await;
    assert_eq!(doc.subtotal, dec("50.00"));
    assert_eq!(doc.vat_amount, dec("10.50"));
    assert_eq!(doc.total, dec("60.50"));

    // second line: qty 1 x 10.00
    app.ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            AddLineInput {
                description: Some("Hosting".to_string()),
                quantity: Some(1),
                unit_price: Some(dec("10.00")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to add line")
        .expect("Line should be created");

    let doc = fetch_invoice(&app, invoice.id).await;
    assert_eq!(doc.subtotal, dec("60.00"));
    assert_eq!(doc.vat_amount, dec("12.60"));
    assert_eq!(doc.total, dec("72.60"));

    // removing the first line reverts to the second one's totals
    let removed = app
        .ledger
        .remove_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            first_line.id,
        )
        .await
        .expect("Failed to remove line");
    assert!(removed);

    let doc = fetch_invoice(&app, invoice.id).await;
    assert_eq!(doc.subtotal, dec("10.00"));
    assert_eq!(doc.vat_amount, dec("2.10"));
    assert_eq!(doc.total, dec("12.10"));

    // removing every line drives the aggregate to zero
    let lines = app.db.get_line_items(invoice.id).await.unwrap();
    for line in lines {
        app.ledger
            .remove_line(app.workspace_id, DocumentKind::Invoice, invoice.id, line.id)
            .await
            .expect("Failed to remove line");
    }

    let doc = fetch_invoice(&app, invoice.id).await;
    assert_eq!(doc.subtotal, Decimal::ZERO);
    assert_eq!(doc.vat_amount, Decimal::ZERO);
    assert_eq!(doc.total, Decimal::ZERO);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn add_line_without_service_or_description_is_a_no_op() {
    let app = TestApp::spawn().await;
    let invoice = create_invoice(&app).await;

    let result = app
        .ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            AddLineInput {
                description: Some("   ".to_string()),
                quantity: Some(3),
                unit_price: Some(dec("99.00")),
                ..Default::default()
            },
        )
        .await
        .expect("No-op must report success");
    assert!(result.is_none());

    let doc = fetch_invoice(&app, invoice.id).await;
    assert_eq!(doc.subtotal, Decimal::ZERO);
    assert_eq!(doc.total, Decimal::ZERO);
    assert!(app.db.get_line_items(invoice.id).await.unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn changing_vat_recomputes_from_current_lines() {
    let app = TestApp::spawn().await;
    let invoice = create_invoice(&app).await;

    app.ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            AddLineInput {
                description: Some("Mantenimiento".to_string()),
                quantity: Some(4),
                unit_price: Some(dec("50.00")),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let doc = app
        .ledger
        .set_vat_percentage(
            app.workspace_id,
            DocumentKind::Invoice,
            invoice.id,
            dec("10"),
        )
        .await
        .expect("Failed to set VAT")
        .expect("Document should exist");
    assert_eq!(doc.subtotal, dec("200.00"));
    assert_eq!(doc.vat_amount, dec("20.00"));
    assert_eq!(doc.total, dec("220.00"));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL; set TEST_DATABASE_URL"]
async fn mutations_on_unknown_documents_are_no_ops() {
    let app = TestApp::spawn().await;

    let added = app
        .ledger
        .add_line(
            app.workspace_id,
            DocumentKind::Invoice,
            999_999,
            AddLineInput {
                description: Some("Fantasma".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Unknown document must be a no-op");
    assert!(added.is_none());

    let removed = app
        .ledger
        .remove_line(app.workspace_id, DocumentKind::Invoice, 999_999, 1)
        .await
        .expect("Unknown document must be a no-op");
    assert!(!removed);

    app.cleanup().await;
}
