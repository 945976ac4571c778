//! Line item model: a billable row owned by exactly one document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Line item on a document. `total_line` is quantity x unit price, fixed at
/// write time; the parent document's aggregate is recomputed from the sum of
/// these on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub id: i64,
    pub document_id: i64,
    pub service_id: Option<i64>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_line: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a line item, already validated and normalized by the
/// ledger.
#[derive(Debug, Clone)]
pub struct CreateLineItem {
    pub document_id: i64,
    pub service_id: Option<i64>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
