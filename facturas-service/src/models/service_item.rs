//! Catalog service model: reusable entries a line item may reference.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A billable catalog entry. Deactivating one hides it from pickers but
/// leaves existing line items untouched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceItem {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateServiceItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateServiceItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}
