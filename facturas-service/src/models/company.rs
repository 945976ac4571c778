//! Issuing-company configuration, one record per workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Display data of the company issuing documents in a workspace, plus the
/// locale its documents are rendered in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyConfig {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub iban: Option<String>,
    pub language: String,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating or replacing a workspace's company configuration.
#[derive(Debug, Clone)]
pub struct UpsertCompanyConfig {
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub iban: Option<String>,
    pub language: String,
}
