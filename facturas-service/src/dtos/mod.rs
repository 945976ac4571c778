//! Request payloads of the HTTP API. Shape-level validation lives here;
//! domain rules (positive quantities, number collisions) live in the
//! services.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::{
    CreateClient, CreateServiceItem, CreateWorkspace, UpdateClient, UpdateServiceItem,
    UpsertCompanyConfig,
};

// -----------------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

// -----------------------------------------------------------------------------
// Workspaces
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub slug: Option<String>,
}

impl CreateWorkspaceRequest {
    pub fn into_input(self) -> CreateWorkspace {
        CreateWorkspace {
            name: self.name.trim().to_string(),
            slug: self.slug,
        }
    }
}

// -----------------------------------------------------------------------------
// Clients
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CreateClientRequest {
    pub fn into_input(self) -> CreateClient {
        CreateClient {
            name: self.name.trim().to_string(),
            tax_id: normalize(self.tax_id),
            email: normalize(self.email),
            phone: normalize(self.phone),
            address: normalize(self.address),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateClientRequest {
    pub fn into_input(self) -> UpdateClient {
        UpdateClient {
            name: normalize(self.name),
            tax_id: normalize(self.tax_id),
            email: normalize(self.email),
            phone: normalize(self.phone),
            address: normalize(self.address),
        }
    }
}

// -----------------------------------------------------------------------------
// Catalog services
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl CreateServiceRequest {
    pub fn into_input(self) -> CreateServiceItem {
        CreateServiceItem {
            name: self.name.trim().to_string(),
            description: normalize(self.description),
            price: self.price,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

impl UpdateServiceRequest {
    pub fn into_input(self) -> UpdateServiceItem {
        UpdateServiceItem {
            name: normalize(self.name),
            description: normalize(self.description),
            price: self.price,
            active: self.active,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListServicesParams {
    #[serde(default)]
    pub active: bool,
}

// -----------------------------------------------------------------------------
// Company configuration
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCompanyRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub web: Option<String>,
    pub iban: Option<String>,
    pub language: Option<String>,
}

impl UpsertCompanyRequest {
    pub fn into_input(self) -> UpsertCompanyConfig {
        // Anything that is not Catalan renders in Spanish.
        let language = match self.language.as_deref() {
            Some("ca") => "ca",
            _ => "es",
        };
        UpsertCompanyConfig {
            name: self.name.trim().to_string(),
            tax_id: normalize(self.tax_id),
            address: normalize(self.address),
            postal_code: normalize(self.postal_code),
            city: normalize(self.city),
            province: normalize(self.province),
            phone: normalize(self.phone),
            email: normalize(self.email),
            web: normalize(self.web),
            iban: normalize(self.iban),
            language: language.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// Documents
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    pub client_id: i64,
    pub issue_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddLineRequest {
    pub service_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenumberRequest {
    pub number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetVatRequest {
    pub vat_percentage: Decimal,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListDocumentsParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
