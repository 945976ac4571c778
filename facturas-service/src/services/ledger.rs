//! Line-item ledger: mutates a document's lines and keeps its aggregate
//! (subtotal, VAT amount, total) consistent after every change.

use crate::models::{CreateLineItem, Document, DocumentKind, LineItem};
use crate::services::database::Database;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

/// Description used when a line references a service without its own text.
const DEFAULT_LINE_DESCRIPTION: &str = "Descripción.";

/// Raw input of an add-line request, before validation and defaulting.
#[derive(Debug, Clone, Default)]
pub struct AddLineInput {
    pub service_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
struct NormalizedLine {
    service_id: Option<i64>,
    description: String,
    quantity: i32,
    unit_price: Decimal,
}

#[derive(Clone)]
pub struct LedgerService {
    db: Database,
}

impl LedgerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add a line item to a document and recompute its totals.
    ///
    /// Returns `Ok(None)` without touching the document when the input names
    /// neither a service nor a description, or when the document does not
    /// exist; both are deliberate no-ops, not errors.
    #[instrument(skip(self, input), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn add_line(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        input: AddLineInput,
    ) -> Result<Option<LineItem>, AppError> {
        let Some(line) = normalize_line(&input)? else {
            return Ok(None);
        };

        let Some(document) = self.db.get_document(workspace_id, kind, document_id).await? else {
            return Ok(None);
        };

        let line = self
            .db
            .insert_line_item_and_recalculate(&CreateLineItem {
                document_id: document.id,
                service_id: line.service_id,
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .await?;

        Ok(Some(line))
    }

    /// Remove a line item from a document and recompute its totals. Unknown
    /// document or line ids are no-ops (`Ok(false)`).
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id, line_id = %line_id))]
    pub async fn remove_line(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        line_id: i64,
    ) -> Result<bool, AppError> {
        let Some(document) = self.db.get_document(workspace_id, kind, document_id).await? else {
            return Ok(false);
        };

        self.db
            .delete_line_item_and_recalculate(document.id, line_id)
            .await
    }

    /// Change a document's VAT percentage and recompute its totals. An
    /// unknown document id is a no-op (`Ok(None)`).
    #[instrument(skip(self), fields(workspace_id = %workspace_id, document_id = %document_id))]
    pub async fn set_vat_percentage(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        document_id: i64,
        vat_percentage: Decimal,
    ) -> Result<Option<Document>, AppError> {
        if vat_percentage < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "VAT percentage cannot be negative"
            )));
        }

        self.db
            .set_vat_and_recalculate(workspace_id, kind, document_id, vat_percentage)
            .await
    }
}

/// Validate and default an add-line input. `Ok(None)` means the request
/// carries nothing billable and should leave the document unchanged.
fn normalize_line(input: &AddLineInput) -> Result<Option<NormalizedLine>, AppError> {
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    if input.service_id.is_none() && description.is_empty() {
        return Ok(None);
    }

    let quantity = input.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Quantity must be greater than zero"
        )));
    }

    let unit_price = input.unit_price.unwrap_or(Decimal::ZERO);
    if unit_price < Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Unit price cannot be negative"
        )));
    }

    let description = if description.is_empty() {
        DEFAULT_LINE_DESCRIPTION.to_string()
    } else {
        description.to_string()
    };

    Ok(Some(NormalizedLine {
        service_id: input.service_id,
        description,
        quantity,
        unit_price,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let normalized = normalize_line(&AddLineInput::default()).unwrap();
        assert!(normalized.is_none());

        let normalized = normalize_line(&AddLineInput {
            description: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(normalized.is_none());
    }

    #[test]
    fn service_without_text_gets_default_description() {
        let normalized = normalize_line(&AddLineInput {
            service_id: Some(7),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(normalized.description, DEFAULT_LINE_DESCRIPTION);
        assert_eq!(normalized.quantity, 1);
        assert_eq!(normalized.unit_price, Decimal::ZERO);
    }

    #[test]
    fn zero_or_negative_quantity_is_rejected() {
        for quantity in [0, -3] {
            let result = normalize_line(&AddLineInput {
                description: Some("Mantenimiento web".to_string()),
                quantity: Some(quantity),
                ..Default::default()
            });
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = normalize_line(&AddLineInput {
            description: Some("Hosting anual".to_string()),
            unit_price: Some(dec("-0.01")),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn explicit_values_pass_through() {
        let normalized = normalize_line(&AddLineInput {
            description: Some("  Diseño de logotipo  ".to_string()),
            quantity: Some(2),
            unit_price: Some(dec("25.00")),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(normalized.description, "Diseño de logotipo");
        assert_eq!(normalized.quantity, 2);
        assert_eq!(normalized.unit_price, dec("25.00"));
    }
}
