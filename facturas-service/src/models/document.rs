//! Document model: invoices and quotes are structurally identical and share
//! this type; the kind selects the numbering prefix and the status set.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Client, LineItem};

/// Document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quote => "quote",
        }
    }

    /// Prefix of the human-readable number (`F-2025-0001` / `P-2025-0001`).
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "F",
            DocumentKind::Quote => "P",
        }
    }

    pub fn statuses(&self) -> &'static [DocumentStatus] {
        match self {
            DocumentKind::Invoice => &[
                DocumentStatus::Draft,
                DocumentStatus::Issued,
                DocumentStatus::Paid,
            ],
            DocumentKind::Quote => &[
                DocumentStatus::Draft,
                DocumentStatus::Sent,
                DocumentStatus::Accepted,
            ],
        }
    }
}

/// Document status. Which values apply depends on the kind; there is no
/// transition validation, any status of the kind's set can replace any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Issued,
    Paid,
    Sent,
    Accepted,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Issued => "issued",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Accepted => "accepted",
        }
    }

    /// Parse a status string against the set valid for `kind`.
    pub fn parse(kind: DocumentKind, s: &str) -> Option<Self> {
        kind.statuses().iter().copied().find(|st| st.as_str() == s)
    }
}

/// Invoice or quote document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub workspace_id: i64,
    pub kind: String,
    pub number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    pub vat_percentage: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// A document with its line items and client, as served by the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentWithLines {
    #[serde(flatten)]
    pub document: Document,
    pub client: Client,
    pub lines: Vec<LineItem>,
}

/// Input for creating a document. Totals start at zero; the VAT percentage
/// comes from the column default.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub workspace_id: i64,
    pub kind: DocumentKind,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub notes: Option<String>,
}

/// Filter parameters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct ListDocumentsFilter {
    pub status: Option<DocumentStatus>,
    pub limit: Option<i64>,
}

/// Derived aggregate of a document. Always computed from the current line
/// totals, never from a previously stored subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

impl DocumentTotals {
    pub const ZERO: DocumentTotals = DocumentTotals {
        subtotal: Decimal::ZERO,
        vat_amount: Decimal::ZERO,
        total: Decimal::ZERO,
    };

    /// Derive the VAT amount and total from a line-total sum and a VAT
    /// percentage. Full precision is kept; rounding is a display concern.
    pub fn compute(subtotal: Decimal, vat_percentage: Decimal) -> Self {
        let vat_amount = subtotal * vat_percentage / Decimal::ONE_HUNDRED;
        DocumentTotals {
            subtotal,
            vat_amount,
            total: subtotal + vat_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn totals_single_line_at_21_percent() {
        // qty 2 x 25.00 with 21% VAT
        let totals = DocumentTotals::compute(dec("50.00"), dec("21"));
        assert_eq!(totals.subtotal, dec("50.00"));
        assert_eq!(totals.vat_amount, dec("10.50"));
        assert_eq!(totals.total, dec("60.50"));
    }

    #[test]
    fn totals_after_second_line() {
        let totals = DocumentTotals::compute(dec("60.00"), dec("21"));
        assert_eq!(totals.vat_amount, dec("12.60"));
        assert_eq!(totals.total, dec("72.60"));
    }

    #[test]
    fn totals_after_removing_a_line() {
        let totals = DocumentTotals::compute(dec("10.00"), dec("21"));
        assert_eq!(totals.vat_amount, dec("2.10"));
        assert_eq!(totals.total, dec("12.10"));
    }

    #[test]
    fn totals_of_empty_document_are_zero() {
        let totals = DocumentTotals::compute(Decimal::ZERO, dec("21"));
        assert_eq!(totals, DocumentTotals::ZERO);
    }

    #[test]
    fn totals_with_zero_vat() {
        let totals = DocumentTotals::compute(dec("99.99"), Decimal::ZERO);
        assert_eq!(totals.vat_amount, Decimal::ZERO);
        assert_eq!(totals.total, dec("99.99"));
    }

    #[test]
    fn invariant_holds_for_fractional_percentages() {
        let totals = DocumentTotals::compute(dec("123.45"), dec("10.5"));
        assert_eq!(totals.total, totals.subtotal + totals.vat_amount);
        assert_eq!(
            totals.vat_amount,
            dec("123.45") * dec("10.5") / Decimal::ONE_HUNDRED
        );
    }

    #[test]
    fn status_parsing_respects_kind() {
        assert_eq!(
            DocumentStatus::parse(DocumentKind::Invoice, "paid"),
            Some(DocumentStatus::Paid)
        );
        assert_eq!(DocumentStatus::parse(DocumentKind::Quote, "paid"), None);
        assert_eq!(
            DocumentStatus::parse(DocumentKind::Quote, "accepted"),
            Some(DocumentStatus::Accepted)
        );
        assert_eq!(DocumentStatus::parse(DocumentKind::Invoice, "sent"), None);
        assert_eq!(DocumentStatus::parse(DocumentKind::Invoice, "unknown"), None);
    }

    #[test]
    fn number_prefix_per_kind() {
        assert_eq!(DocumentKind::Invoice.number_prefix(), "F");
        assert_eq!(DocumentKind::Quote.number_prefix(), "P");
    }
}
