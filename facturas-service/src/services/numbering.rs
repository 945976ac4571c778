//! Sequential document numbering: `F-2025-0001`, `P-2025-0001`, ...

use crate::models::DocumentKind;
use crate::services::database::Database;
use service_core::error::AppError;
use tracing::{instrument, warn};

/// Computes the next unused number of a workspace/year/prefix sequence.
#[derive(Clone)]
pub struct NumberingService {
    db: Database,
}

impl NumberingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Next number for a workspace and year. Reads the latest stored number
    /// of the sequence and increments its sequence segment; two concurrent
    /// callers can compute the same value, which the creation path resolves
    /// via the unique constraint and one retry.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, kind = %kind.as_str()))]
    pub async fn next_document_number(
        &self,
        workspace_id: i64,
        kind: DocumentKind,
        year: i32,
    ) -> Result<String, AppError> {
        let prefix = kind.number_prefix();
        let pattern = format!("{}-{}-%", prefix, year);
        let latest = self
            .db
            .latest_document_number(workspace_id, &pattern)
            .await?;
        Ok(next_in_sequence(prefix, year, latest.as_deref()))
    }
}

/// Increment the sequence segment of the latest number, or start at 1.
///
/// A malformed segment (non-numeric) counts as 0 and therefore increments to
/// 1, restarting the sequence; this mirrors the historical behavior but is
/// logged so corrupted numbers do not pass silently.
pub fn next_in_sequence(prefix: &str, year: i32, latest: Option<&str>) -> String {
    let sequence = match latest {
        None => 1,
        Some(number) => {
            let segment = number.splitn(3, '-').nth(2).unwrap_or("0000");
            let current = match segment.parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    warn!(number = %number, "Malformed document number, sequence restarts at 1");
                    0
                }
            };
            current + 1
        }
    };
    format!("{}-{}-{:04}", prefix, year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_of_the_year() {
        assert_eq!(next_in_sequence("F", 2025, None), "F-2025-0001");
        assert_eq!(next_in_sequence("P", 2025, None), "P-2025-0001");
    }

    #[test]
    fn increments_latest() {
        assert_eq!(
            next_in_sequence("F", 2025, Some("F-2025-0001")),
            "F-2025-0002"
        );
        assert_eq!(
            next_in_sequence("F", 2025, Some("F-2025-0041")),
            "F-2025-0042"
        );
    }

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(
            next_in_sequence("P", 2026, Some("P-2026-0009")),
            "P-2026-0010"
        );
    }

    #[test]
    fn grows_past_four_digits() {
        assert_eq!(
            next_in_sequence("F", 2025, Some("F-2025-9999")),
            "F-2025-10000"
        );
    }

    #[test]
    fn malformed_segment_restarts_sequence() {
        assert_eq!(
            next_in_sequence("F", 2025, Some("F-2025-00X7")),
            "F-2025-0001"
        );
    }

    #[test]
    fn missing_segment_restarts_sequence() {
        assert_eq!(next_in_sequence("F", 2025, Some("F-2025")), "F-2025-0001");
    }
}
