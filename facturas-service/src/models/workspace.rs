//! Workspace model: the tenant boundary every other entity hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a workspace. A missing slug is derived from the name.
#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    pub name: String,
    pub slug: Option<String>,
}

/// Lowercase, strip the accents common in Spanish and Catalan names, and
/// collapse every other non-alphanumeric run into a single dash.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        let mapped = match c {
            'á' | 'à' | 'ä' | 'â' => Some('a'),
            'é' | 'è' | 'ë' | 'ê' => Some('e'),
            'í' | 'ì' | 'ï' | 'î' => Some('i'),
            'ó' | 'ò' | 'ö' | 'ô' => Some('o'),
            'ú' | 'ù' | 'ü' | 'û' => Some('u'),
            'ñ' => Some('n'),
            'ç' => Some('c'),
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        };
        match mapped {
            Some(c) => slug.push(c),
            None => {
                if !slug.is_empty() && !slug.ends_with('-') {
                    slug.push('-');
                }
            }
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Nexo Digital"), "nexo-digital");
    }

    #[test]
    fn slugify_strips_accents() {
        assert_eq!(slugify("Construcción López"), "construccion-lopez");
        assert_eq!(slugify("Cañas & Barro"), "canas-barro");
    }

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("  a -- b  "), "a-b");
    }

    #[test]
    fn slugify_trims_edge_dashes() {
        assert_eq!(slugify("--hola--"), "hola");
    }

    #[test]
    fn slugify_can_be_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
