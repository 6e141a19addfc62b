//! Target-schema catalog embedded into extraction prompts
//!
//! The model fills entity records column by column; the catalog tells it
//! what each column means. A built-in catalog ships with the crate and can
//! be overridden from a JSON file of the same shape.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

const BUILTIN_TABLES: &str = include_str!("../assets/tables.json");

/// One described column of a target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Column name, also the JSON key the model must emit
    pub name: String,
    /// What the column holds
    pub description: String,
}

/// One target table with its column descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTable {
    /// Table name
    pub name: String,
    /// Described columns in emission order
    pub columns: Vec<SchemaColumn>,
}

/// The full set of target tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    /// All tables
    pub tables: Vec<SchemaTable>,
}

impl SchemaCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(BUILTIN_TABLES)?)
    }

    /// Load a catalog from a JSON file, same shape as the built-in one.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&SchemaTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Render the named tables as a prompt section.
    ///
    /// Unknown names are skipped silently so a trimmed override file still
    /// produces a usable prompt.
    pub fn prompt_block(&self, names: &[&str]) -> String {
        let mut block = String::new();
        for name in names {
            let Some(table) = self.table(name) else {
                continue;
            };
            let _ = writeln!(block, "## {}", table.name);
            for column in &table.columns {
                let _ = writeln!(block, "- {}: {}", column.name, column.description);
            }
            block.push('\n');
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_all_four_tables() {
        let catalog = SchemaCatalog::builtin().unwrap();
        for name in ["sites", "trenches", "features", "artifacts"] {
            assert!(catalog.table(name).is_some(), "missing table {name}");
        }
    }

    #[test]
    fn test_builtin_columns_match_entity_fields() {
        let catalog = SchemaCatalog::builtin().unwrap();
        let trenches = catalog.table("trenches").unwrap();
        let names: Vec<&str> = trenches.columns.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"trench_number"));
        assert!(names.contains(&"page_references"));

        let artifacts = catalog.table("artifacts").unwrap();
        let names: Vec<&str> = artifacts.columns.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"feature_id"));
        assert!(names.contains(&"trench_id"));
    }

    #[test]
    fn test_prompt_block_renders_headers_and_columns() {
        let catalog = SchemaCatalog::builtin().unwrap();
        let block = catalog.prompt_block(&["sites"]);
        assert!(block.starts_with("## sites"));
        assert!(block.contains("- site_name:"));
        assert!(!block.contains("## trenches"));
    }

    #[test]
    fn test_prompt_block_skips_unknown_tables() {
        let catalog = SchemaCatalog::builtin().unwrap();
        assert!(catalog.prompt_block(&["no_such_table"]).is_empty());
    }
}
