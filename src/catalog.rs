//! Table catalog input: the `name:type` column format, the ordered catalog
//! list with per-entry expansion state, and the bundled sample catalog.

use crate::error::Result;
use crate::types::{ColumnInfo, TableCatalog};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

pub const DEFAULT_COLUMN_TYPE: &str = "VARCHAR";

/// Parses one column per non-blank line, `name:type`. Missing types fall back
/// to `VARCHAR`.
pub fn parse_columns(text: &str) -> Vec<ColumnInfo> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.split(':').map(str::trim);
            let name = parts.next().unwrap_or_default();
            let data_type = parts
                .next()
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_COLUMN_TYPE);
            ColumnInfo::new(name, data_type)
        })
        .collect()
}

impl TableCatalog {
    pub fn from_column_lines(
        schema: impl Into<String>,
        table: impl Into<String>,
        columns: &str,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            columns: parse_columns(columns),
            ..Default::default()
        }
    }
}

/// Reads a JSON array of catalogs.
pub fn load_catalogs(path: &Path) -> Result<Vec<TableCatalog>> {
    let content = std::fs::read_to_string(path)?;
    let catalogs: Vec<TableCatalog> = serde_json::from_str(&content)?;
    info!("Loaded {} catalog(s) from {}", catalogs.len(), path.display());
    Ok(catalogs)
}

/// Catalogs in insertion order with an expanded/collapsed flag per entry.
#[derive(Debug, Clone, Default)]
pub struct CatalogList {
    catalogs: Vec<TableCatalog>,
    expanded: BTreeSet<usize>,
}

impl CatalogList {
    pub fn new(catalogs: Vec<TableCatalog>) -> Self {
        Self {
            catalogs,
            expanded: BTreeSet::new(),
        }
    }

    pub fn add(&mut self, catalog: TableCatalog) {
        self.catalogs.push(catalog);
    }

    /// Removes the entry at `index`, keeping later entries' expansion state
    /// attached to them.
    pub fn remove(&mut self, index: usize) -> Option<TableCatalog> {
        if index >= self.catalogs.len() {
            return None;
        }
        let removed = self.catalogs.remove(index);
        self.expanded = self
            .expanded
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        Some(removed)
    }

    /// Flips the expansion flag; returns the new state.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.catalogs.len() {
            return false;
        }
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
            return true;
        }
        false
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn as_slice(&self) -> &[TableCatalog] {
        &self.catalogs
    }

    pub fn into_vec(self) -> Vec<TableCatalog> {
        self.catalogs
    }
}

fn key_column(name: &str, data_type: &str, primary: bool) -> ColumnInfo {
    ColumnInfo {
        is_primary_key: primary.then_some(true),
        is_foreign_key: (!primary).then_some(true),
        ..ColumnInfo::new(name, data_type)
    }
}

/// `sales.orders` and `sales.customers`
pub fn example_catalogs() -> Vec<TableCatalog> {
    vec![
        TableCatalog {
            schema: "sales".to_string(),
            table: "orders".to_string(),
            columns: vec![
                key_column("order_id", "INT", true),
                key_column("customer_id", "INT", false),
                ColumnInfo::new("order_date", "TIMESTAMP"),
                ColumnInfo::new("total_amount", "DECIMAL(10,2)"),
                ColumnInfo::new("status", "VARCHAR(50)"),
                ColumnInfo::new("tenant_id", "VARCHAR(100)"),
            ],
            row_count: Some(125_000),
            comment: Some("Main sales orders table".to_string()),
            ..Default::default()
        },
        TableCatalog {
            schema: "sales".to_string(),
            table: "customers".to_string(),
            columns: vec![
                key_column("customer_id", "INT", true),
                ColumnInfo::new("email", "VARCHAR(255)"),
                ColumnInfo::new("full_name", "VARCHAR(255)"),
                ColumnInfo::new("created_at", "TIMESTAMP"),
                ColumnInfo::new("tenant_id", "VARCHAR(100)"),
            ],
            row_count: Some(45_000),
            comment: Some("Customer information".to_string()),
            ..Default::default()
        },
    ]
}
