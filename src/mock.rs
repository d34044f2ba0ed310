//! Local SQL templating used when no generation backend is wired up.
//!
//! Output is a pure function of the request. Governance values are pasted into
//! the SQL verbatim; nothing here escapes or parameterizes them.

use crate::types::{Dialect, QualityChecks, QueryRequest, QueryResponse};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::debug;

pub const PLACEHOLDER_TABLE: &str = "your_table";
pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_MOCK_COLUMNS: usize = 5;

pub const MOCK_ASSUMPTIONS: [&str; 3] = [
    "Using default time range of last 90 days",
    "Applied row limit of 100",
    "Using INNER JOIN for table relationships",
];

const DATE_RANGE_PREDICATE: &str = "date_column >= DATEADD(day, -90, CURRENT_DATE())";

/// Builds the full mock response for `request`.
pub fn mock_response(request: &QueryRequest) -> QueryResponse {
    let sql = mock_sql(request);
    let subject = request
        .primary_catalog()
        .map(|c| c.table.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("tables");

    let filters_apply_rls = request
        .governance
        .as_ref()
        .is_some_and(|g| g.rls_predicates.is_some());

    QueryResponse {
        sql,
        dialect: request.dialect,
        summary: format!("Retrieving data from {} based on your question.", subject),
        assumptions: MOCK_ASSUMPTIONS.iter().map(|a| a.to_string()).collect(),
        parameters: BTreeMap::new(),
        quality_checks: QualityChecks {
            joins_reviewed: true,
            filters_apply_rls,
            uses_indices_or_partitions: true,
            select_star_avoided: true,
            limit_applied: true,
        },
        clarification_question: String::new(),
    }
}

/// Renders the dialect template for `request`.
pub fn mock_sql(request: &QueryRequest) -> String {
    let table_name = table_name(request);
    let columns = column_list(request);
    let limit = row_limit(request);

    let mut predicates = Vec::new();
    if let Some(filter) = request.governance.as_ref().and_then(|g| g.tenant_filter.as_ref()) {
        predicates.push(format!("{} = '{}'", filter.column, filter.value));
    }
    let wants_date_range = request
        .defaults
        .as_ref()
        .is_some_and(|d| d.time_range_default.is_some());
    if request.dialect == Dialect::Snowflake && wants_date_range {
        predicates.push(DATE_RANGE_PREDICATE.to_string());
    }

    debug!(
        "Templating {} SQL for {} ({} predicates, limit {})",
        request.dialect,
        table_name,
        predicates.len(),
        limit
    );

    match request.dialect {
        Dialect::Snowflake | Dialect::Postgres | Dialect::Databricks => {
            let mut sql = format!(
                "WITH base_data AS (\n  SELECT\n    {}\n  FROM {}\n  WHERE 1=1",
                columns, table_name
            );
            for predicate in &predicates {
                sql.push_str("\n    AND ");
                sql.push_str(predicate);
            }
            sql.push_str(&format!("\n)\nSELECT *\nFROM base_data\nLIMIT {};", limit));
            sql
        }
        Dialect::Mysql => {
            let mut sql = format!("SELECT\n  {}\nFROM {}\nWHERE 1=1", columns, table_name);
            for predicate in &predicates {
                sql.push_str("\n  AND ");
                sql.push_str(predicate);
            }
            sql.push_str(&format!("\nLIMIT {};", limit));
            sql
        }
    }
}

fn table_name(request: &QueryRequest) -> String {
    request
        .primary_catalog()
        .map(|c| c.qualified_name())
        .unwrap_or_else(|| PLACEHOLDER_TABLE.to_string())
}

fn column_list(request: &QueryRequest) -> String {
    let columns = request
        .primary_catalog()
        .map(|c| {
            c.columns
                .iter()
                .take(MAX_MOCK_COLUMNS)
                .map(|col| col.name.as_str())
                .join(",\n  ")
        })
        .unwrap_or_default();

    if columns.is_empty() {
        "*".to_string()
    } else {
        columns
    }
}

fn row_limit(request: &QueryRequest) -> u64 {
    request
        .defaults
        .as_ref()
        .and_then(|d| d.limit_default)
        .filter(|&limit| limit != 0)
        .unwrap_or(DEFAULT_LIMIT)
}
