//! Request/response contracts shared with the SQL generation backend.
//!
//! Field names follow the JSON the backend speaks: snake_case for the request
//! and response envelopes, camelCase inside catalog metadata.

use crate::error::{CopilotError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Target SQL engine flavor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Snowflake,
    Postgres,
    Mysql,
    Databricks,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Snowflake,
        Dialect::Postgres,
        Dialect::Mysql,
        Dialect::Databricks,
    ];

    /// Wire name, as sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "snowflake",
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Databricks => "databricks",
        }
    }

    /// Human-readable name for display
    pub fn label(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "Snowflake",
            Dialect::Postgres => "PostgreSQL",
            Dialect::Mysql => "MySQL",
            Dialect::Databricks => "Databricks (Spark SQL)",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = CopilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "snowflake" => Ok(Dialect::Snowflake),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::Mysql),
            "databricks" => Ok(Dialect::Databricks),
            other => Err(CopilotError::UnknownDialect(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_foreign_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }
}

/// One table's metadata. Column order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TableCatalog {
    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFilter {
    pub column: String,
    pub value: String,
}

/// Advisory governance hints. Nothing here is enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_filter: Option<TenantFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pii_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rls_predicates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_timezone: Option<String>,
}

impl GovernanceRules {
    pub fn is_empty(&self) -> bool {
        self.tenant_filter.is_none()
            && self.pii_columns.is_none()
            && self.rls_predicates.is_none()
            && self.date_timezone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range_default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_default: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_definitions: Option<Vec<MetricDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_glossary: Option<BTreeMap<String, String>>,
}

impl Defaults {
    /// Defaults with nothing set
    pub fn none() -> Self {
        Self {
            time_range_default: None,
            limit_default: None,
            metric_definitions: None,
            business_glossary: None,
        }
    }
}

/// The form's initial state: 100 rows over the last 90 days.
impl Default for Defaults {
    fn default() -> Self {
        Self {
            time_range_default: Some("LAST 90 DAYS".to_string()),
            limit_default: Some(100),
            ..Self::none()
        }
    }
}

/// Request toggles for the backend. The mock generator ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_clarify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub dialect: Dialect,
    pub user_question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<Vec<TableCatalog>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance: Option<GovernanceRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeFlags>,
}

impl QueryRequest {
    pub fn builder(dialect: Dialect, question: impl Into<String>) -> QueryRequestBuilder {
        QueryRequestBuilder {
            dialect,
            question: question.into(),
            catalogs: Vec::new(),
            governance: GovernanceRules::default(),
            defaults: None,
            mode: None,
        }
    }

    /// First catalog entry, the only one the mock generator looks at
    pub fn primary_catalog(&self) -> Option<&TableCatalog> {
        self.catalogs.as_ref().and_then(|c| c.first())
    }
}

/// Assembles a request the way the form does: empty catalog lists and empty
/// governance are left out entirely.
#[derive(Debug, Clone)]
pub struct QueryRequestBuilder {
    dialect: Dialect,
    question: String,
    catalogs: Vec<TableCatalog>,
    governance: GovernanceRules,
    defaults: Option<Defaults>,
    mode: Option<ModeFlags>,
}

impl QueryRequestBuilder {
    pub fn catalogs(mut self, catalogs: Vec<TableCatalog>) -> Self {
        self.catalogs = catalogs;
        self
    }

    pub fn governance(mut self, governance: GovernanceRules) -> Self {
        self.governance = governance;
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn mode(mut self, mode: ModeFlags) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<QueryRequest> {
        if self.question.trim().is_empty() {
            return Err(CopilotError::EmptyQuestion);
        }

        Ok(QueryRequest {
            dialect: self.dialect,
            user_question: self.question,
            catalogs: (!self.catalogs.is_empty()).then_some(self.catalogs),
            governance: (!self.governance.is_empty()).then_some(self.governance),
            defaults: self.defaults,
            mode: self.mode,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityChecks {
    pub joins_reviewed: bool,
    pub filters_apply_rls: bool,
    pub uses_indices_or_partitions: bool,
    pub select_star_avoided: bool,
    pub limit_applied: bool,
}

impl QualityChecks {
    /// (key, value) pairs in wire order
    pub fn entries(&self) -> [(&'static str, bool); 5] {
        [
            ("joins_reviewed", self.joins_reviewed),
            ("filters_apply_rls", self.filters_apply_rls),
            ("uses_indices_or_partitions", self.uses_indices_or_partitions),
            ("select_star_avoided", self.select_star_avoided),
            ("limit_applied", self.limit_applied),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub sql: String,
    pub dialect: Dialect,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    pub quality_checks: QualityChecks,
    #[serde(default)]
    pub clarification_question: String,
}

/// Body of `/validate-sql`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub sql: String,
    pub dialect: Dialect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: None,
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors: Some(errors),
        }
    }
}

/// A named question/SQL pair. Nothing in this crate stores these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub id: Uuid,
    pub name: String,
    pub question: String,
    pub sql: String,
    pub dialect: Dialect,
    pub created_at: DateTime<Utc>,
}

impl SavedQuery {
    pub fn new(name: impl Into<String>, request: &QueryRequest, response: &QueryResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            question: request.user_question.clone(),
            sql: response.sql.clone(),
            dialect: response.dialect,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("Snowflake".parse::<Dialect>().unwrap(), Dialect::Snowflake);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!(" mysql ".parse::<Dialect>().unwrap(), Dialect::Mysql);
        assert!(matches!(
            "oracle".parse::<Dialect>(),
            Err(CopilotError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_dialect_wire_name() {
        let json = serde_json::to_string(&Dialect::Databricks).unwrap();
        assert_eq!(json, "\"databricks\"");
        for dialect in Dialect::ALL {
            assert_eq!(dialect.as_str().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_column_info_uses_camel_case_keys() {
        let column = ColumnInfo {
            is_primary_key: Some(true),
            ..ColumnInfo::new("order_id", "INT")
        };
        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(value["type"], "INT");
        assert_eq!(value["isPrimaryKey"], true);
        assert!(value.get("isForeignKey").is_none());
    }

    #[test]
    fn test_catalog_deserializes_row_count() {
        let catalog: TableCatalog = serde_json::from_str(
            r#"{"schema":"sales","table":"orders",
                "columns":[{"name":"id","type":"INT"}],"rowCount":42}"#,
        )
        .unwrap();
        assert_eq!(catalog.row_count, Some(42));
        assert_eq!(catalog.qualified_name(), "sales.orders");
        assert_eq!(catalog.columns[0].data_type, "INT");
    }

    #[test]
    fn test_builder_omits_empty_sections() {
        let request = QueryRequest::builder(Dialect::Postgres, "count orders")
            .governance(GovernanceRules::default())
            .build()
            .unwrap();
        assert!(request.catalogs.is_none());
        assert!(request.governance.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dialect"], "postgres");
        assert!(json.get("catalogs").is_none());
        assert!(json.get("governance").is_none());
    }

    #[test]
    fn test_builder_rejects_blank_question() {
        let result = QueryRequest::builder(Dialect::Mysql, "   ").build();
        assert!(matches!(result, Err(CopilotError::EmptyQuestion)));
    }

    #[test]
    fn test_response_tolerates_missing_metadata() {
        let response: QueryResponse = serde_json::from_str(
            r#"{
                "sql": "SELECT 1;",
                "dialect": "mysql",
                "quality_checks": {
                    "joins_reviewed": false,
                    "filters_apply_rls": false,
                    "uses_indices_or_partitions": false,
                    "select_star_avoided": true,
                    "limit_applied": false
                }
            }"#,
        )
        .unwrap();
        assert!(response.assumptions.is_empty());
        assert!(response.parameters.is_empty());
        assert_eq!(response.clarification_question, "");
    }

    #[test]
    fn test_quality_checks_entries_order() {
        let checks = QualityChecks {
            joins_reviewed: true,
            filters_apply_rls: false,
            uses_indices_or_partitions: true,
            select_star_avoided: true,
            limit_applied: true,
        };
        let keys: Vec<_> = checks.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys[1], "filters_apply_rls");
        assert!(!checks.entries()[1].1);
    }

    #[test]
    fn test_saved_query_copies_request_and_response() {
        let request = QueryRequest::builder(Dialect::Postgres, "revenue by month")
            .build()
            .unwrap();
        let response = QueryResponse {
            sql: "SELECT 1;".to_string(),
            dialect: Dialect::Postgres,
            summary: String::new(),
            assumptions: Vec::new(),
            parameters: BTreeMap::new(),
            quality_checks: QualityChecks {
                joins_reviewed: true,
                filters_apply_rls: false,
                uses_indices_or_partitions: true,
                select_star_avoided: true,
                limit_applied: true,
            },
            clarification_question: String::new(),
        };

        let first = SavedQuery::new("monthly revenue", &request, &response);
        let second = SavedQuery::new("monthly revenue", &request, &response);
        assert_eq!(first.name, "monthly revenue");
        assert_eq!(first.question, "revenue by month");
        assert_eq!(first.sql, "SELECT 1;");
        assert_eq!(first.dialect, Dialect::Postgres);
        assert_ne!(first.id, second.id);

        let json = serde_json::to_value(&first).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["id"], first.id.to_string());
    }

    #[test]
    fn test_default_defaults_match_form() {
        let defaults = Defaults::default();
        assert_eq!(defaults.limit_default, Some(100));
        assert_eq!(defaults.time_range_default.as_deref(), Some("LAST 90 DAYS"));
        assert!(Defaults::none().limit_default.is_none());
    }
}
