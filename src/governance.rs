//! Governance and defaults input in the text formats the settings form
//! accepts, plus the bundled example configuration.

use crate::error::Result;
use crate::mock::DEFAULT_LIMIT;
use crate::types::{GovernanceRules, TenantFilter};
use std::collections::BTreeMap;
use std::path::Path;

/// One predicate per non-blank line.
pub fn parse_rls_predicates(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_pii_columns(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// `term=definition` per line; the definition may itself contain `=`.
pub fn parse_glossary(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(term, _)| !term.trim().is_empty())
        .map(|(term, definition)| (term.trim().to_string(), definition.trim().to_string()))
        .collect()
}

pub fn format_glossary(glossary: &BTreeMap<String, String>) -> String {
    glossary
        .iter()
        .map(|(term, definition)| format!("{}={}", term, definition))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Row limit input; anything unparseable or zero becomes 100.
pub fn parse_limit(text: &str) -> u64 {
    text.trim()
        .parse::<u64>()
        .ok()
        .filter(|&limit| limit != 0)
        .unwrap_or(DEFAULT_LIMIT)
}

pub fn load_governance(path: &Path) -> Result<GovernanceRules> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn example_governance() -> GovernanceRules {
    GovernanceRules {
        tenant_filter: Some(TenantFilter {
            column: "tenant_id".to_string(),
            value: "tenant_acme_corp".to_string(),
        }),
        pii_columns: Some(vec![
            "email".to_string(),
            "ssn".to_string(),
            "credit_card".to_string(),
        ]),
        rls_predicates: Some(vec!["status != 'deleted'".to_string()]),
        date_timezone: Some("America/New_York".to_string()),
    }
}

pub fn example_question() -> &'static str {
    "Show me top 10 customers by total order value in the last quarter"
}
