pub mod catalog;
pub mod config;
pub mod error;
pub mod governance;
pub mod mock;
pub mod render;
pub mod server;
pub mod service;
pub mod types;

pub use config::Config;
pub use error::{CopilotError, Result};
pub use service::{LiveGenerator, MockGenerator, QueryService, SqlGenerator};
pub use types::{
    ColumnInfo, Defaults, Dialect, GovernanceRules, ModeFlags, QualityChecks, QueryRequest,
    QueryResponse, TableCatalog, TenantFilter, ValidationOutcome,
};
