//! Client for the NL→SQL generation backend, plus the local mock path.

use crate::config::{Config, DEFAULT_API_BASE_URL, DEFAULT_MOCK_DELAY};
use crate::error::{CopilotError, Result};
use crate::mock;
use crate::types::{Dialect, QueryRequest, QueryResponse, ValidateRequest, ValidationOutcome};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct QueryService {
    client: reqwest::Client,
    api_base_url: String,
    mock_delay: Duration,
}

impl Default for QueryService {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl QueryService {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            api_base_url,
            mock_delay: DEFAULT_MOCK_DELAY,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone()).with_mock_delay(config.mock_delay)
    }

    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = delay;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path)
    }

    /// Asks the backend to generate SQL for `request`.
    ///
    /// Any non-success status is an error; nothing is retried.
    pub async fn generate_sql(&self, request: &QueryRequest) -> Result<QueryResponse> {
        info!("Generating {} SQL via {}", request.dialect, self.api_base_url);
        self.post_generate(request).await.map_err(|e| {
            error!("Error generating SQL: {}", e);
            e
        })
    }

    async fn post_generate(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let response = self
            .client
            .post(self.endpoint("generate-sql"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CopilotError::Api(
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            ));
        }

        Ok(response.json::<QueryResponse>().await?)
    }

    /// Local stand-in for [`generate_sql`](Self::generate_sql): waits out the
    /// configured delay, then templates a response. Never touches the network.
    pub async fn generate_sql_mock(&self, request: &QueryRequest) -> QueryResponse {
        if !self.mock_delay.is_zero() {
            tokio::time::sleep(self.mock_delay).await;
        }
        mock::mock_response(request)
    }

    /// Checks `sql` with the backend. Fails open: any error yields `valid`.
    pub async fn validate_sql(&self, sql: &str, dialect: Dialect) -> ValidationOutcome {
        let body = ValidateRequest {
            sql: sql.to_string(),
            dialect,
        };
        match self.post_validate(&body).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error validating SQL: {}", e);
                ValidationOutcome::valid()
            }
        }
    }

    async fn post_validate(&self, body: &ValidateRequest) -> Result<ValidationOutcome> {
        let response = self
            .client
            .post(self.endpoint("validate-sql"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CopilotError::Api(
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            ));
        }

        Ok(response.json::<ValidationOutcome>().await?)
    }
}

/// Source of generated SQL, picked once by the caller.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, request: &QueryRequest) -> Result<QueryResponse>;
}

/// Goes through the backend
pub struct LiveGenerator {
    service: QueryService,
}

impl LiveGenerator {
    pub fn new(service: QueryService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SqlGenerator for LiveGenerator {
    async fn generate(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.service.generate_sql(request).await
    }
}

/// Templates locally
pub struct MockGenerator {
    service: QueryService,
}

impl MockGenerator {
    pub fn new(service: QueryService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SqlGenerator for MockGenerator {
    async fn generate(&self, request: &QueryRequest) -> Result<QueryResponse> {
        Ok(self.service.generate_sql_mock(request).await)
    }
}
