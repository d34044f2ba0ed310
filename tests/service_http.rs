use query_copilot::catalog::example_catalogs;
use query_copilot::governance::example_governance;
use query_copilot::{
    server, CopilotError, Defaults, Dialect, LiveGenerator, QueryRequest, QueryService,
    SqlGenerator, ValidationOutcome,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Starts the dev backend on an ephemeral port and returns its API base URL.
async fn spawn_dev_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener));
    format!("http://{}/api", addr)
}

/// Answers every request with `status_line` and an empty body.
async fn spawn_canned_backend(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                read_full_request(&mut stream).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status_line
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    format!("http://{}/api", addr)
}

async fn read_full_request(stream: &mut tokio::net::TcpStream) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buffer);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= end + 4 + length {
                return;
            }
        }
    }
}

fn sales_request(dialect: Dialect) -> QueryRequest {
    QueryRequest::builder(dialect, "Show me top 10 customers by total order value")
        .catalogs(example_catalogs())
        .governance(example_governance())
        .defaults(Defaults::default())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_live_generate_against_dev_backend() {
    let service = QueryService::new(spawn_dev_backend().await);
    let request = sales_request(Dialect::Snowflake);

    let response = service.generate_sql(&request).await.unwrap();
    assert_eq!(response.dialect, Dialect::Snowflake);
    assert!(response.sql.contains("FROM sales.orders"));
    assert!(response.quality_checks.filters_apply_rls);

    let local = QueryService::default()
        .with_mock_delay(std::time::Duration::ZERO)
        .generate_sql_mock(&request)
        .await;
    assert_eq!(response, local);
}

#[tokio::test]
async fn test_live_generator_trait_object() {
    let generator: Box<dyn SqlGenerator> =
        Box::new(LiveGenerator::new(QueryService::new(spawn_dev_backend().await)));
    let response = generator.generate(&sales_request(Dialect::Mysql)).await.unwrap();
    assert!(response.sql.starts_with("SELECT\n  order_id,"));
}

#[tokio::test]
async fn test_validate_against_dev_backend() {
    let service = QueryService::new(spawn_dev_backend().await);
    assert_eq!(
        service.validate_sql("SELECT 1", Dialect::Postgres).await,
        ValidationOutcome::valid()
    );

    let outcome = service.validate_sql("", Dialect::Postgres).await;
    assert!(!outcome.valid);
    assert_eq!(outcome.errors, Some(vec!["SQL is empty".to_string()]));
}

#[tokio::test]
async fn test_generate_surfaces_server_error() {
    let service = QueryService::new(spawn_canned_backend("500 Internal Server Error").await);
    match service.generate_sql(&sales_request(Dialect::Postgres)).await {
        Err(CopilotError::Api(status)) => assert_eq!(status, "Internal Server Error"),
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_validate_fails_open_on_server_error() {
    let service = QueryService::new(spawn_canned_backend("503 Service Unavailable").await);
    assert_eq!(
        service.validate_sql("SELEC nonsense", Dialect::Mysql).await,
        ValidationOutcome::valid()
    );
}

#[tokio::test]
async fn test_validate_fails_open_when_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = QueryService::new(format!("http://{}/api", addr));
    assert_eq!(
        service.validate_sql("SELECT 1", Dialect::Snowflake).await,
        ValidationOutcome::valid()
    );
    assert!(matches!(
        service.generate_sql(&sales_request(Dialect::Snowflake)).await,
        Err(CopilotError::Http(_))
    ));
}

#[tokio::test]
async fn test_generate_rejects_undecodable_body() {
    let service = QueryService::new(spawn_canned_backend("200 OK").await);
    assert!(service.generate_sql(&sales_request(Dialect::Mysql)).await.is_err());
}
