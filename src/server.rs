//! Development backend serving the mock generator over the same HTTP contract
//! as the real one. Plain tokio sockets, HTTP/1.1, one request per connection.

use crate::error::Result;
use crate::mock;
use crate::types::{QueryRequest, ValidateRequest, ValidationOutcome};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REQUEST_BYTES: usize = 1_000_000;

/// Accepts connections forever, one task each.
pub async fn serve(listener: TcpListener) -> Result<()> {
    info!("Query Copilot dev backend listening on {}", listener.local_addr()?);
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!("New connection from: {}", addr);
        tokio::spawn(handle_connection(stream));
    }
}

async fn handle_connection(mut stream: TcpStream) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    let read_result = timeout(READ_TIMEOUT, async {
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            if request_complete(&buffer) || buffer.len() > MAX_REQUEST_BYTES {
                break;
            }
        }
        Ok::<(), std::io::Error>(())
    })
    .await;

    match read_result {
        Err(_) => {
            warn!("Request read timeout");
            return;
        }
        Ok(Err(e)) => {
            warn!("Failed to read from stream: {}", e);
            return;
        }
        Ok(Ok(())) => {}
    }

    if buffer.is_empty() {
        return;
    }

    let response = match String::from_utf8(buffer) {
        Ok(request) => handle_request(&request),
        Err(e) => {
            warn!("Failed to parse request as UTF-8: {}", e);
            create_response(400, "Bad Request", r#"{"error":"request is not valid UTF-8"}"#)
        }
    };

    if let Err(e) = stream.write_all(response.as_bytes()).await {
        warn!("Failed to write response: {}", e);
    }
    let _ = stream.shutdown().await;
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn request_complete(buffer: &[u8]) -> bool {
    let Some(body_start) = header_end(buffer) else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buffer[..body_start]);
    let content_length = extract_content_length(&headers).unwrap_or(0);
    body_start
        .checked_add(content_length)
        .is_some_and(|end| buffer.len() >= end)
}

fn extract_content_length(request: &str) -> Option<usize> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Routes one raw HTTP request and returns the raw HTTP response.
pub fn handle_request(request: &str) -> String {
    let Some(request_line) = request.lines().next() else {
        return create_response(400, "Bad Request", "{}");
    };
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return create_response(400, "Bad Request", "{}");
    };

    let path = target.split('?').next().unwrap_or_default().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };
    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default();

    debug!("Request: {} {}", method, path);

    match (method, path) {
        ("GET", "/api/health") => {
            create_response(200, "OK", r#"{"status":"ok","service":"query-copilot"}"#)
        }
        ("POST", "/api/generate-sql") => match serde_json::from_str::<QueryRequest>(body) {
            Ok(query) => {
                info!("Generating mock {} SQL", query.dialect);
                json_response(&mock::mock_response(&query))
            }
            Err(e) => bad_request(&e),
        },
        ("POST", "/api/validate-sql") => match serde_json::from_str::<ValidateRequest>(body) {
            Ok(validate) => {
                let outcome = if validate.sql.trim().is_empty() {
                    ValidationOutcome::invalid(vec!["SQL is empty".to_string()])
                } else {
                    ValidationOutcome::valid()
                };
                json_response(&outcome)
            }
            Err(e) => bad_request(&e),
        },
        _ => create_response(404, "Not Found", r#"{"error":"not found"}"#),
    }
}

fn bad_request(err: &serde_json::Error) -> String {
    warn!("Rejecting request body: {}", err);
    let body = serde_json::json!({ "error": err.to_string() });
    create_response(400, "Bad Request", &body.to_string())
}

fn json_response<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(body) => create_response(200, "OK", &body),
        Err(e) => create_response(
            500,
            "Internal Server Error",
            &serde_json::json!({ "error": e.to_string() }).to_string(),
        ),
    }
}

fn create_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Connection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(path: &str, body: &str) -> String {
        format!(
            "POST {} HTTP/1.1\r\nHost: localhost\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            path,
            body.len(),
            body
        )
    }

    #[test]
    fn test_health() {
        let response = handle_request("GET /api/health/ HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"{"status":"ok","service":"query-copilot"}"#));
    }

    #[test]
    fn test_generate_returns_mock() {
        let response = handle_request(&post(
            "/api/generate-sql",
            r#"{"dialect":"mysql","user_question":"all rows"}"#,
        ));
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("FROM your_table"));
    }

    #[test]
    fn test_generate_rejects_bad_body() {
        let response = handle_request(&post("/api/generate-sql", r#"{"dialect":"oracle"}"#));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));
    }

    #[test]
    fn test_validate_empty_sql() {
        let response = handle_request(&post(
            "/api/validate-sql",
            r#"{"sql":"  ","dialect":"postgres"}"#,
        ));
        assert!(response.ends_with(r#"{"valid":false,"errors":["SQL is empty"]}"#));

        let response = handle_request(&post(
            "/api/validate-sql",
            r#"{"sql":"SELECT 1","dialect":"postgres"}"#,
        ));
        assert!(response.ends_with(r#"{"valid":true}"#));
    }

    #[test]
    fn test_unknown_route() {
        let response = handle_request("DELETE /api/generate-sql HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn test_request_complete_waits_for_body() {
        let full = post("/api/validate-sql", r#"{"sql":"x","dialect":"mysql"}"#);
        assert!(request_complete(full.as_bytes()));
        assert!(!request_complete(&full.as_bytes()[..full.len() - 3]));
        assert!(!request_complete(b"GET / HTTP/1.1\r\nHost: x\r\n"));
    }

    #[test]
    fn test_request_complete_with_huge_content_length() {
        let request = b"POST /api/validate-sql HTTP/1.1\r\n\
            Content-Length: 18446744073709551615\r\n\r\n{}";
        assert!(!request_complete(request));
    }
}
