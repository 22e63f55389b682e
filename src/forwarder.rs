//! HTTP forwarding of assembled queries to the proxy backend.
//!
//! The backend contract: `POST {backend_url}/query` with a form body whose
//! single `query` field holds the base64 of the assembled query string. A
//! 2xx response carries a JSON array of rows; any other status carries a
//! plain text body.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ServerConfig;

/// A failed backend exchange. Rendered to the caller as a plain message in
/// place of result rows.
#[derive(Debug, Error)]
enum ForwardError {
    #[error("Error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Transmits assembled query strings to the proxy backend.
///
/// One instance per server; the underlying `reqwest::Client` pools
/// connections internally.
pub struct Forwarder {
    config: ServerConfig,
    http: Client,
}

impl Forwarder {
    /// Create a forwarder from resolved configuration.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    /// Submit an assembled query to the backend's `/query` endpoint.
    ///
    /// Returns the backend's row array on success. A non-success status or a
    /// transport failure (timeout, connection error, unreadable body) is
    /// folded into a one-element row list holding the message. One attempt
    /// per call, no retries.
    pub async fn submit(&self, query: &str) -> Vec<Value> {
        match self.exchange(query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "query forwarding failed");
                vec![Value::String(e.to_string())]
            }
        }
    }

    async fn exchange(&self, query: &str) -> Result<Vec<Value>, ForwardError> {
        let url = format!("{}/query", self.config.backend_url);
        let encoded = base64::engine::general_purpose::STANDARD.encode(query.as_bytes());
        debug!(url = %url, "forwarding query");

        let resp = self
            .http
            .post(&url)
            .form(&[("query", encoded.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let body = resp.text().await?;
            Err(ForwardError::Backend {
                status: status.as_u16(),
                body: body.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn forwarder_for(url: &str) -> Forwarder {
        Forwarder::new(ServerConfig {
            backend_url: url.to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_backend_rows_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let query = "SELECT url FROM proxy WHERE status_code=200 LIMIT 5";
        let expected_b64 = base64::engine::general_purpose::STANDARD.encode(query.as_bytes());

        let m = server
            .mock("POST", "/query")
            .match_body(Matcher::UrlEncoded("query".into(), expected_b64))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"url":"https://a.example"},{"url":"https://b.example"}]"#)
            .create_async()
            .await;

        let rows = forwarder_for(&server.url()).submit(query).await;
        m.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["url"], "https://a.example");
    }

    #[tokio::test]
    async fn backend_error_becomes_single_message_row() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/query")
            .with_status(500)
            .with_body("db locked")
            .create_async()
            .await;

        let rows = forwarder_for(&server.url())
            .submit("SELECT url FROM proxy WHERE status_code=200 LIMIT 5")
            .await;
        assert_eq!(rows, vec![Value::String("Error 500: db locked".to_string())]);
    }

    #[tokio::test]
    async fn backend_error_body_is_trimmed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/query")
            .with_status(400)
            .with_body("bad query\n")
            .create_async()
            .await;

        let rows = forwarder_for(&server.url())
            .submit("SELECT url FROM proxy WHERE status_code=200 LIMIT 5")
            .await;
        assert_eq!(rows, vec![Value::String("Error 400: bad query".to_string())]);
    }

    #[tokio::test]
    async fn unreachable_backend_reports_request_failed() {
        // Nothing listens on this port.
        let rows = forwarder_for("http://127.0.0.1:1")
            .submit("SELECT url FROM proxy WHERE status_code=200 LIMIT 5")
            .await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].as_str().unwrap().starts_with("Request failed:"));
    }

    #[tokio::test]
    async fn silent_backend_times_out_as_request_failed() {
        // Bound but never accepted: the connection parks in the listen
        // backlog and the response never arrives.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let forwarder = Forwarder::new(ServerConfig {
            backend_url: format!("http://{addr}"),
            request_timeout_secs: 1,
        })
        .unwrap();

        let rows = forwarder
            .submit("SELECT url FROM proxy WHERE status_code=200 LIMIT 5")
            .await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].as_str().unwrap().starts_with("Request failed:"));
    }

    #[tokio::test]
    async fn non_array_success_body_reports_request_failed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let rows = forwarder_for(&server.url())
            .submit("SELECT url FROM proxy WHERE status_code=200 LIMIT 5")
            .await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].as_str().unwrap().starts_with("Request failed:"));
    }

    #[test]
    fn base64_round_trips_non_ascii_query_text() {
        let query = "SELECT url FROM proxy WHERE req.body like 'пароль ñandú 密码' LIMIT 10";
        let encoded = base64::engine::general_purpose::STANDARD.encode(query.as_bytes());
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), query);
    }
}
