//! @ai:module:intent HTTP client for the benchmark results API
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultsSourceTrait, HttpResultsSource, MockResultsSource
//! @ai:module:stateless true

use crate::config::{ApiConfig, BenchmarkSpec};
use crate::error::{Result, ViewerError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// @ai:intent Trait for anything that can supply a raw result document
#[allow(async_fn_in_trait)]
pub trait ResultsSourceTrait: Send + Sync {
    /// @ai:intent Fetch the raw result document of a benchmark
    async fn fetch(&self, benchmark: &BenchmarkSpec, mode: Option<&str>) -> Result<Value>;
}

/// @ai:intent Failure body returned by the results API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// @ai:intent Results API client
pub struct HttpResultsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResultsSource {
    /// @ai:intent Create a new client from API configuration
    /// @ai:effects pure
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ViewerError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// @ai:intent Endpoint URL for a benchmark
    /// @ai:effects pure
    pub fn url_for(&self, benchmark: &BenchmarkSpec) -> String {
        format!("{}/api/{}", self.base_url, benchmark.endpoint)
    }
}

impl ResultsSourceTrait for HttpResultsSource {
    /// @ai:intent GET the result document, mapping failures to structured errors
    /// @ai:effects network
    async fn fetch(&self, benchmark: &BenchmarkSpec, mode: Option<&str>) -> Result<Value> {
        let url = self.url_for(benchmark);
        let mut request = self.client.get(&url);

        if let Some(mode) = mode {
            request = request.query(&[("mode", mode)]);
        }

        tracing::info!("Fetching {} results from {}", benchmark.name, url);

        let response = request
            .send()
            .await
            .map_err(|e| ViewerError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure_from_response(benchmark, mode, status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ViewerError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            ViewerError::MalformedDocument(format!("response is not valid JSON: {}", e))
        })
    }
}

/// @ai:intent Convert a non-success response into a user-facing error
/// @ai:effects pure, log
pub fn failure_from_response(
    benchmark: &BenchmarkSpec,
    mode: Option<&str>,
    status: u16,
    body: &str,
) -> ViewerError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no details provided".to_string()
            } else {
                trimmed.to_string()
            }
        });

    if status == 404 {
        tracing::debug!("{} not found upstream: {}", benchmark.name, detail);
        return ViewerError::NotFound {
            benchmark: display_name(benchmark, mode),
            hint: benchmark.produce_hint(mode),
        };
    }

    ViewerError::Api { status, detail }
}

/// @ai:intent Benchmark name with its mode, as shown to the user
/// @ai:effects pure
pub fn display_name(benchmark: &BenchmarkSpec, mode: Option<&str>) -> String {
    match mode {
        Some(mode) => format!("{} ({})", benchmark.name, mode),
        None => benchmark.name.clone(),
    }
}

/// @ai:intent Canned response of the mock source
#[derive(Debug, Clone)]
pub enum MockResponse {
    Document(Value),
    TransportFailure(String),
}

/// @ai:intent Mock source for testing
#[derive(Debug, Default)]
pub struct MockResultsSource {
    responses: HashMap<String, MockResponse>,
}

impl MockResultsSource {
    /// @ai:intent Create an empty mock source where every benchmark is missing
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Serve a fixed document for a benchmark name
    /// @ai:effects pure
    pub fn with_document(mut self, benchmark: &str, document: Value) -> Self {
        self.responses
            .insert(benchmark.to_string(), MockResponse::Document(document));
        self
    }

    /// @ai:intent Fail with a transport error for a benchmark name
    /// @ai:effects pure
    pub fn with_transport_failure(mut self, benchmark: &str, message: &str) -> Self {
        self.responses.insert(
            benchmark.to_string(),
            MockResponse::TransportFailure(message.to_string()),
        );
        self
    }
}

impl ResultsSourceTrait for MockResultsSource {
    /// @ai:intent Return the canned response
    /// @ai:effects pure
    async fn fetch(&self, benchmark: &BenchmarkSpec, mode: Option<&str>) -> Result<Value> {
        match self.responses.get(&benchmark.name) {
            Some(MockResponse::Document(doc)) => Ok(doc.clone()),
            Some(MockResponse::TransportFailure(message)) => {
                Err(ViewerError::Transport(message.clone()))
            }
            None => Err(failure_from_response(benchmark, mode, 404, "")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn locomo() -> BenchmarkSpec {
        ViewerConfig::default().benchmark("locomo").unwrap().clone()
    }

    /// Serve exactly one canned HTTP response and return the base URL
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    fn source_for(base_url: String) -> HttpResultsSource {
        HttpResultsSource::new(&ApiConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let source = source_for("http://localhost:8080/".to_string());
        assert_eq!(source.url_for(&locomo()), "http://localhost:8080/api/locomo");
    }

    #[test]
    fn test_not_found_maps_to_hint() {
        let err = failure_from_response(&locomo(), Some("think"), 404, r#"{"detail": "No results"}"#);

        match err {
            ViewerError::NotFound { benchmark, hint } => {
                assert_eq!(benchmark, "locomo (think)");
                assert!(hint.contains("--mode think"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_detail_body_is_surfaced() {
        let err = failure_from_response(&locomo(), None, 500, r#"{"detail": "results file is locked"}"#);
        assert_eq!(
            err.to_string(),
            "Results API error (500): results file is locked"
        );
    }

    #[test]
    fn test_non_json_failure_body_is_kept_raw() {
        let err = failure_from_response(&locomo(), None, 502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "Results API error (502): Bad Gateway");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let body = json!({"item_results": [], "overall_accuracy": 0.0}).to_string();
        let base = serve_once("200 OK", body).await;

        let doc = source_for(base).fetch(&locomo(), Some("search")).await.unwrap();
        assert_eq!(doc["overall_accuracy"], json!(0.0));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let body = json!({"detail": "LoCoMo results not found"}).to_string();
        let base = serve_once("404 Not Found", body).await;

        let err = source_for(base).fetch(&locomo(), Some("search")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source_for(format!("http://{}", addr))
            .fetch(&locomo(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::Transport(_)));
    }

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockResultsSource::new()
            .with_document("locomo", json!({"item_results": []}))
            .with_transport_failure("longmemeval", "connection reset");
        let config = ViewerConfig::default();

        assert!(source.fetch(&locomo(), None).await.is_ok());

        let lme = config.benchmark("longmemeval").unwrap();
        assert!(matches!(
            source.fetch(lme, None).await,
            Err(ViewerError::Transport(_))
        ));
    }
}
