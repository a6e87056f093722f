//! # Backend HTTP Client
//!
//! Thin fetch wrapper over `reqwest` bound to a backend base URL.
//! Responses are decoded as JSON or text depending on `Content-Type`.

use pay_core::{PaymentError, PaymentResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Text(_) => None,
        }
    }
}

/// Status and decoded body of a response, successful or not
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: ApiResponse,
}

/// Per-request options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// Builder: add a header (overrides the default `Content-Type`)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// HTTP client bound to a backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>) -> PaymentResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(30));

        let http = builder
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// Absolute `http...` endpoints are used verbatim, anything else is
    /// joined onto the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url,
                endpoint.strip_prefix('/').unwrap_or(endpoint)
            )
        }
    }

    /// Send a request and decode the body without judging the status
    pub async fn execute(&self, endpoint: &str, options: RequestOptions) -> PaymentResult<RawResponse> {
        let url = self.url_for(endpoint);
        debug!("{} {}", options.method, url);

        let mut request = self.http.request(options.method.clone(), &url);
        if !options
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
        {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            error!("API request error for {}: {}", url, e);
            PaymentError::Network(e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let body = if is_json {
            let value = serde_json::from_str(&text).map_err(|e| {
                PaymentError::Serialization(format!("Invalid JSON from {}: {}", url, e))
            })?;
            ApiResponse::Json(value)
        } else {
            ApiResponse::Text(text)
        };

        Ok(RawResponse { status, body })
    }

    /// Send a request, failing with `PaymentError::Request` on non-success
    pub async fn fetch(&self, endpoint: &str, options: RequestOptions) -> PaymentResult<ApiResponse> {
        let response = self.execute(endpoint, options).await?;

        if !response.status.is_success() {
            let err = PaymentError::Request {
                status: response.status.as_u16(),
                status_text: response
                    .status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string(),
            };
            error!("API request error for {}: {}", self.url_for(endpoint), err);
            return Err(err);
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_for() {
        let client = ApiClient::new("http://localhost:8888").unwrap();
        assert_eq!(client.url_for("/prefer"), "http://localhost:8888/prefer");
        assert_eq!(client.url_for("prefer"), "http://localhost:8888/prefer");
        assert_eq!(
            client.url_for("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[tokio::test]
    async fn test_fetch_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "hello": "world" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let body = client
            .fetch("/echo", RequestOptions::post(json!({ "hello": "world" })))
            .await
            .unwrap();
        assert_eq!(body, ApiResponse::Json(json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_fetch_decodes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let body = client.fetch("health", RequestOptions::get()).await.unwrap();
        assert_eq!(body, ApiResponse::Text("pong".to_string()));
        assert!(body.as_json().is_none());
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.fetch("/anything", RequestOptions::get()).await.unwrap_err();
        match &err {
            PaymentError::Request { status, status_text } => {
                assert_eq!(*status, 503);
                assert_eq!(status_text, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "API request failed: 503 Service Unavailable");
    }

    #[tokio::test]
    async fn test_execute_keeps_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad" })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let response = client.execute("/x", RequestOptions::get()).await.unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.as_json().unwrap()["error"], "bad");
    }

    #[tokio::test]
    async fn test_caller_header_replaces_default_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "text/plain"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let options = RequestOptions::post(json!("raw")).with_header("Content-Type", "text/plain");
        let body = client.fetch("/raw", options).await.unwrap();
        assert_eq!(body, ApiResponse::Text(String::new()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.fetch("/x", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Network(_)));
    }
}
