//! # MercadoPago Service
//!
//! Backend calls for Checkout Pro: creating payment preferences and
//! verifying payment status, plus the display helpers the UI needs.

use crate::client::{ApiClient, ApiResponse, RequestOptions};
use crate::config::{ApiConfig, MercadoPagoEndpoints};
use chrono::Utc;
use pay_core::{
    format_currency, status_info, Currency, ErrorInfo, PaymentError, PaymentPreference,
    PaymentRecord, PaymentResult, PreferenceCreated, StatusInfo, DEFAULT_EXPIRATION_DAYS,
};
use reqwest::StatusCode;
use tracing::{error, info, instrument};

/// Client for the backend's MercadoPago endpoints
#[derive(Debug, Clone)]
pub struct MercadoPagoService {
    config: ApiConfig,
    endpoints: MercadoPagoEndpoints,
    client: ApiClient,
}

impl MercadoPagoService {
    pub fn new(config: ApiConfig) -> PaymentResult<Self> {
        let client = ApiClient::new(config.base_url.clone())?;
        let endpoints = config.mercado_pago_endpoints();
        Ok(Self {
            config,
            endpoints,
            client,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Create a preference that expires in [`DEFAULT_EXPIRATION_DAYS`] days
    pub async fn create_payment_preference(&self, id_url: &str, quantity: i64) -> PaymentResult<String> {
        self.create_payment_preference_expiring(id_url, quantity, DEFAULT_EXPIRATION_DAYS)
            .await
    }

    /// Create a payment preference in the backend and return its id
    #[instrument(skip(self))]
    pub async fn create_payment_preference_expiring(
        &self,
        id_url: &str,
        quantity: i64,
        expiration_days: i64,
    ) -> PaymentResult<String> {
        let preference = PaymentPreference::new(id_url, quantity, expiration_days, Utc::now())?;
        let body = serde_json::to_value(&preference)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;

        let response = self
            .client
            .execute(&self.endpoints.create_preference, RequestOptions::post(body))
            .await?;

        if !response.status.is_success() {
            let message = response
                .body
                .as_json()
                .and_then(|v| v.get("error"))
                .and_then(|v| v.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or("Failed to create payment preference")
                .to_string();
            error!(
                "Payment creation failed: status={}, error={}",
                response.status, message
            );
            return Err(PaymentError::Backend {
                status: response.status.as_u16(),
                message,
            });
        }

        let created: PreferenceCreated = match response.body {
            ApiResponse::Json(value) => serde_json::from_value(value),
            ApiResponse::Text(text) => serde_json::from_str(&text),
        }
        .map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse preference response: {}", e))
        })?;

        info!(
            "Created payment preference: id={}, expires_at={}",
            created.id,
            preference.expires_at_iso()
        );
        Ok(created.id)
    }

    /// Fetch the payment record for `payment_id` from the backend
    #[instrument(skip(self))]
    pub async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentRecord> {
        if payment_id.trim().is_empty() {
            return Err(PaymentError::validation(
                "payment_id",
                "Payment ID is required",
            ));
        }

        let response = self
            .client
            .execute(&self.endpoints.verify_payment(payment_id), RequestOptions::get())
            .await?;

        match response.status {
            StatusCode::NOT_FOUND => {
                error!("Payment verification error: payment {} not found", payment_id);
                return Err(PaymentError::NotFound {
                    payment_id: payment_id.to_string(),
                });
            }
            status if !status.is_success() => {
                error!("Payment verification error: status={}", status);
                return Err(PaymentError::Verification {
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let record: PaymentRecord = match response.body {
            ApiResponse::Json(value) => serde_json::from_value(value),
            ApiResponse::Text(text) => serde_json::from_str(&text),
        }
        .map_err(|e| PaymentError::Serialization(format!("Failed to parse payment record: {}", e)))?;

        info!(
            "Verified payment {}: status={}",
            payment_id,
            record.payment_status()
        );
        Ok(record)
    }

    /// Display metadata for a provider status string
    pub fn status_info(&self, status: &str) -> StatusInfo {
        status_info(status)
    }

    /// User-facing classification of an error
    pub fn classify_error(&self, err: &PaymentError) -> ErrorInfo {
        err.classify()
    }

    /// Format an amount the way the checkout displays it
    pub fn format_currency(&self, amount: f64, currency: Currency) -> String {
        format_currency(amount, currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use pay_core::{ErrorKind, PaymentStatus, Severity};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> MercadoPagoService {
        MercadoPagoService::new(ApiConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_create_preference_sends_expiration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prefer"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "123456789-pref-abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let before = Utc::now();
        let id = service
            .create_payment_preference_expiring("short-url-1", 3, 5)
            .await
            .unwrap();
        let after = Utc::now();
        assert_eq!(id, "123456789-pref-abc");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["idUrl"], "short-url-1");
        assert_eq!(body["quantity"], 3);

        let expires_at = body["expires_at"].as_str().unwrap();
        assert!(expires_at.ends_with('Z'));
        let expires_at = DateTime::parse_from_rfc3339(expires_at).unwrap().with_timezone(&Utc);
        let slack = Duration::milliseconds(1);
        assert!(expires_at >= before + Duration::days(5) - slack);
        assert!(expires_at <= after + Duration::days(5) + slack);
    }

    #[tokio::test]
    async fn test_create_preference_defaults_to_seven_days() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prefer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "123456789-pref" })))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let before = Utc::now();
        service.create_payment_preference("abc", 1).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let expires_at = DateTime::parse_from_rfc3339(body["expires_at"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        let delta = expires_at - before;
        assert!(delta >= Duration::days(7) - Duration::milliseconds(1));
        assert!(delta < Duration::days(7) + Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_create_preference_validation_skips_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        for (id_url, quantity) in [("abc", 0), ("abc", -1), ("", 1)] {
            let err = service
                .create_payment_preference(id_url, quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, PaymentError::Validation { .. }), "{err:?}");
            assert_eq!(service.classify_error(&err).kind, ErrorKind::Validation);
        }

        let err = service
            .create_payment_preference_expiring("abc", 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Validation {
                field: "expiration_days",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_create_preference_surfaces_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prefer"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "idUrl does not exist" })),
            )
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.create_payment_preference("ghost", 1).await.unwrap_err();
        assert_eq!(err.to_string(), "idUrl does not exist");
        assert!(matches!(err, PaymentError::Backend { status: 400, .. }));
        assert_eq!(service.classify_error(&err).kind, ErrorKind::PaymentError);
    }

    #[tokio::test]
    async fn test_create_preference_default_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.create_payment_preference("abc", 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create payment preference");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_create_preference_requires_id_in_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.create_payment_preference("abc", 1).await.unwrap_err();
        assert!(matches!(err, PaymentError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_verify_payment_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/987654/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 987654,
                "status": "approved",
                "transaction_amount": 25.0
            })))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let record = service.verify_payment("987654").await.unwrap();
        assert_eq!(record.payment_status(), PaymentStatus::Approved);
        assert_eq!(record.details["transaction_amount"], 25.0);
    }

    #[tokio::test]
    async fn test_verify_payment_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/missing-id/verify"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.verify_payment("missing-id").await.unwrap_err();
        assert!(matches!(err, PaymentError::NotFound { .. }));

        let info = service.classify_error(&err);
        assert_eq!(info.kind, ErrorKind::NotFound);
        assert_eq!(info.message, "Pagamento não encontrado");
    }

    #[tokio::test]
    async fn test_verify_payment_other_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.verify_payment("123").await.unwrap_err();
        assert!(matches!(err, PaymentError::Verification { status: 500 }));
    }

    #[tokio::test]
    async fn test_verify_payment_requires_id() {
        let server = MockServer::start().await;
        let service = service_for(&server).await;
        let err = service.verify_payment("").await.unwrap_err();
        assert!(matches!(err, PaymentError::Validation { field: "payment_id", .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_classifies_as_network() {
        let service = MercadoPagoService::new(ApiConfig::new("http://127.0.0.1:1")).unwrap();
        let err = service.create_payment_preference("abc", 1).await.unwrap_err();
        assert_eq!(service.classify_error(&err).kind, ErrorKind::Network);
    }

    #[test]
    fn test_display_helpers() {
        let service = MercadoPagoService::new(ApiConfig::new("http://localhost:8888")).unwrap();
        assert_eq!(service.status_info("approved").severity, Severity::Success);
        assert_eq!(service.status_info("bogus").severity, Severity::Unknown);
        assert_eq!(
            service.format_currency(1500.0, Currency::BRL),
            "R$\u{a0}1.500,00"
        );
    }
}
