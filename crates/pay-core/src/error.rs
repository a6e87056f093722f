//! # Payment Error Types
//!
//! Typed error handling for the checkout flow.
//! All payment operations return `Result<T, PaymentError>`, and every error
//! can be classified into a user-facing [`ErrorInfo`] for display.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Bad caller input (empty ids, non-positive quantities, ...)
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Missing or placeholder credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider script loaded but is unusable
    #[error("SDK load error: {0}")]
    SdkLoad(String),

    /// Backend refused to create a preference
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Backend has no record of the payment
    #[error("Payment not found: {payment_id}")]
    NotFound { payment_id: String },

    /// Any other non-success from the verify endpoint
    #[error("Payment verification failed (HTTP {status})")]
    Verification { status: u16 },

    /// Non-success response from the generic fetch wrapper
    #[error("API request failed: {status} {status_text}")]
    Request { status: u16, status_text: String },

    /// Transport-level failure talking to the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The SDK's checkout call failed
    #[error("Checkout failed: {0}")]
    Checkout(String),

    /// Full-page navigation could not be performed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A payment is already being processed
    #[error("A payment is already in progress")]
    PaymentInProgress,
}

impl PaymentError {
    /// Shorthand for a [`PaymentError::Validation`]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PaymentError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns true if retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Network(_) => true,
            PaymentError::Backend { status, .. }
            | PaymentError::Verification { status }
            | PaymentError::Request { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map the error into the user-facing triple shown by the UI.
    ///
    /// Total and deterministic: every variant lands in exactly one
    /// [`ErrorKind`], and `details` always carries the raw display string.
    pub fn classify(&self) -> ErrorInfo {
        let (kind, message) = match self {
            PaymentError::Validation { field, .. } => (
                ErrorKind::Validation,
                match *field {
                    "quantity" => "A quantidade deve ser um número inteiro positivo",
                    "expiration_days" => {
                        "O prazo de expiração deve ser um número inteiro positivo"
                    }
                    "preference_id" => "Identificador de preferência inválido",
                    _ => "Por favor, preencha todos os campos obrigatórios",
                },
            ),
            PaymentError::NotFound { .. } => (ErrorKind::NotFound, "Pagamento não encontrado"),
            PaymentError::Backend { .. } => (
                ErrorKind::PaymentError,
                "Serviço de pagamento temporariamente indisponível",
            ),
            PaymentError::Network(_) => (
                ErrorKind::Network,
                "Erro de conexão. Verifique sua internet e tente novamente.",
            ),
            PaymentError::PaymentInProgress => {
                (ErrorKind::Generic, "Já existe um pagamento em andamento")
            }
            _ => (ErrorKind::Generic, "Algo deu errado. Tente novamente."),
        };

        ErrorInfo {
            kind,
            message: message.to_string(),
            details: self.to_string(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Category of a classified error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    PaymentError,
    Network,
    Generic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PaymentError => "payment_error",
            ErrorKind::Network => "network",
            ErrorKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing view of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Localized message for display
    pub message: String,
    /// Raw error text
    pub details: String,
}

/// An error surfaced to the caller together with its classification.
///
/// The raw [`PaymentError`] stays reachable through `source` so callers can
/// inspect the root cause.
#[derive(Debug, Error)]
#[error("{}", info.message)]
pub struct ClassifiedError {
    pub info: ErrorInfo,
    #[source]
    pub source: PaymentError,
}

impl From<PaymentError> for ClassifiedError {
    fn from(source: PaymentError) -> Self {
        Self {
            info: source.classify(),
            source,
        }
    }
}
