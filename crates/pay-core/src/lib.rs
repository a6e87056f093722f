//! # pay-core
//!
//! Core types and traits for the MercadoPago Checkout Pro payment flow.
//!
//! This crate provides:
//! - `PaymentError`, `ErrorInfo` and `ClassifiedError` for typed error handling
//! - `PaymentStatus` and `StatusInfo` for displaying payment outcomes
//! - `PaymentPreference` and `PaymentRecord` for the backend wire format
//! - `ReturnParams` for parsing return URLs
//! - `Currency` and `format_currency` for pt-BR monetary formatting
//! - Host capability traits (`PaymentSdkLoader`, `PaymentSdk`,
//!   `LocationReader`, `Navigator`)
//!
//! ## Example
//!
//! ```rust
//! use pay_core::{format_currency, status_info, Currency, ReturnParams, Severity};
//!
//! let params = ReturnParams::from_query("?payment_id=123&status=approved");
//! assert!(params.has_payment_data);
//!
//! let info = status_info(params.status.as_deref().unwrap_or_default());
//! assert_eq!(info.severity, Severity::Success);
//!
//! assert_eq!(format_currency(10.0, Currency::BRL), "R$\u{a0}10,00");
//! ```

pub mod capability;
pub mod currency;
pub mod error;
pub mod preference;
pub mod return_params;
pub mod status;

// Re-exports for convenience
pub use capability::{CheckoutHandle, CheckoutOptions, LocationReader, Navigator, PaymentSdk, PaymentSdkLoader};
pub use currency::{format_currency, Currency};
pub use error::{ClassifiedError, ErrorInfo, ErrorKind, PaymentError, PaymentResult};
pub use preference::{
    validate_preference_id, whole_number, PaymentPreference, PaymentRecord, PreferenceCreated,
    VerifiedPayment, DEFAULT_EXPIRATION_DAYS, MIN_PREFERENCE_ID_LEN,
};
pub use return_params::ReturnParams;
pub use status::{status_info, PaymentStatus, Severity, StatusInfo};
