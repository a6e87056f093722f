//! # pay-mercadopago
//!
//! MercadoPago Checkout Pro integration for mp-checkout-rs.
//!
//! This crate provides:
//!
//! 1. **ApiConfig** - backend and provider settings from the environment
//! 2. **ApiClient** - fetch wrapper with JSON/text decoding
//! 3. **MercadoPagoService** - preference creation and payment verification
//! 4. **PaymentOrchestrator** - SDK lifecycle and the end-to-end checkout flow
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_mercadopago::{MercadoPagoService, PaymentOrchestrator};
//! use pay_core::CheckoutOptions;
//!
//! let service = MercadoPagoService::from_env()?;
//! let checkout = PaymentOrchestrator::new(service, loader, location, navigator);
//!
//! // Auto-initialize when the page mounts (failures are only logged)
//! checkout.mount().await;
//!
//! // Create a preference and open Checkout Pro (redirects if the widget fails)
//! let outcome = checkout.process_payment("my-short-url", 1, CheckoutOptions::new()).await?;
//! println!("paid via {:?}", outcome.method);
//! ```
//!
//! ## Return URL
//!
//! ```rust,ignore
//! let params = checkout.handle_payment_return();
//! if let Some(payment_id) = params.payment_id.as_deref() {
//!     let verified = checkout.verify_payment(payment_id).await?;
//!     println!("{} {}", verified.status_info.icon, verified.status_info.message);
//! }
//! ```

pub mod checkout;
pub mod client;
pub mod config;
pub mod service;

// Re-exports
pub use checkout::{CheckoutMethod, PaymentOrchestrator, PaymentOutcome, SdkPhase, SdkState};
pub use client::{ApiClient, ApiResponse, RawResponse, RequestOptions};
pub use config::{
    ApiConfig, ConfigValidation, Environment, MercadoPagoEndpoints, DEFAULT_API_URL,
    DEFAULT_CHECKOUT_BASE_URL, PLACEHOLDER_PUBLIC_KEY,
};
pub use service::MercadoPagoService;
