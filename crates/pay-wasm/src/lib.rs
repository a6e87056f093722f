//! # pay-wasm
//!
//! WebAssembly bindings for mp-checkout-rs.
//!
//! This crate wires the checkout orchestrator to the browser:
//! - Loading the MercadoPago JS SDK and opening Checkout Pro
//! - Redirecting to the hosted checkout when the widget is unavailable
//! - Reading payment data from the return URL
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCheckout, status_info } from 'mp-checkout-wasm';
//!
//! await init();
//!
//! const checkout = new WasmCheckout('https://api.example.com', 'TEST-abc123');
//! await checkout.mount();
//!
//! try {
//!   await checkout.processPayment('my-short-url', 1);
//! } catch (err) {
//!   console.error(err.type, err.message);
//! }
//!
//! const params = checkout.handlePaymentReturn();
//! if (params.paymentId) {
//!   const payment = await checkout.verifyPayment(params.paymentId);
//!   console.log(payment.statusInfo.icon, payment.statusInfo.message);
//! }
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod browser;

pub use browser::{BrowserLocation, BrowserNavigator, BrowserSdk, BrowserSdkLoader, SDK_SCRIPT_URL};

use js_sys::Promise;
use pay_core::{
    whole_number, CheckoutOptions, ClassifiedError, Currency, PaymentError, PaymentResult,
};
use pay_mercadopago::{ApiConfig, MercadoPagoService, PaymentOrchestrator};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Serialize to a plain JS object (maps become objects, not `Map`)
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Rejection value: the serialized `ErrorInfo`
fn error_to_js(err: &ClassifiedError) -> JsValue {
    to_js(&err.info).unwrap_or_else(|_| JsValue::from_str(&err.info.message))
}

fn rejection(err: PaymentError) -> JsValue {
    error_to_js(&ClassifiedError::from(err))
}

fn checkout_options(value: JsValue) -> Result<CheckoutOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CheckoutOptions::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        rejection(PaymentError::validation(
            "options",
            format!("Invalid checkout options: {}", e),
        ))
    })
}

/// Checkout Pro bound to the current page
#[wasm_bindgen]
pub struct WasmCheckout {
    inner: Rc<PaymentOrchestrator>,
}

#[wasm_bindgen]
impl WasmCheckout {
    #[wasm_bindgen(constructor)]
    pub fn new(
        api_url: String,
        public_key: Option<String>,
        checkout_base_url: Option<String>,
    ) -> Result<WasmCheckout, JsValue> {
        let mut config = ApiConfig::new(api_url);
        if let Some(key) = public_key {
            config = config.with_public_key(key);
        }
        if let Some(url) = checkout_base_url {
            config = config.with_checkout_base_url(url);
        }

        let validation = config.validate();
        for warning in &validation.warnings {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }
        if !validation.is_valid {
            return Err(rejection(PaymentError::Configuration(
                validation.errors.join("; "),
            )));
        }

        let service = MercadoPagoService::new(config).map_err(rejection)?;
        let orchestrator = PaymentOrchestrator::new(
            service,
            Box::new(BrowserSdkLoader::default()),
            Box::new(BrowserLocation),
            Box::new(BrowserNavigator),
        );
        Ok(Self {
            inner: Rc::new(orchestrator),
        })
    }

    /// Auto-initialize the SDK. Never rejects; failures land in `error`.
    pub fn mount(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.mount().await;
            if let Some(message) = inner.last_error() {
                web_sys::console::warn_1(&JsValue::from_str(&message));
            }
            Ok(JsValue::from_bool(inner.is_sdk_loaded()))
        })
    }

    pub fn initialize(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.initialize().await.map_err(rejection)?;
            Ok(JsValue::TRUE)
        })
    }

    /// Create a preference and open the widget, falling back to redirect
    #[wasm_bindgen(js_name = processPayment)]
    pub fn process_payment(&self, id_url: String, quantity: f64, options: JsValue) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let quantity = whole_number(quantity, "quantity").map_err(rejection)?;
            let options = checkout_options(options)?;
            let outcome = inner
                .process_payment(&id_url, quantity, options)
                .await
                .map_err(|e| error_to_js(&e))?;
            to_js(&outcome)
        })
    }

    #[wasm_bindgen(js_name = processPaymentWithRedirect)]
    pub fn process_payment_with_redirect(&self, id_url: String, quantity: f64) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let quantity = whole_number(quantity, "quantity").map_err(rejection)?;
            let outcome = inner
                .process_payment_with_redirect(&id_url, quantity)
                .await
                .map_err(|e| error_to_js(&e))?;
            to_js(&outcome)
        })
    }

    #[wasm_bindgen(js_name = verifyPayment)]
    pub fn verify_payment(&self, payment_id: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let verified = inner
                .verify_payment(&payment_id)
                .await
                .map_err(|e| error_to_js(&e))?;
            to_js(&verified)
        })
    }

    /// Payment data from `window.location.search`
    #[wasm_bindgen(js_name = handlePaymentReturn)]
    pub fn handle_payment_return(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.handle_payment_return())
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen(getter, js_name = isSdkLoaded)]
    pub fn is_sdk_loaded(&self) -> bool {
        self.inner.is_sdk_loaded()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.last_error()
    }
}

fn format_amount(amount: f64, currency: Option<&str>) -> PaymentResult<String> {
    let currency = match currency {
        Some(code) => code.parse::<Currency>()?,
        None => Currency::default(),
    };
    Ok(pay_core::format_currency(amount, currency))
}

/// Format an amount for display (defaults to BRL, pt-BR style)
#[wasm_bindgen]
pub fn format_currency(amount: f64, currency: Option<String>) -> Result<String, JsValue> {
    format_amount(amount, currency.as_deref()).map_err(rejection)
}

/// `{message, icon, type}` for a payment status
#[wasm_bindgen]
pub fn status_info(status: &str) -> Result<JsValue, JsValue> {
    to_js(&pay_core::status_info(status))
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
