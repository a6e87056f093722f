//! # Host Capabilities
//!
//! The checkout flow needs a few things only the host environment can
//! provide: the provider's checkout SDK, the current page URL, and full-page
//! navigation. Each is a small trait so the browser, the terminal and tests
//! can plug in their own implementation.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PaymentOrchestrator                     │
//! └──────┬───────────────────┬───────────────────┬───────────────┘
//!        │                   │                   │
//!  ┌─────┴────────────┐ ┌────┴───────────┐ ┌─────┴──────┐
//!  │ PaymentSdkLoader │ │ LocationReader │ │ Navigator  │
//!  │  └─ PaymentSdk   │ │                │ │            │
//!  └──────────────────┘ └────────────────┘ └────────────┘
//! ```
//!
//! Execution is single-threaded (browser event loop or a current-thread
//! runtime), so none of these traits require `Send`.

use crate::error::PaymentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;

/// Loads the provider script and constructs an SDK instance.
#[async_trait(?Send)]
pub trait PaymentSdkLoader {
    /// Load the SDK and construct `MercadoPago(public_key, { locale })`.
    ///
    /// Implementations fail with `PaymentError::SdkLoad` when the script is
    /// present but does not expose the expected constructor.
    async fn load(&self, public_key: &str, locale: &str) -> PaymentResult<Rc<dyn PaymentSdk>>;
}

/// A constructed provider SDK instance
pub trait PaymentSdk {
    /// Open Checkout Pro with the given options
    fn checkout(&self, options: &CheckoutOptions) -> PaymentResult<CheckoutHandle>;
}

/// Read access to the current page location
pub trait LocationReader {
    /// Query string of the current URL, including the leading `?` if any
    fn search(&self) -> String;
}

/// Full-page navigation
pub trait Navigator {
    fn navigate(&self, url: &str) -> PaymentResult<()>;
}

/// Options passed to the SDK's `checkout` call.
///
/// A JSON object; the defaults are `{ preference: { id }, autoOpen: true }`
/// and caller-supplied keys replace them key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutOptions(Map<String, Value>);

impl CheckoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a top-level option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Defaults for `preference_id` with `overrides` merged over them
    pub fn for_preference(preference_id: &str, overrides: CheckoutOptions) -> Self {
        let mut merged = Map::new();
        merged.insert(
            "preference".to_string(),
            serde_json::json!({ "id": preference_id }),
        );
        merged.insert("autoOpen".to_string(), Value::Bool(true));
        merged.extend(overrides.0);
        Self(merged)
    }

    pub fn preference_id(&self) -> Option<&str> {
        self.0.get("preference")?.get("id")?.as_str()
    }

    pub fn auto_open(&self) -> bool {
        self.0
            .get("autoOpen")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for CheckoutOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Result of a successful SDK checkout call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutHandle {
    pub preference_id: String,
    /// Whether the widget opened immediately
    pub auto_open: bool,
}

impl CheckoutHandle {
    pub fn from_options(options: &CheckoutOptions) -> Self {
        Self {
            preference_id: options.preference_id().unwrap_or_default().to_string(),
            auto_open: options.auto_open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use serde_json::json;
    use std::cell::RefCell;

    struct RecordingSdk {
        calls: RefCell<Vec<CheckoutOptions>>,
    }

    impl PaymentSdk for RecordingSdk {
        fn checkout(&self, options: &CheckoutOptions) -> PaymentResult<CheckoutHandle> {
            self.calls.borrow_mut().push(options.clone());
            Ok(CheckoutHandle::from_options(options))
        }
    }

    struct StaticLoader;

    #[async_trait(?Send)]
    impl PaymentSdkLoader for StaticLoader {
        async fn load(&self, public_key: &str, _locale: &str) -> PaymentResult<Rc<dyn PaymentSdk>> {
            if public_key.is_empty() {
                return Err(PaymentError::SdkLoad("no key".into()));
            }
            Ok(Rc::new(RecordingSdk {
                calls: RefCell::new(Vec::new()),
            }))
        }
    }

    #[test]
    fn test_default_options() {
        let options = CheckoutOptions::for_preference("123456789-pref", CheckoutOptions::new());
        assert_eq!(options.preference_id(), Some("123456789-pref"));
        assert!(options.auto_open());
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({ "preference": { "id": "123456789-pref" }, "autoOpen": true })
        );
    }

    #[test]
    fn test_caller_options_override_defaults() {
        let overrides = CheckoutOptions::new()
            .with("autoOpen", false)
            .with("render", json!({ "container": ".pay", "label": "Pagar" }));
        let options = CheckoutOptions::for_preference("123456789-pref", overrides);

        assert!(!options.auto_open());
        assert_eq!(options.get("render").unwrap()["label"], "Pagar");
        assert_eq!(options.preference_id(), Some("123456789-pref"));
    }

    #[tokio::test]
    async fn test_loader_returns_usable_sdk() {
        let sdk = StaticLoader.load("TEST-key", "pt-BR").await.unwrap();
        let options = CheckoutOptions::for_preference("123456789-pref", CheckoutOptions::new());
        let handle = sdk.checkout(&options).unwrap();
        assert_eq!(handle.preference_id, "123456789-pref");
        assert!(handle.auto_open);

        assert!(StaticLoader.load("", "pt-BR").await.is_err());
    }
}
