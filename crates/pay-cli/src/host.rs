//! # Terminal Host
//!
//! Capability implementations for running the checkout flow outside a
//! browser. There is no widget to load, so only the redirect path works;
//! "navigating" means handing the URL to the user.

use async_trait::async_trait;
use pay_core::{LocationReader, Navigator, PaymentError, PaymentResult, PaymentSdk, PaymentSdkLoader};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// The terminal cannot host the Checkout Pro widget
pub struct HeadlessSdkLoader;

#[async_trait(?Send)]
impl PaymentSdkLoader for HeadlessSdkLoader {
    async fn load(&self, _public_key: &str, _locale: &str) -> PaymentResult<Rc<dyn PaymentSdk>> {
        Err(PaymentError::SdkLoad(
            "the MercadoPago SDK needs a browser; use the redirect flow".to_string(),
        ))
    }
}

/// Location backed by a URL given on the command line
pub struct StaticLocation {
    search: String,
}

impl StaticLocation {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
        }
    }
}

impl LocationReader for StaticLocation {
    fn search(&self) -> String {
        self.search.clone()
    }
}

/// Records the checkout URL so the command can print it
#[derive(Clone, Default)]
pub struct TerminalNavigator {
    last_url: Rc<RefCell<Option<String>>>,
}

impl TerminalNavigator {
    pub fn last_url(&self) -> Option<String> {
        self.last_url.borrow().clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) -> PaymentResult<()> {
        info!("Open this URL to pay: {}", url);
        *self.last_url.borrow_mut() = Some(url.to_string());
        Ok(())
    }
}
