//! # Browser Capabilities
//!
//! `window`-backed implementations of the checkout host traits: the
//! MercadoPago JS SDK, `window.location` and page navigation.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use pay_core::{
    CheckoutHandle, CheckoutOptions, LocationReader, Navigator, PaymentError, PaymentResult,
    PaymentSdk, PaymentSdkLoader,
};
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlScriptElement, Window};

/// MercadoPago SDK v2 script
pub const SDK_SCRIPT_URL: &str = "https://sdk.mercadopago.com/js/v2";

/// Global constructor exposed by the SDK script
const SDK_GLOBAL: &str = "MercadoPago";

/// Best-effort text for a thrown JS value
pub(crate) fn js_error_text(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

/// Loads the SDK script into the page and constructs `MercadoPago`
pub struct BrowserSdkLoader {
    script_url: String,
}

impl BrowserSdkLoader {
    pub fn new(script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
        }
    }

    fn sdk_global(window: &Window) -> JsValue {
        Reflect::get(window, &JsValue::from_str(SDK_GLOBAL)).unwrap_or(JsValue::UNDEFINED)
    }

    async fn inject_script(&self, window: &Window) -> PaymentResult<()> {
        let load_error = |what: &str, e: JsValue| {
            PaymentError::SdkLoad(format!("{}: {}", what, js_error_text(&e)))
        };

        let document = window
            .document()
            .ok_or_else(|| PaymentError::SdkLoad("no document available".to_string()))?;
        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| load_error("cannot create script element", e))?
            .dyn_into()
            .map_err(|_| PaymentError::SdkLoad("created element is not a script".to_string()))?;
        script.set_src(&self.script_url);
        script.set_async(true);

        let loaded = Promise::new(&mut |resolve, reject| {
            script.set_onload(Some(&resolve));
            script.set_onerror(Some(&reject));
        });

        let head = document
            .head()
            .ok_or_else(|| PaymentError::SdkLoad("document has no <head>".to_string()))?;
        head.append_child(&script)
            .map_err(|e| load_error("cannot attach SDK script", e))?;

        debug!("Loading MercadoPago SDK from {}", self.script_url);
        JsFuture::from(loaded)
            .await
            .map_err(|e| load_error(&format!("failed to load {}", self.script_url), e))?;
        Ok(())
    }
}

impl Default for BrowserSdkLoader {
    fn default() -> Self {
        Self::new(SDK_SCRIPT_URL)
    }
}

#[async_trait(?Send)]
impl PaymentSdkLoader for BrowserSdkLoader {
    async fn load(&self, public_key: &str, locale: &str) -> PaymentResult<Rc<dyn PaymentSdk>> {
        let window = web_sys::window()
            .ok_or_else(|| PaymentError::SdkLoad("no window available".to_string()))?;

        if Self::sdk_global(&window).is_undefined() {
            self.inject_script(&window).await?;
        }

        let constructor: Function = Self::sdk_global(&window).dyn_into().map_err(|_| {
            PaymentError::SdkLoad("window.MercadoPago is not a constructor".to_string())
        })?;

        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("locale"), &JsValue::from_str(locale))
            .map_err(|e| PaymentError::SdkLoad(js_error_text(&e)))?;
        let args = Array::of2(&JsValue::from_str(public_key), &options);

        let instance = Reflect::construct(&constructor, &args)
            .map_err(|e| PaymentError::SdkLoad(js_error_text(&e)))?;

        info!("MercadoPago SDK constructed (locale={})", locale);
        Ok(Rc::new(BrowserSdk { instance }))
    }
}

/// A `MercadoPago` instance living in the page
pub struct BrowserSdk {
    instance: JsValue,
}

impl PaymentSdk for BrowserSdk {
    fn checkout(&self, options: &CheckoutOptions) -> PaymentResult<CheckoutHandle> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let js_options = options
            .serialize(&serializer)
            .map_err(|e| PaymentError::Checkout(e.to_string()))?;

        let checkout: Function = Reflect::get(&self.instance, &JsValue::from_str("checkout"))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| PaymentError::Checkout("SDK instance has no checkout()".to_string()))?;

        checkout
            .call1(&self.instance, &js_options)
            .map_err(|e| PaymentError::Checkout(js_error_text(&e)))?;

        Ok(CheckoutHandle::from_options(options))
    }
}

/// `window.location.search`
pub struct BrowserLocation;

impl LocationReader for BrowserLocation {
    fn search(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default()
    }
}

/// `window.location.assign(url)`
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> PaymentResult<()> {
        let window = web_sys::window()
            .ok_or_else(|| PaymentError::Navigation("no window available".to_string()))?;
        window
            .location()
            .assign(url)
            .map_err(|e| PaymentError::Navigation(js_error_text(&e)))
    }
}
