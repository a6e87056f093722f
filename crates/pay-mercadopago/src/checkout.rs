//! # Checkout Pro Orchestration
//!
//! Drives the end-to-end payment flow: SDK lifecycle, preference creation,
//! opening the hosted checkout and falling back to a full-page redirect.
//!
//! ## SDK lifecycle
//!
//! ```text
//!  Uninitialized ──initialize()──▶ Loading ──ok──▶ Ready
//!        ▲                            │
//!        └──────── err (last_error) ──┘
//! ```
//!
//! All state lives on the orchestrator and is only touched between
//! `.await` points; execution is single-threaded.

use crate::service::MercadoPagoService;
use pay_core::{
    validate_preference_id, CheckoutHandle, CheckoutOptions, ClassifiedError, Currency,
    LocationReader, Navigator, PaymentError, PaymentResult, PaymentSdk, PaymentSdkLoader,
    ReturnParams, StatusInfo, VerifiedPayment, DEFAULT_EXPIRATION_DAYS,
};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

/// Snapshot of the SDK lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkState {
    pub initialized: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl SdkState {
    pub fn phase(&self) -> SdkPhase {
        if self.initialized {
            SdkPhase::Ready
        } else if self.loading {
            SdkPhase::Loading
        } else {
            SdkPhase::Uninitialized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkPhase {
    Uninitialized,
    Loading,
    Ready,
}

/// How the checkout was presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMethod {
    /// The SDK widget opened
    Sdk,
    /// Full-page navigation to the hosted checkout
    Redirect,
}

/// Result of a payment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub preference_id: String,
    pub method: CheckoutMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

/// Payment flow coordinator.
///
/// Owns the SDK handle and its lifecycle state. Host capabilities are
/// injected so the same flow runs in a browser, a terminal or tests.
pub struct PaymentOrchestrator {
    service: MercadoPagoService,
    loader: Box<dyn PaymentSdkLoader>,
    location: Box<dyn LocationReader>,
    navigator: Box<dyn Navigator>,
    sdk: OnceCell<Rc<dyn PaymentSdk>>,
    state: RefCell<SdkState>,
    loading_depth: Cell<u32>,
    payment_in_flight: Cell<bool>,
}

impl PaymentOrchestrator {
    pub fn new(
        service: MercadoPagoService,
        loader: Box<dyn PaymentSdkLoader>,
        location: Box<dyn LocationReader>,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        Self {
            service,
            loader,
            location,
            navigator,
            sdk: OnceCell::new(),
            state: RefCell::new(SdkState::default()),
            loading_depth: Cell::new(0),
            payment_in_flight: Cell::new(false),
        }
    }

    /// Current SDK state
    pub fn state(&self) -> SdkState {
        self.state.borrow().clone()
    }

    pub fn is_sdk_loaded(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().last_error = None;
    }

    /// Load and construct the SDK. Returns the existing handle when ready.
    ///
    /// Callers arriving while a load is in progress wait for that load
    /// instead of starting another one.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> PaymentResult<Rc<dyn PaymentSdk>> {
        if let Some(sdk) = self.sdk.get() {
            return Ok(Rc::clone(sdk));
        }

        let config = self.service.config();
        let public_key = match config.public_key.as_deref() {
            Some(key) if config.has_usable_public_key() => key,
            _ => {
                let err = PaymentError::Configuration(
                    "MercadoPago public key is missing or still the placeholder".to_string(),
                );
                self.record_error(format!("Failed to initialize MercadoPago SDK: {}", err));
                return Err(err);
            }
        };

        let _loading = self.enter_loading();
        let sdk = self
            .sdk
            .get_or_try_init(|| self.load_sdk(public_key, &config.locale))
            .await?;
        Ok(Rc::clone(sdk))
    }

    async fn load_sdk(&self, public_key: &str, locale: &str) -> PaymentResult<Rc<dyn PaymentSdk>> {
        self.state.borrow_mut().last_error = None;

        match self.loader.load(public_key, locale).await {
            Ok(sdk) => {
                self.state.borrow_mut().initialized = true;
                info!("MercadoPago SDK initialized successfully");
                Ok(sdk)
            }
            Err(err) => {
                error!("MercadoPago SDK initialization error: {}", err);
                self.record_error(format!("Failed to initialize MercadoPago SDK: {}", err));
                Err(err)
            }
        }
    }

    /// Auto-initialization for when the host UI mounts.
    ///
    /// Failures are logged and recorded in `last_error` but not returned;
    /// the user has not asked to pay yet.
    pub async fn mount(&self) {
        if self.is_sdk_loaded() {
            return;
        }
        if let Err(err) = self.initialize().await {
            warn!("MercadoPago SDK auto-initialization failed: {}", err);
        }
    }

    /// Open Checkout Pro for a preference
    #[instrument(skip(self, options))]
    pub async fn open_checkout(
        &self,
        preference_id: &str,
        options: CheckoutOptions,
    ) -> PaymentResult<CheckoutHandle> {
        validate_preference_id(preference_id)?;

        let sdk = self.initialize().await?;
        let options = CheckoutOptions::for_preference(preference_id, options);

        match sdk.checkout(&options) {
            Ok(handle) => {
                info!("Checkout opened with preference: {}", preference_id);
                Ok(handle)
            }
            Err(err) => {
                error!("Checkout error: {}", err);
                self.record_error(format!("Failed to open checkout: {}", err));
                Err(err)
            }
        }
    }

    /// Create a preference and open the SDK checkout, redirecting to the
    /// hosted checkout if the SDK path fails.
    #[instrument(skip(self, options))]
    pub async fn process_payment(
        &self,
        id_url: &str,
        quantity: i64,
        options: CheckoutOptions,
    ) -> Result<PaymentOutcome, ClassifiedError> {
        let result = self.process_payment_inner(id_url, quantity, options).await;
        self.surface("Payment process error", result)
    }

    async fn process_payment_inner(
        &self,
        id_url: &str,
        quantity: i64,
        options: CheckoutOptions,
    ) -> PaymentResult<PaymentOutcome> {
        let _in_flight = InFlightGuard::acquire(&self.payment_in_flight)?;
        let _loading = self.enter_loading();
        self.state.borrow_mut().last_error = None;

        debug!("Creating payment preference: id_url={}, quantity={}", id_url, quantity);
        let preference_id = self.service.create_payment_preference(id_url, quantity).await?;

        match self.open_checkout(&preference_id, options).await {
            Ok(handle) => Ok(PaymentOutcome {
                preference_id,
                method: CheckoutMethod::Sdk,
                checkout: Some(handle),
                checkout_url: None,
            }),
            Err(err) => {
                warn!("SDK checkout failed, falling back to redirect: {}", err);
                let outcome = self.redirect(preference_id)?;
                self.clear_error();
                Ok(outcome)
            }
        }
    }

    /// Create a preference and always redirect, never touching the SDK
    pub async fn process_payment_with_redirect(
        &self,
        id_url: &str,
        quantity: i64,
    ) -> Result<PaymentOutcome, ClassifiedError> {
        self.process_payment_with_redirect_expiring(id_url, quantity, DEFAULT_EXPIRATION_DAYS)
            .await
    }

    /// Redirect flow with an explicit preference lifetime in days
    #[instrument(skip(self))]
    pub async fn process_payment_with_redirect_expiring(
        &self,
        id_url: &str,
        quantity: i64,
        expiration_days: i64,
    ) -> Result<PaymentOutcome, ClassifiedError> {
        let result = async {
            let _in_flight = InFlightGuard::acquire(&self.payment_in_flight)?;
            let _loading = self.enter_loading();
            self.state.borrow_mut().last_error = None;

            let preference_id = self
                .service
                .create_payment_preference_expiring(id_url, quantity, expiration_days)
                .await?;
            self.redirect(preference_id)
        }
        .await;
        self.surface("Payment process error", result)
    }

    /// Verify a payment and attach its display metadata
    #[instrument(skip(self))]
    pub async fn verify_payment(&self, payment_id: &str) -> Result<VerifiedPayment, ClassifiedError> {
        let result = async {
            let _loading = self.enter_loading();
            self.state.borrow_mut().last_error = None;
            self.service.verify_payment(payment_id).await.map(VerifiedPayment::from)
        }
        .await;
        self.surface("Payment verification error", result)
    }

    /// Read payment data from the current page's query string
    pub fn handle_payment_return(&self) -> ReturnParams {
        ReturnParams::from_query(&self.location.search())
    }

    pub fn status_info(&self, status: &str) -> StatusInfo {
        self.service.status_info(status)
    }

    pub fn format_currency(&self, amount: f64, currency: Currency) -> String {
        self.service.format_currency(amount, currency)
    }

    fn redirect(&self, preference_id: String) -> PaymentResult<PaymentOutcome> {
        let url = self.service.config().redirect_url(&preference_id);
        info!("Redirecting to hosted checkout: {}", url);
        self.navigator.navigate(&url)?;

        Ok(PaymentOutcome {
            preference_id,
            method: CheckoutMethod::Redirect,
            checkout: None,
            checkout_url: Some(url),
        })
    }

    fn enter_loading(&self) -> LoadingGuard<'_> {
        LoadingGuard::enter(&self.state, &self.loading_depth)
    }

    fn record_error(&self, message: String) {
        self.state.borrow_mut().last_error = Some(message);
    }

    fn surface<T>(&self, context: &str, result: PaymentResult<T>) -> Result<T, ClassifiedError> {
        result.map_err(|err| {
            let classified = ClassifiedError::from(err);
            error!(
                kind = %classified.info.kind,
                details = %classified.info.details,
                "{}", context
            );
            self.record_error(classified.info.message.clone());
            classified
        })
    }
}

/// Counts in-progress operations; `loading` holds while any guard is alive.
///
/// Guards may be dropped in any order.
struct LoadingGuard<'a> {
    state: &'a RefCell<SdkState>,
    depth: &'a Cell<u32>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a RefCell<SdkState>, depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        state.borrow_mut().loading = true;
        Self { state, depth }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        self.state.borrow_mut().loading = depth > 0;
    }
}

/// Rejects a second payment while one is pending
struct InFlightGuard<'a>(&'a Cell<bool>);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> PaymentResult<Self> {
        if flag.replace(true) {
            return Err(PaymentError::PaymentInProgress);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
