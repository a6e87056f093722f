//! # API Configuration
//!
//! Backend and MercadoPago settings for the checkout flow.
//! Values come from environment variables (a `.env` file is honored).

use std::env;

/// Backend URL used when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8888";

/// Checkout Pro host used for the redirect fallback
pub const DEFAULT_CHECKOUT_BASE_URL: &str = "https://www.mercadopago.com.br";

/// Public key shipped in sample `.env` files; never valid
pub const PLACEHOLDER_PUBLIC_KEY: &str = "TEST-your-public-key-here";

pub const DEFAULT_LOCALE: &str = "pt-BR";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL (MercadoPago integration endpoints)
    pub base_url: String,

    /// MercadoPago public key (TEST-... or APP_USR-...)
    pub public_key: Option<String>,

    /// Base URL of the hosted checkout, for the redirect fallback
    pub checkout_base_url: String,

    /// Locale handed to the SDK constructor
    pub locale: String,

    pub environment: Environment,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// - `API_URL` (default `http://localhost:8888`)
    /// - `MP_PUBLIC_KEY`
    /// - `MP_CHECKOUT_BASE_URL` (default `https://www.mercadopago.com.br`)
    /// - `MP_LOCALE` (default `pt-BR`)
    /// - `ENVIRONMENT` (default `development`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            base_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            public_key: env::var("MP_PUBLIC_KEY").ok().filter(|k| !k.is_empty()),
            checkout_base_url: env::var("MP_CHECKOUT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CHECKOUT_BASE_URL.to_string()),
            locale: env::var("MP_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string()),
            environment: env::var("ENVIRONMENT")
                .map(|e| Environment::parse(&e))
                .unwrap_or_default(),
        }
    }

    /// Create config with an explicit backend URL (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            public_key: None,
            checkout_base_url: DEFAULT_CHECKOUT_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            environment: Environment::Development,
        }
    }

    /// Builder: set the MercadoPago public key
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    /// Builder: set the checkout base URL
    pub fn with_checkout_base_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_base_url = url.into();
        self
    }

    /// Builder: set the environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Join the base URL and `path`, dropping one leading slash from `path`
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }

    /// Backend endpoints used by the payment flow
    pub fn mercado_pago_endpoints(&self) -> MercadoPagoEndpoints {
        MercadoPagoEndpoints {
            create_preference: self.endpoint("/prefer"),
            webhook: self.endpoint("/webhook"),
            base_url: self.base_url.clone(),
        }
    }

    /// Hosted checkout URL for a preference
    pub fn redirect_url(&self, preference_id: &str) -> String {
        format!(
            "{}/checkout/v1/redirect?pref_id={}",
            self.checkout_base_url, preference_id
        )
    }

    /// True if the public key is set and is not the sample placeholder
    pub fn has_usable_public_key(&self) -> bool {
        self.public_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty() && k != PLACEHOLDER_PUBLIC_KEY)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check the configuration for problems
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.base_url.trim().is_empty() {
            errors.push("API base URL is not configured".to_string());
        }

        if self.public_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            warnings.push("MercadoPago public key is not configured".to_string());
        }

        if self.is_production()
            && (self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1"))
        {
            warnings.push("Using localhost API URL in production".to_string());
        }

        ConfigValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Backend endpoints for the MercadoPago integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MercadoPagoEndpoints {
    pub create_preference: String,
    /// Provider callback endpoint; served by the backend, not called here
    pub webhook: String,
    base_url: String,
}

impl MercadoPagoEndpoints {
    pub fn verify_payment(&self, payment_id: &str) -> String {
        format!("{}/payment/{}/verify", self.base_url, payment_id)
    }
}

/// Outcome of [`ApiConfig::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}
