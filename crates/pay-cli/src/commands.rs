//! # Commands
//!
//! Each subcommand runs against a [`PaymentOrchestrator`] wired with the
//! terminal host capabilities and returns a JSON report for printing.

use crate::cli::Command;
use crate::host::{HeadlessSdkLoader, StaticLocation, TerminalNavigator};
use anyhow::{bail, Context};
use pay_core::{whole_number, ClassifiedError, PaymentStatus};
use pay_mercadopago::{ApiConfig, MercadoPagoService, PaymentOrchestrator};
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

/// Run `command` with the given configuration
pub async fn execute(command: &Command, config: ApiConfig) -> anyhow::Result<Value> {
    match command {
        Command::Config => check_config(&config),
        Command::Pay {
            id_url,
            quantity,
            expiration_days,
        } => pay(config, id_url, *quantity, *expiration_days).await,
        Command::Verify { payment_id } => {
            let checkout = orchestrator(config, "")?;
            verify(&checkout, payment_id).await
        }
        Command::Return { url, offline } => {
            let url = Url::parse(url).context("invalid return URL")?;
            let checkout = orchestrator(config, url.query().unwrap_or_default())?;
            handle_return(&checkout, *offline).await
        }
    }
}

fn orchestrator(config: ApiConfig, search: &str) -> anyhow::Result<PaymentOrchestrator> {
    orchestrator_with_navigator(config, search, TerminalNavigator::default())
}

fn orchestrator_with_navigator(
    config: ApiConfig,
    search: &str,
    navigator: TerminalNavigator,
) -> anyhow::Result<PaymentOrchestrator> {
    let service = MercadoPagoService::new(config).context("failed to build backend client")?;
    Ok(PaymentOrchestrator::new(
        service,
        Box::new(HeadlessSdkLoader),
        Box::new(StaticLocation::new(search)),
        Box::new(navigator),
    ))
}

fn check_config(config: &ApiConfig) -> anyhow::Result<Value> {
    let validation = config.validate();
    for warning in &validation.warnings {
        warn!("API configuration warning: {}", warning);
    }
    if !validation.is_valid {
        bail!("invalid configuration: {}", validation.errors.join("; "));
    }

    Ok(json!({
        "apiUrl": config.base_url,
        "environment": config.environment.as_str(),
        "checkoutBaseUrl": config.checkout_base_url,
        "publicKeyConfigured": config.has_usable_public_key(),
        "warnings": validation.warnings,
    }))
}

async fn pay(
    config: ApiConfig,
    id_url: &str,
    quantity: f64,
    expiration_days: i64,
) -> anyhow::Result<Value> {
    let quantity = whole_number(quantity, "quantity").map_err(ClassifiedError::from)?;

    let navigator = TerminalNavigator::default();
    let checkout = orchestrator_with_navigator(config, "", navigator.clone())?;

    let outcome = checkout
        .process_payment_with_redirect_expiring(id_url, quantity, expiration_days)
        .await
        .map_err(surface_error)?;

    info!(
        "Preference {} ready, checkout at {:?}",
        outcome.preference_id,
        navigator.last_url()
    );
    Ok(serde_json::to_value(&outcome)?)
}

async fn verify(checkout: &PaymentOrchestrator, payment_id: &str) -> anyhow::Result<Value> {
    let verified = checkout.verify_payment(payment_id).await.map_err(surface_error)?;
    let status = verified.record.payment_status();
    if !status.is_final() {
        info!("Payment {} is not final yet ({})", payment_id, status);
    }
    Ok(serde_json::to_value(&verified)?)
}

async fn handle_return(checkout: &PaymentOrchestrator, offline: bool) -> anyhow::Result<Value> {
    let params = checkout.handle_payment_return();

    let mut report = json!({ "returnParams": params });
    if offline || !params.has_payment_data {
        return Ok(report);
    }

    match params.payment_id.as_deref().filter(|id| !id.is_empty()) {
        Some(payment_id) => {
            report["payment"] = verify(checkout, payment_id).await?;
        }
        None => {
            let status = params.payment_status().unwrap_or(PaymentStatus::Unknown);
            report["status"] = json!(status);
            report["statusInfo"] = serde_json::to_value(checkout.status_info(status.as_str()))?;
        }
    }
    Ok(report)
}

fn surface_error(err: ClassifiedError) -> anyhow::Error {
    if err.source.is_retryable() {
        warn!("{} ({}), retrying may help", err.info.message, err.info.kind);
    }
    anyhow::Error::new(err)
}
