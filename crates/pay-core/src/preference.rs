//! # Payment Preference
//!
//! The request body sent to the backend to obtain a MercadoPago preference,
//! and the payment record returned when verifying a payment.

use crate::error::{PaymentError, PaymentResult};
use crate::status::{PaymentStatus, StatusInfo};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Default lifetime of a payment link
pub const DEFAULT_EXPIRATION_DAYS: i64 = 7;

/// Minimum length of a preference id accepted by the checkout widget
pub const MIN_PREFERENCE_ID_LEN: usize = 10;

/// Payment preference request body (`POST /prefer`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentPreference {
    /// Identifier of the short URL being paid for
    #[serde(rename = "idUrl")]
    pub id_url: String,

    pub quantity: u32,

    /// When the payment link stops being valid
    #[serde(serialize_with = "serialize_iso8601")]
    pub expires_at: DateTime<Utc>,
}

impl PaymentPreference {
    /// Validate caller input and compute the expiration as `now + expiration_days`.
    pub fn new(
        id_url: &str,
        quantity: i64,
        expiration_days: i64,
        now: DateTime<Utc>,
    ) -> PaymentResult<Self> {
        if id_url.trim().is_empty() {
            return Err(PaymentError::validation(
                "id_url",
                "Missing required fields: idUrl and quantity are required",
            ));
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                PaymentError::validation("quantity", "Quantity must be a positive integer")
            })?;

        if expiration_days <= 0 {
            return Err(PaymentError::validation(
                "expiration_days",
                "Expiration days must be a positive integer",
            ));
        }

        let expires_at = Duration::try_days(expiration_days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                PaymentError::validation("expiration_days", "Expiration days is out of range")
            })?;

        Ok(Self {
            id_url: id_url.to_string(),
            quantity,
            expires_at,
        })
    }

    /// `expires_at` rendered the way it goes over the wire
    pub fn expires_at_iso(&self) -> String {
        iso8601(&self.expires_at)
    }
}

/// Convert a number coming from an untyped boundary (JS, CLI) into a whole
/// number, rejecting fractions and non-finite values.
pub fn whole_number(value: f64, field: &'static str) -> PaymentResult<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(PaymentError::validation(
            field,
            format!("{} must be a positive integer", field_label(field)),
        ));
    }
    Ok(value as i64)
}

/// Check a preference id before handing it to the checkout widget
pub fn validate_preference_id(preference_id: &str) -> PaymentResult<()> {
    if preference_id.is_empty() {
        return Err(PaymentError::validation(
            "preference_id",
            "Preference ID is required",
        ));
    }
    if preference_id.chars().count() < MIN_PREFERENCE_ID_LEN {
        return Err(PaymentError::validation(
            "preference_id",
            format!("Invalid preference ID: {}", preference_id),
        ));
    }
    Ok(())
}

fn field_label(field: &str) -> &str {
    match field {
        "quantity" => "Quantity",
        "expiration_days" => "Expiration days",
        other => other,
    }
}

fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso8601<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&iso8601(ts))
}

/// Response body of `POST /prefer`
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceCreated {
    pub id: String,
}

/// Payment record returned by `GET /payment/{id}/verify`.
///
/// Only `status` is interpreted; everything else is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl PaymentRecord {
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::parse(self.status.as_deref().unwrap_or_default())
    }
}

/// A verified payment enriched with display metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    #[serde(flatten)]
    pub record: PaymentRecord,
    pub status_info: StatusInfo,
}

impl From<PaymentRecord> for VerifiedPayment {
    fn from(record: PaymentRecord) -> Self {
        let status_info = record.payment_status().info();
        Self {
            record,
            status_info,
        }
    }
}
