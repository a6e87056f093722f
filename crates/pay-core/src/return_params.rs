//! # Return URL Parameters
//!
//! After checkout MercadoPago sends the user back with the outcome in the
//! query string (`payment_id`, `status`, `merchant_order_id`,
//! `preference_id`). Parsing is pure; nothing here touches the network.

use crate::error::{PaymentError, PaymentResult};
use crate::status::PaymentStatus;
use serde::Serialize;
use url::{form_urlencoded, Url};

/// Payment data carried by a return URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnParams {
    pub payment_id: Option<String>,
    pub status: Option<String>,
    pub merchant_order_id: Option<String>,
    pub preference_id: Option<String>,
    /// True iff a non-empty `payment_id` or `status` is present
    pub has_payment_data: bool,
}

impl ReturnParams {
    /// Parse a query string, with or without the leading `?`.
    ///
    /// The first occurrence of a repeated key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = ReturnParams::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "payment_id" => &mut params.payment_id,
                "status" => &mut params.status,
                "merchant_order_id" => &mut params.merchant_order_id,
                "preference_id" => &mut params.preference_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params.has_payment_data = is_present(&params.payment_id) || is_present(&params.status);
        params
    }

    /// Parse the query string of a full URL
    pub fn from_url(url: &str) -> PaymentResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| PaymentError::validation("url", format!("Invalid return URL: {}", e)))?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }

    /// Status parameter interpreted as a [`PaymentStatus`]
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.status.as_deref().map(PaymentStatus::parse)
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_approved_return() {
        let params = ReturnParams::from_query("?payment_id=123&status=approved");
        assert_eq!(
            params,
            ReturnParams {
                payment_id: Some("123".into()),
                status: Some("approved".into()),
                merchant_order_id: None,
                preference_id: None,
                has_payment_data: true,
            }
        );
        assert_eq!(params.payment_status(), Some(PaymentStatus::Approved));
    }

    #[test]
    fn test_parse_without_payment_data() {
        let params = ReturnParams::from_query("?utm_source=mail&lang=pt");
        assert!(!params.has_payment_data);
        assert_eq!(params, ReturnParams::default());

        assert!(!ReturnParams::from_query("").has_payment_data);
        assert!(!ReturnParams::from_query("?status=").has_payment_data);
    }

    #[test]
    fn test_parse_full_return() {
        let params = ReturnParams::from_url(
            "https://app.example.com/pagamento?collection_id=9&payment_id=9&status=pending&merchant_order_id=77&preference_id=123-abc%20x",
        )
        .unwrap();
        assert_eq!(params.merchant_order_id.as_deref(), Some("77"));
        assert_eq!(params.preference_id.as_deref(), Some("123-abc x"));
        assert!(params.has_payment_data);
    }

    #[test]
    fn test_status_only_counts_as_payment_data() {
        let params = ReturnParams::from_query("status=rejected&status=approved");
        assert!(params.has_payment_data);
        assert_eq!(params.status.as_deref(), Some("rejected"));
        assert!(params.payment_id.is_none());
    }

    #[test]
    fn test_from_url_rejects_garbage() {
        assert!(ReturnParams::from_url("not a url").is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ReturnParams::from_query("payment_id=1")).unwrap();
        assert_eq!(json["paymentId"], "1");
        assert_eq!(json["merchantOrderId"], serde_json::Value::Null);
        assert_eq!(json["hasPaymentData"], true);
    }
}
