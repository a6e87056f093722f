//! # Payment Status
//!
//! Payment statuses reported by MercadoPago and their display metadata.

use serde::{Deserialize, Serialize};

/// Status of a MercadoPago payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Approved,
    Pending,
    Rejected,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Parse a provider status string; unrecognized values map to `Unknown`
    pub fn parse(status: &str) -> Self {
        match status {
            "approved" => PaymentStatus::Approved,
            "pending" => PaymentStatus::Pending,
            "rejected" => PaymentStatus::Rejected,
            "cancelled" => PaymentStatus::Cancelled,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Approved => "approved",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Unknown => "unknown",
        }
    }

    /// Display metadata for this status
    pub fn info(&self) -> StatusInfo {
        let (message, icon, severity) = match self {
            PaymentStatus::Approved => ("Pagamento aprovado", "✅", Severity::Success),
            PaymentStatus::Pending => ("Pagamento pendente", "⏳", Severity::Warning),
            PaymentStatus::Rejected => ("Pagamento rejeitado", "❌", Severity::Error),
            PaymentStatus::Cancelled => ("Pagamento cancelado", "❌", Severity::Error),
            PaymentStatus::Refunded => ("Pagamento reembolsado", "💰", Severity::Info),
            PaymentStatus::Unknown => ("Status desconhecido", "❓", Severity::Unknown),
        };

        StatusInfo {
            message,
            icon,
            severity,
        }
    }

    /// True once the provider will not change the status any more
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Approved
                | PaymentStatus::Rejected
                | PaymentStatus::Cancelled
                | PaymentStatus::Refunded
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity class used to style a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
    Unknown,
}

/// Message, icon and severity for a payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub message: &'static str,
    pub icon: &'static str,
    #[serde(rename = "type")]
    pub severity: Severity,
}

/// Look up display metadata for a raw status string. Never fails.
pub fn status_info(status: &str) -> StatusInfo {
    PaymentStatus::parse(status).info()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_info_table() {
        let approved = status_info("approved");
        assert_eq!(approved.severity, Severity::Success);
        assert_eq!(approved.message, "Pagamento aprovado");
        assert_eq!(approved.icon, "✅");

        assert_eq!(status_info("pending").severity, Severity::Warning);
        assert_eq!(status_info("rejected").severity, Severity::Error);
        assert_eq!(status_info("cancelled").severity, Severity::Error);
        assert_eq!(status_info("refunded").severity, Severity::Info);
    }

    #[test]
    fn test_unknown_status_fallback() {
        let info = status_info("bogus");
        assert_eq!(info.severity, Severity::Unknown);
        assert_eq!(info.message, "Status desconhecido");
        assert_eq!(status_info(""), info);
    }

    #[test]
    fn test_status_deserialize_unknown() {
        let status: PaymentStatus = serde_json::from_str("\"in_mediation\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
        let status: PaymentStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, PaymentStatus::Approved);
    }

    #[test]
    fn test_final_statuses() {
        assert!(PaymentStatus::Approved.is_final());
        assert!(!PaymentStatus::Pending.is_final());
        assert!(!PaymentStatus::Unknown.is_final());
    }
}
