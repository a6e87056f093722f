//! # Command Line
//!
//! Argument definitions for `mp-checkout`.

use clap::{Parser, Subcommand};
use pay_core::DEFAULT_EXPIRATION_DAYS;

/// Drive the MercadoPago Checkout Pro flow from a terminal
#[derive(Debug, Parser)]
#[command(name = "mp-checkout", version, about)]
pub struct Cli {
    /// Backend base URL (overrides API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the configuration and report errors and warnings
    Config,

    /// Create a payment preference and print the hosted checkout URL
    Pay {
        /// Short URL identifier being paid for
        id_url: String,

        /// Number of units (a positive whole number)
        #[arg(allow_negative_numbers = true)]
        quantity: f64,

        /// Days until the preference expires
        #[arg(long, default_value_t = DEFAULT_EXPIRATION_DAYS, allow_negative_numbers = true)]
        expiration_days: i64,
    },

    /// Look up the status of a payment
    Verify {
        payment_id: String,
    },

    /// Parse a return URL from MercadoPago and verify the payment it names
    Return {
        url: String,

        /// Only parse, do not call the backend
        #[arg(long)]
        offline: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pay() {
        let cli = Cli::try_parse_from(["mp-checkout", "pay", "abc", "2"]).unwrap();
        match cli.command {
            Command::Pay {
                id_url,
                quantity,
                expiration_days,
            } => {
                assert_eq!(id_url, "abc");
                assert_eq!(quantity, 2.0);
                assert_eq!(expiration_days, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "mp-checkout",
            "verify",
            "123",
            "--api-url",
            "https://api.example.com",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("https://api.example.com"));
        assert!(cli.log_json);
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli = Cli::try_parse_from(["mp-checkout", "pay", "abc", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Pay { quantity, .. } if quantity == -1.0));
    }

    #[test]
    fn test_parse_expiration_days() {
        let cli =
            Cli::try_parse_from(["mp-checkout", "pay", "abc", "1", "--expiration-days", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Pay { expiration_days: 3, .. }));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["mp-checkout"]).is_err());
    }
}
