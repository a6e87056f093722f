//! # Currency Formatting
//!
//! Monetary formatting following pt-BR conventions (the checkout locale):
//! `.` groups thousands, `,` separates decimals and the symbol is followed
//! by a no-break space, e.g. `R$ 1.234,56`.

use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const NBSP: char = '\u{a0}';

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    BRL,
    ARS,
    CLP,
    COP,
    MXN,
    PEN,
    UYU,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::ARS => "ARS",
            Currency::CLP => "CLP",
            Currency::COP => "COP",
            Currency::MXN => "MXN",
            Currency::PEN => "PEN",
            Currency::UYU => "UYU",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Symbol as rendered in the pt-BR locale
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::MXN => "MX$",
            Currency::USD => "US$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "JP¥",
            other => other.code(),
        }
    }

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::CLP | Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let currency = match s.to_ascii_uppercase().as_str() {
            "BRL" => Currency::BRL,
            "ARS" => Currency::ARS,
            "CLP" => Currency::CLP,
            "COP" => Currency::COP,
            "MXN" => Currency::MXN,
            "PEN" => Currency::PEN,
            "UYU" => Currency::UYU,
            "USD" => Currency::USD,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            "JPY" => Currency::JPY,
            _ => {
                return Err(PaymentError::validation(
                    "currency",
                    format!("Unsupported currency: {}", s),
                ))
            }
        };
        Ok(currency)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Format an amount for display, e.g. `format_currency(1234.5, Currency::BRL)`
/// gives `"R$ 1.234,50"` (with a no-break space).
///
/// Negative amounts keep their sign even when they round to zero, and
/// non-finite amounts render as `NaN` / `∞` after the symbol.
pub fn format_currency(amount: f64, currency: Currency) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_nan() { "-" } else { "" };
    if amount.is_nan() {
        return format!("{}{}NaN", currency.symbol(), NBSP);
    }
    if amount.is_infinite() {
        return format!("{}{}{}∞", sign, currency.symbol(), NBSP);
    }

    let places = currency.decimal_places();
    let scale = 10_u64.pow(places);
    let scaled = (amount.abs() * scale as f64).round() as u64;

    let whole = group_thousands(scaled / scale);

    if places == 0 {
        format!("{}{}{}{}", sign, currency.symbol(), NBSP, whole)
    } else {
        format!(
            "{}{}{}{},{:0width$}",
            sign,
            currency.symbol(),
            NBSP,
            whole,
            scaled % scale,
            width = places as usize
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
