//! pt-BR display formatting for amounts and percentages.
//!
//! Dashboard values travel as pre-formatted strings (`R$ 2.450.000,00`,
//! `+12,5%`). Derived report lines need the numbers back, so the parsers here
//! are the inverse of the formatters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Moeda {
    #[default]
    Brl,
    Usd,
    Eur,
}

impl Moeda {
    pub fn symbol(self) -> &'static str {
        match self {
            Moeda::Brl => "R$",
            Moeda::Usd => "US$",
            Moeda::Eur => "€",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Moeda::Brl => "BRL",
            Moeda::Usd => "USD",
            Moeda::Eur => "EUR",
        }
    }
}

impl fmt::Display for Moeda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Moeda {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRL" => Ok(Moeda::Brl),
            "USD" => Ok(Moeda::Usd),
            "EUR" => Ok(Moeda::Eur),
            _ => Err(ReportError::InvalidFilter(format!(
                "unknown currency '{s}' (use BRL, USD or EUR)"
            ))),
        }
    }
}

/// Group an unsigned digit string with `.` every three digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Format a number with pt-BR separators (`1.234.567,89`).
pub fn format_number(value: f64, precisao: u8) -> String {
    let rounded = format!("{:.*}", precisao as usize, value.abs());
    let (whole, frac) = match rounded.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (rounded.as_str(), None),
    };

    // -0,00 prints as 0,00
    let negative = value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(frac) = frac {
        out.push(',');
        out.push_str(frac);
    }
    out
}

pub fn format_currency(amount: f64, moeda: Moeda, precisao: u8) -> String {
    let number = format_number(amount, precisao);
    match number.strip_prefix('-') {
        Some(abs) => format!("-{} {}", moeda.symbol(), abs),
        None => format!("{} {}", moeda.symbol(), number),
    }
}

pub fn format_percent(value: f64, precisao: u8) -> String {
    format!("{}%", format_number(value, precisao))
}

/// Signed percentage, as used for period-over-period changes.
pub fn format_change(value: f64, precisao: u8) -> String {
    let formatted = format_percent(value, precisao);
    if formatted.starts_with('-') {
        formatted
    } else {
        format!("+{formatted}")
    }
}

/// Recover the amount from a pt-BR currency string such as `R$ 2.450.000,00`.
pub fn parse_currency(text: &str) -> Option<f64> {
    // the sign may sit before or after the currency symbol
    let negative = text
        .chars()
        .take_while(|c| !c.is_ascii_digit())
        .any(|c| c == '-');
    let mut normalized = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '0'..='9' => normalized.push(ch),
            ',' => normalized.push('.'),
            _ => {}
        }
    }

    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Recover the number from a percentage string such as `+12,5%` or `42,0%`.
pub fn parse_percent(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '%' | '+' | ' '))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}
