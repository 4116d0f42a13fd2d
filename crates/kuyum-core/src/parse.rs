//! # Parsing Module
//!
//! Turns presentation input into exact values before any ledger math runs.
//!
//! ## Accepted Money Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input                 │ Result (kuruş)  │ Rule                         │
//! │  ──────────────────────┼─────────────────┼───────────────────────────── │
//! │  200                   │ 20_000          │ native integer (lira)        │
//! │  199.995               │ 20_000          │ native float, rounded        │
//! │  "1.234,56 ₺"          │ 123_456         │ TR: dot groups, comma dec.   │
//! │  "1,234.56"            │ 123_456         │ EN: last separator is dec.   │
//! │  "200.00"              │ 20_000          │ single dot, 2 digits → dec.  │
//! │  "21.520"              │ 2_152_000       │ single dot, 3 digits → group │
//! │  "12,5 TL"             │ 1_250           │ single comma → decimal       │
//! │  ""  / "abc"           │ ParseError      │                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fractions beyond the kuruş are rounded half away from zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ParseError;
use crate::money::Money;

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

// =============================================================================
// Numeric Input
// =============================================================================

/// A number as the presentation layer hands it over.
///
/// Table cells arrive as display text, spin boxes as native numbers. The
/// untagged representation accepts either from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Default for NumericInput {
    fn default() -> Self {
        NumericInput::Integer(0)
    }
}

impl From<i64> for NumericInput {
    fn from(v: i64) -> Self {
        NumericInput::Integer(v)
    }
}

impl From<i32> for NumericInput {
    fn from(v: i32) -> Self {
        NumericInput::Integer(v as i64)
    }
}

impl From<f64> for NumericInput {
    fn from(v: f64) -> Self {
        NumericInput::Float(v)
    }
}

impl From<&str> for NumericInput {
    fn from(v: &str) -> Self {
        NumericInput::Text(v.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(v: String) -> Self {
        NumericInput::Text(v)
    }
}

impl From<&NumericInput> for NumericInput {
    fn from(v: &NumericInput) -> Self {
        v.clone()
    }
}

// =============================================================================
// Public Parsers
// =============================================================================

/// Parses a money amount from text, an integer (whole lira) or a float.
///
/// ```rust
/// use kuyum_core::parse::parse_money;
///
/// assert_eq!(parse_money("1.234,56 ₺").unwrap().cents(), 123_456);
/// assert_eq!(parse_money(200).unwrap().cents(), 20_000);
/// assert!(parse_money("").is_err());
/// ```
pub fn parse_money(value: impl Into<NumericInput>) -> ParseResult<Money> {
    match value.into() {
        NumericInput::Integer(lira) => lira
            .checked_mul(100)
            .map(Money::from_cents)
            .ok_or_else(|| ParseError::InvalidNumber(lira.to_string())),
        NumericInput::Float(f) => {
            Money::from_f64(f).ok_or_else(|| ParseError::InvalidNumber(f.to_string()))
        }
        NumericInput::Text(text) => {
            let number = normalize(&text)?;
            number
                .to_cents()
                .map(Money::from_cents)
                .ok_or(ParseError::InvalidNumber(text))
        }
    }
}

/// Parses a decimal quantity such as a gram weight.
///
/// ```rust
/// use kuyum_core::parse::parse_decimal;
///
/// assert_eq!(parse_decimal("8,20").unwrap(), 8.2);
/// assert_eq!(parse_decimal(10).unwrap(), 10.0);
/// ```
pub fn parse_decimal(value: impl Into<NumericInput>) -> ParseResult<f64> {
    match value.into() {
        NumericInput::Integer(v) => Ok(v as f64),
        NumericInput::Float(f) if f.is_finite() => Ok(f),
        NumericInput::Float(f) => Err(ParseError::InvalidNumber(f.to_string())),
        NumericInput::Text(text) => {
            let number = normalize(&text)?;
            number
                .canonical()
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber(text))
        }
    }
}

/// Parses a whole item count. Fractions other than zero are rejected.
///
/// ```rust
/// use kuyum_core::parse::parse_quantity;
///
/// assert_eq!(parse_quantity("2").unwrap(), 2);
/// assert_eq!(parse_quantity(3.0).unwrap(), 3);
/// assert!(parse_quantity("1,5").is_err());
/// ```
pub fn parse_quantity(value: impl Into<NumericInput>) -> ParseResult<i64> {
    match value.into() {
        NumericInput::Integer(v) => Ok(v),
        NumericInput::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        NumericInput::Float(f) => Err(ParseError::InvalidNumber(f.to_string())),
        NumericInput::Text(text) => {
            let number = normalize(&text)?;
            if number.fraction.chars().any(|c| c != '0') {
                return Err(ParseError::InvalidNumber(text));
            }
            let whole = if number.integer.is_empty() {
                "0"
            } else {
                number.integer.as_str()
            };
            let magnitude = whole
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidNumber(text.clone()))?;
            Ok(if number.negative { -magnitude } else { magnitude })
        }
    }
}

/// Parses a transaction date: ISO `2025-09-15` or Turkish `15.09.2025`.
pub fn parse_date(value: &str) -> ParseResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::Empty);
    }

    ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ParseError::InvalidDate(value.to_string()))
}

// =============================================================================
// Normalization
// =============================================================================

/// A sign plus digit strings, separators already resolved.
#[derive(Debug, PartialEq, Eq)]
struct Normalized {
    negative: bool,
    integer: String,
    fraction: String,
}

impl Normalized {
    fn canonical(&self) -> String {
        format!(
            "{}{}.{}",
            if self.negative { "-" } else { "" },
            if self.integer.is_empty() { "0" } else { &self.integer },
            if self.fraction.is_empty() { "0" } else { &self.fraction },
        )
    }

    /// Kuruş value, rounding the third fraction digit half away from zero.
    fn to_cents(&self) -> Option<i64> {
        let whole: i64 = if self.integer.is_empty() {
            0
        } else {
            self.integer.parse().ok()?
        };

        let mut digits = self.fraction.bytes().map(|b| (b - b'0') as i64);
        let tens = digits.next().unwrap_or(0);
        let units = digits.next().unwrap_or(0);
        let round_up = digits.next().map_or(false, |d| d >= 5);

        let cents = whole
            .checked_mul(100)?
            .checked_add(tens * 10 + units + i64::from(round_up))?;

        Some(if self.negative { -cents } else { cents })
    }
}

const CURRENCY_CODES: [&str; 2] = ["TRY", "TL"];

fn strip_currency(raw: &str) -> String {
    let mut text: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '₺' | '$' | '€' | '£'))
        .collect();

    for code in CURRENCY_CODES {
        let upper = text.to_uppercase();
        if upper.ends_with(code) {
            text.truncate(text.len() - code.len());
        } else if upper.starts_with(code) {
            text.drain(..code.len());
        }
    }

    text
}

fn normalize(raw: &str) -> ParseResult<Normalized> {
    let text = strip_currency(raw);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let invalid = || ParseError::InvalidNumber(raw.trim().to_string());

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(invalid());
    }

    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    // (decimal separator, grouping separator)
    let (decimal, grouping) = match (dots, commas) {
        (0, 0) => (None, None),
        (_, 0) if dots > 1 => (None, Some('.')),
        (1, 0) => {
            let (head, tail) = body.split_once('.').ok_or_else(invalid)?;
            if tail.len() == 3 && !head.is_empty() && head != "0" {
                (None, Some('.'))
            } else {
                (Some('.'), None)
            }
        }
        (0, 1) => (Some(','), None),
        (0, _) => (None, Some(',')),
        _ => {
            let last_dot = body.rfind('.').ok_or_else(invalid)?;
            let last_comma = body.rfind(',').ok_or_else(invalid)?;
            if last_comma > last_dot {
                (Some(','), Some('.'))
            } else {
                (Some('.'), Some(','))
            }
        }
    };

    let (int_part, frac_part) = match decimal {
        Some(sep) => {
            let (head, tail) = body.rsplit_once(sep).ok_or_else(invalid)?;
            if !tail.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            (head, tail)
        }
        None => (body, ""),
    };

    let integer = match grouping {
        Some(sep) => {
            let groups: Vec<&str> = int_part.split(sep).collect();
            let first_ok = (1..=3).contains(&groups[0].len());
            let rest_ok = groups[1..].iter().all(|g| g.len() == 3);
            if !first_ok || !rest_ok {
                return Err(invalid());
            }
            groups.concat()
        }
        None => int_part.to_string(),
    };

    if !integer.chars().all(|c| c.is_ascii_digit()) || (integer.is_empty() && frac_part.is_empty())
    {
        return Err(invalid());
    }

    Ok(Normalized {
        negative,
        integer,
        fraction: frac_part.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
