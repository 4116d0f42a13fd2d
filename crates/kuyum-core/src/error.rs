//! # Error Types
//!
//! Domain-specific error types for kuyum-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kuyum-core errors (this file)                                         │
//! │  ├── ParseError       - Malformed numeric/date input                   │
//! │  ├── ValidationError  - Required fields, ranges, allowed values        │
//! │  └── CoreError        - Business rule failures (stock shortage)        │
//! │                                                                         │
//! │  kuyum-db errors (separate crate)                                      │
//! │  ├── DbError          - Storage failures                               │
//! │  └── LedgerError      - CoreError | DbError, what callers see          │
//! │                                                                         │
//! │  Flow: ParseError → CoreError → LedgerError → presentation             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is raised before the storage transaction opens. None of
//! them can leave a half-written sale behind.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Parse Error
// =============================================================================

/// Numeric or date input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was empty after stripping currency symbols and whitespace.
    #[error("value is empty")]
    Empty,

    /// Input is not a number in any accepted format.
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    /// Input is not a date in any accepted format.
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD or DD.MM.YYYY)")]
    InvalidDate(String),
}

// =============================================================================
// Stock Shortage
// =============================================================================

/// One sale line that asks for more than the shelf holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockShortage {
    pub code: String,
    pub name: String,
    pub requested: i64,
    /// Quantity on hand; 0 when the code is unknown.
    pub available: i64,
}

impl fmt::Display for StockShortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): requested {}, available {}",
            self.code, self.name, self.requested, self.available
        )
    }
}

fn list_shortages(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more sale lines exceed the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale: STK0008 × 10, STK0001 × 1
    ///      │
    ///      ▼
    /// Check stock: STK0008 available=3, STK0001 available=5
    ///      │
    ///      ▼
    /// InsufficientStock { shortages: [STK0008 10/3] }
    ///      │
    ///      ▼
    /// UI shows every deficient line at once, nothing was written
    /// ```
    #[error("Insufficient stock: {}", list_shortages(.shortages))]
    InsufficientStock { shortages: Vec<StockShortage> },

    /// A request field failed to parse.
    #[error("{field}: {source}")]
    InvalidField {
        field: String,
        #[source]
        source: ParseError,
    },

    /// A transaction was submitted without line items.
    #[error("Transaction has no line items")]
    EmptyTransaction,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Wraps a parse failure with the name of the offending field.
    pub fn invalid_field(field: impl Into<String>, source: ParseError) -> Self {
        CoreError::InvalidField {
            field: field.into(),
            source,
        }
    }

    /// Returns the deficient lines when this is a stock shortage.
    pub fn shortages(&self) -> Option<&[StockShortage]> {
        match self {
            CoreError::InsufficientStock { shortages } => Some(shortages),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while turning raw presentation input into request value objects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
