//! # kuyum-core: Pure Ledger Logic for the Kuyum Shop
//!
//! This crate holds every rule of the jewelry-shop ledger that can be
//! decided without touching the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kuyum Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation (desktop forms)                   │   │
//! │  │    Sale form ──► Stock page ──► Customers ──► Kasa / Banka      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SaleHeaderInput + LineItemInput         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kuyum-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   parse   │  │  request  │  │  ledger   │  │  events   │  │   │
//! │  │   │  "1.234,5"│  │SaleRequest│  │ totals    │  │ Committed │  │   │
//! │  │   │  → Money  │  │ SaleLine  │  │ postings  │  │ LedgerEvt │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              kuyum-db (Storage + LedgerService)                 │   │
//! │  │        SQLite, write lock, scoped transactions, read views      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer kuruş `Money`
//! - [`parse`] - Locale-tolerant money, quantity and date parsing
//! - [`types`] - Stored rows and their enums
//! - [`request`] - Raw form input and validated request value objects
//! - [`ledger`] - Totals, effective payment, stock check, customer postings
//! - [`events`] - Change notifications returned with committed results
//! - [`catalogue`] - Default stock for a new shop
//! - [`validation`] - Field-level business rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kuyum_core::ledger::SaleTotals;
//! use kuyum_core::request::SaleLine;
//! use kuyum_core::{Money, PayType};
//!
//! let lines = vec![SaleLine::new("STK0001", "Bilezik 22 Ayar", 2, Money::from_major(100))];
//! let totals = SaleTotals::compute(&lines, Money::zero(), Money::from_major(250), PayType::Cash);
//!
//! assert_eq!(totals.paid_effective, Money::from_major(200));
//! assert_eq!(totals.change, Money::from_major(50));
//! assert!(totals.due.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalogue;
pub mod error;
pub mod events;
pub mod ledger;
pub mod money;
pub mod parse;
pub mod request;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ParseError, StockShortage, ValidationError};
pub use events::{Committed, LedgerEvent, SalePayload};
pub use money::Money;
pub use parse::{parse_money, NumericInput};
pub use request::{
    CustomerRef, LineItemInput, NewCashEntry, NewStockItem, SaleHeaderInput, SaleLine,
    SaleRequest,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines on a single transaction.
pub const MAX_LINE_ITEMS: usize = 200;

/// Maximum quantity on a single line.
///
/// Catches a mistyped count (2000 instead of 20) before it empties the shelf.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest single amount accepted anywhere in a request, in kuruş (10 billion ₺).
///
/// A transaction total is bounded by the same value, so totals, balances and
/// sums of lines stay far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;
