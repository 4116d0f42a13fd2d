//! # Domain Types
//!
//! Core domain types used throughout the Kuyum ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Sale       │   │   StockItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (INTEGER)   │◄──│  customer_id    │   │  id (INTEGER)   │       │
//! │  │  name + phone   │   │  txn_type       │   │  code (unique)  │       │
//! │  │  balance_cents  │   │  total/paid/due │   │  qty ≥ 0        │       │
//! │  └───────┬─────────┘   └───────┬─────────┘   └───────┬─────────┘       │
//! │          │                     │                     │                  │
//! │          ▼                     ▼                     ▼                  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CustomerLedger  │   │    SaleItem     │   │   StockMove     │       │
//! │  │  Borç / Alacak  │   │  snapshot line  │   │  OUT / IN / ADJ │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │  CashLedger     │  Kasa / Banka journal, Giriş / Çıkış              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Labels
//! Enum values are stored with the labels the shop uses on paper
//! ("Satış", "Borç", "Giriş"...). Rust code uses the English variant names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a transaction from the shop's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum TxnType {
    /// Goods leave the shelf, the customer owes the shop.
    #[serde(rename = "Satış")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Satış"))]
    Sale,
    /// Goods enter the shelf, the shop owes the customer.
    #[serde(rename = "Alış")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Alış"))]
    Purchase,
}

impl TxnType {
    pub const fn label(&self) -> &'static str {
        match self {
            TxnType::Sale => "Satış",
            TxnType::Purchase => "Alış",
        }
    }

    #[inline]
    pub const fn is_sale(&self) -> bool {
        matches!(self, TxnType::Sale)
    }

    /// Sign applied to line quantities when adjusting stock.
    #[inline]
    pub const fn stock_sign(&self) -> i64 {
        match self {
            TxnType::Sale => -1,
            TxnType::Purchase => 1,
        }
    }

    pub const fn move_type(&self) -> MoveType {
        match self {
            TxnType::Sale => MoveType::Out,
            TxnType::Purchase => MoveType::In,
        }
    }

    pub const fn cash_entry_type(&self) -> CashEntryType {
        match self {
            TxnType::Sale => CashEntryType::Inflow,
            TxnType::Purchase => CashEntryType::Outflow,
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TxnType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Satış" => Ok(TxnType::Sale),
            "Alış" => Ok(TxnType::Purchase),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["Satış".to_string(), "Alış".to_string()],
            }),
        }
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// How the customer settles a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum PayType {
    #[serde(rename = "Nakit")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Nakit"))]
    Cash,
    #[serde(rename = "Kart")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kart"))]
    Card,
    #[serde(rename = "Havale")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Havale"))]
    Transfer,
    /// Deferred payment. Nothing is collected at the counter.
    #[serde(rename = "Veresiye")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Veresiye"))]
    Credit,
}

impl PayType {
    pub const ALL: [PayType; 4] = [
        PayType::Cash,
        PayType::Card,
        PayType::Transfer,
        PayType::Credit,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            PayType::Cash => "Nakit",
            PayType::Card => "Kart",
            PayType::Transfer => "Havale",
            PayType::Credit => "Veresiye",
        }
    }

    #[inline]
    pub const fn is_credit(&self) -> bool {
        matches!(self, PayType::Credit)
    }
}

impl fmt::Display for PayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive, so "nakit" from a free-text field still routes to the till.
impl FromStr for PayType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PayType::ALL
            .into_iter()
            .find(|p| p.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "pay_type".to_string(),
                allowed: PayType::ALL.iter().map(|p| p.label().to_string()).collect(),
            })
    }
}

// =============================================================================
// Small Enums
// =============================================================================

/// Stock movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveType {
    Out,
    In,
    /// Manual correction. Reserved; the ledger engine never produces it.
    #[serde(rename = "ADJ")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ADJ"))]
    Adjust,
}

/// Customer ledger direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum LedgerDirection {
    /// Borç: raises what the customer owes.
    #[serde(rename = "Borç")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Borç"))]
    Debit,
    /// Alacak: lowers what the customer owes.
    #[serde(rename = "Alacak")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Alacak"))]
    Credit,
}

/// Cash journal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CashEntryType {
    #[serde(rename = "Giriş")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Giriş"))]
    Inflow,
    #[serde(rename = "Çıkış")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Çıkış"))]
    Outflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CustomerStatus {
    #[serde(rename = "Aktif")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Aktif"))]
    Active,
    #[serde(rename = "Pasif")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pasif"))]
    Inactive,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Active
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account (cari hesap).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    /// Optional shop-assigned code.
    pub code: Option<String>,
    pub name: String,
    /// Empty string when unknown; part of the identity match.
    pub phone: String,
    pub status: CustomerStatus,
    /// Positive means the customer owes the shop.
    pub balance_cents: i64,
    #[ts(as = "Option<String>")]
    pub last_txn_at: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// Text form used by customer pickers: `Name — Phone`.
    pub fn display_text(&self) -> String {
        if self.phone.is_empty() {
            self.name.clone()
        } else {
            format!("{} — {}", self.name, self.phone)
        }
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// A catalogue item with its on-hand quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockItem {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    /// Fineness in parts per thousand (916 ≈ 22 ayar).
    pub milyem: Option<i64>,
    /// Karat.
    pub ayar: Option<i64>,
    pub gram: f64,
    /// Never negative.
    pub qty: i64,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
    /// İşçilik pricing mode as written on the tag (e.g. "TL", "Milyem").
    pub workmanship_kind: Option<String>,
    pub workmanship_received_cents: i64,
    pub workmanship_paid_cents: i64,
    /// VAT in basis points (2000 = %20).
    pub vat_bps: i64,
    pub critical_qty: i64,
}

impl StockItem {
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    #[inline]
    pub fn buy_price(&self) -> Money {
        Money::from_cents(self.buy_price_cents)
    }

    /// True when the shelf is at or below the warning threshold.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.qty <= self.critical_qty
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale or purchase header. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub txn_type: TxnType,
    pub doc_no: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub customer_id: Option<i64>,
    pub pay_type: PayType,
    /// Effective payment: capped at total, zero for Veresiye.
    pub paid_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// `total_cents - paid_cents`.
    pub due_cents: i64,
    /// Raw amount handed over, only kept under the record-on-sale policy.
    pub tendered_cents: Option<i64>,
    pub change_cents: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    #[inline]
    pub fn due(&self) -> Money {
        Money::from_cents(self.due_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale.
/// Uses snapshot pattern to freeze catalogue data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    /// None when the code did not resolve to a stock item.
    pub stock_id: Option<i64>,
    pub code: String,
    pub name: String,
    pub gram: f64,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub milyem: Option<String>,
    /// İşçilik charged on this line.
    pub workmanship_cents: i64,
    pub line_total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Audit Rows
// =============================================================================

/// Immutable record of a stock quantity change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMove {
    pub id: i64,
    pub stock_id: i64,
    pub sale_id: Option<i64>,
    pub move_type: MoveType,
    /// Absolute quantity moved.
    pub qty: i64,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// One line on a customer's account statement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerLedgerEntry {
    pub id: i64,
    pub customer_id: i64,
    pub sale_id: Option<i64>,
    pub direction: LedgerDirection,
    /// Signed: purchases are stored as negative Alacak amounts.
    pub amount_cents: i64,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// One line of the Kasa / Banka journal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashLedgerEntry {
    pub id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Free-form `HH:MM`; None for entries written by the ledger engine.
    pub time: Option<String>,
    pub account: String,
    pub entry_type: CashEntryType,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub customer_id: Option<i64>,
    pub sale_id: Option<i64>,
}

impl CashLedgerEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Read Views
// =============================================================================

/// Dashboard row: a sale joined with its customer's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecentTransaction {
    pub sale_id: i64,
    pub txn_type: TxnType,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub doc_no: Option<String>,
    /// None for walk-in transactions.
    pub customer_name: Option<String>,
    pub pay_type: PayType,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub due_cents: i64,
}

/// Row counts per table, for diagnostics and atomicity checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableCounts {
    pub customers: i64,
    pub stock_items: i64,
    pub sales: i64,
    pub sale_items: i64,
    pub customer_ledger: i64,
    pub stock_moves: i64,
    pub cash_ledger: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
