//! # Request Value Objects
//!
//! What the presentation layer submits, and the validated form the ledger
//! engine works with.
//!
//! ## Two Shapes per Request
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleHeaderInput + Vec<LineItemInput>     (raw, display text allowed)   │
//! │       │                                                                 │
//! │       │  SaleRequest::from_input()                                      │
//! │       │  ├── parse_money / parse_quantity / parse_date                  │
//! │       │  ├── validate codes, names, quantities                          │
//! │       │  └── split "Name — Phone" into CustomerRef                      │
//! │       ▼                                                                 │
//! │  SaleRequest { Vec<SaleLine> }            (exact values only)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerService::create_sale  (no parsing past this point)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::parse::{parse_date, parse_decimal, parse_money, parse_quantity, NumericInput};
use crate::types::{CashEntryType, PayType, TxnType};
use crate::MAX_AMOUNT_CENTS;
use crate::validation::{
    validate_cash_amount, validate_code, validate_gram, validate_line_count, validate_name,
    validate_non_negative, validate_optional_text, validate_quantity,
};

/// Separator between name and phone in customer picker text.
pub const CUSTOMER_TEXT_SEPARATOR: char = '—';

// =============================================================================
// Raw Input
// =============================================================================

/// Transaction header as collected by the entry form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleHeaderInput {
    /// "Satış" or "Alış".
    #[serde(rename = "type")]
    pub txn_type: String,
    pub doc_no: Option<String>,
    pub date: String,
    pub notes: Option<String>,
    /// `Name — Phone`; empty for walk-in customers.
    #[serde(default)]
    pub customer_text: String,
    pub pay_type: String,
    #[serde(default)]
    pub paid_amount: NumericInput,
    #[serde(default)]
    pub discount: NumericInput,
}

/// One row of the entry form's item table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub gram: NumericInput,
    pub qty: NumericInput,
    pub unit_price: NumericInput,
    pub milyem: Option<String>,
    #[serde(default, alias = "iscilik")]
    pub workmanship: NumericInput,
    /// When absent: `qty × unit_price + workmanship`.
    #[serde(default)]
    pub line_total: Option<NumericInput>,
}

// =============================================================================
// Customer Reference
// =============================================================================

/// A customer identified by exact name and phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub name: String,
    pub phone: String,
}

impl CustomerRef {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        CustomerRef {
            name: name.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
        }
    }

    /// Splits picker text into name and phone.
    ///
    /// Returns None for blank text (walk-in). Text without a separator is a
    /// name with an empty phone.
    ///
    /// ```rust
    /// use kuyum_core::request::CustomerRef;
    ///
    /// let c = CustomerRef::parse("Ayşe Yılmaz — 0532 111 2233").unwrap();
    /// assert_eq!(c.name, "Ayşe Yılmaz");
    /// assert_eq!(c.phone, "0532 111 2233");
    /// assert!(CustomerRef::parse("  ").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let (name, phone) = text
            .split_once(CUSTOMER_TEXT_SEPARATOR)
            .unwrap_or((text, ""));
        let customer = CustomerRef::new(name, phone);
        if customer.name.is_empty() {
            None
        } else {
            Some(customer)
        }
    }
}

// =============================================================================
// Validated Sale Request
// =============================================================================

/// A validated line. All money is exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub code: String,
    pub name: String,
    pub gram: f64,
    pub qty: i64,
    pub unit_price: Money,
    pub milyem: Option<String>,
    pub workmanship: Money,
    pub line_total: Money,
}

impl SaleLine {
    /// A line priced at `qty × unit_price` with no workmanship.
    pub fn new(code: impl Into<String>, name: impl Into<String>, qty: i64, unit_price: Money) -> Self {
        SaleLine {
            code: code.into(),
            name: name.into(),
            gram: 0.0,
            qty,
            unit_price,
            milyem: None,
            workmanship: Money::zero(),
            line_total: unit_price.saturating_mul(qty),
        }
    }

    pub fn with_gram(mut self, gram: f64) -> Self {
        self.gram = gram;
        self
    }

    /// Adds workmanship and reprices the line.
    pub fn with_workmanship(mut self, workmanship: Money) -> Self {
        self.workmanship = workmanship;
        self.line_total = self
            .unit_price
            .saturating_mul(self.qty)
            .saturating_add(workmanship);
        self
    }

    fn from_input(index: usize, input: &LineItemInput) -> CoreResult<Self> {
        let field = |name: &str| format!("items[{}].{}", index, name);

        let code = input.code.trim().to_string();
        validate_code(&code)?;
        validate_name(&field("name"), &input.name)?;

        let qty = parse_quantity(&input.qty).map_err(|e| CoreError::invalid_field(field("qty"), e))?;
        validate_quantity(qty)?;

        let gram = parse_decimal(&input.gram).map_err(|e| CoreError::invalid_field(field("gram"), e))?;
        validate_gram(gram)?;

        let unit_price = parse_money(&input.unit_price)
            .map_err(|e| CoreError::invalid_field(field("unit_price"), e))?;
        validate_non_negative(&field("unit_price"), unit_price)?;

        let workmanship = parse_money(&input.workmanship)
            .map_err(|e| CoreError::invalid_field(field("workmanship"), e))?;
        validate_non_negative(&field("workmanship"), workmanship)?;

        let line_total = match &input.line_total {
            Some(v) => parse_money(v).map_err(|e| CoreError::invalid_field(field("line_total"), e))?,
            None => unit_price
                .checked_mul(qty)
                .and_then(|subtotal| subtotal.checked_add(workmanship))
                .ok_or_else(|| amount_out_of_range(field("line_total")))?,
        };
        validate_non_negative(&field("line_total"), line_total)?;

        Ok(SaleLine {
            code,
            name: input.name.trim().to_string(),
            gram,
            qty,
            unit_price,
            milyem: non_blank(input.milyem.as_deref()),
            workmanship,
            line_total,
        })
    }
}

/// A sale or purchase ready for the ledger engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub txn_type: TxnType,
    pub doc_no: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// None for walk-in.
    pub customer: Option<CustomerRef>,
    pub pay_type: PayType,
    /// Amount handed over, before capping at the total.
    pub paid_requested: Money,
    pub discount: Money,
    pub lines: Vec<SaleLine>,
}

impl SaleRequest {
    /// Starts a request with no lines, no customer, nothing paid.
    pub fn new(txn_type: TxnType, date: NaiveDate, pay_type: PayType) -> Self {
        SaleRequest {
            txn_type,
            doc_no: None,
            date,
            notes: None,
            customer: None,
            pay_type,
            paid_requested: Money::zero(),
            discount: Money::zero(),
            lines: Vec::new(),
        }
    }

    pub fn doc_no(mut self, doc_no: impl Into<String>) -> Self {
        self.doc_no = Some(doc_no.into());
        self
    }

    pub fn customer(mut self, customer: CustomerRef) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn paid(mut self, amount: Money) -> Self {
        self.paid_requested = amount;
        self
    }

    pub fn discount(mut self, amount: Money) -> Self {
        self.discount = amount;
        self
    }

    pub fn line(mut self, line: SaleLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Parses and validates raw form input.
    ///
    /// Every field is checked here, so nothing can fail on bad input once
    /// the storage transaction is open.
    pub fn from_input(header: &SaleHeaderInput, items: &[LineItemInput]) -> CoreResult<Self> {
        let txn_type: TxnType = header.txn_type.parse()?;
        let pay_type: PayType = header.pay_type.parse()?;
        let date = parse_date(&header.date).map_err(|e| CoreError::invalid_field("date", e))?;

        let doc_no = non_blank(header.doc_no.as_deref());
        validate_optional_text("doc_no", doc_no.as_deref(), 50)?;
        let notes = non_blank(header.notes.as_deref());
        validate_optional_text("notes", notes.as_deref(), 1000)?;

        let paid_requested = parse_money(&header.paid_amount)
            .map_err(|e| CoreError::invalid_field("paid_amount", e))?;
        validate_non_negative("paid_amount", paid_requested)?;

        let discount =
            parse_money(&header.discount).map_err(|e| CoreError::invalid_field("discount", e))?;
        validate_non_negative("discount", discount)?;

        let lines = items
            .iter()
            .enumerate()
            .map(|(i, item)| SaleLine::from_input(i, item))
            .collect::<CoreResult<Vec<_>>>()?;

        let request = SaleRequest {
            txn_type,
            doc_no,
            date,
            notes,
            customer: CustomerRef::parse(&header.customer_text),
            pay_type,
            paid_requested,
            discount,
            lines,
        };
        request.validate()?;
        Ok(request)
    }

    /// Structural checks shared by both construction paths.
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyTransaction);
        }
        validate_line_count(self.lines.len())?;
        validate_non_negative("paid_amount", self.paid_requested)?;
        validate_non_negative("discount", self.discount)?;

        let mut gross = Money::zero();
        for line in &self.lines {
            validate_code(&line.code)?;
            validate_quantity(line.qty)?;
            validate_non_negative("line_total", line.line_total)?;
            gross = gross
                .checked_add(line.line_total)
                .ok_or_else(|| amount_out_of_range("total".to_string()))?;
        }
        validate_non_negative("total", gross)?;
        Ok(())
    }
}

fn amount_out_of_range(field: String) -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field,
        min: 0,
        max: MAX_AMOUNT_CENTS,
    })
}

// =============================================================================
// Cash Entry
// =============================================================================

/// A journal line to append to the Kasa / Banka book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCashEntry {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub time: Option<String>,
    pub account: String,
    pub entry_type: CashEntryType,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Money,
    pub customer_id: Option<i64>,
    pub sale_id: Option<i64>,
}

impl NewCashEntry {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("account", &self.account)?;
        validate_cash_amount(self.amount)?;
        Ok(())
    }
}

// =============================================================================
// New Stock Item
// =============================================================================

/// Catalogue data for a stock item that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockItem {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub milyem: Option<i64>,
    pub ayar: Option<i64>,
    pub gram: f64,
    pub qty: i64,
    pub buy_price: Money,
    pub sell_price: Money,
    pub critical_qty: i64,
}

impl NewStockItem {
    /// Shelf entry for an unknown code received on a purchase.
    ///
    /// Starts at qty 0; the purchase's stock step adds the received amount.
    pub fn from_purchase_line(line: &SaleLine, critical_qty: i64) -> Self {
        NewStockItem {
            code: line.code.clone(),
            name: line.name.clone(),
            category: None,
            milyem: line.milyem.as_deref().and_then(|m| m.trim().parse().ok()),
            ayar: None,
            gram: line.gram,
            qty: 0,
            buy_price: line.unit_price,
            sell_price: Money::zero(),
            critical_qty,
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
