//! # Ledger Arithmetic
//!
//! The pure half of `create_sale`: totals, effective payment, stock
//! sufficiency and the customer ledger postings. The storage crate only
//! writes what this module decides.
//!
//! ## Payment Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross = Σ line_total                                                   │
//! │  total = max(0, gross - discount)                                       │
//! │                                                                         │
//! │  pay_type == Veresiye ──► paid_effective = 0                            │
//! │  otherwise            ──► paid_effective = min(paid_requested, total)   │
//! │                                                                         │
//! │  due    = total - paid_effective          (≥ 0, exact in kuruş)         │
//! │  change = paid_requested - paid_effective (never reaches a ledger)      │
//! │                                                                         │
//! │  Example: total 200, Nakit, handed 250 → paid 200, due 0, change 50    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Customer Postings
//! ```text
//! Satış  total > 0   → Borç   +total  "Satış"        balance += total
//! Alış   total > 0   → Alacak -total  "Alış"         balance -= total
//! paid_effective > 0 → Alacak +paid   "Ödeme (Nakit)" balance -= paid
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, StockShortage};
use crate::money::Money;
use crate::request::{SaleLine, SaleRequest};
use crate::types::{LedgerDirection, PayType, TxnType};

// =============================================================================
// Totals
// =============================================================================

/// Every amount derived from a request before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub gross: Money,
    pub discount: Money,
    pub total: Money,
    pub paid_requested: Money,
    pub paid_effective: Money,
    /// Handed over beyond the total. Zero for Veresiye.
    pub change: Money,
    pub due: Money,
}

impl SaleTotals {
    pub fn compute(
        lines: &[SaleLine],
        discount: Money,
        paid_requested: Money,
        pay_type: PayType,
    ) -> Self {
        let gross = lines
            .iter()
            .fold(Money::zero(), |acc, l| acc.saturating_add(l.line_total));
        let total = (gross - discount).clamp_zero();

        let (paid_effective, change) = if pay_type.is_credit() {
            (Money::zero(), Money::zero())
        } else {
            let paid = paid_requested.min(total).clamp_zero();
            (paid, (paid_requested - paid).clamp_zero())
        };

        SaleTotals {
            gross,
            discount,
            total,
            paid_requested,
            paid_effective,
            change,
            due: total - paid_effective,
        }
    }

    pub fn for_request(request: &SaleRequest) -> Self {
        SaleTotals::compute(
            &request.lines,
            request.discount,
            request.paid_requested,
            request.pay_type,
        )
    }

    /// Something is still owed after a non-credit payment.
    #[inline]
    pub fn is_underpaid(&self, pay_type: PayType) -> bool {
        !pay_type.is_credit() && self.due.is_positive()
    }

    /// A cash journal line is written if and only if this holds.
    #[inline]
    pub fn collects_cash(&self) -> bool {
        self.paid_effective.is_positive()
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Quantity requested per code, in first-seen order.
///
/// Lines repeating a code are summed so two lines of 3 cannot slip past a
/// shelf of 5.
pub fn requested_by_code(lines: &[SaleLine]) -> Vec<(String, String, i64)> {
    let mut order: Vec<(String, String, i64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        match index.get(line.code.as_str()) {
            Some(&i) => order[i].2 += line.qty,
            None => {
                index.insert(line.code.as_str(), order.len());
                order.push((line.code.clone(), line.name.clone(), line.qty));
            }
        }
    }

    order
}

/// Fails with every deficient code when a sale asks for more than the shelf
/// holds. Codes missing from `on_hand` count as zero.
///
/// ```rust
/// use std::collections::HashMap;
/// use kuyum_core::ledger::check_stock;
/// use kuyum_core::request::SaleLine;
/// use kuyum_core::Money;
///
/// let lines = vec![SaleLine::new("STK0008", "Şahmeran", 10, Money::from_major(1))];
/// let on_hand = HashMap::from([("STK0008".to_string(), 3)]);
///
/// let err = check_stock(&lines, &on_hand).unwrap_err();
/// assert_eq!(err.shortages().unwrap()[0].available, 3);
/// ```
pub fn check_stock(lines: &[SaleLine], on_hand: &HashMap<String, i64>) -> CoreResult<()> {
    let shortages: Vec<StockShortage> = requested_by_code(lines)
        .into_iter()
        .filter_map(|(code, name, requested)| {
            let available = on_hand.get(&code).copied().unwrap_or(0);
            (requested > available).then_some(StockShortage {
                code,
                name,
                requested,
                available,
            })
        })
        .collect();

    if shortages.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InsufficientStock { shortages })
    }
}

/// Signed quantity change a line causes on its stock item.
#[inline]
pub const fn stock_delta(txn_type: TxnType, qty: i64) -> i64 {
    txn_type.stock_sign() * qty
}

// =============================================================================
// Customer Postings
// =============================================================================

/// A customer ledger row the engine will write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Posting {
    pub direction: LedgerDirection,
    /// Amount as stored on the statement.
    pub amount: Money,
    /// Effect on `customers.balance`.
    pub balance_effect: Money,
    pub description: String,
}

/// Customer ledger postings for one transaction.
pub fn customer_postings(txn_type: TxnType, pay_type: PayType, totals: &SaleTotals) -> Vec<Posting> {
    let mut postings = Vec::with_capacity(2);

    if totals.total.is_positive() {
        let (direction, signed) = match txn_type {
            TxnType::Sale => (LedgerDirection::Debit, totals.total),
            TxnType::Purchase => (LedgerDirection::Credit, -totals.total),
        };
        postings.push(Posting {
            direction,
            amount: signed,
            balance_effect: signed,
            description: txn_type.label().to_string(),
        });
    }

    if totals.paid_effective.is_positive() {
        postings.push(Posting {
            direction: LedgerDirection::Credit,
            amount: totals.paid_effective,
            balance_effect: -totals.paid_effective,
            description: format!("Ödeme ({})", pay_type.label()),
        });
    }

    postings
}

/// Net change of the customer balance across a set of postings.
pub fn balance_delta(postings: &[Posting]) -> Money {
    postings.iter().map(|p| p.balance_effect).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
