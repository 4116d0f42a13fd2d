//! # Ledger Events
//!
//! Change notifications returned alongside every successful write.
//!
//! The engine never dispatches anything itself. Callers receive a
//! [`Committed`] value and decide how to refresh their views:
//!
//! ```text
//! create_sale(...) ──► Committed {
//!                          value:  SalePayload { sale_id, total, paid, due, ... },
//!                          events: [StockChanged, CustomersChanged,
//!                                   CashChanged, SaleCommitted(payload)],
//!                      }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PayType, TxnType};

/// Result summary of a committed sale or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePayload {
    pub sale_id: i64,
    pub txn_type: TxnType,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub doc_no: Option<String>,
    pub customer_id: Option<i64>,
    pub total: Money,
    /// Effective payment.
    pub paid: Money,
    pub due: Money,
    pub pay_type: PayType,
}

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum LedgerEvent {
    StockChanged,
    CustomersChanged,
    CashChanged,
    SaleCommitted(SalePayload),
}

/// A committed result and the events it produced, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committed<T> {
    pub value: T,
    pub events: Vec<LedgerEvent>,
}

impl<T> Committed<T> {
    pub fn new(value: T, events: Vec<LedgerEvent>) -> Self {
        Committed { value, events }
    }

    pub fn into_parts(self) -> (T, Vec<LedgerEvent>) {
        (self.value, self.events)
    }

    /// True when `event` was emitted.
    pub fn emitted(&self, event: &LedgerEvent) -> bool {
        self.events.contains(event)
    }
}

/// Events for a committed sale. `CashChanged` only when cash was journaled.
pub fn sale_events(payload: &SalePayload, cash_written: bool) -> Vec<LedgerEvent> {
    let mut events = vec![LedgerEvent::StockChanged, LedgerEvent::CustomersChanged];
    if cash_written {
        events.push(LedgerEvent::CashChanged);
    }
    events.push(LedgerEvent::SaleCommitted(payload.clone()));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SalePayload {
        SalePayload {
            sale_id: 7,
            txn_type: TxnType::Sale,
            date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
            doc_no: Some("SAT-0007".to_string()),
            customer_id: Some(1),
            total: Money::from_major(200),
            paid: Money::from_major(200),
            due: Money::zero(),
            pay_type: PayType::Cash,
        }
    }

    #[test]
    fn test_sale_events_order() {
        let p = payload();
        let events = sale_events(&p, true);
        assert_eq!(
            events,
            vec![
                LedgerEvent::StockChanged,
                LedgerEvent::CustomersChanged,
                LedgerEvent::CashChanged,
                LedgerEvent::SaleCommitted(p.clone()),
            ]
        );

        let committed = Committed::new(p, sale_events(&payload(), false));
        assert!(!committed.emitted(&LedgerEvent::CashChanged));
        assert!(committed.emitted(&LedgerEvent::StockChanged));
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(LedgerEvent::CashChanged).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "cash_changed" }));

        let json = serde_json::to_value(LedgerEvent::SaleCommitted(payload())).unwrap();
        assert_eq!(json["kind"], "sale_committed");
        assert_eq!(json["payload"]["total"], 20_000);
        assert_eq!(json["payload"]["txn_type"], "Satış");
    }
}
