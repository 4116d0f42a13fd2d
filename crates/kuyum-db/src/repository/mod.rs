//! # Repository Module
//!
//! SQL for each table group, in one place.
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reads: &self methods on the pool                                      │
//! │       db.stock().list()          db.sales().recent(10)                 │
//! │                                                                         │
//! │  Writes: associated functions on a transaction connection              │
//! │       let mut txn = db.begin_write().await?;                           │
//! │       StockRepository::apply_delta(txn.conn(), id, -2).await?;         │
//! │       SaleRepository::insert_item(txn.conn(), sale_id, ...).await?;    │
//! │       txn.commit().await?;                                              │
//! │                                                                         │
//! │  A write can only run inside a WriteTxn, so it always holds the lock.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customers, balances, statements
//! - [`stock::StockRepository`] - Stock items and movement log
//! - [`sale::SaleRepository`] - Transaction headers and lines
//! - [`cash::CashRepository`] - Kasa / Banka journal

pub mod cash;
pub mod customer;
pub mod sale;
pub mod stock;
