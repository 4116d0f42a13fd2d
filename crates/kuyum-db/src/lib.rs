//! # kuyum-db: Storage and Ledger Engine for Kuyum
//!
//! This crate owns the shop's SQLite database and the transactional ledger
//! engine that writes to it. It uses sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kuyum Data Flow                                  │
//! │                                                                         │
//! │  Sale form (SaleHeaderInput + LineItemInput)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kuyum-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LedgerService │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (ledger.rs)  │    │ customer.rs   │    │  (embedded)  │  │   │
//! │  │   │               │───►│ stock.rs      │    │ 001_init.sql │  │   │
//! │  │   │ create_sale   │    │ sale.rs       │    │              │  │   │
//! │  │   │ read views    │    │ cash.rs       │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼───────┐                                             │   │
//! │  │   │   Database    │  SqlitePool + write lock + WriteTxn         │   │
//! │  │   │   (pool.rs)   │                                             │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Committed { payload, events } back to the caller                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, write lock, scoped write transactions
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - Ledger policies (accounts, overpayment, stock auto-create)
//! - [`ledger`] - `LedgerService`: create_sale, cash journal, read views, seeding
//! - [`repository`] - SQL per table group
//! - [`error`] - Storage and ledger error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kuyum_db::{Database, DbConfig, LedgerConfig};
//!
//! let db = Database::new(DbConfig::new("kuyum.db")).await?;
//! let ledger = db.ledger(LedgerConfig::from_env());
//!
//! let committed = ledger.create_sale_from_input(&header, &items).await?;
//! for event in &committed.events {
//!     // refresh the affected views
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{LedgerConfig, OverpaymentPolicy};
pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use ledger::{LedgerService, SeedReport};
pub use pool::{Database, DbConfig, WriteTxn};

// Repository re-exports for convenience
pub use repository::cash::CashRepository;
pub use repository::customer::CustomerRepository;
pub use repository::sale::{SaleHeader, SaleRepository};
pub use repository::stock::StockRepository;
