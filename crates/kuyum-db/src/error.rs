//! # Database Error Types
//!
//! Error types for storage operations and the ledger service.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)           CoreError (kuyum-core)           │
//! │       │                                    │                            │
//! │       ▼                                    │                            │
//! │  DbError ← adds categorization             │                            │
//! │       │                                    │                            │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │  LedgerError ← what every LedgerService operation returns              │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  Presentation shows the shortage list or a storage failure             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `DbError` raised inside a write transaction drops the transaction, so
//! SQLite rolls back everything written since `begin_write`.

use kuyum_core::{CoreError, LedgerEvent, SalePayload, StockShortage};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate stock code
    /// - Inserting a duplicate customer code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative qty, due mismatch...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Directory doesn't exist or isn't writable
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wraps a begin/commit failure.
    pub fn transaction(err: sqlx::Error) -> Self {
        DbError::TransactionFailed(err.to_string())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// Error returned by every `LedgerService` operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected before any write: bad input or not enough stock.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failed during the write; the transaction was rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// The sale committed but its cash journal line could not be appended.
    ///
    /// The payload describes the committed sale so the caller can retry
    /// with `record_cash_entry`. `events` lists the views the committed part
    /// changed; it never contains `CashChanged`.
    #[error("Sale {} committed but cash entry failed: {source}", .payload.sale_id)]
    CashNotRecorded {
        payload: Box<SalePayload>,
        events: Vec<LedgerEvent>,
        #[source]
        source: DbError,
    },
}

impl LedgerError {
    /// True when the request was rejected for lack of stock.
    pub fn is_stock_shortage(&self) -> bool {
        self.shortages().is_some()
    }

    /// Deficient lines of a stock rejection.
    pub fn shortages(&self) -> Option<&[StockShortage]> {
        match self {
            LedgerError::Core(core) => core.shortages(),
            LedgerError::Storage(_) | LedgerError::CashNotRecorded { .. } => None,
        }
    }

    /// The committed sale of a `CashNotRecorded` failure.
    pub fn committed_sale(&self) -> Option<&SalePayload> {
        match self {
            LedgerError::CashNotRecorded { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Events the caller still has to act on although the operation failed.
    ///
    /// Empty unless the sale itself committed.
    pub fn committed_events(&self) -> &[LedgerEvent] {
        match self {
            LedgerError::CashNotRecorded { events, .. } => events,
            _ => &[],
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<kuyum_core::ValidationError> for LedgerError {
    fn from(err: kuyum_core::ValidationError) -> Self {
        LedgerError::Core(err.into())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortage_helpers() {
        let err: LedgerError = CoreError::InsufficientStock {
            shortages: vec![StockShortage {
                code: "STK0008".to_string(),
                name: "Şahmeran 22 Ayar".to_string(),
                requested: 10,
                available: 3,
            }],
        }
        .into();

        assert!(err.is_stock_shortage());
        assert_eq!(err.shortages().map(|s| s[0].available), Some(3));
        assert!(err.to_string().starts_with("Insufficient stock: STK0008"));
    }

    #[test]
    fn test_storage_error_is_not_shortage() {
        let err: LedgerError = DbError::PoolExhausted.into();
        assert!(!err.is_stock_shortage());
        assert!(err.committed_events().is_empty());
        assert_eq!(err.to_string(), "Storage error: Connection pool exhausted");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
