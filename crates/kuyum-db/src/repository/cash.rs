//! # Cash Repository
//!
//! The Kasa / Banka journal. Append-only.

use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kuyum_core::{CashLedgerEntry, NewCashEntry};

const CASH_COLUMNS: &str = r#"
    id, date, time, account, entry_type, category, description,
    amount_cents, customer_id, sale_id
"#;

/// Repository for cash journal operations.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    /// Creates a new CashRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Whole journal, newest first.
    pub async fn list(&self) -> DbResult<Vec<CashLedgerEntry>> {
        let entries = sqlx::query_as::<_, CashLedgerEntry>(&format!(
            "SELECT {} FROM cash_ledger ORDER BY date DESC, id DESC",
            CASH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Journal lines linked to one sale.
    pub async fn for_sale(&self, sale_id: i64) -> DbResult<Vec<CashLedgerEntry>> {
        let entries = sqlx::query_as::<_, CashLedgerEntry>(&format!(
            "SELECT {} FROM cash_ledger WHERE sale_id = ?1 ORDER BY id",
            CASH_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_ledger")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Appends one journal line inside a write transaction.
    pub async fn insert(conn: &mut SqliteConnection, entry: &NewCashEntry) -> DbResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO cash_ledger (
                date, time, account, entry_type, category, description,
                amount_cents, customer_id, sale_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(entry.date)
        .bind(&entry.time)
        .bind(&entry.account)
        .bind(entry.entry_type)
        .bind(&entry.category)
        .bind(&entry.description)
        .bind(entry.amount.cents())
        .bind(entry.customer_id)
        .bind(entry.sale_id)
        .execute(conn)
        .await?
        .last_insert_rowid();

        debug!(entry_id = id, account = %entry.account, amount = %entry.amount, "Cash entry appended");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use kuyum_core::{CashEntryType, Money};

    fn entry(day: u32, amount: i64) -> NewCashEntry {
        NewCashEntry {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            time: None,
            account: "Kasa".to_string(),
            entry_type: CashEntryType::Inflow,
            category: Some("Diğer".to_string()),
            description: None,
            amount: Money::from_major(amount),
            customer_id: None,
            sale_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut txn = db.begin_write().await.unwrap();
        CashRepository::insert(txn.conn(), &entry(14, 10)).await.unwrap();
        CashRepository::insert(txn.conn(), &entry(15, 20)).await.unwrap();
        CashRepository::insert(txn.conn(), &entry(15, 30)).await.unwrap();
        txn.commit().await.unwrap();

        let amounts: Vec<i64> = db
            .cash()
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| e.amount().lira())
            .collect();
        assert_eq!(amounts, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut txn = db.begin_write().await.unwrap();
        let err = CashRepository::insert(txn.conn(), &entry(15, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
