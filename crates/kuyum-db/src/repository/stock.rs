//! # Stock Repository
//!
//! Stock items, quantity adjustments and the movement log.
//!
//! ## Quantity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale line      qty 2  ──► UPDATE qty = MAX(0, qty - 2)  + OUT move 2  │
//! │  Purchase line  qty 5  ──► UPDATE qty = MAX(0, qty + 5)  + IN  move 5  │
//! │                                                                         │
//! │  qty never drops below zero; a sale that would need it to is rejected  │
//! │  by the stock check before anything is written.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kuyum_core::{MoveType, NewStockItem, StockItem, StockMove};

const STOCK_COLUMNS: &str = r#"
    id, code, name, category, milyem, ayar, gram, qty,
    buy_price_cents, sell_price_cents,
    workmanship_kind, workmanship_received_cents, workmanship_paid_cents,
    vat_bps, critical_qty
"#;

/// Repository for stock database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// All stock items ordered by code.
    pub async fn list(&self) -> DbResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(&format!(
            "SELECT {} FROM stock_items ORDER BY code",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<StockItem>> {
        let item = sqlx::query_as::<_, StockItem>(&format!(
            "SELECT {} FROM stock_items WHERE code = ?1",
            STOCK_COLUMNS
        ))
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Items at or below their critical quantity, emptiest first.
    pub async fn low_stock(&self) -> DbResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(&format!(
            "SELECT {} FROM stock_items WHERE qty <= critical_qty ORDER BY qty, code",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Movement history of one item, oldest first.
    pub async fn moves(&self, stock_id: i64) -> DbResult<Vec<StockMove>> {
        let moves = sqlx::query_as::<_, StockMove>(
            r#"
            SELECT id, stock_id, sale_id, move_type, qty, note, date
            FROM stock_moves
            WHERE stock_id = ?1
            ORDER BY id
            "#,
        )
        .bind(stock_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(moves)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn move_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_moves")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Inside a write transaction
    // =========================================================================

    /// Stock item id for a code, if it exists.
    pub async fn find_id(conn: &mut SqliteConnection, code: &str) -> DbResult<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM stock_items WHERE code = ?1")
            .bind(code)
            .fetch_optional(conn)
            .await?;
        Ok(id)
    }

    /// On-hand quantity per code. Unknown codes are absent from the map.
    pub async fn on_hand<'a>(
        conn: &mut SqliteConnection,
        codes: impl IntoIterator<Item = &'a str>,
    ) -> DbResult<HashMap<String, i64>> {
        let mut on_hand = HashMap::new();

        for code in codes {
            if on_hand.contains_key(code) {
                continue;
            }
            let qty: Option<i64> = sqlx::query_scalar("SELECT qty FROM stock_items WHERE code = ?1")
                .bind(code)
                .fetch_optional(&mut *conn)
                .await?;
            if let Some(qty) = qty {
                on_hand.insert(code.to_string(), qty);
            }
        }

        Ok(on_hand)
    }

    /// Inserts a stock item.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code already exists.
    pub async fn insert(conn: &mut SqliteConnection, item: &NewStockItem) -> DbResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO stock_items (
                code, name, category, milyem, ayar, gram, qty,
                buy_price_cents, sell_price_cents, critical_qty
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.code)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.milyem)
        .bind(item.ayar)
        .bind(item.gram)
        .bind(item.qty.max(0))
        .bind(item.buy_price.cents())
        .bind(item.sell_price.cents())
        .bind(item.critical_qty)
        .execute(conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, item.code.clone()),
            other => other,
        })?
        .last_insert_rowid();

        debug!(stock_id = id, code = %item.code, "Stock item created");
        Ok(id)
    }

    /// Applies a signed quantity change, clamped at zero. Returns the new qty.
    pub async fn apply_delta(conn: &mut SqliteConnection, stock_id: i64, delta: i64) -> DbResult<i64> {
        let qty: Option<i64> = sqlx::query_scalar(
            "UPDATE stock_items SET qty = MAX(0, qty + ?1) WHERE id = ?2 RETURNING qty",
        )
        .bind(delta)
        .bind(stock_id)
        .fetch_optional(conn)
        .await?;

        let qty = qty.ok_or_else(|| DbError::not_found("StockItem", stock_id))?;
        debug!(stock_id, delta, qty, "Stock quantity adjusted");
        Ok(qty)
    }

    /// Appends a movement record.
    pub async fn insert_move(
        conn: &mut SqliteConnection,
        stock_id: i64,
        sale_id: Option<i64>,
        move_type: MoveType,
        qty: i64,
        note: &str,
        date: NaiveDate,
    ) -> DbResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO stock_moves (stock_id, sale_id, move_type, qty, note, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(stock_id)
        .bind(sale_id)
        .bind(move_type)
        .bind(qty.abs())
        .bind(note)
        .bind(date)
        .execute(conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn count_in(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(conn)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kuyum_core::catalogue::default_catalogue;
    use kuyum_core::Money;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut txn = db.begin_write().await.unwrap();
        for item in default_catalogue(5) {
            StockRepository::insert(txn.conn(), &item).await.unwrap();
        }
        txn.commit().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_code() {
        let db = seeded().await;
        let items = db.stock().list().await.unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].code, "STK0001");
        assert_eq!(items[9].code, "STK0010");
        assert_eq!(items[0].sell_price(), Money::from_major(21_520));
        assert_eq!(items[0].gram, 8.2);
    }

    #[tokio::test]
    async fn test_apply_delta_clamps_at_zero() {
        let db = seeded().await;
        let id = db.stock().get_by_code("STK0008").await.unwrap().unwrap().id;

        let mut txn = db.begin_write().await.unwrap();
        assert_eq!(StockRepository::apply_delta(txn.conn(), id, -1).await.unwrap(), 3);
        assert_eq!(StockRepository::apply_delta(txn.conn(), id, -10).await.unwrap(), 0);
        assert_eq!(StockRepository::apply_delta(txn.conn(), id, 5).await.unwrap(), 5);
        assert!(matches!(
            StockRepository::apply_delta(txn.conn(), 9_999, 1).await,
            Err(DbError::NotFound { .. })
        ));
        txn.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_on_hand_skips_unknown_codes() {
        let db = seeded().await;
        let mut txn = db.begin_write().await.unwrap();
        let on_hand = StockRepository::on_hand(txn.conn(), ["STK0001", "STK0001", "NOPE"])
            .await
            .unwrap();
        assert_eq!(on_hand.len(), 1);
        assert_eq!(on_hand["STK0001"], 5);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() {
        let db = seeded().await;
        let mut txn = db.begin_write().await.unwrap();
        let dup = default_catalogue(5).remove(0);
        let err = StockRepository::insert(txn.conn(), &dup).await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "STK0001"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = seeded().await;
        let low: Vec<String> = db
            .stock()
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.code)
            .collect();
        // STK0008 has 4, STK0001 has 5, threshold 5
        assert_eq!(low, vec!["STK0008".to_string(), "STK0001".to_string()]);
    }

    #[tokio::test]
    async fn test_moves_roundtrip() {
        let db = seeded().await;
        let id = db.stock().get_by_code("STK0007").await.unwrap().unwrap().id;
        let date = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();

        let mut txn = db.begin_write().await.unwrap();
        StockRepository::insert_move(txn.conn(), id, None, MoveType::Out, -3, "Satış", date)
            .await
            .unwrap();
        txn.commit().await.unwrap();

        let moves = db.stock().moves(id).await.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].move_type, MoveType::Out);
        assert_eq!(moves[0].qty, 3);
        assert_eq!(moves[0].note.as_deref(), Some("Satış"));
    }
}
