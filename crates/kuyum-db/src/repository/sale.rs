//! # Sale Repository
//!
//! Database operations for transaction headers and their lines.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. INSERT header  (paid = effective payment, due = total - paid)      │
//! │  2. INSERT lines   (snapshot of code/name/gram/qty/price per line)     │
//! │  3. COMMIT together with stock and customer ledger writes              │
//! │                                                                         │
//! │  Headers and lines are never updated afterwards. Deleting a header     │
//! │  cascades to its lines; deleting a customer only nulls customer_id.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kuyum_core::ledger::SaleTotals;
use kuyum_core::{Money, RecentTransaction, Sale, SaleItem, SaleLine, SaleRequest};

const SALE_COLUMNS: &str = r#"
    id, txn_type, doc_no, date, notes, customer_id, pay_type,
    paid_cents, discount_cents, total_cents, due_cents,
    tendered_cents, change_cents, created_at
"#;

/// Header row values decided by the ledger engine.
#[derive(Debug, Clone, Copy)]
pub struct SaleHeader<'a> {
    pub request: &'a SaleRequest,
    pub customer_id: Option<i64>,
    pub totals: &'a SaleTotals,
    /// `(tendered, change)` when overpayment is recorded on the sale.
    pub overpayment: Option<(Money, Money)>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = ?1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lines of a sale in entry order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, stock_id, code, name, gram, qty,
                   unit_price_cents, milyem, workmanship_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Most recent transactions with the customer's name, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<RecentTransaction>> {
        let rows = sqlx::query_as::<_, RecentTransaction>(
            r#"
            SELECT
                s.id AS sale_id,
                s.txn_type,
                s.date,
                s.doc_no,
                c.name AS customer_name,
                s.pay_type,
                s.total_cents,
                s.paid_cents,
                s.due_cents
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            ORDER BY s.date DESC, s.id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn item_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Inside a write transaction
    // =========================================================================

    /// Inserts the header row and returns its id.
    pub async fn insert(conn: &mut SqliteConnection, header: SaleHeader<'_>) -> DbResult<i64> {
        let request = header.request;
        let totals = header.totals;
        let (tendered, change) = match header.overpayment {
            Some((tendered, change)) => (Some(tendered.cents()), Some(change.cents())),
            None => (None, None),
        };

        let id = sqlx::query(
            r#"
            INSERT INTO sales (
                txn_type, doc_no, date, notes, customer_id, pay_type,
                paid_cents, discount_cents, total_cents, due_cents,
                tendered_cents, change_cents, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(request.txn_type)
        .bind(&request.doc_no)
        .bind(request.date)
        .bind(&request.notes)
        .bind(header.customer_id)
        .bind(request.pay_type)
        .bind(totals.paid_effective.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(totals.due.cents())
        .bind(tendered)
        .bind(change)
        .bind(Utc::now())
        .execute(conn)
        .await?
        .last_insert_rowid();

        debug!(sale_id = id, txn_type = %request.txn_type, "Sale header inserted");
        Ok(id)
    }

    /// Inserts one line snapshot.
    pub async fn insert_item(
        conn: &mut SqliteConnection,
        sale_id: i64,
        stock_id: Option<i64>,
        line: &SaleLine,
    ) -> DbResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, stock_id, code, name, gram, qty,
                unit_price_cents, milyem, workmanship_cents, line_total_cents
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(sale_id)
        .bind(stock_id)
        .bind(&line.code)
        .bind(&line.name)
        .bind(line.gram)
        .bind(line.qty)
        .bind(line.unit_price.cents())
        .bind(&line.milyem)
        .bind(line.workmanship.cents())
        .bind(line.line_total.cents())
        .execute(conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use kuyum_core::{PayType, TxnType};

    fn request(day: u32) -> SaleRequest {
        SaleRequest::new(
            TxnType::Sale,
            NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            PayType::Cash,
        )
        .doc_no(format!("SAT-{:04}", day))
        .paid(Money::from_major(150))
        .line(SaleLine::new("STK0001", "Bilezik 22 Ayar", 2, Money::from_major(100)))
    }

    async fn insert(db: &Database, req: &SaleRequest, overpayment: Option<(Money, Money)>) -> i64 {
        let totals = SaleTotals::for_request(req);
        let mut txn = db.begin_write().await.unwrap();
        let id = SaleRepository::insert(
            txn.conn(),
            SaleHeader {
                request: req,
                customer_id: None,
                totals: &totals,
                overpayment,
            },
        )
        .await
        .unwrap();
        for line in &req.lines {
            SaleRepository::insert_item(txn.conn(), id, None, line).await.unwrap();
        }
        txn.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let req = request(15);
        let id = insert(&db, &req, None).await;

        let sale = db.sales().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.txn_type, TxnType::Sale);
        assert_eq!(sale.pay_type, PayType::Cash);
        assert_eq!(sale.total(), Money::from_major(200));
        assert_eq!(sale.paid(), Money::from_major(150));
        assert_eq!(sale.due(), Money::from_major(50));
        assert_eq!(sale.tendered_cents, None);

        let items = db.sales().get_items(id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total(), Money::from_major(200));
        assert_eq!(items[0].stock_id, None);
    }

    #[tokio::test]
    async fn test_overpayment_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = insert(
            &db,
            &request(15),
            Some((Money::from_major(250), Money::from_major(50))),
        )
        .await;

        let sale = db.sales().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.tendered_cents, Some(25_000));
        assert_eq!(sale.change_cents, Some(5_000));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for day in [10, 12, 11] {
            insert(&db, &request(day), None).await;
        }

        let recent = db.sales().recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].doc_no.as_deref(), Some("SAT-0012"));
        assert_eq!(recent[1].doc_no.as_deref(), Some("SAT-0011"));
        assert_eq!(recent[0].customer_name, None);
    }
}
