//! # Customer Repository
//!
//! Customer accounts and their ledger statements.
//!
//! ## Balance Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  customers.balance_cents is written ONLY through apply_balance(),      │
//! │  inside the same transaction as the customer_ledger rows explaining    │
//! │  the change. Σ ledger effects == balance for every customer.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kuyum_core::ledger::Posting;
use kuyum_core::{Customer, CustomerLedgerEntry, CustomerRef, Money};

const CUSTOMER_COLUMNS: &str =
    "id, code, name, phone, status, balance_cents, last_txn_at, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// All customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers ORDER BY name, id",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = ?1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Exact name + phone match, the identity used by customer picker text.
    pub async fn find_by_name_phone(&self, name: &str, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE name = ?1 AND phone = ?2 ORDER BY id LIMIT 1",
            CUSTOMER_COLUMNS
        ))
        .bind(name.trim())
        .bind(phone.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Statement lines for one customer, oldest first.
    pub async fn ledger(&self, customer_id: i64) -> DbResult<Vec<CustomerLedgerEntry>> {
        let entries = sqlx::query_as::<_, CustomerLedgerEntry>(
            r#"
            SELECT id, customer_id, sale_id, direction, amount_cents, description, date
            FROM customer_ledger
            WHERE customer_id = ?1
            ORDER BY date, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn ledger_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_ledger")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Inside a write transaction
    // =========================================================================

    /// Returns the id of the matching customer, creating one if needed.
    ///
    /// The boolean is true when a new row was inserted.
    pub async fn resolve_or_create(
        conn: &mut SqliteConnection,
        customer: &CustomerRef,
    ) -> DbResult<(i64, bool)> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM customers WHERE name = ?1 AND phone = ?2 ORDER BY id LIMIT 1",
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(id) = existing {
            return Ok((id, false));
        }

        let id = Self::insert(conn, customer).await?;
        Ok((id, true))
    }

    /// Inserts an active customer with a zero balance.
    pub async fn insert(conn: &mut SqliteConnection, customer: &CustomerRef) -> DbResult<i64> {
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO customers (name, phone, status, balance_cents, created_at, updated_at)
            VALUES (?1, ?2, 'Aktif', 0, ?3, ?3)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(now)
        .execute(conn)
        .await?
        .last_insert_rowid();

        debug!(customer_id = id, name = %customer.name, "Customer created");
        Ok(id)
    }

    /// Appends one statement line.
    pub async fn insert_ledger_entry(
        conn: &mut SqliteConnection,
        customer_id: i64,
        sale_id: Option<i64>,
        posting: &Posting,
        date: NaiveDate,
    ) -> DbResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO customer_ledger (customer_id, sale_id, direction, amount_cents, description, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(customer_id)
        .bind(sale_id)
        .bind(posting.direction)
        .bind(posting.amount.cents())
        .bind(&posting.description)
        .bind(date)
        .execute(conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Adds `delta` to the balance and stamps the last transaction date.
    pub async fn apply_balance(
        conn: &mut SqliteConnection,
        customer_id: i64,
        delta: Money,
        last_txn_at: NaiveDate,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET balance_cents = balance_cents + ?1,
                last_txn_at = ?2,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(delta.cents())
        .bind(last_txn_at)
        .bind(Utc::now())
        .bind(customer_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        debug!(customer_id, delta = %delta, "Customer balance updated");
        Ok(())
    }

    pub async fn count_in(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(conn)
            .await?;
        Ok(count)
    }
}
