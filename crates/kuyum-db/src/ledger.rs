//! # Ledger Service
//!
//! The transactional engine: one call turns a sale or purchase request into
//! consistent rows across every ledger table.
//!
//! ## create_sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRequest (already parsed and validated)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleTotals::for_request   total, paid_effective, change, due          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  begin_write() ──────────────────────────── write lock held ────┐      │
//! │   1. stock check (sales only)  ── shortage ──► rollback, Err    │      │
//! │   2. resolve / create customer                                   │      │
//! │   3. INSERT sales                                                │      │
//! │   4. per line: resolve stock, INSERT sale_items,                 │      │
//! │      UPDATE stock_items qty, INSERT stock_moves                  │      │
//! │   5. customer_ledger postings + balance                          │      │
//! │  commit() ───────────────────────────────────────────────────────┘      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  paid_effective > 0 ?  ──► append cash_ledger line (own write txn)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Committed { SalePayload, [StockChanged, CustomersChanged,             │
//! │                            CashChanged?, SaleCommitted] }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error before `commit()` drops the transaction and nothing is kept.
//!
//! ## Read Views
//! Plain reads on the pool. They never take the write lock.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;
use tracing::{debug, error, info, warn};

use crate::config::{LedgerConfig, OverpaymentPolicy};
use crate::error::{DbResult, LedgerError, LedgerResult};
use crate::pool::Database;
use crate::repository::cash::CashRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::sale::{SaleHeader, SaleRepository};
use crate::repository::stock::StockRepository;
use kuyum_core::events::sale_events;
use kuyum_core::ledger::{self, SaleTotals};
use kuyum_core::{
    CashLedgerEntry, Committed, Customer, CustomerLedgerEntry, CustomerRef, LedgerDirection,
    LedgerEvent, LineItemInput, Money, NewCashEntry, NewStockItem, RecentTransaction, Sale,
    SaleHeaderInput, SaleItem, SaleLine, SalePayload, SaleRequest, StockItem, StockMove,
    TableCounts, TxnType,
};

/// Rows written by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub customers_inserted: usize,
    pub stock_inserted: usize,
}

/// Ledger engine bound to one database.
///
/// Cloning shares the database handle, so every clone writes under the same
/// lock.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
    config: LedgerConfig,
}

impl LedgerService {
    pub fn new(db: Database, config: LedgerConfig) -> Self {
        LedgerService { db, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Parses raw form input, then runs [`create_sale`](Self::create_sale).
    ///
    /// Parse and validation failures return before the write lock is taken.
    pub async fn create_sale_from_input(
        &self,
        header: &SaleHeaderInput,
        items: &[LineItemInput],
    ) -> LedgerResult<Committed<SalePayload>> {
        let request = SaleRequest::from_input(header, items)?;
        self.create_sale(&request).await
    }

    /// Records a sale or purchase.
    ///
    /// ## Returns
    /// * `Ok(Committed)` - Payload plus the change events, in emission order
    /// * `Err(LedgerError::Core)` - Invalid request or not enough stock; nothing written
    /// * `Err(LedgerError::Storage)` - Write failed and was rolled back
    /// * `Err(LedgerError::CashNotRecorded)` - Sale committed, journal line missing
    pub async fn create_sale(&self, request: &SaleRequest) -> LedgerResult<Committed<SalePayload>> {
        request.validate()?;

        let totals = SaleTotals::for_request(request);
        debug!(
            txn_type = %request.txn_type,
            lines = request.lines.len(),
            total = %totals.total,
            paid = %totals.paid_effective,
            "create_sale"
        );

        if totals.is_underpaid(request.pay_type) {
            warn!(
                total = %totals.total,
                paid = %totals.paid_effective,
                due = %totals.due,
                pay_type = %request.pay_type,
                "Under-payment accepted, remainder stays due"
            );
        }

        let overpayment = match self.config.overpayment {
            OverpaymentPolicy::RecordOnSale => Some((totals.paid_requested, totals.change)),
            OverpaymentPolicy::Discard => {
                if totals.change.is_positive() {
                    warn!(change = %totals.change, "Change handed back, not recorded");
                }
                None
            }
        };

        let mut txn = self.db.begin_write().await?;

        if request.txn_type.is_sale() {
            let on_hand = StockRepository::on_hand(
                txn.conn(),
                request.lines.iter().map(|l| l.code.as_str()),
            )
            .await?;

            if let Err(e) = ledger::check_stock(&request.lines, &on_hand) {
                warn!(error = %e, "Sale rejected, nothing written");
                return Err(e.into());
            }
        }

        let customer_id = match &request.customer {
            Some(customer) => Some(Self::resolve_customer(txn.conn(), customer).await?),
            None => None,
        };

        let sale_id = SaleRepository::insert(
            txn.conn(),
            SaleHeader {
                request,
                customer_id,
                totals: &totals,
                overpayment,
            },
        )
        .await?;

        for line in &request.lines {
            let stock_id = self
                .resolve_stock(txn.conn(), request.txn_type, line)
                .await?;
            SaleRepository::insert_item(txn.conn(), sale_id, stock_id, line).await?;

            if let Some(stock_id) = stock_id {
                let delta = ledger::stock_delta(request.txn_type, line.qty);
                StockRepository::apply_delta(txn.conn(), stock_id, delta).await?;
                StockRepository::insert_move(
                    txn.conn(),
                    stock_id,
                    Some(sale_id),
                    request.txn_type.move_type(),
                    delta,
                    request.txn_type.label(),
                    request.date,
                )
                .await?;
            }
        }

        if let Some(customer_id) = customer_id {
            let postings = ledger::customer_postings(request.txn_type, request.pay_type, &totals);
            for posting in &postings {
                CustomerRepository::insert_ledger_entry(
                    txn.conn(),
                    customer_id,
                    Some(sale_id),
                    posting,
                    request.date,
                )
                .await?;
            }
            if !postings.is_empty() {
                CustomerRepository::apply_balance(
                    txn.conn(),
                    customer_id,
                    ledger::balance_delta(&postings),
                    request.date,
                )
                .await?;
            }
        }

        txn.commit().await?;

        let payload = SalePayload {
            sale_id,
            txn_type: request.txn_type,
            date: request.date,
            doc_no: request.doc_no.clone(),
            customer_id,
            total: totals.total,
            paid: totals.paid_effective,
            due: totals.due,
            pay_type: request.pay_type,
        };

        info!(
            sale_id,
            txn_type = %payload.txn_type,
            total = %payload.total,
            paid = %payload.paid,
            due = %payload.due,
            items = request.lines.len(),
            "Sale committed"
        );

        let cash_written = if totals.collects_cash() {
            let entry = self.sale_cash_entry(request, &totals, customer_id, sale_id);
            if let Err(source) = self.append_cash(&entry).await {
                error!(sale_id, error = %source, "Sale committed but cash entry failed");
                let events = sale_events(&payload, false);
                return Err(LedgerError::CashNotRecorded {
                    payload: Box::new(payload),
                    events,
                    source,
                });
            }
            true
        } else {
            false
        };

        let events = sale_events(&payload, cash_written);
        Ok(Committed::new(payload, events))
    }

    /// Appends one line to the Kasa / Banka journal.
    pub async fn record_cash_entry(&self, entry: &NewCashEntry) -> LedgerResult<Committed<i64>> {
        entry.validate()?;

        let id = self.append_cash(entry).await?;
        info!(
            entry_id = id,
            account = %entry.account,
            entry_type = ?entry.entry_type,
            amount = %entry.amount,
            "Cash entry recorded"
        );

        Ok(Committed::new(id, vec![LedgerEvent::CashChanged]))
    }

    async fn append_cash(&self, entry: &NewCashEntry) -> DbResult<i64> {
        let mut txn = self.db.begin_write().await?;
        let id = CashRepository::insert(txn.conn(), entry).await?;
        txn.commit().await?;
        Ok(id)
    }

    fn sale_cash_entry(
        &self,
        request: &SaleRequest,
        totals: &SaleTotals,
        customer_id: Option<i64>,
        sale_id: i64,
    ) -> NewCashEntry {
        let is_sale = request.txn_type.is_sale();
        NewCashEntry {
            date: request.date,
            time: None,
            account: self.config.account_for(request.pay_type).to_string(),
            entry_type: request.txn_type.cash_entry_type(),
            category: Some(self.config.cash_category(is_sale).to_string()),
            description: request.doc_no.clone(),
            amount: totals.paid_effective,
            customer_id,
            sale_id: Some(sale_id),
        }
    }

    async fn resolve_customer(conn: &mut SqliteConnection, customer: &CustomerRef) -> DbResult<i64> {
        let (id, created) = CustomerRepository::resolve_or_create(conn, customer).await?;
        if created {
            info!(customer_id = id, name = %customer.name, "Customer created from transaction");
        }
        Ok(id)
    }

    /// Stock item id for a line, creating the item for purchases of a new code
    /// when the policy allows it.
    async fn resolve_stock(
        &self,
        conn: &mut SqliteConnection,
        txn_type: TxnType,
        line: &SaleLine,
    ) -> DbResult<Option<i64>> {
        if let Some(id) = StockRepository::find_id(&mut *conn, &line.code).await? {
            return Ok(Some(id));
        }

        if txn_type != TxnType::Purchase || !self.config.auto_create_stock_on_purchase {
            debug!(code = %line.code, "Line has no stock item, recorded without stock link");
            return Ok(None);
        }

        let item = NewStockItem::from_purchase_line(line, self.config.default_critical_qty);
        match StockRepository::insert(conn, &item).await {
            Ok(id) => {
                info!(stock_id = id, code = %line.code, "Stock item created from purchase");
                Ok(Some(id))
            }
            Err(e) => {
                warn!(error = %e, code = %line.code, "Could not create stock item, continuing without stock link");
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Writes starter customers and stock into empty tables.
    ///
    /// Each table is only touched when it has no rows. Customers are given as
    /// picker text (`Name — Phone`).
    pub async fn seed_if_empty(
        &self,
        customers: &[&str],
        stock: &[NewStockItem],
    ) -> LedgerResult<Committed<SeedReport>> {
        self.seed(customers, stock, true).await
    }

    /// Writes whichever starter customers and stock codes are missing.
    pub async fn seed_missing(
        &self,
        customers: &[&str],
        stock: &[NewStockItem],
    ) -> LedgerResult<Committed<SeedReport>> {
        self.seed(customers, stock, false).await
    }

    async fn seed(
        &self,
        customers: &[&str],
        stock: &[NewStockItem],
        only_when_empty: bool,
    ) -> LedgerResult<Committed<SeedReport>> {
        let mut report = SeedReport::default();
        let mut txn = self.db.begin_write().await?;

        if !only_when_empty || CustomerRepository::count_in(txn.conn()).await? == 0 {
            for customer in customers.iter().filter_map(|text| CustomerRef::parse(text)) {
                let (_, created) = CustomerRepository::resolve_or_create(txn.conn(), &customer).await?;
                if created {
                    report.customers_inserted += 1;
                }
            }
        }

        if !only_when_empty || StockRepository::count_in(txn.conn()).await? == 0 {
            for item in stock {
                if StockRepository::find_id(txn.conn(), &item.code).await?.is_none() {
                    StockRepository::insert(txn.conn(), item).await?;
                    report.stock_inserted += 1;
                }
            }
        }

        txn.commit().await?;

        let mut events = Vec::new();
        if report.customers_inserted > 0 {
            events.push(LedgerEvent::CustomersChanged);
        }
        if report.stock_inserted > 0 {
            events.push(LedgerEvent::StockChanged);
        }

        info!(
            customers = report.customers_inserted,
            stock = report.stock_inserted,
            "Seed complete"
        );
        Ok(Committed::new(report, events))
    }

    // =========================================================================
    // Read Views
    // =========================================================================

    pub async fn list_customers(&self) -> LedgerResult<Vec<Customer>> {
        Ok(self.db.customers().list().await?)
    }

    pub async fn list_stock(&self) -> LedgerResult<Vec<StockItem>> {
        Ok(self.db.stock().list().await?)
    }

    /// Cash journal, newest first.
    pub async fn list_cash(&self) -> LedgerResult<Vec<CashLedgerEntry>> {
        Ok(self.db.cash().list().await?)
    }

    pub async fn get_recent_transactions(&self, limit: u32) -> LedgerResult<Vec<RecentTransaction>> {
        Ok(self.db.sales().recent(limit).await?)
    }

    pub async fn get_sale(&self, sale_id: i64) -> LedgerResult<Option<Sale>> {
        Ok(self.db.sales().get_by_id(sale_id).await?)
    }

    pub async fn sale_items(&self, sale_id: i64) -> LedgerResult<Vec<SaleItem>> {
        Ok(self.db.sales().get_items(sale_id).await?)
    }

    pub async fn stock_by_code(&self, code: &str) -> LedgerResult<Option<StockItem>> {
        Ok(self.db.stock().get_by_code(code).await?)
    }

    pub async fn stock_moves(&self, stock_id: i64) -> LedgerResult<Vec<StockMove>> {
        Ok(self.db.stock().moves(stock_id).await?)
    }

    /// Items at or below their critical quantity.
    pub async fn low_stock(&self) -> LedgerResult<Vec<StockItem>> {
        Ok(self.db.stock().low_stock().await?)
    }

    pub async fn customer_ledger(&self, customer_id: i64) -> LedgerResult<Vec<CustomerLedgerEntry>> {
        Ok(self.db.customers().ledger(customer_id).await?)
    }

    pub async fn find_customer(&self, name: &str, phone: &str) -> LedgerResult<Option<Customer>> {
        Ok(self.db.customers().find_by_name_phone(name, phone).await?)
    }

    /// Customer balance recomputed from the statement rows.
    pub async fn statement_balance(&self, customer_id: i64) -> LedgerResult<Money> {
        let entries = self.customer_ledger(customer_id).await?;
        Ok(entries
            .iter()
            .map(|e| {
                let amount = Money::from_cents(e.amount_cents);
                match e.direction {
                    LedgerDirection::Debit => amount,
                    // payment credits are stored positive, purchase credits negative
                    LedgerDirection::Credit => -amount.abs(),
                }
            })
            .sum())
    }

    /// Row count of every ledger table.
    pub async fn table_counts(&self) -> LedgerResult<TableCounts> {
        let customers = self.db.customers();
        let stock = self.db.stock();
        let sales = self.db.sales();

        Ok(TableCounts {
            customers: customers.count().await?,
            stock_items: stock.count().await?,
            sales: sales.count().await?,
            sale_items: sales.item_count().await?,
            customer_ledger: customers.ledger_count().await?,
            stock_moves: stock.move_count().await?,
            cash_ledger: self.db.cash().count().await?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use chrono::NaiveDate;
    use kuyum_core::catalogue::{default_catalogue, DEMO_CUSTOMERS};
    use kuyum_core::{CashEntryType, CoreError, MoveType, PayType, StockShortage};

    async fn shop_with(config: LedgerConfig) -> LedgerService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.ledger(config);
        ledger
            .seed_if_empty(&DEMO_CUSTOMERS, &default_catalogue(5))
            .await
            .unwrap();
        ledger
    }

    async fn shop() -> LedgerService {
        shop_with(LedgerConfig::default()).await
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
    }

    fn ayse() -> CustomerRef {
        CustomerRef::new("Ayşe Yılmaz", "0532 111 2233")
    }

    /// 2 × STK0001 at 100 ₺ for Ayşe.
    fn bilezik_sale(pay_type: PayType, paid: i64) -> SaleRequest {
        SaleRequest::new(TxnType::Sale, date(), pay_type)
            .doc_no("SAT-0001")
            .customer(ayse())
            .paid(Money::from_major(paid))
            .line(SaleLine::new("STK0001", "Bilezik 22 Ayar", 2, Money::from_major(100)))
    }

    async fn qty_of(ledger: &LedgerService, code: &str) -> i64 {
        ledger.stock_by_code(code).await.unwrap().unwrap().qty
    }

    async fn balance_of(ledger: &LedgerService, customer: &CustomerRef) -> Money {
        ledger
            .find_customer(&customer.name, &customer.phone)
            .await
            .unwrap()
            .unwrap()
            .balance()
    }

    #[tokio::test]
    async fn test_cash_sale_paid_in_full() {
        let ledger = shop().await;

        let committed = ledger.create_sale(&bilezik_sale(PayType::Cash, 200)).await.unwrap();
        let payload = committed.value.clone();

        assert_eq!(payload.total, Money::from_major(200));
        assert_eq!(payload.paid, Money::from_major(200));
        assert!(payload.due.is_zero());
        assert_eq!(
            committed.events,
            vec![
                LedgerEvent::StockChanged,
                LedgerEvent::CustomersChanged,
                LedgerEvent::CashChanged,
                LedgerEvent::SaleCommitted(payload.clone()),
            ]
        );

        assert_eq!(qty_of(&ledger, "STK0001").await, 3);

        let cash = ledger.list_cash().await.unwrap();
        assert_eq!(cash.len(), 1);
        assert_eq!(cash[0].amount(), Money::from_major(200));
        assert_eq!(cash[0].entry_type, CashEntryType::Inflow);
        assert_eq!(cash[0].account, "Kasa");
        assert_eq!(cash[0].category.as_deref(), Some("Satış Tahsilatı"));
        assert_eq!(cash[0].description.as_deref(), Some("SAT-0001"));
        assert_eq!(cash[0].sale_id, Some(payload.sale_id));
        assert_eq!(cash[0].customer_id, payload.customer_id);

        let customer_id = payload.customer_id.unwrap();
        let statement = ledger.customer_ledger(customer_id).await.unwrap();
        assert_eq!(statement.len(), 2);
        assert_eq!(statement[0].direction, LedgerDirection::Debit);
        assert_eq!(statement[0].amount_cents, 20_000);
        assert_eq!(statement[0].description.as_deref(), Some("Satış"));
        assert_eq!(statement[1].direction, LedgerDirection::Credit);
        assert_eq!(statement[1].amount_cents, 20_000);
        assert_eq!(statement[1].description.as_deref(), Some("Ödeme (Nakit)"));
        assert!(balance_of(&ledger, &ayse()).await.is_zero());
    }

    #[tokio::test]
    async fn test_read_back_reproduces_totals() {
        let ledger = shop().await;
        let request = bilezik_sale(PayType::Cash, 150)
            .discount(Money::from_major(20))
            .line(
                SaleLine::new("STK0009", "Küpe 18 Ayar", 1, Money::from_major(48))
                    .with_workmanship(Money::from_major_minor(12, 50)),
            );

        let payload = ledger.create_sale(&request).await.unwrap().value;
        let sale = ledger.get_sale(payload.sale_id).await.unwrap().unwrap();

        // 200 + 48 + 12,50 - 20
        assert_eq!(sale.total(), Money::from_major_minor(240, 50));
        assert_eq!(sale.paid(), Money::from_major(150));
        assert_eq!(sale.due(), Money::from_major_minor(90, 50));
        assert_eq!(sale.total(), payload.total);
        assert_eq!(sale.due(), payload.due);

        let items = ledger.sale_items(payload.sale_id).await.unwrap();
        let totals: Vec<Money> = items.iter().map(|i| i.line_total()).collect();
        assert_eq!(
            totals,
            vec![Money::from_major(200), Money::from_major_minor(60, 50)]
        );
        assert!(items.iter().all(|i| i.stock_id.is_some()));

        let stock_id = ledger.stock_by_code("STK0009").await.unwrap().unwrap().id;
        let moves = ledger.stock_moves(stock_id).await.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].move_type, MoveType::Out);
        assert_eq!(moves[0].qty, 1);
        assert_eq!(moves[0].note.as_deref(), Some("Satış"));
        assert_eq!(moves[0].sale_id, Some(payload.sale_id));
    }

    #[tokio::test]
    async fn test_overpayment_becomes_change() {
        let ledger = shop().await;

        let payload = ledger
            .create_sale(&bilezik_sale(PayType::Cash, 250))
            .await
            .unwrap()
            .value;

        assert_eq!(payload.paid, Money::from_major(200));
        assert!(payload.due.is_zero());

        let cash = ledger.list_cash().await.unwrap();
        assert_eq!(cash.len(), 1);
        assert_eq!(cash[0].amount(), Money::from_major(200));

        let sale = ledger.get_sale(payload.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.tendered_cents, None);
        assert_eq!(sale.change_cents, None);
        assert!(balance_of(&ledger, &ayse()).await.is_zero());
    }

    #[tokio::test]
    async fn test_overpayment_recorded_on_sale() {
        let ledger = shop_with(LedgerConfig {
            overpayment: OverpaymentPolicy::RecordOnSale,
            ..LedgerConfig::default()
        })
        .await;

        let payload = ledger
            .create_sale(&bilezik_sale(PayType::Cash, 250))
            .await
            .unwrap()
            .value;

        let sale = ledger.get_sale(payload.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.paid(), Money::from_major(200));
        assert_eq!(sale.tendered_cents, Some(25_000));
        assert_eq!(sale.change_cents, Some(5_000));
        assert_eq!(ledger.list_cash().await.unwrap()[0].amount(), Money::from_major(200));
    }

    #[tokio::test]
    async fn test_veresiye_sale_stays_on_account() {
        let ledger = shop().await;

        let committed = ledger
            .create_sale(&bilezik_sale(PayType::Credit, 200))
            .await
            .unwrap();
        let payload = committed.value.clone();

        assert!(payload.paid.is_zero());
        assert_eq!(payload.due, Money::from_major(200));
        assert!(!committed.emitted(&LedgerEvent::CashChanged));
        assert!(ledger.list_cash().await.unwrap().is_empty());
        assert_eq!(balance_of(&ledger, &ayse()).await, Money::from_major(200));

        let statement = ledger.customer_ledger(payload.customer_id.unwrap()).await.unwrap();
        assert_eq!(statement.len(), 1);
        assert_eq!(statement[0].direction, LedgerDirection::Debit);

        let customer = ledger.find_customer("Ayşe Yılmaz", "0532 111 2233").await.unwrap().unwrap();
        assert_eq!(customer.last_txn_at, Some(date()));
    }

    #[tokio::test]
    async fn test_shortage_writes_nothing() {
        let ledger = shop().await;
        // STK0008 starts at 4; sell one so 3 remain
        ledger
            .create_sale(
                &SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
                    .paid(Money::from_major(238))
                    .line(SaleLine::new("STK0008", "Şahmeran 22 Ayar", 1, Money::from_major(238))),
            )
            .await
            .unwrap();
        let before = ledger.table_counts().await.unwrap();

        let request = SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
            .customer(CustomerRef::new("Zeynep Ak", "0500 000 0000"))
            .paid(Money::from_major(100))
            .line(SaleLine::new("STK0001", "Bilezik 22 Ayar", 1, Money::from_major(100)))
            .line(SaleLine::new("STK0008", "Şahmeran 22 Ayar", 10, Money::from_major(10)));

        let err = ledger.create_sale(&request).await.unwrap_err();
        assert!(err.is_stock_shortage());
        assert_eq!(
            err.shortages().unwrap(),
            &[StockShortage {
                code: "STK0008".to_string(),
                name: "Şahmeran 22 Ayar".to_string(),
                requested: 10,
                available: 3,
            }]
        );

        assert_eq!(ledger.table_counts().await.unwrap(), before);
        assert_eq!(qty_of(&ledger, "STK0001").await, 5);
        assert_eq!(qty_of(&ledger, "STK0008").await, 3);
        assert!(ledger.find_customer("Zeynep Ak", "0500 000 0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_code_is_checked_as_a_whole() {
        let ledger = shop().await;
        let line = SaleLine::new("STK0001", "Bilezik 22 Ayar", 3, Money::from_major(100));
        let request = SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
            .line(line.clone())
            .line(line);

        let err = ledger.create_sale(&request).await.unwrap_err();
        let shortages = err.shortages().unwrap();
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].requested, 6);
        assert_eq!(shortages[0].available, 5);
    }

    #[tokio::test]
    async fn test_sale_of_unknown_code_is_a_shortage() {
        let ledger = shop().await;
        let request = SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
            .line(SaleLine::new("YOK0001", "Olmayan", 1, Money::from_major(1)));

        let err = ledger.create_sale(&request).await.unwrap_err();
        assert_eq!(err.shortages().unwrap()[0].available, 0);
        assert!(ledger.stock_by_code("YOK0001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purchase_creates_stock_item() {
        let ledger = shop().await;
        let request = SaleRequest::new(TxnType::Purchase, date(), PayType::Cash)
            .doc_no("ALS-0001")
            .line(SaleLine::new("ALS0001", "Hurda Bilezik", 5, Money::from_major(900)).with_gram(12.5));

        let committed = ledger.create_sale(&request).await.unwrap();
        assert!(!committed.emitted(&LedgerEvent::CashChanged));

        let item = ledger.stock_by_code("ALS0001").await.unwrap().unwrap();
        assert_eq!(item.qty, 5);
        assert_eq!(item.name, "Hurda Bilezik");
        assert_eq!(item.buy_price(), Money::from_major(900));
        assert_eq!(item.gram, 12.5);
        assert_eq!(item.critical_qty, 5);

        let moves = ledger.stock_moves(item.id).await.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].move_type, MoveType::In);
        assert_eq!(moves[0].qty, 5);
        assert_eq!(moves[0].note.as_deref(), Some("Alış"));

        let items = ledger.sale_items(committed.value.sale_id).await.unwrap();
        assert_eq!(items[0].stock_id, Some(item.id));
    }

    #[tokio::test]
    async fn test_purchase_without_auto_create() {
        let ledger = shop_with(LedgerConfig {
            auto_create_stock_on_purchase: false,
            ..LedgerConfig::default()
        })
        .await;
        let before = ledger.table_counts().await.unwrap();

        let request = SaleRequest::new(TxnType::Purchase, date(), PayType::Cash)
            .line(SaleLine::new("ALS0001", "Hurda Bilezik", 5, Money::from_major(900)));
        let payload = ledger.create_sale(&request).await.unwrap().value;

        assert!(ledger.stock_by_code("ALS0001").await.unwrap().is_none());
        let items = ledger.sale_items(payload.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stock_id, None);

        let after = ledger.table_counts().await.unwrap();
        assert_eq!(after.stock_items, before.stock_items);
        assert_eq!(after.stock_moves, before.stock_moves);
        assert_eq!(after.sales, before.sales + 1);
    }

    #[tokio::test]
    async fn test_purchase_keeps_line_when_stock_item_cannot_be_created() {
        let ledger = shop().await;
        sqlx::query(
            "CREATE TRIGGER reject_new_stock BEFORE INSERT ON stock_items \
             BEGIN SELECT RAISE(ABORT, 'stock catalogue is locked'); END",
        )
        .execute(ledger.database().pool())
        .await
        .unwrap();
        let before = ledger.table_counts().await.unwrap();

        let request = SaleRequest::new(TxnType::Purchase, date(), PayType::Cash)
            .paid(Money::from_major(10))
            .line(SaleLine::new("ALS0001", "Hurda Bilezik", 5, Money::from_major(900)));
        let committed = ledger.create_sale(&request).await.unwrap();

        assert!(ledger.stock_by_code("ALS0001").await.unwrap().is_none());
        let items = ledger.sale_items(committed.value.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stock_id, None);

        let after = ledger.table_counts().await.unwrap();
        assert_eq!(after.stock_items, before.stock_items);
        assert_eq!(after.stock_moves, before.stock_moves);
        assert_eq!(after.sales, before.sales + 1);
        assert_eq!(after.cash_ledger, before.cash_ledger + 1);
        assert!(committed.emitted(&LedgerEvent::CashChanged));
    }

    #[tokio::test]
    async fn test_purchase_paid_from_till() {
        let ledger = shop().await;
        let before = balance_of(&ledger, &ayse()).await;

        let request = SaleRequest::new(TxnType::Purchase, date(), PayType::Cash)
            .doc_no("ALS-0002")
            .customer(ayse())
            .paid(Money::from_major(500))
            .line(SaleLine::new("STK0002", "Bilezik 18 Ayar", 1, Money::from_major(1_000)));

        let payload = ledger.create_sale(&request).await.unwrap().value;
        assert_eq!(payload.total, Money::from_major(1_000));
        assert_eq!(payload.paid, Money::from_major(500));
        assert_eq!(payload.due, Money::from_major(500));

        let cash = ledger.list_cash().await.unwrap();
        assert_eq!(cash.len(), 1);
        assert_eq!(cash[0].entry_type, CashEntryType::Outflow);
        assert_eq!(cash[0].amount(), Money::from_major(500));
        assert_eq!(cash[0].category.as_deref(), Some("Alım Ödemesi"));

        let after = balance_of(&ledger, &ayse()).await;
        assert_eq!(after - before, -Money::from_major(1_500));
        assert_eq!(qty_of(&ledger, "STK0002").await, 8);

        let customer_id = payload.customer_id.unwrap();
        let statement = ledger.customer_ledger(customer_id).await.unwrap();
        assert_eq!(statement[0].direction, LedgerDirection::Credit);
        assert_eq!(statement[0].amount_cents, -100_000);
        assert_eq!(statement[0].description.as_deref(), Some("Alış"));
        assert_eq!(ledger.statement_balance(customer_id).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_card_and_transfer_accounts() {
        let ledger = shop().await;

        ledger.create_sale(&bilezik_sale(PayType::Card, 200)).await.unwrap();
        ledger.create_sale(&bilezik_sale(PayType::Transfer, 50)).await.unwrap();

        let accounts: Vec<(String, i64)> = ledger
            .list_cash()
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.account, e.amount_cents))
            .collect();
        assert_eq!(
            accounts,
            vec![
                ("Banka — Havale".to_string(), 5_000),
                ("Banka — POS".to_string(), 20_000),
            ]
        );
        assert_eq!(balance_of(&ledger, &ayse()).await, Money::from_major(150));
    }

    #[tokio::test]
    async fn test_walk_in_sale() {
        let ledger = shop().await;
        let before = ledger.table_counts().await.unwrap();

        let request = SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
            .paid(Money::from_major(950))
            .line(SaleLine::new("STK0007", "Gram Altın", 1, Money::from_major(950)));
        let payload = ledger.create_sale(&request).await.unwrap().value;

        assert_eq!(payload.customer_id, None);
        let after = ledger.table_counts().await.unwrap();
        assert_eq!(after.customers, before.customers);
        assert_eq!(after.customer_ledger, before.customer_ledger);
        assert_eq!(after.cash_ledger, before.cash_ledger + 1);

        let recent = ledger.get_recent_transactions(5).await.unwrap();
        assert_eq!(recent[0].sale_id, payload.sale_id);
        assert_eq!(recent[0].customer_name, None);
    }

    #[tokio::test]
    async fn test_new_customer_from_form_input() {
        let ledger = shop().await;
        let header = SaleHeaderInput {
            txn_type: "Satış".to_string(),
            doc_no: Some("SAT-0042".to_string()),
            date: "15.09.2025".to_string(),
            customer_text: "Zeynep Ak — 0500 000 0000".to_string(),
            pay_type: "Nakit".to_string(),
            paid_amount: "1.000,00 ₺".into(),
            ..SaleHeaderInput::default()
        };
        let item = LineItemInput {
            code: "STK0006".to_string(),
            name: "Külçe 24 Ayar 10g".to_string(),
            gram: "10".into(),
            qty: 1.into(),
            unit_price: "9.500".into(),
            milyem: Some("995".to_string()),
            ..LineItemInput::default()
        };

        let payload = ledger.create_sale_from_input(&header, &[item]).await.unwrap().value;
        assert_eq!(payload.total, Money::from_major(9_500));
        assert_eq!(payload.paid, Money::from_major(1_000));
        assert_eq!(payload.due, Money::from_major(8_500));

        let zeynep = ledger.find_customer("Zeynep Ak", "0500 000 0000").await.unwrap().unwrap();
        assert_eq!(Some(zeynep.id), payload.customer_id);
        assert_eq!(zeynep.balance(), Money::from_major(8_500));

        let recent = ledger.get_recent_transactions(1).await.unwrap();
        assert_eq!(recent[0].customer_name.as_deref(), Some("Zeynep Ak"));
        assert_eq!(recent[0].doc_no.as_deref(), Some("SAT-0042"));
    }

    #[tokio::test]
    async fn test_bad_input_is_rejected_before_writing() {
        let ledger = shop().await;
        let before = ledger.table_counts().await.unwrap();

        let header = SaleHeaderInput {
            txn_type: "Satış".to_string(),
            date: "2025-09-15".to_string(),
            pay_type: "Nakit".to_string(),
            paid_amount: "yüz".into(),
            ..SaleHeaderInput::default()
        };
        let err = ledger.create_sale_from_input(&header, &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::InvalidField { .. })));

        let empty = SaleRequest::new(TxnType::Sale, date(), PayType::Cash);
        let err = ledger.create_sale(&empty).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::EmptyTransaction)));

        assert_eq!(ledger.table_counts().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_everything() {
        let ledger = shop().await;
        sqlx::query("DROP TABLE customer_ledger")
            .execute(ledger.database().pool())
            .await
            .unwrap();

        let request = bilezik_sale(PayType::Cash, 200)
            .customer(CustomerRef::new("Zeynep Ak", "0500 000 0000"));
        let err = ledger.create_sale(&request).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));

        let db = ledger.database();
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.sales().item_count().await.unwrap(), 0);
        assert_eq!(db.stock().move_count().await.unwrap(), 0);
        assert_eq!(db.cash().count().await.unwrap(), 0);
        assert_eq!(db.customers().count().await.unwrap(), 5);
        assert_eq!(qty_of(&ledger, "STK0001").await, 5);
    }

    #[tokio::test]
    async fn test_cash_failure_after_commit_is_reported() {
        let ledger = shop().await;
        sqlx::query("DROP TABLE cash_ledger")
            .execute(ledger.database().pool())
            .await
            .unwrap();

        let err = ledger
            .create_sale(&bilezik_sale(PayType::Cash, 200))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::CashNotRecorded {
                source: DbError::QueryFailed(_),
                ..
            }
        ));

        let payload = err.committed_sale().unwrap();
        assert!(ledger.get_sale(payload.sale_id).await.unwrap().is_some());
        assert_eq!(qty_of(&ledger, "STK0001").await, 3);

        let events = err.committed_events();
        assert!(events.contains(&LedgerEvent::StockChanged));
        assert!(events.contains(&LedgerEvent::CustomersChanged));
        assert!(events.contains(&LedgerEvent::SaleCommitted(payload.clone())));
        assert!(!events.contains(&LedgerEvent::CashChanged));
    }

    #[tokio::test]
    async fn test_concurrent_sales_cannot_oversell() {
        let ledger = shop().await;
        let request = SaleRequest::new(TxnType::Sale, date(), PayType::Cash)
            .line(SaleLine::new("STK0001", "Bilezik 22 Ayar", 3, Money::from_major(100)));

        let (a, b) = tokio::join!(ledger.create_sale(&request), ledger.create_sale(&request));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(a.err().or(b.err()).unwrap().is_stock_shortage());
        assert_eq!(qty_of(&ledger, "STK0001").await, 2);
    }

    #[tokio::test]
    async fn test_record_cash_entry() {
        let ledger = shop().await;
        let entry = NewCashEntry {
            date: date(),
            time: Some("14:30".to_string()),
            account: "Kasa".to_string(),
            entry_type: CashEntryType::Outflow,
            category: Some("Kira".to_string()),
            description: Some("Eylül kirası".to_string()),
            amount: Money::from_major(150),
            customer_id: None,
            sale_id: None,
        };

        let committed = ledger.record_cash_entry(&entry).await.unwrap();
        assert_eq!(committed.events, vec![LedgerEvent::CashChanged]);

        let cash = ledger.list_cash().await.unwrap();
        assert_eq!(cash.len(), 1);
        assert_eq!(cash[0].id, committed.value);
        assert_eq!(cash[0].time.as_deref(), Some("14:30"));

        let zero = NewCashEntry {
            amount: Money::zero(),
            ..entry
        };
        assert!(matches!(
            ledger.record_cash_entry(&zero).await,
            Err(LedgerError::Core(CoreError::Validation(_)))
        ));
        assert_eq!(ledger.list_cash().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.ledger(LedgerConfig::default());

        let first = ledger
            .seed_if_empty(&DEMO_CUSTOMERS, &default_catalogue(5))
            .await
            .unwrap();
        assert_eq!(
            first.value,
            SeedReport {
                customers_inserted: 5,
                stock_inserted: 10
            }
        );
        assert_eq!(
            first.events,
            vec![LedgerEvent::CustomersChanged, LedgerEvent::StockChanged]
        );

        let second = ledger
            .seed_if_empty(&DEMO_CUSTOMERS, &default_catalogue(5))
            .await
            .unwrap();
        assert_eq!(second.value, SeedReport::default());
        assert!(second.events.is_empty());

        let hasan = ledger.find_customer("Hasan Çelik", "").await.unwrap();
        assert!(hasan.is_some());
        assert_eq!(ledger.list_stock().await.unwrap().len(), 10);
        assert_eq!(
            ledger.low_stock().await.unwrap().iter().map(|i| i.code.as_str()).collect::<Vec<_>>(),
            vec!["STK0008", "STK0001"]
        );
    }

    #[tokio::test]
    async fn test_seed_missing_adds_only_new_rows() {
        let ledger = shop().await;

        let report = ledger
            .seed_missing(
                &["Ayşe Yılmaz — 0532 111 2233", "Zeynep Ak — 0500 000 0000"],
                &default_catalogue(5),
            )
            .await
            .unwrap();

        assert_eq!(report.value.customers_inserted, 1);
        assert_eq!(report.value.stock_inserted, 0);
        assert_eq!(report.events, vec![LedgerEvent::CustomersChanged]);
        assert_eq!(ledger.list_customers().await.unwrap().len(), 6);
    }
}
