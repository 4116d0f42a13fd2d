//! # Ledger Configuration
//!
//! Runtime policies of the ledger engine.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KUYUM_*`)
//! 2. Defaults (this file)
//!
//! Read-only once the `LedgerService` is built.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use kuyum_core::PayType;

/// What happens to money handed over beyond the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// Change is returned and leaves no trace in storage.
    #[default]
    Discard,

    /// The sale header also stores the tendered amount and the change given.
    /// Customer and cash ledgers still only see the effective payment.
    RecordOnSale,
}

impl FromStr for OverpaymentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(OverpaymentPolicy::Discard),
            "record_on_sale" | "record" => Ok(OverpaymentPolicy::RecordOnSale),
            other => Err(format!("unknown overpayment policy '{}'", other)),
        }
    }
}

/// Ledger engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Journal account for cash ("Nakit") payments.
    pub cash_account: String,

    /// Journal account for card payments.
    pub card_account: String,

    /// Journal account for bank transfers.
    pub transfer_account: String,

    /// Cash journal category for sale collections.
    pub sale_cash_category: String,

    /// Cash journal category for purchase payouts.
    pub purchase_cash_category: String,

    /// Create a stock item when a purchase names an unknown code.
    /// Default: true
    pub auto_create_stock_on_purchase: bool,

    pub overpayment: OverpaymentPolicy,

    /// Critical threshold given to auto-created stock items.
    /// Default: 5
    pub default_critical_qty: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            cash_account: "Kasa".to_string(),
            card_account: "Banka — POS".to_string(),
            transfer_account: "Banka — Havale".to_string(),
            sale_cash_category: "Satış Tahsilatı".to_string(),
            purchase_cash_category: "Alım Ödemesi".to_string(),
            auto_create_stock_on_purchase: true,
            overpayment: OverpaymentPolicy::Discard,
            default_critical_qty: 5,
        }
    }
}

impl LedgerConfig {
    /// Builds a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `KUYUM_CASH_ACCOUNT`, `KUYUM_CARD_ACCOUNT`, `KUYUM_TRANSFER_ACCOUNT`
    /// - `KUYUM_AUTO_CREATE_STOCK`: `true` / `false`
    /// - `KUYUM_OVERPAYMENT`: `discard` / `record_on_sale`
    /// - `KUYUM_CRITICAL_QTY`: integer
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LedgerConfig::default();

        if let Some(account) = lookup("KUYUM_CASH_ACCOUNT") {
            config.cash_account = account;
        }

        if let Some(account) = lookup("KUYUM_CARD_ACCOUNT") {
            config.card_account = account;
        }

        if let Some(account) = lookup("KUYUM_TRANSFER_ACCOUNT") {
            config.transfer_account = account;
        }

        if let Some(flag) = lookup("KUYUM_AUTO_CREATE_STOCK") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.auto_create_stock_on_purchase = true,
                "0" | "false" | "no" => config.auto_create_stock_on_purchase = false,
                other => warn!(value = other, "Ignoring invalid KUYUM_AUTO_CREATE_STOCK"),
            }
        }

        if let Some(policy) = lookup("KUYUM_OVERPAYMENT") {
            match policy.parse() {
                Ok(policy) => config.overpayment = policy,
                Err(e) => warn!(error = %e, "Ignoring invalid KUYUM_OVERPAYMENT"),
            }
        }

        if let Some(qty) = lookup("KUYUM_CRITICAL_QTY") {
            match qty.trim().parse::<i64>() {
                Ok(qty) if qty >= 0 => config.default_critical_qty = qty,
                _ => warn!(value = %qty, "Ignoring invalid KUYUM_CRITICAL_QTY"),
            }
        }

        config
    }

    /// Journal account a payment type settles into.
    ///
    /// Veresiye never reaches the journal; it maps to the cash account only
    /// so the function is total.
    pub fn account_for(&self, pay_type: PayType) -> &str {
        match pay_type {
            PayType::Cash | PayType::Credit => &self.cash_account,
            PayType::Card => &self.card_account,
            PayType::Transfer => &self.transfer_account,
        }
    }

    pub fn cash_category(&self, is_sale: bool) -> &str {
        if is_sale {
            &self.sale_cash_category
        } else {
            &self.purchase_cash_category
        }
    }
}
