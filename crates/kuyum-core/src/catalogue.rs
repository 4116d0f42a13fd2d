//! # Default Catalogue
//!
//! Starter data written by `seed_if_empty` on a fresh shop database.

use crate::money::Money;
use crate::request::NewStockItem;

/// (code, name, category, ayar, milyem, gram, qty, sell price in lira)
const DEFAULT_STOCK: [(&str, &str, &str, i64, i64, f64, i64, i64); 10] = [
    ("STK0001", "Bilezik 22 Ayar", "Bilezik", 22, 916, 8.20, 5, 21_520),
    ("STK0002", "Bilezik 18 Ayar", "Bilezik", 18, 750, 7.50, 7, 17_600),
    ("STK0003", "Yüzük 22 Ayar", "Yüzük", 22, 916, 4.50, 12, 14_430),
    ("STK0004", "Yüzük 18 Ayar", "Yüzük", 18, 750, 3.80, 15, 9_970),
    ("STK0005", "Kolye 14 Ayar", "Kolye", 14, 585, 6.00, 9, 8_450),
    ("STK0006", "Külçe 24 Ayar 10g", "Külçe", 24, 995, 10.0, 20, 9_500),
    ("STK0007", "Gram Altın", "Gram", 24, 995, 1.00, 200, 950),
    ("STK0008", "Şahmeran 22 Ayar", "Bilezik", 22, 916, 9.10, 4, 23_800),
    ("STK0009", "Küpe 18 Ayar", "Küpe", 18, 750, 2.60, 30, 4_800),
    ("STK0010", "Kolye 22 Ayar", "Kolye", 22, 916, 5.90, 6, 19_500),
];

/// Walk-in regulars used by the demo seed, in picker text form.
pub const DEMO_CUSTOMERS: [&str; 5] = [
    "Ayşe Yılmaz — 0532 111 2233",
    "Mehmet Kaya — 0533 444 5566",
    "Elif Demir — 0542 777 8899",
    "GoldCenter — 0555 555 6666",
    "Hasan Çelik",
];

/// The ten-item jewelry catalogue (STK0001..STK0010).
pub fn default_catalogue(critical_qty: i64) -> Vec<NewStockItem> {
    DEFAULT_STOCK
        .iter()
        .map(
            |&(code, name, category, ayar, milyem, gram, qty, price)| NewStockItem {
                code: code.to_string(),
                name: name.to_string(),
                category: Some(category.to_string()),
                milyem: Some(milyem),
                ayar: Some(ayar),
                gram,
                qty,
                buy_price: Money::zero(),
                sell_price: Money::from_major(price),
                critical_qty,
            },
        )
        .collect()
}
