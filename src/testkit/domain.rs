//! Builders for domain values used across the test suites.

use chrono::{NaiveDate, Utc};

use crate::domain::{Employee, Product, Store, StoreHistory};

/// A store with no children.
#[must_use]
pub fn store(id: i64, name: &str, address: &str) -> Store {
    store_with(id, name, address, 0, 0)
}

/// A store with `n_products` products and `n_employees` employees.
#[must_use]
pub fn store_with(id: i64, name: &str, address: &str, n_products: usize, n_employees: usize) -> Store {
    Store {
        id,
        name: name.to_string(),
        address: address.to_string(),
        products: (0..n_products)
            .map(|i| Product {
                id: i as i64 + 1,
                name: format!("product-{i}"),
                price_cents: 500 + i as i64 * 100,
            })
            .collect(),
        employees: (0..n_employees)
            .map(|i| Employee {
                id: i as i64 + 1,
                name: format!("employee-{i}"),
                hired_at: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            })
            .collect(),
    }
}

/// A page of childless stores with ids drawn from `ids`.
#[must_use]
pub fn stores_page(ids: std::ops::Range<i64>) -> Vec<Store> {
    ids.map(|id| store(id, &format!("store-{id}"), "Seoul")).collect()
}

/// A ready-made snapshot, bypassing the transformer.
#[must_use]
pub fn snapshot(
    store_id: i64,
    name: &str,
    address: &str,
    n_products: usize,
    n_employees: usize,
) -> StoreHistory {
    StoreHistory::capture(&store_with(store_id, name, address, n_products, n_employees), Utc::now())
}
