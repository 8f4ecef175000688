//! Domain types: live store aggregates and their immutable history snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A fully materialized store aggregate as read from the source.
///
/// The source guarantees both child collections are loaded before the
/// aggregate is handed to the transformer; a `Store` never carries
/// partially resolved state.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub products: Vec<Product>,
    pub employees: Vec<Employee>,
}

/// A product belonging to exactly one store.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// An employee belonging to exactly one store.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub hired_at: NaiveDate,
}

/// An immutable point-in-time snapshot of a [`Store`].
///
/// Child collections are deep copies taken at transform time, so later
/// mutation of the live store cannot leak into an already-built
/// snapshot. Holds no reference back to the live aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreHistory {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub captured_at: DateTime<Utc>,
    pub products: Vec<ProductSnapshot>,
    pub employees: Vec<EmployeeSnapshot>,
}

/// Frozen copy of a product's state at capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub price_cents: i64,
}

/// Frozen copy of an employee's state at capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSnapshot {
    pub name: String,
    pub hired_at: NaiveDate,
}

impl StoreHistory {
    /// Capture a snapshot of `store` at the given instant.
    #[must_use]
    pub fn capture(store: &Store, captured_at: DateTime<Utc>) -> Self {
        Self {
            store_id: store.id,
            name: store.name.clone(),
            address: store.address.clone(),
            captured_at,
            products: store
                .products
                .iter()
                .map(|p| ProductSnapshot {
                    name: p.name.clone(),
                    price_cents: p.price_cents,
                })
                .collect(),
            employees: store
                .employees
                .iter()
                .map(|e| EmployeeSnapshot {
                    name: e.name.clone(),
                    hired_at: e.hired_at,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> Store {
        Store {
            id: 42,
            name: "Gangnam Mart".into(),
            address: "Seoul-Gangnam".into(),
            products: vec![Product {
                id: 1,
                name: "Ramen".into(),
                price_cents: 1_200,
            }],
            employees: vec![Employee {
                id: 1,
                name: "Kim".into(),
                hired_at: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            }],
        }
    }

    #[test]
    fn capture_copies_name_address_and_child_counts() {
        let store = sample_store();
        let snapshot = StoreHistory::capture(&store, Utc::now());

        assert_eq!(snapshot.store_id, 42);
        assert_eq!(snapshot.name, store.name);
        assert_eq!(snapshot.address, store.address);
        assert_eq!(snapshot.products.len(), store.products.len());
        assert_eq!(snapshot.employees.len(), store.employees.len());
    }

    #[test]
    fn snapshot_is_independent_of_later_store_mutation() {
        let mut store = sample_store();
        let snapshot = StoreHistory::capture(&store, Utc::now());

        store.name = "Renamed".into();
        store.products.clear();
        store.employees.push(Employee {
            id: 2,
            name: "Lee".into(),
            hired_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        });

        assert_eq!(snapshot.name, "Gangnam Mart");
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.employees.len(), 1);
    }
}
