//! Database harness: migrated pools and row seeding.

use diesel::prelude::*;

use crate::db::model::{NewEmployeeRow, NewProductRow, NewStoreRow};
use crate::db::schema::{employees, products, stores};
use crate::db::{create_pool, run_migrations, DbPool};

/// A migrated in-memory database.
///
/// Pool size is pinned to 1: every connection to `:memory:` opens its
/// own database, so a larger pool would hand out empty databases.
#[must_use]
pub fn setup_test_db() -> DbPool {
    let pool = create_pool(":memory:", 1).expect("failed to create pool");
    run_migrations(&pool).expect("failed to run migrations");
    pool
}

/// A migrated pool over an on-disk database file.
#[must_use]
pub fn setup_file_db(path: &str) -> DbPool {
    let pool = create_pool(path, 5).expect("failed to create pool");
    run_migrations(&pool).expect("failed to run migrations");
    pool
}

/// Insert a store with generated children; returns its id.
pub fn seed_store(
    pool: &DbPool,
    name: &str,
    address: &str,
    n_products: usize,
    n_employees: usize,
) -> i64 {
    let mut conn = pool.get().expect("failed to get connection");

    let store_id: i64 = diesel::insert_into(stores::table)
        .values(&NewStoreRow {
            name: name.to_string(),
            address: address.to_string(),
        })
        .returning(stores::id)
        .get_result(&mut conn)
        .expect("failed to insert store");

    let product_rows: Vec<NewProductRow> = (0..n_products)
        .map(|i| NewProductRow {
            store_id,
            name: format!("product-{i}"),
            price_cents: 500 + i as i64 * 100,
        })
        .collect();
    if !product_rows.is_empty() {
        diesel::insert_into(products::table)
            .values(&product_rows)
            .execute(&mut conn)
            .expect("failed to insert products");
    }

    let employee_rows: Vec<NewEmployeeRow> = (0..n_employees)
        .map(|i| NewEmployeeRow {
            store_id,
            name: format!("employee-{i}"),
            hired_at: "2022-01-01".to_string(),
        })
        .collect();
    if !employee_rows.is_empty() {
        diesel::insert_into(employees::table)
            .values(&employee_rows)
            .execute(&mut conn)
            .expect("failed to insert employees");
    }

    store_id
}
