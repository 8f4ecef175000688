//! Database row types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{
    employees, history_employees, history_products, products, store_histories, stores,
};

/// Database row for a store aggregate root.
#[derive(Identifiable, Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Database row for a product (queryable, grouped under its store).
#[derive(Identifiable, Queryable, Selectable, Associations, Debug, Clone)]
#[diesel(belongs_to(StoreRow, foreign_key = store_id))]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductRow {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// Database row for an employee (queryable, grouped under its store).
#[derive(Identifiable, Queryable, Selectable, Associations, Debug, Clone)]
#[diesel(belongs_to(StoreRow, foreign_key = store_id))]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EmployeeRow {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub hired_at: String,
}

/// Database row for a store (insertable; id assigned by the database).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stores)]
pub struct NewStoreRow {
    pub name: String,
    pub address: String,
}

/// Database row for a product (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub store_id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// Database row for an employee (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = employees)]
pub struct NewEmployeeRow {
    pub store_id: i64,
    pub name: String,
    pub hired_at: String,
}

/// Database row for a history snapshot header (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = store_histories)]
pub struct NewStoreHistoryRow {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub captured_at: String,
}

/// Database row for a history snapshot header (queryable).
#[derive(Identifiable, Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = store_histories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoreHistoryRow {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub captured_at: String,
}

/// Database row for a snapshotted product (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = history_products)]
pub struct NewHistoryProductRow {
    pub history_id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// Database row for a snapshotted employee (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = history_employees)]
pub struct NewHistoryEmployeeRow {
    pub history_id: i64,
    pub name: String,
    pub hired_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_row_is_insertable() {
        // Type check - if this compiles, the Insertable derive works
        let _row = NewStoreRow {
            name: "Mart".to_string(),
            address: "Seoul".to_string(),
        };
    }

    #[test]
    fn new_history_rows_are_insertable() {
        let _header = NewStoreHistoryRow {
            store_id: 1,
            name: "Mart".to_string(),
            address: "Seoul".to_string(),
            captured_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let _product = NewHistoryProductRow {
            history_id: 1,
            name: "Ramen".to_string(),
            price_cents: 1_200,
        };
        let _employee = NewHistoryEmployeeRow {
            history_id: 1,
            name: "Kim".to_string(),
            hired_at: "2021-03-01".to_string(),
        };
    }
}
