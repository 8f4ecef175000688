//! Paginated store source.
//!
//! Reads ordered pages of store aggregates matching an address prefix,
//! materializing each store's child collections before handing the page
//! to the step. Two grouped queries per page resolve all children, so
//! there is no per-item query amplification.

use diesel::prelude::*;

use crate::db::model::{EmployeeRow, ProductRow, StoreRow};
use crate::db::schema::stores;
use crate::db::DbPool;
use crate::domain::{Employee, Product, Store};
use crate::error::ReadError;

/// A finite, ordered sequence of store pages under a stable unique key.
///
/// Implementations must yield each matching store exactly once across a
/// full scan of a static dataset. A page shorter than the page size
/// (including the empty page) marks the end of the sequence.
pub trait StoreSource {
    /// Fetch the next page of fully materialized stores.
    fn next_page(&mut self) -> Result<Vec<Store>, ReadError>;
}

/// SQLite-backed paginated source.
///
/// Orders by `id` ascending and advances an offset by the page size on
/// each fetch. The cursor lives only in memory; a restarted process
/// rescans from the beginning.
pub struct SqliteStoreSource {
    pool: DbPool,
    like_pattern: String,
    page_size: usize,
    offset: i64,
    exhausted: bool,
}

impl SqliteStoreSource {
    /// Create a source scanning stores whose address starts with `prefix`.
    #[must_use]
    pub fn new(pool: DbPool, prefix: &str, page_size: usize) -> Self {
        Self {
            pool,
            like_pattern: format!("{}%", escape_like(prefix)),
            page_size,
            offset: 0,
            exhausted: false,
        }
    }

    fn hydrate(
        store_rows: Vec<StoreRow>,
        product_rows: Vec<ProductRow>,
        employee_rows: Vec<EmployeeRow>,
    ) -> Result<Vec<Store>, ReadError> {
        let grouped_products = product_rows.grouped_by(&store_rows);
        let grouped_employees = employee_rows.grouped_by(&store_rows);

        store_rows
            .into_iter()
            .zip(grouped_products)
            .zip(grouped_employees)
            .map(|((store, products), employees)| {
                let products = products
                    .into_iter()
                    .map(|p| Product {
                        id: p.id,
                        name: p.name,
                        price_cents: p.price_cents,
                    })
                    .collect();
                let employees = employees
                    .into_iter()
                    .map(|e| {
                        let hired_at = e.hired_at.parse().map_err(|_| {
                            ReadError::Query(format!(
                                "employee {}: malformed hire date '{}'",
                                e.id, e.hired_at
                            ))
                        })?;
                        Ok(Employee {
                            id: e.id,
                            name: e.name,
                            hired_at,
                        })
                    })
                    .collect::<Result<Vec<_>, ReadError>>()?;

                Ok(Store {
                    id: store.id,
                    name: store.name,
                    address: store.address,
                    products,
                    employees,
                })
            })
            .collect()
    }
}

impl StoreSource for SqliteStoreSource {
    fn next_page(&mut self) -> Result<Vec<Store>, ReadError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let mut conn = self
            .pool
            .get()
            .map_err(|e| ReadError::Connection(e.to_string()))?;

        let store_rows: Vec<StoreRow> = stores::table
            .filter(stores::address.like(self.like_pattern.as_str()).escape('\\'))
            .order(stores::id.asc())
            .limit(self.page_size as i64)
            .offset(self.offset)
            .select(StoreRow::as_select())
            .load(&mut conn)
            .map_err(|e| ReadError::Query(e.to_string()))?;

        if store_rows.len() < self.page_size {
            self.exhausted = true;
        }
        self.offset += self.page_size as i64;

        if store_rows.is_empty() {
            return Ok(Vec::new());
        }

        let product_rows: Vec<ProductRow> = ProductRow::belonging_to(&store_rows)
            .select(ProductRow::as_select())
            .load(&mut conn)
            .map_err(|e| ReadError::Query(e.to_string()))?;

        let employee_rows: Vec<EmployeeRow> = EmployeeRow::belonging_to(&store_rows)
            .select(EmployeeRow::as_select())
            .load(&mut conn)
            .map_err(|e| ReadError::Query(e.to_string()))?;

        Self::hydrate(store_rows, product_rows, employee_rows)
    }
}

/// Escape SQL `LIKE` metacharacters so the prefix matches literally.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::db::{seed_store, setup_test_db};

    #[test]
    fn escape_like_passes_plain_prefixes_through() {
        assert_eq!(escape_like("Seoul"), "Seoul");
    }

    #[test]
    fn escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn matches_prefix_not_substring() {
        let pool = setup_test_db();
        seed_store(&pool, "Gangnam Mart", "Seoul-Gangnam", 1, 1);
        seed_store(&pool, "Nowhere Mart", "New-Seoul", 0, 0);

        let mut source = SqliteStoreSource::new(pool, "Seoul", 10);
        let page = source.next_page().unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].address, "Seoul-Gangnam");
    }

    #[test]
    fn pages_are_ordered_disjoint_and_exhaustive() {
        let pool = setup_test_db();
        for i in 0..5 {
            seed_store(&pool, &format!("Mart {i}"), "Seoul", 0, 0);
        }

        let mut source = SqliteStoreSource::new(pool, "Seoul", 2);
        let mut seen = Vec::new();
        loop {
            let page = source.next_page().unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.len() <= 2);
            seen.extend(page.into_iter().map(|s| s.id));
        }

        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(seen.len(), 5, "every store exactly once");
        assert_eq!(seen, sorted, "ids ascending with no duplicates");
    }

    #[test]
    fn children_are_materialized_per_page() {
        let pool = setup_test_db();
        seed_store(&pool, "Stocked Mart", "Seoul", 3, 2);

        let mut source = SqliteStoreSource::new(pool, "Seoul", 10);
        let page = source.next_page().unwrap();

        assert_eq!(page[0].products.len(), 3);
        assert_eq!(page[0].employees.len(), 2);
    }

    #[test]
    fn short_page_terminates_the_scan() {
        let pool = setup_test_db();
        seed_store(&pool, "Only Mart", "Seoul", 0, 0);

        let mut source = SqliteStoreSource::new(pool, "Seoul", 10);
        assert_eq!(source.next_page().unwrap().len(), 1);
        assert!(source.next_page().unwrap().is_empty());
        assert!(source.next_page().unwrap().is_empty());
    }
}
