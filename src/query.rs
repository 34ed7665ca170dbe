//! Read-only aggregation queries over the ledger.

use rusqlite::params;

use crate::models::{CategoryTotal, SummaryReport};
use crate::storage::{ExpenseStore, StoreError};

impl ExpenseStore {
    /// Sum of `amount` across all records; `0` on an empty table.
    pub fn total(&self) -> Result<f64, StoreError> {
        let conn = self.connect()?;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Grouped sum of `amount` per distinct category.
    pub fn by_category(&self) -> Result<Vec<CategoryTotal>, StoreError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT category, SUM(amount) FROM expenses GROUP BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-category sums restricted to dates starting with the given
    /// `"YYYY-MM"` prefix. A literal prefix match, not a calendar range:
    /// `"2024-1"` does not match `"2024-01-15"`.
    pub fn monthly(&self, month: &str) -> Result<Vec<CategoryTotal>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT category, SUM(amount) FROM expenses WHERE expense_date LIKE ?1 GROUP BY category",
        )?;
        let rows = stmt.query_map(params![format!("{month}%")], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct category values in store-native order.
    pub fn categories(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM expenses")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn summarize(&self) -> Result<SummaryReport, StoreError> {
        Ok(SummaryReport {
            total: self.total()?,
            by_category: self.by_category()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (tempfile::TempDir, ExpenseStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ExpenseStore::new(dir.path().join("expenses.db"));
        store.initialize().unwrap();
        store.add(10.0, "food", "lunch", Some("2024-01-15")).unwrap();
        store.add(5.5, "food", "snack", Some("2024-01-20")).unwrap();
        store.add(30.0, "travel", "taxi", Some("2024-02-01")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_total_sums_all_amounts() {
        let (_dir, store) = seeded_store();
        assert_eq!(store.total().unwrap(), 45.5);
    }

    #[test]
    fn test_total_is_zero_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExpenseStore::new(dir.path().join("expenses.db"));
        store.initialize().unwrap();
        assert_eq!(store.total().unwrap(), 0.0);
    }

    #[test]
    fn test_by_category_groups() {
        let (_dir, store) = seeded_store();
        let mut groups = store.by_category().unwrap();
        groups.sort_by(|a, b| a.category.cmp(&b.category));
        assert_eq!(
            groups,
            vec![
                CategoryTotal {
                    category: "food".to_string(),
                    total: 15.5
                },
                CategoryTotal {
                    category: "travel".to_string(),
                    total: 30.0
                },
            ]
        );
    }

    #[test]
    fn test_monthly_is_a_literal_prefix_match() {
        let (_dir, store) = seeded_store();

        let january = store.monthly("2024-01").unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].category, "food");
        assert_eq!(january[0].total, 15.5);

        // An unpadded month is a different prefix and matches nothing.
        assert!(store.monthly("2024-1").unwrap().is_empty());
    }

    #[test]
    fn test_categories_are_distinct() {
        let (_dir, store) = seeded_store();
        let cats = store.categories().unwrap();
        assert_eq!(cats, vec!["food".to_string(), "travel".to_string()]);
    }
}
