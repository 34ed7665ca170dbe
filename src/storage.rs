use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use crate::models::Expense;

/// Name of the ledger table.
pub const EXPENSES_TABLE: &str = "expenses";

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of an insert attempt. A malformed date is a result value, not a
/// fault; no write occurs for it.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added { date: String },
    InvalidDate,
}

/// Handle on the file-backed ledger. Holds only the database path; every
/// operation opens its own scoped connection and releases it on return.
pub struct ExpenseStore {
    path: PathBuf,
}

impl ExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &'static str {
        EXPENSES_TABLE
    }

    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Create the ledger table if absent. Idempotent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL,
                category TEXT,
                description TEXT,
                expense_date TEXT
            );
            ",
        )?;
        Ok(())
    }

    /// Insert a new record. The date defaults to today and must parse as a
    /// `YYYY-MM-DD` calendar date or the insert is rejected.
    pub fn add(
        &self,
        amount: f64,
        category: &str,
        description: &str,
        expense_date: Option<&str>,
    ) -> Result<AddOutcome, StoreError> {
        let date = match expense_date {
            Some(d) => d.to_string(),
            None => today_iso(),
        };

        if Date::parse(&date, DATE_FORMAT).is_err() {
            return Ok(AddOutcome::InvalidDate);
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO expenses (amount, category, description, expense_date) VALUES (?1, ?2, ?3, ?4)",
            params![amount, category, description, date],
        )?;
        tracing::debug!(id = conn.last_insert_rowid(), %date, "expense added");
        Ok(AddOutcome::Added { date })
    }

    /// Point lookup; a miss is `None`, not a fault.
    pub fn get(&self, id: i64) -> Result<Option<Expense>, StoreError> {
        let conn = self.connect()?;
        let result = conn.query_row(
            "SELECT id, amount, category, description, expense_date FROM expenses WHERE id = ?1",
            params![id],
            row_to_expense,
        );
        match result {
            Ok(expense) => Ok(Some(expense)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All records in store-native (primary key) order.
    pub fn list(&self) -> Result<Vec<Expense>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT id, amount, category, description, expense_date FROM expenses")?;
        let rows = stmt.query_map([], row_to_expense)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Remove the matching row if present. No existence check; a miss is
    /// indistinguishable from a hit for the caller.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let affected = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        tracing::debug!(id, affected, "expense deleted");
        Ok(())
    }

    /// Set `amount` on the matching row if present. Same unconditional
    /// success behavior as `delete`.
    pub fn update_amount(&self, id: i64, amount: f64) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let affected = conn.execute(
            "UPDATE expenses SET amount = ?1 WHERE id = ?2",
            params![amount, id],
        )?;
        tracing::debug!(id, affected, "expense updated");
        Ok(())
    }

    /// Remove all rows, leaving the empty table intact.
    pub fn clear(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let affected = conn.execute("DELETE FROM expenses", [])?;
        tracing::debug!(affected, "ledger cleared");
        Ok(())
    }
}

fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        expense_date: row.get(4)?,
    })
}

fn today_iso() -> String {
    let d = OffsetDateTime::now_utc().date();
    format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, ExpenseStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ExpenseStore::new(dir.path().join("expenses.db"));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_and_get_roundtrip() {
        let (_dir, store) = temp_store();
        let outcome = store.add(12.50, "food", "lunch", Some("2024-01-15")).unwrap();
        assert_eq!(
            outcome,
            AddOutcome::Added {
                date: "2024-01-15".to_string()
            }
        );

        let expense = store.get(1).unwrap().unwrap();
        assert_eq!(
            expense,
            Expense {
                id: 1,
                amount: 12.5,
                category: "food".to_string(),
                description: "lunch".to_string(),
                expense_date: "2024-01-15".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_date_writes_nothing() {
        let (_dir, store) = temp_store();
        let outcome = store.add(5.0, "food", "snack", Some("15-01-2024")).unwrap();
        assert_eq!(outcome, AddOutcome::InvalidDate);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_omitted_date_defaults_to_today() {
        let (_dir, store) = temp_store();
        let outcome = store.add(3.0, "coffee", "espresso", None).unwrap();
        match outcome {
            AddOutcome::Added { date } => {
                assert_eq!(date, today_iso());
            }
            other => panic!("expected Added, got {:?}", other),
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();
        store.initialize().unwrap();
    }

    #[test]
    fn test_delete_is_unconditional() {
        let (_dir, store) = temp_store();
        store.add(1.0, "a", "x", Some("2024-01-01")).unwrap();
        store.add(2.0, "b", "y", Some("2024-01-02")).unwrap();

        store.delete(1).unwrap();
        assert!(store.get(1).unwrap().is_none());
        assert!(store.get(2).unwrap().is_some());

        // Deleting a missing id still succeeds.
        store.delete(1).unwrap();
        store.delete(999).unwrap();
    }

    #[test]
    fn test_update_amount_only() {
        let (_dir, store) = temp_store();
        store.add(10.0, "food", "dinner", Some("2024-01-01")).unwrap();
        store.update_amount(1, 42.0).unwrap();

        let expense = store.get(1).unwrap().unwrap();
        assert_eq!(expense.amount, 42.0);
        assert_eq!(expense.category, "food");

        // Missing id is still a success.
        store.update_amount(999, 1.0).unwrap();
    }

    #[test]
    fn test_clear_leaves_table_intact() {
        let (_dir, store) = temp_store();
        store.add(1.0, "a", "x", Some("2024-01-01")).unwrap();
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());

        // Table still accepts inserts, and ids keep increasing.
        store.add(2.0, "b", "y", Some("2024-01-02")).unwrap();
        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
    }
}
