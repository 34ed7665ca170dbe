//! CSV export of the full record set, reflecting the live schema at the
//! moment of the call.

use rusqlite::types::ValueRef;

use crate::storage::{ExpenseStore, StoreError, EXPENSES_TABLE};

pub const DEFAULT_EXPORT_FILE: &str = "expenses.csv";

/// Write the current record set to a CSV file: a header row of the live
/// column names followed by one row per record in store iteration order.
/// Returns the written path.
pub fn export_csv(store: &ExpenseStore, filename: Option<&str>) -> Result<String, StoreError> {
    let path = filename.unwrap_or(DEFAULT_EXPORT_FILE);
    let conn = store.connect()?;

    let mut columns_stmt = conn.prepare(&format!("PRAGMA table_info({EXPENSES_TABLE})"))?;
    let columns: Vec<String> = columns_stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM {EXPENSES_TABLE}"))?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let record: Vec<String> = (0..column_count)
            .map(|i| row.get_ref(i).map(cell_to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    tracing::debug!(%path, "ledger exported");
    Ok(path.to_string())
}

fn cell_to_string(value: ValueRef) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExpenseStore::new(dir.path().join("expenses.db"));
        store.initialize().unwrap();
        store.add(12.5, "food", "lunch", Some("2024-01-15")).unwrap();
        store.add(30.0, "travel", "taxi", Some("2024-02-01")).unwrap();

        let out = dir.path().join("out.csv");
        let written = export_csv(&store, Some(out.to_str().unwrap())).unwrap();
        assert_eq!(written, out.to_str().unwrap());

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "id,amount,category,description,expense_date");
        assert_eq!(lines[1], "1,12.5,food,lunch,2024-01-15");
        assert_eq!(lines[2], "2,30,travel,taxi,2024-02-01");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_empty_store_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExpenseStore::new(dir.path().join("expenses.db"));
        store.initialize().unwrap();

        let out = dir.path().join("empty.csv");
        export_csv(&store, Some(out.to_str().unwrap())).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents.trim_end(), "id,amount,category,description,expense_date");
    }
}
