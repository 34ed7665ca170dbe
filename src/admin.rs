//! Schema introspection, the confirm-gated drop path, and the raw execution
//! escape hatch.

use rusqlite::types::ValueRef;
use serde_json::Value as JsonValue;

use crate::models::ColumnInfo;
use crate::storage::{ExpenseStore, StoreError, EXPENSES_TABLE};

/// Outcome of a drop request. Without an explicit `confirm` nothing happens.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Aborted,
    Dropped { table: String },
}

impl ExpenseStore {
    /// Column descriptors for the given table, defaulting to the ledger
    /// table. Ordinals come straight from `PRAGMA table_info`.
    pub fn table_schema(&self, table_name: Option<&str>) -> Result<Vec<ColumnInfo>, StoreError> {
        let table = table_name.unwrap_or(EXPENSES_TABLE);
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                column_type: row.get(2)?,
                notnull: row.get::<_, i64>(3)? != 0,
                pk: row.get::<_, i64>(5)? != 0,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Irreversibly destroy a table. The only destructive operation in the
    /// system; it runs only when `confirm` is explicitly true.
    pub fn drop_table(
        &self,
        table_name: Option<&str>,
        confirm: bool,
    ) -> Result<DropOutcome, StoreError> {
        if !confirm {
            return Ok(DropOutcome::Aborted);
        }
        let table = table_name.unwrap_or(EXPENSES_TABLE);
        let conn = self.connect()?;
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))?;
        tracing::warn!(%table, "table dropped");
        Ok(DropOutcome::Dropped {
            table: table.to_string(),
        })
    }

    /// Execute an arbitrary caller-supplied statement. No validation and no
    /// restriction on statement kind; this is a deliberate escape hatch.
    /// Rows come back as positional arrays. A failure while retrieving the
    /// result set after the statement has run is reported as "no rows"; the
    /// statement's effect stands either way.
    pub fn run_sql(&self, statement: &str) -> Result<Vec<JsonValue>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(statement)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        let mut first_step = true;
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let values = (0..column_count)
                        .map(|i| {
                            row.get_ref(i)
                                .map(value_ref_to_json)
                                .unwrap_or(JsonValue::Null)
                        })
                        .collect();
                    out.push(JsonValue::Array(values));
                }
                Ok(None) => break,
                // The first step is the statement running; that failing is a
                // real fault. Later steps are result retrieval only.
                Err(e) if first_step => return Err(e.into()),
                Err(_) => return Ok(Vec::new()),
            }
            first_step = false;
        }
        Ok(out)
    }
}

fn value_ref_to_json(value: ValueRef) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(t) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => JsonValue::Array(b.iter().map(|&byte| JsonValue::from(byte)).collect()),
    }
}
