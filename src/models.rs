use serde::{Deserialize, Serialize};

/// A single ledger record. `id` is assigned by the store and never reused;
/// `expense_date` is validated at insert time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub expense_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddExpenseRequest {
    pub amount: f64,
    pub category: String,
    pub description: String,
    /// Defaults to the current calendar date when omitted.
    #[serde(default)]
    pub expense_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseIdRequest {
    #[serde(alias = "expense_id")]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(alias = "expense_id")]
    pub id: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlySummaryRequest {
    /// `"YYYY-MM"` prefix; matched literally against `expense_date`.
    pub month: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportCsvRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropTableRequest {
    #[serde(default, alias = "tableName")]
    pub table_name: Option<String>,
    /// Must be explicitly true for the drop to run.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowSchemaRequest {
    #[serde(default, alias = "tableName")]
    pub table_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunRawRequest {
    #[serde(alias = "query")]
    pub statement: String,
}

/// One `/invoke` call: an operation name plus keyed arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total: f64,
    pub by_category: Vec<CategoryTotal>,
}

/// Column descriptor as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub notnull: bool,
    pub pk: bool,
}

/// Store descriptor resource: database location and table name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbInfo {
    pub db: String,
    pub table: String,
}
