//! ExpenseDB: a named-operation dispatch service over a persistent ledger of
//! expense records, backed by a file-resident sqlite database.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod models;
pub mod query;
pub mod resources;
pub mod storage;

// Re-export key types at crate root for convenience
pub use dispatch::{Dispatcher, ServiceError};
pub use models::{CategoryTotal, ColumnInfo, DbInfo, Expense, SummaryReport};
pub use storage::{AddOutcome, ExpenseStore, StoreError, EXPENSES_TABLE};
