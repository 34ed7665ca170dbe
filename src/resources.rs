//! Read-only descriptor endpoints, addressed separately from the operation
//! namespace. Pure derived views with no side effects.

use crate::models::DbInfo;
use crate::storage::{ExpenseStore, StoreError};

/// Store location and table name.
pub fn db_info(store: &ExpenseStore) -> DbInfo {
    DbInfo {
        db: store.path().display().to_string(),
        table: store.table().to_string(),
    }
}

/// Distinct category listing; the same computation the query engine exposes
/// as `listCategories`.
pub fn categories(store: &ExpenseStore) -> Result<Vec<String>, StoreError> {
    store.categories()
}
