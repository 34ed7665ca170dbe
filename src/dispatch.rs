//! The dispatch router: a static operation-name to handler table built once
//! at startup. Every invocation is independent and self-contained.

use std::{collections::HashMap, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::admin::DropOutcome;
use crate::export;
use crate::models::{
    AddExpenseRequest, DropTableRequest, ExpenseIdRequest, ExportCsvRequest,
    MonthlySummaryRequest, RunRawRequest, ShowSchemaRequest, UpdateExpenseRequest,
};
use crate::resources;
use crate::storage::{AddOutcome, ExpenseStore, StoreError};

pub const INVALID_DATE_MESSAGE: &str = "Invalid date format YYYY-MM-DD";
pub const DROP_ABORTED_MESSAGE: &str = "Drop table aborted. Set confirm=true to proceed.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

type Handler = Box<dyn Fn(JsonValue) -> Result<JsonValue, ServiceError> + Send + Sync>;

/// Maps operation names to typed handlers over a shared store handle. The
/// table is fixed after construction; dispatch holds no cross-call state.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        let mut dispatcher = Self {
            handlers: HashMap::new(),
        };

        let s = store.clone();
        dispatcher.register("add", move |args| {
            let req: AddExpenseRequest = parse_args(args)?;
            let outcome = s.add(
                req.amount,
                &req.category,
                &req.description,
                req.expense_date.as_deref(),
            )?;
            let message = match outcome {
                AddOutcome::Added { date } => format!("Expense added for {date}"),
                AddOutcome::InvalidDate => INVALID_DATE_MESSAGE.to_string(),
            };
            Ok(json!(message))
        });

        let s = store.clone();
        dispatcher.register("list", move |_args| Ok(serde_json::to_value(s.list()?)?));

        let s = store.clone();
        dispatcher.register("delete", move |args| {
            let req: ExpenseIdRequest = parse_args(args)?;
            s.delete(req.id)?;
            Ok(json!("Expense deleted"))
        });

        let s = store.clone();
        dispatcher.register("summarize", move |_args| {
            Ok(serde_json::to_value(s.summarize()?)?)
        });

        let s = store.clone();
        dispatcher.register("getById", move |args| {
            let req: ExpenseIdRequest = parse_args(args)?;
            Ok(serde_json::to_value(s.get(req.id)?)?)
        });

        let s = store.clone();
        dispatcher.register("update", move |args| {
            let req: UpdateExpenseRequest = parse_args(args)?;
            s.update_amount(req.id, req.amount)?;
            Ok(json!("Expense updated"))
        });

        let s = store.clone();
        dispatcher.register("listCategories", move |_args| {
            Ok(serde_json::to_value(s.categories()?)?)
        });

        let s = store.clone();
        dispatcher.register("monthlySummary", move |args| {
            let req: MonthlySummaryRequest = parse_args(args)?;
            Ok(serde_json::to_value(s.monthly(&req.month)?)?)
        });

        let s = store.clone();
        dispatcher.register("exportCsv", move |args| {
            let req: ExportCsvRequest = parse_args(args)?;
            let path = export::export_csv(&s, req.filename.as_deref())?;
            Ok(json!(format!("Exported to {path}")))
        });

        let s = store.clone();
        dispatcher.register("clearAll", move |_args| {
            s.clear()?;
            Ok(json!("All expenses cleared"))
        });

        let s = store.clone();
        dispatcher.register("dropTable", move |args| {
            let req: DropTableRequest = parse_args(args)?;
            let outcome = s.drop_table(req.table_name.as_deref(), req.confirm)?;
            let message = match outcome {
                DropOutcome::Aborted => DROP_ABORTED_MESSAGE.to_string(),
                DropOutcome::Dropped { table } => {
                    format!("Table {table} dropped successfully")
                }
            };
            Ok(json!(message))
        });

        let s = store.clone();
        dispatcher.register("showSchema", move |args| {
            let req: ShowSchemaRequest = parse_args(args)?;
            Ok(serde_json::to_value(s.table_schema(req.table_name.as_deref())?)?)
        });

        let s = store.clone();
        dispatcher.register("runRaw", move |args| {
            let req: RunRawRequest = parse_args(args)?;
            Ok(JsonValue::Array(s.run_sql(&req.statement)?))
        });

        // Operation-namespace mirrors of the two resource endpoints.
        let s = store.clone();
        dispatcher.register("getDbInfo", move |_args| {
            Ok(serde_json::to_value(resources::db_info(&s))?)
        });

        let s = store;
        dispatcher.register("getCategories", move |_args| {
            Ok(serde_json::to_value(resources::categories(&s)?)?)
        });

        dispatcher
    }

    fn register<F>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(JsonValue) -> Result<JsonValue, ServiceError> + Send + Sync + 'static,
    {
        self.handlers.insert(name, Box::new(handler));
    }

    /// Resolve and invoke one operation with caller-supplied keyed arguments.
    pub fn dispatch(&self, operation: &str, arguments: JsonValue) -> Result<JsonValue, ServiceError> {
        let handler = self
            .handlers
            .get(operation)
            .ok_or_else(|| ServiceError::UnknownOperation(operation.to_string()))?;
        tracing::debug!(%operation, "dispatching");
        handler(arguments)
    }

    /// Registered operation names, sorted for stable listings.
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn parse_args<T: DeserializeOwned>(args: JsonValue) -> Result<T, ServiceError> {
    let args = if args.is_null() {
        JsonValue::Object(serde_json::Map::new())
    } else {
        args
    };
    Ok(serde_json::from_value(args)?)
}
