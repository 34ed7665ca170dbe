use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use expensedb::config::{CliArgs, Config};
use expensedb::dispatch::{Dispatcher, ServiceError};
use expensedb::models::InvokeRequest;
use expensedb::resources;
use expensedb::storage::ExpenseStore;

struct AppState {
    dispatcher: Dispatcher,
    store: Arc<ExpenseStore>,
}

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let store = Arc::new(ExpenseStore::new(&config.store.path));
    store
        .initialize()
        .expect("Failed to initialize expense store");

    let dispatcher = Dispatcher::new(store.clone());
    let state = Arc::new(AppState { dispatcher, store });

    let app = Router::new()
        .route("/invoke", post(invoke))
        .route("/operations", get(operations))
        .route("/resources/db-info", get(db_info))
        .route("/resources/categories", get(categories))
        .with_state(state);

    tracing::info!(addr = %config.listen_addr(), db = %config.store.path, "ExpenseDB listening");

    axum::Server::bind(&config.listen_addr())
        .serve(app.into_make_service())
        .await
        .unwrap();
}

async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> impl IntoResponse {
    match state.dispatcher.dispatch(&request.operation, request.arguments) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e @ ServiceError::UnknownOperation(_)) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e @ ServiceError::InvalidArguments(_)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn operations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dispatcher.operations())
}

async fn db_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(resources::db_info(&state.store))
}

async fn categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match resources::categories(&state.store) {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
