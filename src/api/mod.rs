//! HTTP transport for the ledger
//!
//! A thin axum adapter: decode the body, call the [`Ledger`], serialize the
//! result. Validation and authentication errors map to `400`, store failures
//! to `500`.

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;
use crate::traits::{AccountStore, TransactionLog};

pub use error::{ApiError, ApiResult, ErrorResponse};

/// Build the router for all ATM endpoints
pub fn create_router<S>(ledger: Arc<Ledger<S>>) -> Router
where
    S: AccountStore + TransactionLog + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/atm-users", post(handlers::create_account::<S>))
        .route("/atm-deposit", post(handlers::deposit::<S>))
        .route("/atm-withdraw", post(handlers::withdraw::<S>))
        .route("/atm-transfer", post(handlers::transfer::<S>))
        .route("/atm-setpin", post(handlers::change_pin::<S>))
        .route(
            "/atm-bankstatement",
            get(handlers::statement::<S>).post(handlers::statement::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(ledger)
}
