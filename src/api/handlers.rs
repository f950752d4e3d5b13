//! HTTP handlers
//!
//! Each handler decodes its body, hands the field values to the ledger and
//! serializes the outcome. No business rules live here.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::dto::*;
use crate::api::error::ApiResult;
use crate::ledger::Ledger;
use crate::traits::{AccountStore, TransactionLog};

/// Shared handler state
pub type SharedLedger<S> = Arc<Ledger<S>>;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /atm-users
pub async fn create_account<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Json<CreateAccountResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    let account = ledger.create_account(&req.name, &req.pin).await?;

    Ok(Json(CreateAccountResponse {
        message: "account created successfully".to_string(),
        account_number: account.id,
    }))
}

/// POST /atm-deposit
pub async fn deposit<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<BalanceResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    let receipt = ledger
        .deposit(&req.account_number, &req.pin, &req.amount)
        .await?;

    Ok(Json(BalanceResponse {
        message: "money deposited successfully".to_string(),
        account_number: receipt.account_id,
        balance: receipt.balance,
    }))
}

/// POST /atm-withdraw
pub async fn withdraw<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<BalanceResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    let receipt = ledger
        .withdraw(&req.account_number, &req.pin, &req.amount)
        .await?;

    Ok(Json(BalanceResponse {
        message: "money withdraw successful".to_string(),
        account_number: receipt.account_id,
        balance: receipt.balance,
    }))
}

/// POST /atm-transfer
pub async fn transfer<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<TransferResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    let receipt = ledger
        .transfer(&req.from_account, &req.from_pin, &req.to_account, &req.amount)
        .await?;

    Ok(Json(TransferResponse {
        message: "money transferred successfully".to_string(),
        reference: receipt.reference,
        from_account: receipt.from,
        to_account: receipt.to,
        amount: receipt.amount,
        balance: receipt.balance,
    }))
}

/// POST /atm-setpin
pub async fn change_pin<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<ChangePinRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    ledger
        .change_pin(&req.account_number, &req.old_pin, &req.new_pin)
        .await?;

    Ok(Json(MessageResponse::new("PIN updated successfully")))
}

/// GET or POST /atm-bankstatement
pub async fn statement<S>(
    State(ledger): State<SharedLedger<S>>,
    payload: Result<Json<StatementRequest>, JsonRejection>,
) -> ApiResult<Json<StatementResponse>>
where
    S: AccountStore + TransactionLog + 'static,
{
    let Json(req) = payload?;
    let transactions = ledger.statement(&req.account_number, &req.pin).await?;

    Ok(Json(StatementResponse {
        account_number: req.account_number,
        transactions,
    }))
}
