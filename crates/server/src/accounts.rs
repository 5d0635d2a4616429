use api_types::{
    account::{AccountListResponse, AccountNew, AccountView},
    transaction::TransactionListResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, transactions::transaction_view};

fn account_view(account: engine::Account) -> AccountView {
    AccountView {
        name: account.name,
        balance_minor: account.balance_minor,
        opening_balance_minor: account.opening_balance_minor,
        created_at: account.created_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state.engine.accounts().await?;
    Ok(Json(AccountListResponse {
        accounts: accounts.into_iter().map(account_view).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .new_account(&payload.name, payload.balance_minor.unwrap_or(0))
        .await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&name).await?;
    Ok(Json(account_view(account)))
}

pub async fn history(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let txs = state.engine.account_history(&name).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}
