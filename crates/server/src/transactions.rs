use api_types::{
    Message,
    transaction::{
        Division as ApiDivision, TransactionKind as ApiKind, TransactionListQuery,
        TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn map_division(division: engine::Division) -> ApiDivision {
    match division {
        engine::Division::Personal => ApiDivision::Personal,
        engine::Division::Office => ApiDivision::Office,
    }
}

fn engine_division(division: ApiDivision) -> engine::Division {
    match division {
        ApiDivision::Personal => engine::Division::Personal,
        ApiDivision::Office => engine::Division::Office,
    }
}

pub(crate) fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        description: tx.description,
        category: tx.category,
        division: map_division(tx.division),
        account_from: tx.account_from,
        account_to: tx.account_to,
        note: tx.note,
        occurred_at: tx.occurred_at,
        created_at: tx.created_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = engine::TransactionListFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        kind: query.kind.map(engine_kind),
        division: query.division.map(engine_division),
        category: query.category.filter(|c| !c.trim().is_empty()),
        from: query.from.map(|dt| dt.with_timezone(&Utc)),
        to: query.to.map(|dt| dt.with_timezone(&Utc)),
    };

    let txs = state.engine.list_transactions(&filter).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let cmd = engine::NewTransactionCmd {
        kind: engine_kind(payload.kind),
        amount_minor: payload.amount_minor,
        description: payload.description,
        category: payload.category,
        division: payload.division.map(engine_division),
        account_from: payload.account_from,
        account_to: payload.account_to,
        note: payload.note,
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
    };

    let tx = state.engine.add_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let patch = engine::TransactionPatch {
        kind: payload.kind.map(engine_kind),
        amount_minor: payload.amount_minor,
        description: payload.description,
        category: payload.category,
        division: payload.division.map(engine_division),
        account_from: payload.account_from,
        account_to: payload.account_to,
        note: payload.note,
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
    };
    if patch.is_empty() {
        return Err(ServerError::Generic("nothing to update".to_string()));
    }

    let tx = state.engine.update_transaction(id, patch).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_transaction(id).await?;
    Ok(Json(Message {
        message: "Transaction deleted".to_string(),
    }))
}
