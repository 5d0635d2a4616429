use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run_with_listener};

mod accounts;
mod balances;
mod reports;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountListResponse, AccountNew, AccountView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Division, TransactionKind, TransactionListQuery, TransactionListResponse,
            TransactionNew, TransactionUpdate, TransactionView,
        };
    }

    pub mod report {
        pub use api_types::report::{ReportPeriod, ReportQuery, ReportResponse};
    }

    pub mod balance {
        pub use api_types::balance::{BalanceAuditResponse, BalanceDriftView};
    }

    pub use api_types::Message;
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::AmountOverflow(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::EditWindowExpired { .. } => StatusCode::FORBIDDEN,
        EngineError::BalanceMutation(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::BalanceMutation(msg) => {
            tracing::error!("balance mutation failed: {msg}");
            EngineError::BalanceMutation(msg).to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
