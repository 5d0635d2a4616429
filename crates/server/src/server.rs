use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, balances, reports, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route("/api/accounts/{name}", get(accounts::get))
        .route("/api/accounts/{name}/transactions", get(accounts::history))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/api/reports", get(reports::get))
        .route("/api/balances/verify", get(balances::verify))
        .route("/api/balances/recompute", post(balances::recompute))
        .with_state(state)
}

/// Build the HTTP application around `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
