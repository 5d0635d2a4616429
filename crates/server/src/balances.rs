use api_types::balance::{BalanceAuditResponse, BalanceDriftView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

fn drift_view(drift: engine::BalanceDrift) -> BalanceDriftView {
    BalanceDriftView {
        account: drift.account,
        stored_minor: drift.stored_minor,
        derived_minor: drift.derived_minor,
    }
}

pub async fn verify(
    State(state): State<ServerState>,
) -> Result<Json<BalanceAuditResponse>, ServerError> {
    let drifts = state.engine.verify_balances().await?;
    Ok(Json(BalanceAuditResponse {
        consistent: drifts.is_empty(),
        drifts: drifts.into_iter().map(drift_view).collect(),
    }))
}

/// Rewrites drifting balances; `drifts` lists what was corrected.
pub async fn recompute(
    State(state): State<ServerState>,
) -> Result<Json<BalanceAuditResponse>, ServerError> {
    let drifts = state.engine.recompute_balances().await?;
    Ok(Json(BalanceAuditResponse {
        consistent: true,
        drifts: drifts.into_iter().map(drift_view).collect(),
    }))
}
