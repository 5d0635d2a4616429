use api_types::report::{
    CategoryShareView, ReportPeriod, ReportQuery, ReportResponse, SummaryView, TrendPointView,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use engine::{EngineError, ReportWindow};

use crate::{ServerError, server::ServerState};

fn report_window(query: &ReportQuery) -> Result<ReportWindow, ServerError> {
    match (query.from, query.to) {
        (Some(from), Some(to)) => {
            let (from, to) = (from.with_timezone(&Utc), to.with_timezone(&Utc));
            if from > to {
                return Err(EngineError::Validation(
                    "invalid range: from must be <= to".to_string(),
                )
                .into());
            }
            Ok(ReportWindow::Range { from, to })
        }
        (None, None) => Ok(match query.period.unwrap_or_default() {
            ReportPeriod::Weekly => ReportWindow::Weekly,
            ReportPeriod::Monthly => ReportWindow::Monthly,
            ReportPeriod::Yearly => ReportWindow::Yearly,
            ReportPeriod::All => ReportWindow::All,
        }),
        _ => Err(EngineError::Validation(
            "a custom range needs both from and to".to_string(),
        )
        .into()),
    }
}

pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ServerError> {
    let window = report_window(&query)?;
    let report = state.engine.report(window, Utc::now()).await?;

    Ok(Json(ReportResponse {
        summary: SummaryView {
            income_minor: report.summary.income_minor,
            expense_minor: report.summary.expense_minor,
            transfer_minor: report.summary.transfer_minor,
            balance_minor: report.summary.balance_minor,
            savings_rate: report.summary.savings_rate,
        },
        categories: report
            .categories
            .into_iter()
            .map(|share| CategoryShareView {
                category: share.category,
                amount_minor: share.amount_minor,
                percent: share.percent,
            })
            .collect(),
        trend: report
            .trend
            .into_iter()
            .map(|point| TrendPointView {
                date: point.date,
                income_minor: point.income_minor,
                expense_minor: point.expense_minor,
            })
            .collect(),
    }))
}
