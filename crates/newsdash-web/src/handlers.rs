use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use newsdash_core::{DashboardView, Envelope, EnvelopeMeta, FilterOptions, FilterParams, RecordDetail};
use serde::Serialize;
use tracing::debug;

use crate::{ApiError, AppState};

pub(crate) async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Envelope<DashboardView>>, ApiError> {
    let started = Instant::now();
    let mut view = DashboardView::from_params(&state.dataset, &params, state.table_limit);
    debug!(?params, rows = view.row_count, "dashboard rendered");

    let mut meta = EnvelopeMeta::for_request(state.source(), elapsed_ms(started))?;
    meta.extend_warnings(view.warnings.drain(..));
    Ok(Json(Envelope::success(meta, view)))
}

pub(crate) async fn options(
    State(state): State<AppState>,
) -> Result<Json<Envelope<FilterOptions>>, ApiError> {
    let meta = EnvelopeMeta::for_request(state.source(), 0)?;
    Ok(Json(Envelope::success(meta, state.dataset.options().clone())))
}

pub(crate) async fn record(
    State(state): State<AppState>,
    Path(news_id): Path<String>,
) -> Result<Json<Envelope<RecordDetail>>, ApiError> {
    let started = Instant::now();
    let record = state
        .dataset
        .find(news_id.trim())
        .ok_or_else(|| ApiError::RecordNotFound {
            news_id: news_id.clone(),
            dataset: state.source(),
        })?;
    let detail = RecordDetail::from_record(&state.dataset, record);
    debug!(%news_id, "record detail rendered");

    let meta = EnvelopeMeta::for_request(state.source(), elapsed_ms(started))?;
    Ok(Json(Envelope::success(meta, detail)))
}

#[derive(Debug, Serialize)]
pub(crate) struct Health {
    status: &'static str,
    rows: usize,
    source: String,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        rows: state.dataset.len(),
        source: state.source(),
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
