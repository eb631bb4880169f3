//! Daily summary handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::{parse_day, parse_shop};
use crate::error::AppResult;
use crate::services::summary::{SummaryRequest, SummaryService};
use crate::services::{CsvReport, ReportRenderer, TextReport};
use crate::AppState;

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub format: Option<String>, // "json", "text" or "csv"
}

/// Daily summary as JSON, or as a downloadable text or CSV report
pub async fn daily_summary(
    State(state): State<AppState>,
    Path((shop, date)): Path<(String, String)>,
    Query(query): Query<SummaryQuery>,
    Json(request): Json<SummaryRequest>,
) -> AppResult<impl IntoResponse> {
    let shop = parse_shop(&shop)?;
    let date = parse_day(&date)?;
    let view = SummaryService::new(state.store.clone())
        .daily_summary(shop, date, &request)
        .await?;

    let renderer: Box<dyn ReportRenderer> = match query.format.as_deref() {
        Some("text") => Box::new(TextReport::new(&state.config.report)),
        Some("csv") => Box::new(CsvReport),
        _ => return Ok(Json(view).into_response()),
    };

    let body = renderer.render(&view.summary)?;
    let disposition = format!("attachment; filename=\"{}\"", renderer.file_name(&view.summary));
    Ok((
        [
            (header::CONTENT_TYPE, renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
