// src/web/attendance_handlers.rs
use crate::{
    error::AppResult,
    models::{
        attendance::{
            AttendanceInput, AttendanceRecord, BulkOutcome, BulkPatch, DailyAttendanceRow,
            MonthlySummary,
        },
        user::{Action, Resource},
    },
    services::{
        attendance_service::{self, SortKey, SortOrder},
        roster_service::{RosterFilter, RosterQuery},
    },
    state::AppState,
    web::{extract::{ApiJson, ApiPath, ApiQuery}, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DailyViewParams {
    /// Defaults to today (UTC, like employee creation days).
    pub date: Option<NaiveDate>,
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub filter: RosterQuery,
    pub patch: BulkPatch,
}

// GET /api/attendance?date=&sort=&order=&<roster filters>
pub async fn daily_view(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<DailyViewParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Json<Vec<DailyAttendanceRow>>> {
    current.require(Resource::Attendance, Action::View)?;
    let filter = RosterFilter::try_from(&roster)?;
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut rows = attendance_service::daily_rows(&state.db_pool, date, &filter).await?;
    if let Some(key) = params.sort {
        attendance_service::sort_rows(&mut rows, key, params.order);
    }
    Ok(Json(rows))
}

// PUT /api/attendance
pub async fn save_record(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<AttendanceInput>,
) -> AppResult<Json<AttendanceRecord>> {
    current.require(Resource::Attendance, Action::Edit)?;
    let record = attendance_service::save_record(&state.db_pool, &input).await?;
    Ok(Json(record))
}

// DELETE /api/attendance/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    current.require(Resource::Attendance, Action::Delete)?;
    attendance_service::delete_record(&state.db_pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/attendance/bulk
pub async fn bulk_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(request): ApiJson<BulkRequest>,
) -> AppResult<Json<BulkOutcome>> {
    current.require(Resource::Attendance, Action::Edit)?;
    let filter = RosterFilter::try_from(&request.filter)?;
    let outcome = attendance_service::bulk_update(
        &state.db_pool,
        request.date,
        &filter,
        &request.patch,
        state.config.bulk_concurrency,
    )
    .await?;
    Ok(Json(outcome))
}

// GET /api/attendance/monthly?month=YYYY-MM&<roster filters>
pub async fn monthly_view(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<MonthParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Json<Vec<MonthlySummary>>> {
    current.require(Resource::Attendance, Action::View)?;
    let filter = RosterFilter::try_from(&roster)?;
    let summary = attendance_service::monthly_summary(&state.db_pool, &params.month, &filter).await?;
    Ok(Json(summary))
}
