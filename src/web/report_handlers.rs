// src/web/report_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::report::{Report, ReportFormat},
    services::{
        attendance_service, employee_service, report_service,
        roster_service::{self, RosterFilter, RosterQuery},
    },
    state::AppState,
    web::{
        employee_handlers::eligible_employees,
        extract::ApiQuery,
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
pub struct AttendanceReportParams {
    /// Export the daily view of this date, placeholders included.
    pub date: Option<NaiveDate>,
    /// Otherwise export the stored records between `from` and `to`.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeReportParams {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportParams {
    pub month: String,
    #[serde(default)]
    pub format: ReportFormat,
}

fn render(report: &Report, format: ReportFormat) -> AppResult<Response> {
    tracing::info!("Exporting '{}' ({} rows) as {:?}", report.title, report.rows.len(), format);
    match format {
        ReportFormat::Csv => {
            let body = report_service::to_csv(report)?;
            let disposition = format!("attachment; filename=\"{}.csv\"", report.file_stem);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
        ReportFormat::Html => Ok(Html(report_service::to_html(report)?).into_response()),
    }
}

// GET /api/reports/attendance?date=|from=&to=&format=&<roster filters>
pub async fn attendance_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<AttendanceReportParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Response> {
    current.require_export()?;
    let filter = RosterFilter::try_from(&roster)?;
    let employees = employee_service::find_all_employees(&state.db_pool).await?;

    let report = match (params.date, params.from, params.to) {
        (Some(date), _, _) => {
            let rows = attendance_service::daily_rows(&state.db_pool, date, &filter).await?;
            let records: Vec<_> = rows.into_iter().map(|row| row.record).collect();
            report_service::attendance_report(date, date, &records, &employees)
        }
        (None, Some(from), Some(to)) => {
            if from > to {
                return Err(AppError::Validation("'from' must not be after 'to'".to_string()));
            }
            let records = attendance_service::find_records_in_range(&state.db_pool, from, to).await?;
            let allowed: HashSet<&str> =
                roster_service::filter_roster(&employees, &filter, None, &HashSet::new())
                    .into_iter()
                    .map(|e| e.id.as_str())
                    .collect();
            let records: Vec<_> = records
                .into_iter()
                .filter(|r| allowed.contains(r.employee_id.as_str()))
                .collect();
            report_service::attendance_report(from, to, &records, &employees)
        }
        _ => {
            return Err(AppError::Validation(
                "Give either 'date' or both 'from' and 'to'".to_string(),
            ))
        }
    };

    render(&report, params.format)
}

// GET /api/reports/employees?date=&format=&<roster filters>
pub async fn employee_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<EmployeeReportParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Response> {
    current.require_export()?;
    let filter = RosterFilter::try_from(&roster)?;
    let employees = eligible_employees(&state, params.date, &filter).await?;
    render(&report_service::employee_report(&employees), params.format)
}

// GET /api/reports/monthly?month=YYYY-MM&format=&<roster filters>
pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<MonthlyReportParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Response> {
    current.require_export()?;
    let filter = RosterFilter::try_from(&roster)?;
    let summaries = attendance_service::monthly_summary(&state.db_pool, &params.month, &filter).await?;
    render(
        &report_service::monthly_report(params.month.trim(), &summaries),
        params.format,
    )
}
