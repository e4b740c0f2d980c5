// src/web/employee_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        employee::{Employee, EmployeeInput, EmployeeStatus},
        user::{Action, Resource},
    },
    services::{
        attendance_service, employee_service,
        roster_service::{self, RosterFilter, RosterQuery},
    },
    state::AppState,
    web::{extract::{ApiJson, ApiPath, ApiQuery}, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
pub struct RosterDateParams {
    pub date: Option<NaiveDate>,
}

/// Roster filtered as of an optional date, in roster order.
pub async fn eligible_employees(
    state: &AppState,
    date: Option<NaiveDate>,
    filter: &RosterFilter,
) -> AppResult<Vec<Employee>> {
    let employees = employee_service::find_all_employees(&state.db_pool).await?;
    let records = match date {
        Some(date) => attendance_service::find_records_for_date(&state.db_pool, date).await?,
        None => Vec::new(),
    };
    let with_records: HashSet<&str> = records.iter().map(|r| r.employee_id.as_str()).collect();

    Ok(roster_service::filter_roster(&employees, filter, date, &with_records)
        .into_iter()
        .cloned()
        .collect())
}

// GET /api/employees?date=&status=&project=&location=&payment_type=&sponsorship=
pub async fn list_employees(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<RosterDateParams>,
    ApiQuery(roster): ApiQuery<RosterQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    current.require(Resource::Employees, Action::View)?;
    let filter = RosterFilter::try_from(&roster)?;
    let employees = eligible_employees(&state, params.date, &filter).await?;
    Ok(Json(employees))
}

// GET /api/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Employee>> {
    current.require(Resource::Employees, Action::View)?;
    employee_service::find_employee_by_id(&state.db_pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
}

// POST /api/employees
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<EmployeeInput>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    current.require(Resource::Employees, Action::Edit)?;
    let employee = employee_service::create_employee(&state.db_pool, &input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

// PUT /api/employees/{id}
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<EmployeeInput>,
) -> AppResult<Json<Employee>> {
    current.require(Resource::Employees, Action::Edit)?;
    let employee = employee_service::update_employee(&state.db_pool, &id, &input).await?;
    Ok(Json(employee))
}

// POST /api/employees/{id}/archive
pub async fn archive_employee(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Employee>> {
    current.require(Resource::Employees, Action::Delete)?;
    let employee =
        employee_service::set_employee_status(&state.db_pool, &id, EmployeeStatus::Archived).await?;
    Ok(Json(employee))
}

// POST /api/employees/{id}/restore
pub async fn restore_employee(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Employee>> {
    current.require(Resource::Employees, Action::Edit)?;
    let employee =
        employee_service::set_employee_status(&state.db_pool, &id, EmployeeStatus::Active).await?;
    Ok(Json(employee))
}
