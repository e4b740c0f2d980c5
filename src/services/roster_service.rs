// src/services/roster_service.rs
use crate::{
    error::{AppError, AppResult},
    models::employee::{Employee, EmployeeStatus, PaymentType, Sponsorship},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

/// Value meaning "no constraint" in filter query parameters.
pub const ALL: &str = "All";

/// Equality filters over the roster. `None` leaves the field unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterFilter {
    pub status: Option<EmployeeStatus>,
    pub project: Option<String>,
    pub location: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub sponsorship: Option<Sponsorship>,
}

/// Filter parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterQuery {
    pub status: Option<String>,
    pub project: Option<String>,
    pub location: Option<String>,
    pub payment_type: Option<String>,
    pub sponsorship: Option<String>,
}

fn constraint(raw: &Option<String>) -> Option<&str> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(v) if v.eq_ignore_ascii_case(ALL) => None,
        Some(v) => Some(v),
    }
}

fn parse_choice<T>(raw: &Option<String>, field: &str, parse: fn(&str) -> Option<T>) -> AppResult<Option<T>> {
    match constraint(raw) {
        None => Ok(None),
        Some(v) => parse(v)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown {} filter: '{}'", field, v))),
    }
}

impl TryFrom<&RosterQuery> for RosterFilter {
    type Error = AppError;

    fn try_from(q: &RosterQuery) -> AppResult<Self> {
        Ok(RosterFilter {
            status: parse_choice(&q.status, "status", EmployeeStatus::parse)?,
            project: constraint(&q.project).map(str::to_string),
            location: constraint(&q.location).map(str::to_string),
            payment_type: parse_choice(&q.payment_type, "payment type", PaymentType::parse)?,
            sponsorship: parse_choice(&q.sponsorship, "sponsorship", Sponsorship::parse)?,
        })
    }
}

impl RosterFilter {
    fn matches(&self, employee: &Employee) -> bool {
        self.status.map_or(true, |s| employee.status == s) && self.matches_fields(employee)
    }

    /// Every equality filter except status.
    fn matches_fields(&self, employee: &Employee) -> bool {
        self.project.as_deref().map_or(true, |p| employee.project == p)
            && self.location.as_deref().map_or(true, |l| employee.location == l)
            && self.payment_type.map_or(true, |p| employee.payment_type == p)
            && self.sponsorship.map_or(true, |s| employee.sponsorship == s)
    }
}

/// Decides whether `employee` is shown, optionally as of `date`.
///
/// `with_records` holds the ids of employees that have an attendance record on `date`.
/// Archived employees only show up on days they have a record, and then still have to
/// pass every filter but status. Without a date they are handled by the plain status
/// filter.
pub fn is_eligible(
    employee: &Employee,
    filter: &RosterFilter,
    date: Option<NaiveDate>,
    with_records: &HashSet<&str>,
) -> bool {
    if let Some(date) = date {
        // Not hired yet on that day.
        if employee.created_day() > date {
            return false;
        }
        if employee.is_archived() {
            return with_records.contains(employee.id.as_str()) && filter.matches_fields(employee);
        }
    }
    filter.matches(employee)
}

/// Keeps the eligible employees, preserving roster order.
pub fn filter_roster<'a>(
    employees: &'a [Employee],
    filter: &RosterFilter,
    date: Option<NaiveDate>,
    with_records: &HashSet<&str>,
) -> Vec<&'a Employee> {
    employees
        .iter()
        .filter(|e| is_eligible(e, filter, date, with_records))
        .collect()
}
