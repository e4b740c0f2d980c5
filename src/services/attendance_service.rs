// src/services/attendance_service.rs
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        attendance::{
            is_temporary_id, AttendanceInput, AttendanceRecord, BulkFailure, BulkOutcome,
            BulkPatch, BulkUpdateType, DailyAttendanceRow, MonthlySummary,
        },
        employee::Employee,
    },
    services::{
        employee_service,
        roster_service::{self, RosterFilter},
    },
};
use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const SELECT_RECORD: &str = r#"
    SELECT id, employee_id, date, present, start_time, end_time, overtime_hours, note
    FROM attendance_records
"#;

// --- Record store ---

pub async fn find_records_for_date(
    db_pool: &SqlitePool,
    date: NaiveDate,
) -> AppResult<Vec<AttendanceRecord>> {
    tracing::debug!("Loading attendance records for {}", date);
    let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
        "{} WHERE date = ?1 ORDER BY rowid ASC",
        SELECT_RECORD
    ))
    .bind(date)
    .fetch_all(db_pool)
    .await?;
    Ok(records)
}

/// Records with `from <= date <= to`, ordered by date.
pub async fn find_records_in_range(
    db_pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<AttendanceRecord>> {
    tracing::debug!("Loading attendance records from {} to {}", from, to);
    let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
        "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, rowid ASC",
        SELECT_RECORD
    ))
    .bind(from)
    .bind(to)
    .fetch_all(db_pool)
    .await?;
    Ok(records)
}

pub async fn find_record_by_id(
    db_pool: &SqlitePool,
    id: &str,
) -> AppResult<Option<AttendanceRecord>> {
    let record = sqlx::query_as::<_, AttendanceRecord>(&format!("{} WHERE id = ?1", SELECT_RECORD))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(record)
}

fn validate_time(value: &str, field: &str) -> AppResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("{} must be blank or HH:MM", field)))
}

fn validate_values(start_time: &str, end_time: &str, overtime_hours: f64) -> AppResult<()> {
    validate_time(start_time, "Start time")?;
    validate_time(end_time, "End time")?;
    if !overtime_hours.is_finite() || overtime_hours < 0.0 {
        return Err(AppError::Validation(
            "Overtime hours must be zero or more".to_string(),
        ));
    }
    Ok(())
}

/// Writes one record without checking that the employee exists.
///
/// A real id updates that row in place. A missing or temporary id inserts a new row,
/// or overwrites the one already stored for the same employee and day.
async fn write_record(db_pool: &SqlitePool, input: &AttendanceInput) -> AppResult<AttendanceRecord> {
    match input.id.as_deref().filter(|id| !is_temporary_id(id)) {
        Some(id) => {
            let rows_affected = sqlx::query(
                r#"
                UPDATE attendance_records
                SET employee_id = ?1, date = ?2, present = ?3, start_time = ?4,
                    end_time = ?5, overtime_hours = ?6, note = ?7
                WHERE id = ?8
                "#,
            )
            .bind(&input.employee_id)
            .bind(input.date)
            .bind(input.present)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(input.overtime_hours)
            .bind(&input.note)
            .bind(id)
            .execute(db_pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, "This employee already has a record on that date")
            })?
            .rows_affected();

            if rows_affected == 0 {
                return Err(AppError::NotFound("Attendance record".to_string()));
            }
            find_record_by_id(db_pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Attendance record".to_string()))
        }
        None => {
            let new_id = Uuid::new_v4().to_string();
            let record = sqlx::query_as::<_, AttendanceRecord>(
                r#"
                INSERT INTO attendance_records
                    (id, employee_id, date, present, start_time, end_time, overtime_hours, note)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(employee_id, date) DO UPDATE SET
                    present = excluded.present,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    overtime_hours = excluded.overtime_hours,
                    note = excluded.note
                RETURNING id, employee_id, date, present, start_time, end_time, overtime_hours, note
                "#,
            )
            .bind(&new_id)
            .bind(&input.employee_id)
            .bind(input.date)
            .bind(input.present)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(input.overtime_hours)
            .bind(&input.note)
            .fetch_one(db_pool)
            .await?;
            Ok(record)
        }
    }
}

/// Saves a single record edited by the user.
pub async fn save_record(db_pool: &SqlitePool, input: &AttendanceInput) -> AppResult<AttendanceRecord> {
    validate_values(&input.start_time, &input.end_time, input.overtime_hours)?;

    if employee_service::find_employee_by_id(db_pool, &input.employee_id)
        .await?
        .is_none()
    {
        tracing::warn!("Attendance save rejected: employee '{}' not found.", input.employee_id);
        return Err(AppError::NotFound("Employee".to_string()));
    }

    tracing::info!(
        "Saving attendance for employee {} on {} (present: {})",
        input.employee_id,
        input.date,
        input.present
    );
    let record = write_record(db_pool, input).await?;
    tracing::info!("✅ Attendance record {} saved.", record.id);
    Ok(record)
}

pub async fn delete_record(db_pool: &SqlitePool, id: &str) -> AppResult<()> {
    tracing::info!("Deleting attendance record {}", id);
    let rows_affected = sqlx::query("DELETE FROM attendance_records WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Delete failed: attendance record '{}' not found.", id);
        return Err(AppError::NotFound("Attendance record".to_string()));
    }
    Ok(())
}

// --- Reconciliation ---

/// One row per eligible employee, in roster order: the stored record when there is
/// one (the last one wins on duplicates), a placeholder otherwise.
pub fn reconcile(
    eligible: &[&Employee],
    records: &[AttendanceRecord],
    date: NaiveDate,
) -> Vec<AttendanceRecord> {
    let by_employee: HashMap<&str, &AttendanceRecord> = records
        .iter()
        .map(|r| (r.employee_id.as_str(), r))
        .collect();

    eligible
        .iter()
        .map(|e| match by_employee.get(e.id.as_str()) {
            Some(record) => (*record).clone(),
            None => AttendanceRecord::placeholder(&e.id, date),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Code,
    Present,
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Stable sort of the view by one column.
pub fn sort_rows(rows: &mut [DailyAttendanceRow], key: SortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = match key {
            SortKey::Name => a.employee_name.to_lowercase().cmp(&b.employee_name.to_lowercase()),
            SortKey::Code => a.employee_code.cmp(&b.employee_code),
            SortKey::Present => a.record.present.cmp(&b.record.present),
            SortKey::Overtime => a
                .record
                .overtime_hours
                .partial_cmp(&b.record.overtime_hours)
                .unwrap_or(Ordering::Equal),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// The rows displayed for `date` under `filter`.
pub async fn daily_rows(
    db_pool: &SqlitePool,
    date: NaiveDate,
    filter: &RosterFilter,
) -> AppResult<Vec<DailyAttendanceRow>> {
    let employees = employee_service::find_all_employees(db_pool).await?;
    let records = find_records_for_date(db_pool, date).await?;

    let with_records: HashSet<&str> = records.iter().map(|r| r.employee_id.as_str()).collect();
    let eligible = roster_service::filter_roster(&employees, filter, Some(date), &with_records);
    let reconciled = reconcile(&eligible, &records, date);

    let rows: Vec<DailyAttendanceRow> = eligible
        .iter()
        .zip(reconciled)
        .map(|(employee, record)| DailyAttendanceRow {
            persisted: !record.is_temporary(),
            employee_name: employee.name.clone(),
            employee_code: employee.employee_code.clone(),
            record,
        })
        .collect();

    tracing::debug!(
        "Attendance view for {}: {} rows ({} stored records).",
        date,
        rows.len(),
        records.len()
    );
    Ok(rows)
}

// --- Bulk updates ---

/// Whether `patch` touches `record`. Time patches only reach rows marked present.
pub fn patch_applies(record: &AttendanceRecord, patch: &BulkPatch) -> bool {
    match patch.update_type {
        BulkUpdateType::Presence => true,
        BulkUpdateType::Times => record.present,
    }
}

pub fn apply_patch(record: &AttendanceRecord, patch: &BulkPatch) -> AttendanceRecord {
    let mut updated = record.clone();
    if !patch_applies(record, patch) {
        return updated;
    }

    if patch.update_type == BulkUpdateType::Presence {
        updated.present = patch.present;
    }
    if updated.present {
        updated.start_time = patch.start_time.clone();
        updated.end_time = patch.end_time.clone();
        updated.overtime_hours = patch.overtime_hours;
    } else {
        updated.start_time.clear();
        updated.end_time.clear();
        updated.overtime_hours = 0.0;
    }
    if !patch.note.is_empty() {
        updated.note = patch.note.clone();
    }
    updated
}

/// Applies `patch` to every row, returning all rows (untouched ones unchanged).
pub fn apply_bulk_patch(rows: &[AttendanceRecord], patch: &BulkPatch) -> Vec<AttendanceRecord> {
    rows.iter().map(|r| apply_patch(r, patch)).collect()
}

/// Saves every record with at most `limit` writes in flight. Each failure is reported,
/// none stops the others.
pub async fn persist_all(
    db_pool: &SqlitePool,
    records: Vec<AttendanceRecord>,
    limit: usize,
) -> BulkOutcome {
    let results: Vec<(String, AppResult<AttendanceRecord>)> = stream::iter(records)
        .map(|record| async move {
            let employee_id = record.employee_id.clone();
            let input = AttendanceInput::from(record);
            (employee_id, write_record(db_pool, &input).await)
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let mut outcome = BulkOutcome::default();
    for (employee_id, result) in results {
        match result {
            Ok(_) => outcome.saved += 1,
            Err(e) => {
                tracing::error!("Bulk save failed for employee {}: {:?}", employee_id, e);
                outcome.failed.push(BulkFailure {
                    employee_id,
                    error: e.user_message(),
                });
            }
        }
    }
    outcome
}

/// Applies `patch` to the rows displayed for `date` under `filter` and saves the
/// rows it touched.
pub async fn bulk_update(
    db_pool: &SqlitePool,
    date: NaiveDate,
    filter: &RosterFilter,
    patch: &BulkPatch,
    limit: usize,
) -> AppResult<BulkOutcome> {
    validate_values(&patch.start_time, &patch.end_time, patch.overtime_hours)?;

    let rows = daily_rows(db_pool, date, filter).await?;
    let to_save: Vec<AttendanceRecord> = rows
        .into_iter()
        .map(|row| row.record)
        .filter(|r| patch_applies(r, patch))
        .map(|r| apply_patch(&r, patch))
        .collect();

    tracing::info!(
        "Bulk {:?} update for {}: saving {} records.",
        patch.update_type,
        date,
        to_save.len()
    );
    let outcome = persist_all(db_pool, to_save, limit).await;

    if outcome.failed.is_empty() {
        tracing::info!("✅ Bulk update for {} saved {} records.", date, outcome.saved);
    } else {
        tracing::warn!(
            "Bulk update for {}: {} saved, {} failed.",
            date,
            outcome.saved,
            outcome.failed.len()
        );
    }
    Ok(outcome)
}

// --- Monthly timesheet ---

/// First and last day of the month named by `YYYY-MM`.
pub fn month_bounds(month: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Month must be YYYY-MM, got '{}'", month)))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::Validation(format!("Month out of range: '{}'", month)))?;
    Ok((first, last))
}

/// Totals per employee over `records`, for the employees in `eligible`.
pub fn summarize_month(eligible: &[&Employee], records: &[AttendanceRecord]) -> Vec<MonthlySummary> {
    let mut summaries: Vec<MonthlySummary> = eligible
        .iter()
        .map(|e| MonthlySummary {
            employee_id: e.id.clone(),
            employee_code: e.employee_code.clone(),
            employee_name: e.name.clone(),
            days_present: 0,
            days_absent: 0,
            overtime_hours: 0.0,
        })
        .collect();
    let index: HashMap<&str, usize> = eligible
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.as_str(), i))
        .collect();

    for record in records {
        if let Some(&i) = index.get(record.employee_id.as_str()) {
            let summary = &mut summaries[i];
            if record.present {
                summary.days_present += 1;
            } else {
                summary.days_absent += 1;
            }
            summary.overtime_hours += record.overtime_hours;
        }
    }
    summaries
}

pub async fn monthly_summary(
    db_pool: &SqlitePool,
    month: &str,
    filter: &RosterFilter,
) -> AppResult<Vec<MonthlySummary>> {
    let (first, last) = month_bounds(month)?;
    tracing::debug!("Monthly summary for {}-{:02}", first.year(), first.month());

    let employees = employee_service::find_all_employees(db_pool).await?;
    let records = find_records_in_range(db_pool, first, last).await?;

    // Eligibility as of the last day; archived employees count if they worked that month.
    let with_records: HashSet<&str> = records.iter().map(|r| r.employee_id.as_str()).collect();
    let eligible = roster_service::filter_roster(&employees, filter, Some(last), &with_records);

    Ok(summarize_month(&eligible, &records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::employee::EmployeeStatus;
    use crate::services::employee_service::tests::input as employee_input;
    use crate::services::roster_service::tests::employee;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stored(id: &str, employee_id: &str, date: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            date: day(date),
            present,
            start_time: if present { "08:00".into() } else { String::new() },
            end_time: if present { "17:00".into() } else { String::new() },
            overtime_hours: if present { 1.5 } else { 0.0 },
            note: "kept".to_string(),
        }
    }

    fn patch(update_type: BulkUpdateType, present: bool, note: &str) -> BulkPatch {
        BulkPatch {
            update_type,
            present,
            start_time: "07:00".into(),
            end_time: "16:00".into(),
            overtime_hours: 2.0,
            note: note.to_string(),
        }
    }

    #[test]
    fn test_reconcile_fills_missing_employees() {
        let roster = vec![
            employee("1", "2023-01-01", EmployeeStatus::Active),
            employee("2", "2023-01-01", EmployeeStatus::Active),
            employee("3", "2023-01-01", EmployeeStatus::Active),
        ];
        let eligible: Vec<&Employee> = roster.iter().collect();
        let record = stored("r-2", "2", "2024-01-01", true);

        let rows = reconcile(&eligible, &[record.clone()], day("2024-01-01"));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], record);
        for placeholder in [&rows[0], &rows[2]] {
            assert!(placeholder.is_temporary());
            assert!(!placeholder.present);
            assert_eq!(placeholder.overtime_hours, 0.0);
            assert_eq!(placeholder.start_time, "");
            assert_eq!(placeholder.end_time, "");
            assert_eq!(placeholder.note, "");
            assert_eq!(placeholder.date, day("2024-01-01"));
        }
        assert_eq!(rows[0].employee_id, "1");
        assert_eq!(rows[2].employee_id, "3");
    }

    #[test]
    fn test_reconcile_last_duplicate_wins() {
        let roster = vec![employee("1", "2023-01-01", EmployeeStatus::Active)];
        let eligible: Vec<&Employee> = roster.iter().collect();
        let first = stored("a", "1", "2024-01-01", false);
        let second = stored("b", "1", "2024-01-01", true);

        let rows = reconcile(&eligible, &[first, second.clone()], day("2024-01-01"));
        assert_eq!(rows, vec![second]);
    }

    #[test]
    fn test_presence_absent_clears_times() {
        let rows = vec![
            stored("a", "1", "2024-01-01", true),
            AttendanceRecord::placeholder("2", day("2024-01-01")),
        ];
        let patched = apply_bulk_patch(&rows, &patch(BulkUpdateType::Presence, false, ""));

        for r in &patched {
            assert!(!r.present);
            assert_eq!(r.start_time, "");
            assert_eq!(r.end_time, "");
            assert_eq!(r.overtime_hours, 0.0);
        }
        // Blank patch note keeps the stored one.
        assert_eq!(patched[0].note, "kept");
    }

    #[test]
    fn test_presence_present_sets_times_and_note() {
        let rows = vec![AttendanceRecord::placeholder("2", day("2024-01-01"))];
        let patched = apply_bulk_patch(&rows, &patch(BulkUpdateType::Presence, true, "site visit"));

        assert!(patched[0].present);
        assert_eq!(patched[0].start_time, "07:00");
        assert_eq!(patched[0].end_time, "16:00");
        assert_eq!(patched[0].overtime_hours, 2.0);
        assert_eq!(patched[0].note, "site visit");
    }

    #[test]
    fn test_times_skips_absent_rows() {
        let absent = stored("b", "2", "2024-01-01", false);
        let rows = vec![stored("a", "1", "2024-01-01", true), absent.clone()];
        let patched = apply_bulk_patch(&rows, &patch(BulkUpdateType::Times, true, "new"));

        assert_eq!(patched[1], absent);
        assert_eq!(patched[0].start_time, "07:00");
        assert_eq!(patched[0].overtime_hours, 2.0);
        assert_eq!(patched[0].note, "new");
        assert!(patched[0].present);
    }

    #[test]
    fn test_any_non_empty_note_replaces() {
        let rows = vec![stored("a", "1", "2024-01-01", true)];
        let patched = apply_bulk_patch(&rows, &patch(BulkUpdateType::Times, true, " "));
        assert_eq!(patched[0].note, " ");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds("2024-02").unwrap(), (day("2024-02-01"), day("2024-02-29")));
        assert_eq!(month_bounds("2023-12").unwrap(), (day("2023-12-01"), day("2023-12-31")));
        assert!(matches!(month_bounds("2024-13"), Err(AppError::Validation(_))));
        assert!(matches!(month_bounds("March"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_sort_rows() {
        let mut rows: Vec<DailyAttendanceRow> = [("b", 1.0), ("A", 3.0), ("c", 2.0)]
            .iter()
            .enumerate()
            .map(|(i, (name, ot))| {
                let mut record = stored(&i.to_string(), &i.to_string(), "2024-01-01", true);
                record.overtime_hours = *ot;
                DailyAttendanceRow {
                    record,
                    employee_name: name.to_string(),
                    employee_code: format!("E-{}", i),
                    persisted: true,
                }
            })
            .collect();

        sort_rows(&mut rows, SortKey::Name, SortOrder::Asc);
        let names: Vec<&str> = rows.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, vec!["A", "b", "c"]);

        sort_rows(&mut rows, SortKey::Overtime, SortOrder::Desc);
        let ot: Vec<f64> = rows.iter().map(|r| r.record.overtime_hours).collect();
        assert_eq!(ot, vec![3.0, 2.0, 1.0]);
    }

    async fn seed_employee(pool: &SqlitePool, code: &str) -> Employee {
        employee_service::create_employee(pool, &employee_input(code, &format!("Name {}", code)))
            .await
            .unwrap()
    }

    fn save_input(employee_id: &str, date: NaiveDate, present: bool) -> AttendanceInput {
        AttendanceInput {
            id: None,
            employee_id: employee_id.to_string(),
            date,
            present,
            start_time: if present { "08:00".into() } else { String::new() },
            end_time: if present { "17:00".into() } else { String::new() },
            overtime_hours: 0.0,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_daily_rows_with_one_record() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e1 = seed_employee(&pool, "E-1").await;
        let e2 = seed_employee(&pool, "E-2").await;
        let e3 = seed_employee(&pool, "E-3").await;

        let saved = save_record(&pool, &save_input(&e2.id, today, true)).await.unwrap();

        let rows = daily_rows(&pool, today, &RosterFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 3);
        let by_emp: HashMap<&str, &DailyAttendanceRow> =
            rows.iter().map(|r| (r.record.employee_id.as_str(), r)).collect();
        assert_eq!(by_emp[e2.id.as_str()].record, saved);
        assert!(by_emp[e2.id.as_str()].persisted);
        for id in [&e1.id, &e3.id] {
            assert!(!by_emp[id.as_str()].persisted);
            assert!(!by_emp[id.as_str()].record.present);
        }
    }

    #[tokio::test]
    async fn test_archived_employee_visible_only_with_record() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let worked = seed_employee(&pool, "E-1").await;
        let idle = seed_employee(&pool, "E-2").await;
        save_record(&pool, &save_input(&worked.id, today, true)).await.unwrap();
        employee_service::set_employee_status(&pool, &worked.id, EmployeeStatus::Archived)
            .await
            .unwrap();
        employee_service::set_employee_status(&pool, &idle.id, EmployeeStatus::Archived)
            .await
            .unwrap();

        let rows = daily_rows(&pool, today, &RosterFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.employee_id, worked.id);
    }

    #[tokio::test]
    async fn test_save_strips_temporary_id_and_updates_in_place() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e = seed_employee(&pool, "E-1").await;

        let mut input = save_input(&e.id, today, true);
        input.id = Some(format!("temp-{}", e.id));
        let first = save_record(&pool, &input).await.unwrap();
        assert!(!first.is_temporary());

        let mut edit = AttendanceInput::from(first.clone());
        edit.overtime_hours = 3.0;
        edit.note = "late finish".into();
        let second = save_record(&pool, &edit).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.overtime_hours, 3.0);

        // A second unsaved row for the same day lands on the same record.
        let again = save_record(&pool, &save_input(&e.id, today, false)).await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(find_records_for_date(&pool, today).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_bad_input() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let err = save_record(&pool, &save_input("ghost", today, true)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let e = seed_employee(&pool, "E-1").await;
        let mut bad = save_input(&e.id, today, true);
        bad.start_time = "8 o'clock".into();
        assert!(matches!(save_record(&pool, &bad).await, Err(AppError::Validation(_))));

        let mut bad = save_input(&e.id, today, true);
        bad.overtime_hours = -2.0;
        assert!(matches!(save_record(&pool, &bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_record() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e = seed_employee(&pool, "E-1").await;
        let saved = save_record(&pool, &save_input(&e.id, today, true)).await.unwrap();

        delete_record(&pool, &saved.id).await.unwrap();
        assert!(find_record_by_id(&pool, &saved.id).await.unwrap().is_none());
        assert!(matches!(
            delete_record(&pool, &saved.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_presence_saves_every_row() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e1 = seed_employee(&pool, "E-1").await;
        seed_employee(&pool, "E-2").await;
        save_record(&pool, &save_input(&e1.id, today, true)).await.unwrap();

        let outcome = bulk_update(
            &pool,
            today,
            &RosterFilter::default(),
            &patch(BulkUpdateType::Presence, false, ""),
            4,
        )
        .await
        .unwrap();
        assert_eq!(outcome.saved, 2);
        assert!(outcome.failed.is_empty());

        let records = find_records_for_date(&pool, today).await.unwrap();
        assert_eq!(records.len(), 2);
        for r in records {
            assert!(!r.present);
            assert_eq!(r.start_time, "");
            assert_eq!(r.end_time, "");
            assert_eq!(r.overtime_hours, 0.0);
        }
    }

    #[tokio::test]
    async fn test_bulk_times_only_saves_present_rows() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e1 = seed_employee(&pool, "E-1").await;
        seed_employee(&pool, "E-2").await;
        save_record(&pool, &save_input(&e1.id, today, true)).await.unwrap();

        let outcome = bulk_update(
            &pool,
            today,
            &RosterFilter::default(),
            &patch(BulkUpdateType::Times, true, ""),
            2,
        )
        .await
        .unwrap();
        assert_eq!(outcome.saved, 1);

        let records = find_records_for_date(&pool, today).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time, "07:00");
        assert_eq!(records[0].overtime_hours, 2.0);
    }

    #[tokio::test]
    async fn test_persist_all_reports_each_failure() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let e = seed_employee(&pool, "E-1").await;

        let records = vec![
            AttendanceRecord::placeholder(&e.id, today),
            AttendanceRecord::placeholder("ghost", today),
        ];
        let outcome = persist_all(&pool, records, 2).await;
        assert_eq!(outcome.saved, 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].employee_id, "ghost");
    }

    #[tokio::test]
    async fn test_bulk_rejects_bad_times() {
        let pool = create_test_pool().await;
        let mut bad = patch(BulkUpdateType::Times, true, "");
        bad.end_time = "25:99".into();
        let result = bulk_update(&pool, day("2024-01-01"), &RosterFilter::default(), &bad, 1).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_monthly_summary_counts() {
        let pool = create_test_pool().await;
        let today = chrono::Utc::now().date_naive();
        let month = today.format("%Y-%m").to_string();
        let e1 = seed_employee(&pool, "E-1").await;
        let e2 = seed_employee(&pool, "E-2").await;

        let mut worked = save_input(&e1.id, today, true);
        worked.overtime_hours = 1.5;
        save_record(&pool, &worked).await.unwrap();
        save_record(&pool, &save_input(&e2.id, today, false)).await.unwrap();

        let summary = monthly_summary(&pool, &month, &RosterFilter::default()).await.unwrap();
        assert_eq!(summary.len(), 2);
        let s1 = summary.iter().find(|s| s.employee_id == e1.id).unwrap();
        assert_eq!((s1.days_present, s1.days_absent), (1, 0));
        assert_eq!(s1.overtime_hours, 1.5);
        let s2 = summary.iter().find(|s| s.employee_id == e2.id).unwrap();
        assert_eq!((s2.days_present, s2.days_absent), (0, 1));
    }
}
