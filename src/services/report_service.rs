// src/services/report_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{AttendanceRecord, MonthlySummary},
        employee::Employee,
        report::Report,
    },
    templates::ReportPage,
};
use askama::Template;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const ATTENDANCE_HEADERS: &[&str] = &[
    "Date",
    "Employee Code",
    "Employee Name",
    "Project",
    "Location",
    "Present",
    "Start Time",
    "End Time",
    "Overtime Hours",
    "Note",
];

pub const EMPLOYEE_HEADERS: &[&str] = &[
    "Employee Code",
    "Employee Name",
    "Project",
    "Location",
    "Job Title",
    "Payment Type",
    "Pay Rate",
    "Sponsorship",
    "Status",
    "Created At",
];

pub const MONTHLY_HEADERS: &[&str] = &[
    "Employee Code",
    "Employee Name",
    "Days Present",
    "Days Absent",
    "Overtime Hours",
];

fn yes_no(value: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    text.to_string()
}

fn hours(value: f64) -> String {
    format!("{:.2}", value)
}

/// One row per record. Records whose employee is unknown keep blank employee columns.
pub fn attendance_report(
    from: NaiveDate,
    to: NaiveDate,
    records: &[AttendanceRecord],
    employees: &[Employee],
) -> Report {
    let by_id: HashMap<&str, &Employee> = employees.iter().map(|e| (e.id.as_str(), e)).collect();

    let rows = records
        .iter()
        .map(|r| {
            let (code, name, project, location) = match by_id.get(r.employee_id.as_str()) {
                Some(e) => (
                    e.employee_code.clone(),
                    e.name.clone(),
                    e.project.clone(),
                    e.location.clone(),
                ),
                None => Default::default(),
            };
            vec![
                r.date.format("%Y-%m-%d").to_string(),
                code,
                name,
                project,
                location,
                yes_no(r.present),
                r.start_time.clone(),
                r.end_time.clone(),
                hours(r.overtime_hours),
                r.note.clone(),
            ]
        })
        .collect();

    let (title, file_stem) = if from == to {
        (format!("Attendance {}", from), format!("attendance_{}", from))
    } else {
        (
            format!("Attendance {} to {}", from, to),
            format!("attendance_{}_{}", from, to),
        )
    };

    Report {
        title,
        file_stem,
        headers: ATTENDANCE_HEADERS,
        rows,
    }
}

pub fn employee_report(employees: &[Employee]) -> Report {
    let rows = employees
        .iter()
        .map(|e| {
            vec![
                e.employee_code.clone(),
                e.name.clone(),
                e.project.clone(),
                e.location.clone(),
                e.job_title.clone(),
                e.payment_type.to_string(),
                format!("{:.2}", e.pay_rate),
                e.sponsorship.to_string(),
                e.status.to_string(),
                e.created_day().format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();

    Report {
        title: "Employees".to_string(),
        file_stem: "employees".to_string(),
        headers: EMPLOYEE_HEADERS,
        rows,
    }
}

pub fn monthly_report(month: &str, summaries: &[MonthlySummary]) -> Report {
    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.employee_code.clone(),
                s.employee_name.clone(),
                s.days_present.to_string(),
                s.days_absent.to_string(),
                hours(s.overtime_hours),
            ]
        })
        .collect();

    Report {
        title: format!("Timesheet {}", month),
        file_stem: format!("timesheet_{}", month),
        headers: MONTHLY_HEADERS,
        rows,
    }
}

/// Comma separated, every field quoted, header row first.
pub fn to_csv(report: &Report) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(report.headers)?;
    for row in &report.rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::ReportError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::ReportError(e.to_string()))
}

/// Printable single-table page.
pub fn to_html(report: &Report) -> AppResult<String> {
    let page = ReportPage {
        title: &report.title,
        headers: report.headers,
        rows: &report.rows,
    };
    Ok(page.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::EmployeeStatus;
    use crate::services::roster_service::tests::employee;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(employee_id: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("r-{}", employee_id),
            employee_id: employee_id.to_string(),
            date: day("2024-01-01"),
            present,
            start_time: if present { "08:00".into() } else { String::new() },
            end_time: if present { "17:00".into() } else { String::new() },
            overtime_hours: if present { 1.0 } else { 0.0 },
            note: "said \"hi\", left early".to_string(),
        }
    }

    #[test]
    fn test_attendance_csv_round_trip() {
        let mut roster = vec![
            employee("1", "2023-01-01", EmployeeStatus::Active),
            employee("2", "2023-01-01", EmployeeStatus::Active),
            employee("3", "2023-01-01", EmployeeStatus::Active),
        ];
        roster[1].name = "Smith, John".to_string();
        let records = vec![record("1", true), record("2", false), record("3", true)];

        let report = attendance_report(day("2024-01-01"), day("2024-01-01"), &records, &roster);
        let text = to_csv(&report).unwrap();
        assert!(text.starts_with("\"Date\",\"Employee Code\",\"Employee Name\""));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let name_col = headers.iter().position(|h| h == "Employee Name").unwrap();
        let present_col = headers.iter().position(|h| h == "Present").unwrap();
        let note_col = headers.iter().position(|h| h == "Note").unwrap();

        let parsed: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(parsed.len(), records.len());
        for (i, row) in parsed.iter().enumerate() {
            let emp = &roster[i];
            assert_eq!(&row[name_col], emp.name.as_str());
            let expected = if records[i].present { "Yes" } else { "No" };
            assert_eq!(&row[present_col], expected);
            assert_eq!(&row[note_col], records[i].note.as_str());
        }
    }

    #[test]
    fn test_attendance_report_unknown_employee() {
        let report = attendance_report(day("2024-01-01"), day("2024-01-31"), &[record("9", true)], &[]);
        assert_eq!(report.cell(0, "Employee Name"), Some(""));
        assert_eq!(report.cell(0, "Present"), Some("Yes"));
        assert_eq!(report.cell(0, "Overtime Hours"), Some("1.00"));
        assert_eq!(report.file_stem, "attendance_2024-01-01_2024-01-31");
    }

    #[test]
    fn test_employee_report_columns() {
        let roster = vec![employee("1", "2023-05-06", EmployeeStatus::Archived)];
        let report = employee_report(&roster);
        assert_eq!(report.headers, EMPLOYEE_HEADERS);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.cell(0, "Employee Code"), Some("E-1"));
        assert_eq!(report.cell(0, "Payment Type"), Some("Daily"));
        assert_eq!(report.cell(0, "Sponsorship"), Some("Company"));
        assert_eq!(report.cell(0, "Status"), Some("Archived"));
        assert_eq!(report.cell(0, "Created At"), Some("2023-05-06"));
    }

    #[test]
    fn test_monthly_report() {
        let summaries = vec![MonthlySummary {
            employee_id: "1".into(),
            employee_code: "E-1".into(),
            employee_name: "Ana".into(),
            days_present: 20,
            days_absent: 2,
            overtime_hours: 4.5,
        }];
        let report = monthly_report("2024-01", &summaries);
        assert_eq!(report.title, "Timesheet 2024-01");
        assert_eq!(report.cell(0, "Days Present"), Some("20"));
        assert_eq!(report.cell(0, "Overtime Hours"), Some("4.50"));
    }

    #[test]
    fn test_html_escapes_cells() {
        let mut roster = vec![employee("1", "2023-01-01", EmployeeStatus::Active)];
        roster[0].name = "<b>Ana</b>".to_string();
        let report = attendance_report(day("2024-01-01"), day("2024-01-01"), &[record("1", true)], &roster);

        let html = to_html(&report).unwrap();
        assert!(html.contains("<th>Employee Name</th>"));
        assert!(html.contains("&lt;b&gt;Ana"));
        assert!(!html.contains("<b>Ana</b>"));
    }
}
