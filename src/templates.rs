// src/templates.rs
use askama::Template;

/// Printable report: a title and a single table.
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportPage<'a> {
    pub title: &'a str,
    pub headers: &'a [&'static str],
    pub rows: &'a [Vec<String>],
}
