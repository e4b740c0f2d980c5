// src/models/report.rs
use serde::{Deserialize, Serialize};

/// A flat table ready to be rendered: fixed headers, one row per input item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    /// Base name for downloaded files, without extension.
    pub file_stem: String,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl Report {
    /// Value of `header` in row `index`, if both exist.
    #[cfg(test)]
    pub fn cell(&self, index: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| *h == header)?;
        self.rows.get(index)?.get(col).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    /// Printable table.
    Html,
}
