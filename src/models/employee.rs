// src/models/employee.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentType {
    Monthly,
    Daily,
}

/// Employer category of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Sponsorship {
    Company,
    Partner,
    Freelance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum EmployeeStatus {
    Active,
    Archived,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Monthly => "Monthly",
            PaymentType::Daily => "Daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monthly" => Some(PaymentType::Monthly),
            "Daily" => Some(PaymentType::Daily),
            _ => None,
        }
    }
}

impl Sponsorship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sponsorship::Company => "Company",
            Sponsorship::Partner => "Partner",
            Sponsorship::Freelance => "Freelance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Company" => Some(Sponsorship::Company),
            "Partner" => Some(Sponsorship::Partner),
            "Freelance" => Some(Sponsorship::Freelance),
            _ => None,
        }
    }
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(EmployeeStatus::Active),
            "Archived" => Some(EmployeeStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Sponsorship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `employees` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub employee_code: String,
    pub project: String,
    pub location: String,
    pub job_title: String,
    pub payment_type: PaymentType,
    pub pay_rate: f64,
    pub sponsorship: Sponsorship,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Day the employee was added to the roster (UTC).
    pub fn created_day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_archived(&self) -> bool {
        self.status == EmployeeStatus::Archived
    }
}

/// Payload for creating or replacing an employee's editable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub employee_code: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_title: String,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub pay_rate: f64,
    pub sponsorship: Sponsorship,
}
