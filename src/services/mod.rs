// src/services/mod.rs
pub mod attendance_service;
pub mod auth_service;
pub mod employee_service;
pub mod report_service;
pub mod roster_service;
pub mod user_service;
