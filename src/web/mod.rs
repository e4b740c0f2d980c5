// src/web/mod.rs
pub mod admin_handlers;
pub mod attendance_handlers;
pub mod auth_handlers;
pub mod employee_handlers;
pub mod extract;
pub mod mw_admin;
pub mod mw_auth;
pub mod report_handlers;
pub mod routes;
