// src/models/mod.rs
pub mod attendance;
pub mod employee;
pub mod report;
pub mod user;
