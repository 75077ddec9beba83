//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep migration logic decoupled from SQL and link-encoding details.

pub mod minutes_finder;
