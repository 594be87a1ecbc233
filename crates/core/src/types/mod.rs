//! Core types for Issue Desk.
//!
//! This module provides type-safe wrappers for the fields of an issue report.

pub mod flow;
pub mod order_id;
pub mod report;

pub use flow::Flow;
pub use order_id::{OrderId, OrderIdError};
pub use report::{IssueReport, ReportSource};
