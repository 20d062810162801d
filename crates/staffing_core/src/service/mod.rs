//! Staffing use-case services.
//!
//! # Responsibility
//! - Orchestrate session, capacity source, ledger and commit gate into one
//!   interactive staffing flow.
//! - Keep callers decoupled from reconciliation and persistence details.

pub mod staffing_service;
