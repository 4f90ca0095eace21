//! Side-effecting pieces: the embedded engine, isolated contexts, time
//! budgets, and configuration files.

pub mod config;
pub mod context;
pub mod engine;
pub mod guard;
pub mod watchdog;
