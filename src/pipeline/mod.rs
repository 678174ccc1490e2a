//! The three-stage enrichment pipeline and its concurrent driver.
//!
//! Each package flows Analysis → Licensing → Evaluation independently;
//! [`runner::run`] fans packages out over a bounded number of tasks.

pub mod runner;
pub mod stages;

pub use runner::{run, RunContext, RunOptions, RunOutcome};
