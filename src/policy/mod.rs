//! Policy rules and the resolver that turns a licensed package into a verdict.
//!
//! - [`table`] — [`PolicyTable`]: internal/public classification, package
//!   overrides and per-classification license/category rules.
//! - [`resolver`] — [`evaluate`]: the deterministic evaluation stage.

pub mod resolver;
pub mod table;

pub use resolver::evaluate;
pub use table::PolicyTable;
