//! License metadata and expression handling.
//!
//! - [`catalog`] — [`LicenseCatalog`](catalog::LicenseCatalog): identifier → name and category.
//! - [`expression`] — SPDX expression parser (`AND`, `OR`, `WITH`, parentheses).
//! - [`spdx`] — built-in catalog entries and normalization of common non-SPDX strings.

pub mod catalog;
pub mod expression;
pub mod spdx;

pub use catalog::LicenseCatalog;
pub use expression::LicenseExpr;
