//! Report renderers for evaluated packages.
//!
//! - [`terminal`] — colored summary box and violations table; respects `--verbose` / `--quiet`.
//! - [`json`] — the evaluated records as a JSON array, to stdout or `--output`.

pub mod json;
pub mod terminal;
