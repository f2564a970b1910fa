//! Utils shared across the ipam crates.

#![deny(missing_docs)]
/// logging macros
pub mod utils;
