//! Reachability probing and candidate generation.

#![deny(missing_docs)]

/// Dial-style network client
pub mod net_client;
pub use net_client::*;

/// Reachability prober built on top of a [NetClient]
pub mod prober;
pub use prober::*;

/// Random candidate generation inside a CIDR
pub mod generator;
pub use generator::*;
