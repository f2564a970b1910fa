//! Address space and address pool types shared by the allocators.

#![deny(missing_docs)]

/// IPv4 CIDR blocks
pub mod cidr;
pub use cidr::{Cidr, CidrError};

/// Ordered pools of reserved addresses
pub mod pool;
pub use pool::{IpPool, PoolError};
