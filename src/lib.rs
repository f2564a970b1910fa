//! Collision-free IPv4 address allocation for transient test environments.
//!
//! Two strategies are provided, both behind the [Ipam] trait:
//!
//! * [SequentialIpam] walks a block from its first address, skipping
//!   reserved last octets and addresses that answer a reachability probe.
//! * [RandomIpam] draws random candidates and remembers everything it has
//!   handed out.
//!
//! Allocators keep all of their state locally and take `&mut self`; share one
//! between threads only behind a lock.

#![deny(missing_docs)]

/// Allocator configuration
pub mod config;
pub use config::*;

/// Allocation errors
pub mod error;
pub use error::{Error, Result};

/// Randomized allocation
pub mod random;
pub use random::RandomIpam;

/// Sequential allocation
pub mod sequential;
pub use sequential::SequentialIpam;

pub use ipam_model::{Cidr, CidrError, IpPool, PoolError};
pub use ipam_net::{
    CandidateGenerator, DefaultNetClient, DialErrorPolicy, GeneratorError, IpGenerator,
    IpGeneratorConfig, NetClient, Network, ProbeConfig, Prober,
};

/// Hands out pools of addresses from one CIDR block.
pub trait Ipam {
    /// Reserve `count` addresses.
    ///
    /// Either every requested address is returned or none is.
    fn reserve_ip_pool(&mut self, count: usize) -> Result<IpPool>;
}

impl<T: Ipam + ?Sized> Ipam for Box<T> {
    fn reserve_ip_pool(&mut self, count: usize) -> Result<IpPool> {
        (**self).reserve_ip_pool(count)
    }
}
