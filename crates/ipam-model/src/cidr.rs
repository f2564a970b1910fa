use std::{fmt, net::Ipv4Addr, str::FromStr};

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

/// Possible [Cidr] errors.
#[derive(Debug, thiserror::Error)]
pub enum CidrError {
    /// Input is not a dotted-decimal IPv4 address followed by a prefix length
    #[error("parsing CIDR [{cidr}]: {source}")]
    Invalid {
        /// The rejected input, as given
        cidr: String,
        /// Parser failure
        source: ipnet::AddrParseError,
    },
}

/// An IPv4 address block.
///
/// The stored network always has its host bits cleared, so `10.0.0.7/24`
/// parses to `10.0.0.0/24`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    net: Ipv4Net,
}

impl Cidr {
    /// Parse a CIDR in `a.b.c.d/prefix` notation.
    pub fn parse(cidr: &str) -> Result<Self, CidrError> {
        let net = Ipv4Net::from_str(cidr).map_err(|source| CidrError::Invalid {
            cidr: cidr.to_owned(),
            source,
        })?;

        Ok(Self { net: net.trunc() })
    }

    /// First address of the block
    pub fn network(&self) -> Ipv4Addr {
        self.net.network()
    }

    /// Last address of the block
    pub fn broadcast(&self) -> Ipv4Addr {
        self.net.broadcast()
    }

    /// Number of leading bits fixed by the block
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Netmask derived from the prefix length
    pub fn mask(&self) -> Ipv4Addr {
        self.net.netmask()
    }

    /// Number of addresses in the block, including network and broadcast.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    /// Whether `addr` shares the block's network bits
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.net.contains(&addr)
    }

    /// Combine the block's network bits with the host bits of `bits`.
    ///
    /// Always lands inside the block.
    pub fn with_host_bits(&self, bits: u32) -> Ipv4Addr {
        let mask = u32::from(self.mask());
        Ipv4Addr::from((u32::from(self.network()) & mask) | (bits & !mask))
    }
}

/// Address directly after `addr`, treating it as a big-endian integer.
///
/// Carries from the last octet toward the first and wraps
/// `255.255.255.255` around to `0.0.0.0`.
pub fn next_address(addr: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(addr).wrapping_add(1))
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = CidrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cidr> for String {
    fn from(value: Cidr) -> Self {
        value.to_string()
    }
}

impl From<Ipv4Net> for Cidr {
    fn from(net: Ipv4Net) -> Self {
        Self { net: net.trunc() }
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len())
    }
}
