use std::{collections::VecDeque, fmt, net::Ipv4Addr, str::FromStr};

/// Possible [IpPool] errors.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Tried to take an address out of an empty pool
    #[error("IP pool is empty")]
    Empty,
    /// One of the listed entries is not an IPv4 address
    #[error("parsing IP pool entry [{entry}]: {source}")]
    InvalidEntry {
        /// Offending entry
        entry: String,
        /// Parser failure
        source: std::net::AddrParseError,
    },
    /// Environment variable holding the pool is not set
    #[error("IP pool environment variable {0} is not set")]
    MissingEnv(String),
}

/// Addresses reserved by one allocation request, in the order they were
/// reserved.
///
/// Rendered as a comma separated list, which is also the format accepted by
/// [FromStr].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IpPool {
    ips: VecDeque<Ipv4Addr>,
}

impl IpPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a pool from the environment variable `var`
    pub fn from_env(var: &str) -> Result<Self, PoolError> {
        let value = std::env::var(var).map_err(|_| PoolError::MissingEnv(var.to_owned()))?;
        value.parse()
    }

    /// Append an address. Callers are responsible for uniqueness.
    pub fn add_ip(&mut self, ip: Ipv4Addr) {
        self.ips.push_back(ip);
    }

    /// Remove and return the oldest address
    pub fn pop_ip(&mut self) -> Result<Ipv4Addr, PoolError> {
        self.ips.pop_front().ok_or(PoolError::Empty)
    }

    /// Number of addresses held
    pub fn len(&self) -> usize {
        self.ips.len()
    }

    /// Whether the pool holds no addresses
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    /// Whether `ip` is in the pool
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.ips.contains(&ip)
    }

    /// Addresses in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.ips.iter()
    }
}

impl fmt::Display for IpPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ips = self.ips.iter();
        if let Some(first) = ips.next() {
            write!(f, "{first}")?;
        }
        for ip in ips {
            write!(f, ",{ip}")?;
        }
        Ok(())
    }
}

impl FromStr for IpPool {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ips = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry.parse().map_err(|source| PoolError::InvalidEntry {
                    entry: entry.to_owned(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { ips })
    }
}

impl FromIterator<Ipv4Addr> for IpPool {
    fn from_iter<T: IntoIterator<Item = Ipv4Addr>>(iter: T) -> Self {
        Self {
            ips: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for IpPool {
    type Item = Ipv4Addr;
    type IntoIter = std::collections::vec_deque::IntoIter<Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.ips.into_iter()
    }
}
