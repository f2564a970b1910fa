//! Fixtures shared by the ipam test suites.

#![deny(missing_docs)]

use std::{
    collections::HashSet,
    io,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use ipam_net::{NetClient, Network};
use parking_lot::Mutex;

/// Checks the rendered pool for each listed address.
#[macro_export]
macro_rules! assert_pool_contains {
    ($pool:expr, [$($ip:expr),* $(,)?]) => {{
        let rendered = $pool.to_string();
        $(
            assert!(rendered.contains($ip), "{} not in pool [{}]", $ip, rendered);
        )*
    }};
}

/// Checks the rendered pool for the absence of each listed address.
#[macro_export]
macro_rules! assert_pool_lacks {
    ($pool:expr, [$($ip:expr),* $(,)?]) => {{
        let rendered = $pool.to_string();
        $(
            assert!(!rendered.contains($ip), "{} unexpectedly in pool [{}]", $ip, rendered);
        )*
    }};
}

/// Address that answers when served by [FakeNetClient::listening_on]
pub const BUSY_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 10);
/// Address that never answers
pub const FREE_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 20);
/// Port [FakeNetClient] accepts connections on
pub const PROBE_PORT: u16 = 80;

/// NetClient where only the listed socket addresses accept connections.
/// Records every dialed address.
#[derive(Debug, Default)]
pub struct FakeNetClient {
    listening: HashSet<SocketAddr>,
    dialed: Mutex<Vec<SocketAddr>>,
}

impl FakeNetClient {
    /// Nothing answers
    pub fn silent() -> Self {
        Self::default()
    }

    /// Given addresses answer on [PROBE_PORT]
    pub fn listening_on(ips: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            listening: ips
                .into_iter()
                .map(|ip| SocketAddr::from((ip, PROBE_PORT)))
                .collect(),
            ..Default::default()
        }
    }

    /// Addresses dialed so far, in order
    pub fn dialed(&self) -> Vec<SocketAddr> {
        self.dialed.lock().clone()
    }
}

impl NetClient for FakeNetClient {
    fn dial_timeout(
        &self,
        _network: Network,
        address: SocketAddr,
        _timeout: Duration,
    ) -> io::Result<()> {
        self.dialed.lock().push(address);
        if self.listening.contains(&address) {
            Ok(())
        } else {
            Err(io::ErrorKind::ConnectionRefused.into())
        }
    }
}
