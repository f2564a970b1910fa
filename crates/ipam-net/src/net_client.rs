use std::{io, net::SocketAddr, time::Duration};

use serde::Deserialize;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

/// Transport used when dialing a candidate.
///
/// Only connection oriented transports are offered: a datagram "connect"
/// succeeds whether or not anything listens, so it cannot show an address is
/// taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Stream connection, succeeds only if something accepts it
    #[default]
    Tcp,
}

#[cfg_attr(any(test, feature = "mockall"), mockall::automock)]
/// Dial a remote address with an upper bound on the time spent connecting.
pub trait NetClient: Send + Sync {
    /// Open a connection to `address` and close it again.
    ///
    /// `Ok` means the connection was established.
    fn dial_timeout(
        &self,
        network: Network,
        address: SocketAddr,
        timeout: Duration,
    ) -> io::Result<()>;
}

impl<T: NetClient + ?Sized> NetClient for &T {
    fn dial_timeout(
        &self,
        network: Network,
        address: SocketAddr,
        timeout: Duration,
    ) -> io::Result<()> {
        (**self).dial_timeout(network, address, timeout)
    }
}

/// [NetClient] dialing through OS sockets
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNetClient;

impl NetClient for DefaultNetClient {
    fn dial_timeout(
        &self,
        network: Network,
        address: SocketAddr,
        timeout: Duration,
    ) -> io::Result<()> {
        let (ty, protocol) = match network {
            Network::Tcp => (Type::STREAM, Protocol::TCP),
        };
        let socket = Socket::new(Domain::for_address(address), ty, Some(protocol))?;
        socket.connect_timeout(&SockAddr::from(address), timeout)
    }
}
