use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use ipam_utils::{ipam_log_debug, ipam_log_trace};
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{DefaultNetClient, NetClient, Network};

/// How a failed dial is interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialErrorPolicy {
    /// Every dial error means nothing is using the address.
    ///
    /// Optimistic: an address that is unreachable for other reasons
    /// (firewall, NAT, routing) is still handed out.
    #[default]
    TreatAsFree,
    /// A refused connection means a host answered, so the address is taken.
    /// Other errors still mean free.
    RefusedIsInUse,
}

/// Shortest connect timeout a probe uses.
///
/// A zero timeout makes every dial fail, which [DialErrorPolicy::TreatAsFree]
/// would read as "free" even for live hosts.
pub const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(10);

/// Probe configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ProbeConfig {
    /// Transport used for the probe [default tcp]
    pub network: Network,
    /// Port dialed on every candidate [default 80]
    #[default(80)]
    pub port: u16,
    /// Per-probe connect timeout in milliseconds [default 500].
    /// Values below [MIN_PROBE_TIMEOUT] are raised to it.
    #[default(500)]
    pub timeout_ms: u64,
    /// Interpretation of dial errors
    pub policy: DialErrorPolicy,
}

impl ProbeConfig {
    /// Connect timeout as a [Duration], never below [MIN_PROBE_TIMEOUT]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms).max(MIN_PROBE_TIMEOUT)
    }
}

/// Tells whether something currently answers on an address.
#[derive(Debug)]
pub struct Prober<C: NetClient = DefaultNetClient> {
    client: C,
    config: ProbeConfig,
}

impl Default for Prober<DefaultNetClient> {
    fn default() -> Self {
        Self::new(DefaultNetClient, ProbeConfig::default())
    }
}

impl<C: NetClient> Prober<C> {
    /// Create a prober dialing through `client`
    pub fn new(client: C, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Active configuration
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Returns true when `ip` should be treated as in use.
    ///
    /// Blocks for at most the configured timeout.
    pub fn probe(&self, ip: Ipv4Addr) -> bool {
        let address = SocketAddr::from((ip, self.config.port));
        match self
            .client
            .dial_timeout(self.config.network, address, self.config.timeout())
        {
            Ok(()) => {
                ipam_log_debug!("{} answered, treating as in use", address);
                true
            }
            Err(e) => {
                ipam_log_trace!("Dial {} failed: {}", address, e);
                self.in_use_on_error(&e)
            }
        }
    }

    fn in_use_on_error(&self, err: &io::Error) -> bool {
        match self.config.policy {
            DialErrorPolicy::TreatAsFree => false,
            DialErrorPolicy::RefusedIsInUse => err.kind() == io::ErrorKind::ConnectionRefused,
        }
    }
}
