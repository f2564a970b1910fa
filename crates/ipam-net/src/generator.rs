use std::net::Ipv4Addr;

use ipam_model::Cidr;
use ipam_utils::ipam_log_trace;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{DefaultNetClient, NetClient, ProbeConfig, Prober};

/// Possible [CandidateGenerator] errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Every drawn address answered the reachability probe
    #[error("no free IP found in CIDR [{cidr}] after {probes} probes")]
    NoFreeAddress {
        /// Block the candidates were drawn from
        cidr: Cidr,
        /// Number of probed candidates
        probes: u32,
    },
}

#[cfg_attr(any(test, feature = "mockall"), mockall::automock)]
/// Source of candidate addresses for randomized allocation
pub trait CandidateGenerator {
    /// Produce an address inside `cidr` that is believed to be free.
    ///
    /// Successive calls are independent and may repeat an address.
    fn generate_candidate(&mut self, cidr: &Cidr) -> Result<Ipv4Addr, GeneratorError>;
}

/// [IpGenerator] configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, SmartDefault)]
#[serde(default)]
pub struct IpGeneratorConfig {
    /// Draws probed per [CandidateGenerator::generate_candidate] call before
    /// giving up [default 32]
    #[default(32)]
    pub max_probes: u32,
    /// Fixed RNG seed, entropy seeded when unset
    pub seed: Option<u64>,
    /// Probe settings
    pub probe: ProbeConfig,
}

/// Draws uniformly random addresses inside a block and keeps the first one
/// that does not answer a reachability probe.
#[derive(Debug)]
pub struct IpGenerator<C: NetClient = DefaultNetClient> {
    prober: Prober<C>,
    rng: StdRng,
    max_probes: u32,
}

impl Default for IpGenerator<DefaultNetClient> {
    fn default() -> Self {
        Self::new(DefaultNetClient, IpGeneratorConfig::default())
    }
}

impl<C: NetClient> IpGenerator<C> {
    /// Create a generator probing through `client`
    pub fn new(client: C, config: IpGeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            prober: Prober::new(client, config.probe),
            rng,
            max_probes: config.max_probes.max(1),
        }
    }

    fn random_address(&mut self, cidr: &Cidr) -> Ipv4Addr {
        cidr.with_host_bits(self.rng.gen())
    }
}

impl<C: NetClient> CandidateGenerator for IpGenerator<C> {
    fn generate_candidate(&mut self, cidr: &Cidr) -> Result<Ipv4Addr, GeneratorError> {
        for _ in 0..self.max_probes {
            let ip = self.random_address(cidr);
            if !self.prober.probe(ip) {
                return Ok(ip);
            }
            ipam_log_trace!("Random candidate {} is in use", ip);
        }

        Err(GeneratorError::NoFreeAddress {
            cidr: *cidr,
            probes: self.max_probes,
        })
    }
}
