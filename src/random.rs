use std::{collections::HashSet, net::Ipv4Addr};

use ipam_model::{Cidr, IpPool};
use ipam_net::{CandidateGenerator, IpGenerator};
use ipam_utils::{ipam_err_with_log, ipam_log_debug, ipam_log_warn};

use crate::{Error, Ipam, RandomIpamConfig, Result};

/// Draws independent random addresses from a block, never handing out the
/// same one twice.
///
/// By default a colliding or failed draw is simply retried, without limit.
/// Set [RandomIpamConfig::max_attempts] to turn a saturated block into an
/// [Error::AttemptsExhausted] instead.
#[derive(Debug)]
pub struct RandomIpam<G: CandidateGenerator = IpGenerator> {
    cidr: Cidr,
    used: HashSet<Ipv4Addr>,
    generator: G,
    max_attempts: Option<u32>,
}

impl RandomIpam<IpGenerator> {
    /// Allocator over `cidr` with default settings
    pub fn new(cidr: &str) -> Result<Self> {
        Self::with_config(cidr, RandomIpamConfig::default())
    }

    /// Allocator over `cidr` drawing from a default [IpGenerator]
    pub fn with_config(cidr: &str, config: RandomIpamConfig) -> Result<Self> {
        Self::with_generator(cidr, config, IpGenerator::default())
    }
}

impl<G: CandidateGenerator> RandomIpam<G> {
    /// Allocator over `cidr` drawing candidates from `generator`
    pub fn with_generator(cidr: &str, config: RandomIpamConfig, generator: G) -> Result<Self> {
        Ok(Self {
            cidr: Cidr::parse(cidr)?,
            used: HashSet::new(),
            generator,
            // at least one draw per address
            max_attempts: config.max_attempts.map(|max| max.max(1)),
        })
    }

    /// Block being allocated from
    pub fn cidr(&self) -> &Cidr {
        &self.cidr
    }

    /// Whether `ip` was already handed out by this allocator
    pub fn is_used(&self, ip: Ipv4Addr) -> bool {
        self.used.contains(&ip)
    }

    /// Number of addresses handed out so far
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Reserve a single address not handed out before.
    pub fn reserve_ip(&mut self) -> Result<Ipv4Addr> {
        let mut attempts: u32 = 0;
        loop {
            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    return ipam_err_with_log!(Error::AttemptsExhausted {
                        cidr: self.cidr,
                        attempts,
                    });
                }
            }
            attempts = attempts.saturating_add(1);

            match self.generator.generate_candidate(&self.cidr) {
                Err(e) => {
                    ipam_log_warn!("Getting unique IP failed: {}", e);
                }
                Ok(ip) if !self.cidr.contains(ip) => {
                    ipam_log_warn!("Generated IP {} is outside of {}", ip, self.cidr);
                }
                Ok(ip) if self.used.contains(&ip) => {
                    ipam_log_warn!("Generated IP {} is already taken", ip);
                }
                Ok(ip) => {
                    self.used.insert(ip);
                    return Ok(ip);
                }
            }
        }
    }
}

impl<G: CandidateGenerator> Ipam for RandomIpam<G> {
    fn reserve_ip_pool(&mut self, count: usize) -> Result<IpPool> {
        let mut pool = IpPool::new();
        for _ in 0..count {
            match self.reserve_ip() {
                Ok(ip) => pool.add_ip(ip),
                Err(e) => {
                    // Addresses of a failed request were never handed out
                    for ip in pool {
                        self.used.remove(&ip);
                    }
                    return Err(e);
                }
            }
        }
        ipam_log_debug!("Reserved {} random IPs in {}", pool.len(), self.cidr);
        Ok(pool)
    }
}
