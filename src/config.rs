use std::net::Ipv4Addr;

use ipam_net::ProbeConfig;
use serde::Deserialize;
use smart_default::SmartDefault;

/// Last-octet range skipped by the sequential allocator.
///
/// Thresholds apply to the final octet only, whatever the block's prefix
/// length, so they fit /24-shaped blocks best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ReservedOctets {
    /// Last octets up to and including this value are skipped [default 2]
    #[default(2)]
    pub low: u8,
    /// Last octets from this value upwards are skipped [default 254]
    #[default(254)]
    pub high: u8,
}

impl ReservedOctets {
    /// Whether `ip` falls into the reserved range
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let last = ip.octets()[3];
        last <= self.low || last >= self.high
    }
}

/// [crate::SequentialIpam] configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SequentialIpamConfig {
    /// How candidates are probed
    pub probe: ProbeConfig,
    /// Which last octets are never handed out
    pub reserved: ReservedOctets,
}

/// [crate::RandomIpam] configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RandomIpamConfig {
    /// Candidates drawn per address before giving up.
    ///
    /// `None` retries forever, which can spin on a saturated block.
    /// `Some(0)` is treated as `Some(1)`.
    pub max_attempts: Option<u32>,
}
