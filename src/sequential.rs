use std::net::Ipv4Addr;

use ipam_model::{cidr::next_address, Cidr, IpPool};
use ipam_net::{DefaultNetClient, NetClient, Prober};
use ipam_utils::{ipam_err_with_log, ipam_log_debug, ipam_log_trace};

use crate::{Error, Ipam, ReservedOctets, Result, SequentialIpamConfig};

/// Walks a block upwards from its first address.
///
/// Addresses come out in strictly increasing order and are never repeated.
/// Skipped candidates (reserved last octet, or answering the probe) are
/// passed over for good.
#[derive(Debug)]
pub struct SequentialIpam<C: NetClient = DefaultNetClient> {
    cidr: Cidr,
    current: Ipv4Addr,
    // false until the first candidate was examined, so the network address
    // itself gets tested once
    advanced: bool,
    prober: Prober<C>,
    reserved: ReservedOctets,
}

impl SequentialIpam<DefaultNetClient> {
    /// Allocator over `cidr` probing through OS sockets with default settings
    pub fn new(cidr: &str) -> Result<Self> {
        Self::with_config(cidr, SequentialIpamConfig::default(), DefaultNetClient)
    }
}

impl<C: NetClient> SequentialIpam<C> {
    /// Allocator over `cidr` probing through `net_client`
    pub fn with_config(cidr: &str, config: SequentialIpamConfig, net_client: C) -> Result<Self> {
        let cidr = Cidr::parse(cidr)?;

        Ok(Self {
            cidr,
            current: cidr.network(),
            advanced: false,
            prober: Prober::new(net_client, config.probe),
            reserved: config.reserved,
        })
    }

    /// Block being allocated from
    pub fn cidr(&self) -> &Cidr {
        &self.cidr
    }

    /// Last examined address, `None` before the first request
    pub fn current(&self) -> Option<Ipv4Addr> {
        self.advanced.then_some(self.current)
    }

    fn next_ip(&mut self) -> Result<Ipv4Addr> {
        loop {
            if self.advanced || self.current != self.cidr.network() {
                let next = next_address(self.current);
                // 255.255.255.255 wrapped around, only possible at the end of the space
                if next == Ipv4Addr::UNSPECIFIED {
                    self.advanced = true;
                    return ipam_err_with_log!(Error::Exhausted { cidr: self.cidr });
                }
                self.current = next;
            }
            self.advanced = true;

            if !self.cidr.contains(self.current) {
                return ipam_err_with_log!(Error::Exhausted { cidr: self.cidr });
            }

            if self.reserved.contains(self.current) {
                ipam_log_trace!("Skipping reserved IP {}", self.current);
                continue;
            }

            if self.prober.probe(self.current) {
                ipam_log_debug!("Skipping IP {}, already in use", self.current);
                continue;
            }

            return Ok(self.current);
        }
    }
}

impl<C: NetClient> Ipam for SequentialIpam<C> {
    fn reserve_ip_pool(&mut self, count: usize) -> Result<IpPool> {
        let mut pool = IpPool::new();
        for _ in 0..count {
            pool.add_ip(self.next_ip()?);
        }
        ipam_log_debug!("Reserved {} IPs in {}", pool.len(), self.cidr);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipam_net::{MockNetClient, ProbeConfig};
    use mockall::predicate::{always, eq};
    use pretty_assertions::assert_eq;
    use std::{io, net::SocketAddr};

    fn silent_client() -> MockNetClient {
        let mut client = MockNetClient::new();
        client
            .expect_dial_timeout()
            .returning(|_, _, _| Err(io::ErrorKind::TimedOut.into()));
        client
    }

    fn ipam(cidr: &str) -> SequentialIpam<MockNetClient> {
        SequentialIpam::with_config(cidr, Default::default(), silent_client()).unwrap()
    }

    fn ips(pool: &IpPool) -> Vec<Ipv4Addr> {
        pool.iter().copied().collect()
    }

    #[test]
    fn test_invalid_cidr() {
        let err = SequentialIpam::with_config("10.0.0.0/64", Default::default(), silent_client())
            .unwrap_err();
        assert!(matches!(err, Error::Cidr(_)));
        assert!(err.to_string().contains("10.0.0.0/64"));
    }

    #[test]
    fn test_first_request_skips_reserved_low_octets() {
        let mut ipam = ipam("10.0.0.0/24");
        assert_eq!(None, ipam.current());

        let pool = ipam.reserve_ip_pool(2).unwrap();
        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 3), Ipv4Addr::new(10, 0, 0, 4)],
            ips(&pool)
        );
        assert_eq!(Some(Ipv4Addr::new(10, 0, 0, 4)), ipam.current());
    }

    #[test]
    fn test_requests_resume_after_previous_one() {
        let mut ipam = ipam("10.0.0.0/24");
        ipam.reserve_ip_pool(3).unwrap();

        let pool = ipam.reserve_ip_pool(2).unwrap();
        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 6), Ipv4Addr::new(10, 0, 0, 7)],
            ips(&pool)
        );
    }

    #[test]
    fn test_zero_count_gives_empty_pool() {
        let mut ipam = ipam("10.0.0.0/24");
        assert!(ipam.reserve_ip_pool(0).unwrap().is_empty());
        assert_eq!(None, ipam.current());
    }

    #[test]
    fn test_host_bits_are_ignored() {
        let mut ipam = ipam("10.0.0.77/24");
        assert_eq!("10.0.0.0/24", ipam.cidr().to_string());
        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 3)],
            ips(&ipam.reserve_ip_pool(1).unwrap())
        );
    }

    #[test]
    fn test_in_use_ips_are_skipped() {
        let mut client = MockNetClient::new();
        client
            .expect_dial_timeout()
            .with(always(), eq(SocketAddr::from(([10, 0, 0, 3], 80))), always())
            .returning(|_, _, _| Ok(()));
        client
            .expect_dial_timeout()
            .returning(|_, _, _| Err(io::ErrorKind::ConnectionRefused.into()));

        let mut ipam = SequentialIpam::with_config("10.0.0.0/24", Default::default(), client)
            .unwrap();
        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 4)],
            ips(&ipam.reserve_ip_pool(1).unwrap())
        );
    }

    #[test]
    fn test_refused_counts_as_in_use_with_strict_policy() {
        let mut client = MockNetClient::new();
        client
            .expect_dial_timeout()
            .with(always(), eq(SocketAddr::from(([10, 0, 0, 3], 80))), always())
            .returning(|_, _, _| Err(io::ErrorKind::ConnectionRefused.into()));
        client
            .expect_dial_timeout()
            .returning(|_, _, _| Err(io::ErrorKind::TimedOut.into()));

        let config = SequentialIpamConfig {
            probe: ProbeConfig {
                policy: ipam_net::DialErrorPolicy::RefusedIsInUse,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut ipam = SequentialIpam::with_config("10.0.0.0/24", config, client).unwrap();
        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 4)],
            ips(&ipam.reserve_ip_pool(1).unwrap())
        );
    }

    #[test]
    fn test_reserved_ips_are_never_probed() {
        let mut client = MockNetClient::new();
        client
            .expect_dial_timeout()
            .with(always(), eq(SocketAddr::from(([10, 0, 0, 3], 80))), always())
            .times(1)
            .returning(|_, _, _| Err(io::ErrorKind::TimedOut.into()));

        let mut ipam = SequentialIpam::with_config("10.0.0.0/24", Default::default(), client)
            .unwrap();
        ipam.reserve_ip_pool(1).unwrap();
    }

    #[test]
    fn test_custom_reserved_octets() {
        let config = SequentialIpamConfig {
            reserved: ReservedOctets { low: 9, high: 12 },
            ..Default::default()
        };
        let mut ipam = SequentialIpam::with_config("10.0.0.0/24", config, silent_client()).unwrap();

        assert_eq!(
            vec![Ipv4Addr::new(10, 0, 0, 10), Ipv4Addr::new(10, 0, 0, 11)],
            ips(&ipam.reserve_ip_pool(2).unwrap())
        );
        assert!(matches!(
            ipam.reserve_ip_pool(1),
            Err(Error::Exhausted { .. })
        ));
    }

    #[test]
    fn test_failed_request_does_not_roll_back_cursor() {
        let mut ipam = ipam("10.0.0.0/24");
        assert!(ipam.reserve_ip_pool(300).is_err());
        assert!(ipam.reserve_ip_pool(1).is_err());
    }

    #[test]
    fn test_top_of_address_space_is_exhausted() {
        let mut ipam = ipam("255.255.255.0/24");
        assert_eq!(251, ipam.reserve_ip_pool(251).unwrap().len());

        let err = ipam.reserve_ip_pool(1).unwrap_err();
        assert_eq!(
            "no more IPs available in CIDR [255.255.255.0/24]",
            err.to_string()
        );
        assert_eq!(Some(Ipv4Addr::BROADCAST), ipam.current());
        assert!(ipam.reserve_ip_pool(1).is_err());
    }

    #[test]
    fn test_single_address_block_is_offered_once() {
        let mut ipam = ipam("192.168.0.20/32");
        assert_eq!(
            vec![Ipv4Addr::new(192, 168, 0, 20)],
            ips(&ipam.reserve_ip_pool(1).unwrap())
        );
        assert!(ipam.reserve_ip_pool(1).is_err());
    }
}
