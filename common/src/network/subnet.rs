//! # Subnet Calculator
//!
//! Derives the scannable host range of an IPv4 subnet from a local address and
//! a mask. Masks are accepted as dotted quads (`255.255.255.0`) or prefix
//! lengths (`24`, `/24`).
//!
//! `/31` and `/32` subnets have no usable host range: their host count is
//! clamped to zero and [`SubnetInfo::hosts`] yields nothing.

use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::SubnetError;
use crate::network::range::Ipv4Range;

/// Immutable description of the subnet a scan runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetInfo {
    pub local_address: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub network_address: Ipv4Addr,
    pub broadcast_address: Ipv4Addr,
    pub prefix_len: u8,
    /// `network/prefix`, e.g. `192.168.1.0/24`.
    pub cidr: String,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    /// Usable hosts, excluding network and broadcast addresses.
    pub total_hosts: u32,
}

impl SubnetInfo {
    /// Usable host addresses in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + Send + use<> {
        let range = if self.total_hosts == 0 {
            // start > end: nothing to scan
            Ipv4Range::new(Ipv4Addr::new(0, 0, 0, 1), Ipv4Addr::new(0, 0, 0, 0))
        } else {
            Ipv4Range::new(self.first_host, self.last_host)
        };
        range.to_iter()
    }
}

impl fmt::Display for SubnetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {}, {} hosts)",
            self.cidr, self.first_host, self.last_host, self.total_hosts
        )
    }
}

impl From<Ipv4Network> for SubnetInfo {
    fn from(network: Ipv4Network) -> Self {
        derive(network.ip(), network.prefix())
    }
}

/// Parses `local_address` and `mask` and derives the subnet.
pub fn compute_subnet(local_address: &str, mask: &str) -> Result<SubnetInfo, SubnetError> {
    let address = parse_address(local_address)?;
    let prefix = parse_mask(mask)?;
    compute_subnet_prefix(address, prefix)
}

pub fn compute_subnet_prefix(address: Ipv4Addr, prefix: u8) -> Result<SubnetInfo, SubnetError> {
    if prefix > 32 {
        return Err(SubnetError::PrefixOutOfRange(prefix));
    }
    Ok(derive(address, prefix))
}

fn derive(address: Ipv4Addr, prefix: u8) -> SubnetInfo {
    let prefix: u8 = prefix.min(32);
    let mask: u32 = prefix_to_mask(prefix);
    let network: u32 = u32::from(address) & mask;
    let broadcast: u32 = network | !mask;

    let host_bits: u32 = 32 - prefix as u32;
    let total_hosts: u32 = match host_bits {
        0 | 1 => 0,
        32 => u32::MAX - 1,
        bits => (1u32 << bits) - 2,
    };

    let (first_host, last_host) = if total_hosts == 0 {
        (network, broadcast)
    } else {
        (network + 1, broadcast - 1)
    };

    let network_address = Ipv4Addr::from(network);

    SubnetInfo {
        local_address: address,
        mask: Ipv4Addr::from(mask),
        network_address,
        broadcast_address: Ipv4Addr::from(broadcast),
        prefix_len: prefix,
        cidr: format!("{network_address}/{prefix}"),
        first_host: Ipv4Addr::from(first_host),
        last_host: Ipv4Addr::from(last_host),
        total_hosts,
    }
}

pub fn prefix_to_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p if p >= 32 => u32::MAX,
        p => !(u32::MAX >> p),
    }
}

fn parse_address(s: &str) -> Result<Ipv4Addr, SubnetError> {
    parse_octets(s).ok_or_else(|| SubnetError::MalformedAddress(s.to_string()))
}

/// Accepts `255.255.255.0`, `24` or `/24` and returns the prefix length.
pub fn parse_mask(s: &str) -> Result<u8, SubnetError> {
    let trimmed = s.trim();
    let prefix_str = trimmed.strip_prefix('/').unwrap_or(trimmed);

    if !prefix_str.contains('.') {
        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|_| SubnetError::MalformedMask(s.to_string()))?;
        if prefix > 32 {
            return Err(SubnetError::PrefixOutOfRange(prefix));
        }
        return Ok(prefix);
    }

    let mask: u32 = parse_octets(trimmed)
        .map(u32::from)
        .ok_or_else(|| SubnetError::MalformedMask(s.to_string()))?;

    if mask.leading_ones() + mask.trailing_zeros() != 32 {
        return Err(SubnetError::NonContiguousMask(s.to_string()));
    }

    Ok(mask.leading_ones() as u8)
}

fn parse_octets(s: &str) -> Option<Ipv4Addr> {
    let parts: Vec<&str> = s.trim().split('.').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u8>().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
