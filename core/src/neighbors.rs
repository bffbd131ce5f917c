//! # Neighbour Table
//!
//! IPv4 to MAC resolution from the kernel's neighbour cache. Reads the
//! `/proc/net/arp` layout as well as `ip neigh` output.

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pnet::util::MacAddr;
use umbra_common::vendors::NeighborLookup;

pub const PROC_NET_ARP: &str = "/proc/net/arp";

/// Snapshot of resolved neighbours. Incomplete entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborTable {
    entries: HashMap<Ipv4Addr, MacAddr>,
}

impl NeighborTable {
    pub fn parse(text: &str) -> Self {
        let entries = text.lines().filter_map(parse_line).collect();
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read neighbour table {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&addr).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NeighborLookup for NeighborTable {
    fn mac_for(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.get(addr)
    }
}

/// Reads the neighbour table on every lookup, so entries learnt while a scan
/// is running are seen by later hosts.
#[derive(Debug, Clone)]
pub struct ProcNeighbors {
    path: PathBuf,
}

impl ProcNeighbors {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNeighbors {
    fn default() -> Self {
        Self::new(PROC_NET_ARP)
    }
}

impl NeighborLookup for ProcNeighbors {
    fn mac_for(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        NeighborTable::load(&self.path).ok()?.get(addr)
    }
}

fn parse_line(line: &str) -> Option<(Ipv4Addr, MacAddr)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let addr: Ipv4Addr = fields.first()?.parse().ok()?;

    // `ip neigh`: 192.168.1.1 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE
    let mac_field: &str = match fields.iter().position(|f| *f == "lladdr") {
        Some(i) => fields.get(i + 1)?,
        // /proc/net/arp: IP, HW type, Flags, HW address, Mask, Device
        None => fields.get(3)?,
    };

    let mac: MacAddr = mac_field.parse().ok()?;
    if mac == MacAddr::zero() {
        return None;
    }
    Some((addr, mac))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
