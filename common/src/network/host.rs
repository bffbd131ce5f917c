use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::SystemTime;

use pnet::util::MacAddr;

use crate::network::device::DeviceType;

/// Result of TCP-probing one address across a port list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub is_alive: bool,
    /// Ports that accepted a connection, in the order they were requested.
    pub open_ports: Vec<u16>,
}

/// One probed address, enriched with whatever the scan could learn about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHost {
    pub address: IpAddr,
    pub is_alive: bool,
    pub open_ports: Vec<u16>,
    pub banners: BTreeMap<u16, String>,
    pub mac: Option<MacAddr>,
    pub vendor: Option<String>,
    /// Reverse-DNS name, when the resolver knows one.
    pub hostname: Option<String>,
    pub device_type: DeviceType,
    pub scanned_at: SystemTime,
}

impl NetworkHost {
    pub fn new(address: IpAddr, outcome: ProbeOutcome) -> Self {
        Self {
            address,
            is_alive: outcome.is_alive,
            open_ports: outcome.open_ports,
            banners: BTreeMap::new(),
            mac: None,
            vendor: None,
            hostname: None,
            device_type: DeviceType::Unknown,
            scanned_at: SystemTime::now(),
        }
    }

    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Re-derives `device_type` from the current vendor and open ports.
    pub fn classify(&mut self) {
        self.device_type = DeviceType::classify(self.vendor.as_deref(), &self.open_ports);
    }

    pub fn banner(&self, port: u16) -> Option<&str> {
        self.banners.get(&port).map(String::as_str)
    }
}
