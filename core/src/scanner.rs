//! The central **abstraction** for local network scanning.
//!
//! A scan is split into two concerns: the [`Prober`] talks to a single host
//! (TCP connect probes and banner grabs), while [`subnet_scan`] walks a subnet
//! and decides how many hosts are probed at once.
//!
//! **Architectural Note:**
//! The coordinator depends only on the [`Prober`] trait. [`TcpProber`] is the
//! production implementation; tests substitute their own.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use umbra_common::config::ScanConfig;
use umbra_common::network::host::ProbeOutcome;

mod banner;
mod prober;
pub mod resolver;
pub mod subnet_scan;

pub use banner::{MAX_BANNER_LEN, grab_banner};
pub use prober::probe;
pub use resolver::{DnsResolver, HostnameLookup};
pub use subnet_scan::{ScanJob, ScanServices, scan_subnet, scan_subnet_with};

/// Talks to one host on behalf of the scan coordinator.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Connect-probes `ports` on `address`. Open ports keep the order of `ports`.
    async fn probe(&self, address: IpAddr, ports: &[u16]) -> ProbeOutcome;

    /// First line the service on `port` answers with, if any.
    async fn grab_banner(&self, address: IpAddr, port: u16) -> Option<String>;
}

/// Plain TCP connect prober.
#[derive(Debug, Clone)]
pub struct TcpProber {
    pub probe_timeout: Duration,
    pub banner_timeout: Duration,
}

impl TcpProber {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            probe_timeout: config.probe_timeout,
            banner_timeout: config.banner_timeout,
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: IpAddr, ports: &[u16]) -> ProbeOutcome {
        probe(address, ports, self.probe_timeout).await
    }

    async fn grab_banner(&self, address: IpAddr, port: u16) -> Option<String> {
        grab_banner(address, port, self.banner_timeout).await
    }
}
