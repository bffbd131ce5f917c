//! # Subnet Scan
//!
//! Walks every usable host of a subnet with a bounded number of probes in
//! flight. Shared scan state lives behind a single async mutex and every
//! snapshot handed to the caller is a copy taken under that lock, so snapshots
//! arrive with a strictly increasing `scanned_hosts`.
//!
//! The stream always starts with an empty snapshot and ends with one whose
//! `current_address` is `None`, including when the scan is cancelled.

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};
use umbra_common::cancel::CancelToken;
use umbra_common::config::ScanConfig;
use umbra_common::error::ScanError;
use umbra_common::network::host::NetworkHost;
use umbra_common::network::progress::ScanProgress;
use umbra_common::network::subnet::{SubnetInfo, compute_subnet};
use umbra_common::vendors::{NeighborLookup, VendorRepository};

use crate::neighbors::ProcNeighbors;
use crate::scanner::resolver::{DnsResolver, HostnameLookup};
use crate::scanner::{Prober, TcpProber};
use crate::vendors::MacOuiRepo;

/// Collaborators a scan talks to.
#[derive(Clone)]
pub struct ScanServices {
    pub prober: Arc<dyn Prober>,
    pub neighbors: Option<Arc<dyn NeighborLookup>>,
    pub vendors: Option<Arc<dyn VendorRepository>>,
    pub resolver: Option<Arc<dyn HostnameLookup>>,
}

impl ScanServices {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            neighbors: None,
            vendors: None,
            resolver: None,
        }
    }

    pub fn with_neighbors(mut self, neighbors: Arc<dyn NeighborLookup>) -> Self {
        self.neighbors = Some(neighbors);
        self
    }

    pub fn with_vendors(mut self, vendors: Arc<dyn VendorRepository>) -> Self {
        self.vendors = Some(vendors);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostnameLookup>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// TCP prober, the kernel neighbour table, the bundled OUI database and the
    /// system nameserver.
    pub fn system(config: &ScanConfig) -> Self {
        let mut services = Self::new(Arc::new(TcpProber::new(config)))
            .with_neighbors(Arc::new(ProcNeighbors::default()));

        match MacOuiRepo::bundled() {
            Ok(repo) => services = services.with_vendors(Arc::new(repo)),
            Err(e) => warn!("Vendor lookup disabled: {:#}", e),
        }

        if config.resolve_hostnames {
            match DnsResolver::system(config.probe_timeout) {
                Ok(resolver) => services = services.with_resolver(Arc::new(resolver)),
                Err(e) => warn!("Hostname lookup disabled: {:#}", e),
            }
        }
        services
    }
}

/// A running subnet scan.
pub struct ScanJob {
    pub subnet: SubnetInfo,
    pub progress: mpsc::Receiver<ScanProgress>,
    pub handle: JoinHandle<ScanProgress>,
    cancel: CancelToken,
}

impl ScanJob {
    /// Stops dispatching hosts. Probes already running finish normally.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn next_progress(&mut self) -> Option<ScanProgress> {
        self.progress.recv().await
    }

    /// Discards pending snapshots and waits for the final one.
    pub async fn join(self) -> anyhow::Result<ScanProgress> {
        drop(self.progress);
        self.handle.await.context("scan task failed")
    }
}

/// Scans the subnet of `local_address`/`mask` on `ports` with system services.
///
/// An empty port list falls back to the default ports. Malformed input fails
/// before anything is spawned. Must be called from within a tokio runtime.
pub fn scan_subnet(local_address: &str, mask: &str, ports: Vec<u16>) -> Result<ScanJob, ScanError> {
    let subnet: SubnetInfo = compute_subnet(local_address, mask)?;
    let config: ScanConfig = ScanConfig::default().with_ports(ports);
    let services = ScanServices::system(&config);
    Ok(scan_subnet_with(subnet, config, services, CancelToken::new()))
}

pub fn scan_subnet_with(
    subnet: SubnetInfo,
    config: ScanConfig,
    services: ScanServices,
    cancel: CancelToken,
) -> ScanJob {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));

    let shared = Arc::new(SharedScan {
        state: Mutex::new(ScanProgress {
            total_hosts: subnet.total_hosts as usize,
            ..ScanProgress::default()
        }),
        tx,
        config,
        services,
        cancel: cancel.clone(),
    });

    let handle = tokio::spawn(run_scan(subnet.clone(), shared));

    ScanJob {
        subnet,
        progress: rx,
        handle,
        cancel,
    }
}

struct SharedScan {
    state: Mutex<ScanProgress>,
    tx: mpsc::Sender<ScanProgress>,
    config: ScanConfig,
    services: ScanServices,
    cancel: CancelToken,
}

impl SharedScan {
    async fn publish(&self, snapshot: ScanProgress) {
        // A dropped receiver must not stop the scan.
        let _ = self.tx.send(snapshot).await;
    }
}

async fn run_scan(subnet: SubnetInfo, shared: Arc<SharedScan>) -> ScanProgress {
    info!(
        "Scanning {} ({} hosts, ports {:?})",
        subnet.cidr, subnet.total_hosts, shared.config.ports
    );

    {
        let state = shared.state.lock().await;
        shared.publish(state.clone()).await;
    }

    let semaphore = Arc::new(Semaphore::new(shared.config.max_concurrent_probes.max(1)));
    let mut tasks: JoinSet<()> = JoinSet::new();

    for address in subnet.hosts() {
        if shared.cancel.is_cancelled() {
            break;
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let shared = Arc::clone(&shared);
        tasks.spawn(async move {
            let _permit = permit;
            if shared.cancel.is_cancelled() {
                return;
            }

            let host: NetworkHost = scan_host(IpAddr::V4(address), &shared).await;

            let mut state = shared.state.lock().await;
            state.scanned_hosts += 1;
            state.current_address = Some(host.address);
            if host.is_alive {
                state.found_hosts.push(host);
            }
            let snapshot = state.clone();
            shared.publish(snapshot).await;
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}

    let mut state = shared.state.lock().await;
    state.current_address = None;
    let final_snapshot = state.clone();
    shared.publish(final_snapshot.clone()).await;

    if shared.cancel.is_cancelled() {
        warn!(
            "Scan of {} cancelled after {}/{} hosts",
            subnet.cidr, final_snapshot.scanned_hosts, final_snapshot.total_hosts
        );
    } else {
        info!(
            "Scan of {} finished: {} host(s) up",
            subnet.cidr,
            final_snapshot.found_hosts.len()
        );
    }

    final_snapshot
}

async fn scan_host(address: IpAddr, shared: &SharedScan) -> NetworkHost {
    let services = &shared.services;
    let outcome = services.prober.probe(address, &shared.config.ports).await;
    let mut host = NetworkHost::new(address, outcome);

    if !host.is_alive {
        return host;
    }
    debug!("{} is up", address);

    if shared.config.grab_banners {
        for &port in &host.open_ports {
            if let Some(banner) = services.prober.grab_banner(address, port).await {
                host.banners.insert(port, banner);
            }
        }
    }

    if let (IpAddr::V4(v4), Some(neighbors)) = (address, &services.neighbors) {
        if let Some(mac) = neighbors.mac_for(v4) {
            host.vendor = services.vendors.as_ref().and_then(|repo| repo.get_vendor(mac));
            host = host.with_mac(mac);
        }
    }

    if shared.config.resolve_hostnames
        && let Some(resolver) = &services.resolver
    {
        host.hostname = resolver.hostname(address).await;
    }

    host.classify();
    host
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
