use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::warn;
use umbra_common::config::{Config, ScanConfig};
use umbra_common::network::host::NetworkHost;
use umbra_common::network::interface;
use umbra_common::network::subnet::{SubnetInfo, compute_subnet};
use umbra_core::neighbors::ProcNeighbors;
use umbra_core::scanner::{DnsResolver, ScanServices, TcpProber, scan_subnet_with};
use umbra_core::vendors::{MacOuiRepo, OuiTable, VendorChain};

use crate::commands::{ScanArgs, cancel_on_ctrl_c};
use crate::mprint;
use crate::terminal::{colors, format, print, progress};

type Detail = (String, ColoredString);

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let subnet: SubnetInfo = resolve_subnet(&args)?;
    let timeout = Duration::from_millis(args.timeout_ms);
    let config = ScanConfig {
        probe_timeout: timeout,
        banner_timeout: timeout,
        max_concurrent_probes: args.concurrency,
        grab_banners: !args.no_banners,
        resolve_hostnames: !args.no_dns,
        ..ScanConfig::default()
    }
    .with_ports(args.ports.clone());

    if cfg.quiet == 0 {
        print::as_tree_one_level(vec![
            ("Subnet".to_string(), subnet.cidr.color(colors::IPV4_ADDR)),
            ("Hosts".to_string(), subnet.total_hosts.to_string().normal()),
            ("Ports".to_string(), format::ports(&config.ports).color(colors::PORT)),
        ]);
    }

    let services: ScanServices = build_services(&args, &config)?;
    let cancel = cancel_on_ctrl_c();
    let start_time: Instant = Instant::now();
    let mut job = scan_subnet_with(subnet, config, services, cancel);

    let bar = progress::scan_bar(u64::from(job.subnet.total_hosts), cfg.quiet > 0);
    while let Some(snapshot) = job.next_progress().await {
        bar.set_position(snapshot.scanned_hosts as u64);
        bar.set_message(format!("{} up", snapshot.found_hosts.len()));
    }
    drop(bar);

    let mut last = job.join().await?;
    scan_ends(&mut last.found_hosts, start_time.elapsed(), cfg);
    Ok(())
}

fn resolve_subnet(args: &ScanArgs) -> anyhow::Result<SubnetInfo> {
    match &args.address {
        Some(address) => compute_subnet(address, &args.mask)
            .with_context(|| format!("invalid subnet {}/{}", address, args.mask)),
        None => interface::local_subnet()
            .context("no usable LAN interface, pass --address and --mask"),
    }
}

fn build_services(args: &ScanArgs, config: &ScanConfig) -> anyhow::Result<ScanServices> {
    let mut vendors = VendorChain::new();
    if let Some(path) = &args.oui {
        vendors = vendors.push(OuiTable::load(path)?);
    }
    match MacOuiRepo::bundled() {
        Ok(repo) => vendors = vendors.push(repo),
        Err(e) => warn!("Bundled vendor database unavailable: {:#}", e),
    }

    let mut services = ScanServices::new(Arc::new(TcpProber::new(config)))
        .with_neighbors(Arc::new(ProcNeighbors::default()));
    if !vendors.is_empty() {
        services = services.with_vendors(Arc::new(vendors));
    }
    if config.resolve_hostnames {
        match DnsResolver::system(config.probe_timeout) {
            Ok(resolver) => services = services.with_resolver(Arc::new(resolver)),
            Err(e) => warn!("Hostname lookup disabled: {:#}", e),
        }
    }
    Ok(services)
}

fn scan_ends(hosts: &mut [NetworkHost], total_time: Duration, cfg: &Config) {
    if hosts.is_empty() {
        print::no_results("hosts");
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Subnet Scan", cfg.quiet);
    hosts.sort_by_key(|host| host.address);
    print_hosts(hosts, cfg);
    print_summary(hosts.len(), total_time, cfg);
}

fn print_hosts(hosts: &[NetworkHost], cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        match cfg.quiet {
            2 => print::print(&host.address.to_string()),
            _ => print_host_tree(host, idx),
        }
        if cfg.quiet < 2 && idx + 1 != hosts.len() {
            mprint!();
        }
    }
}

fn print_host_tree(host: &NetworkHost, idx: usize) {
    print::tree_head(idx, &host.address.to_string());
    let mut details: Vec<Detail> = Vec::new();
    if let Some(hostname) = &host.hostname {
        details.push(("Hostname".to_string(), hostname.color(colors::HOSTNAME)));
    }
    details.push(("Type".to_string(), host.device_type.to_string().normal()));
    details.push((
        "Ports".to_string(),
        format::ports(&host.open_ports).color(colors::PORT),
    ));

    if let Some(mac) = host.mac {
        details.push(("MAC".to_string(), mac.to_string().color(colors::MAC_ADDR)));
    }
    if let Some(vendor) = &host.vendor {
        details.push(("Vendor".to_string(), vendor.normal()));
    }
    for (port, banner) in &host.banners {
        details.push((format!("{port}/tcp"), banner.italic()));
    }

    print::as_tree_one_level(details);
}

fn print_summary(hosts_len: usize, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{hosts_len} active hosts").bold().green();
    let total_time: ColoredString = format::duration(total_time).bold().yellow();
    let output: String = format!("Scan complete: {active_hosts} identified in {total_time}");

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            mprint!();
            print::print_status(&output);
        }
    }
}
