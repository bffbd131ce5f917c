use anyhow::Context;
use colored::*;
use umbra_common::config::{Config, ScanConfig};
use umbra_common::network::interface;
use umbra_common::network::subnet::SubnetInfo;

use crate::terminal::{colors, format, print};

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    let subnet: SubnetInfo =
        interface::local_subnet().context("no usable LAN interface on this device")?;

    if cfg.quiet > 1 {
        print::print(&subnet.cidr);
        return Ok(());
    }

    print::tree_head(0, "Local network");
    print::as_tree_one_level(vec![
        (
            "Address".to_string(),
            subnet.local_address.to_string().color(colors::IPV4_ADDR),
        ),
        ("Mask".to_string(), subnet.mask.to_string().color(colors::IPV4_PREFIX)),
        ("Network".to_string(), subnet.cidr.color(colors::IPV4_ADDR)),
        (
            "Broadcast".to_string(),
            subnet.broadcast_address.to_string().color(colors::IPV4_ADDR),
        ),
        (
            "Range".to_string(),
            format!("{} - {}", subnet.first_host, subnet.last_host).normal(),
        ),
        ("Hosts".to_string(), subnet.total_hosts.to_string().color(colors::ACCENT)),
    ]);

    let defaults = ScanConfig::default();
    print::print("");
    print::tree_head(1, "Scan defaults");
    print::as_tree_one_level(vec![
        ("Ports".to_string(), format::ports(&defaults.ports).color(colors::PORT)),
        (
            "Timeout".to_string(),
            format::duration(defaults.probe_timeout).normal(),
        ),
        (
            "Parallel".to_string(),
            defaults.max_concurrent_probes.to_string().normal(),
        ),
    ]);

    Ok(())
}
