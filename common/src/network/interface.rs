//! # Local Network Detection
//!
//! Picks the interface a LAN scan should run on and reports its IPv4 network.
//!
//! Physical, broadcast-capable interfaces carrying a private IPv4 address are
//! preferred (wired before wireless). When none qualify, any interface that is
//! up, not a loopback and has a private IPv4 address is accepted instead.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(target_os = "macos")]
use macos_impl::{is_physical, is_wireless};

use crate::error::ScanError;
use crate::network::subnet::SubnetInfo;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback or virtual device.
    NotPhysical,
    /// The interface does not support broadcast.
    NotBroadcast,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address.
    NoPrivateIpv4,
}

/// Subnet of the best LAN interface on this machine.
pub fn local_subnet() -> Result<SubnetInfo, ScanError> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    debug!("Inspecting {} network interface(s)", interfaces.len());

    select_lan_network(&interfaces, is_physical, is_wired)
        .map(SubnetInfo::from)
        .ok_or(ScanError::NoLocalNetwork)
}

/// Private IPv4 network of the most suitable interface in `interfaces`.
pub fn select_lan_network(
    interfaces: &[NetworkInterface],
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<Ipv4Network> {
    let viable: Vec<&NetworkInterface> = interfaces
        .iter()
        .filter(|intf| is_viable_lan_interface(intf, &is_physical).is_ok())
        .collect();

    let chosen: Option<&NetworkInterface> = viable
        .iter()
        .find(|intf| is_wired(**intf))
        .or(viable.first())
        .copied()
        .or_else(|| {
            interfaces
                .iter()
                .find(|intf| intf.is_up() && !intf.is_loopback() && private_ipv4(intf).is_some())
        });

    let intf = chosen?;
    debug!("Selected interface {} for LAN scanning", intf.name);
    private_ipv4(intf)
}

fn is_viable_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() || !is_physical(interface) {
        return Err(ViabilityError::NotPhysical);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if private_ipv4(interface).is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn private_ipv4(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(*v4),
        _ => None,
    })
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("en")
    }

    // en0 is the built-in Wi-Fi on every current Mac
    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name == "en0"
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn is_physical(interface: &NetworkInterface) -> bool {
    interface.mac.is_some()
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn is_wireless(_interface: &NetworkInterface) -> bool {
    false
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;
    use std::net::Ipv4Addr;

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;
    const IFF_POINTTOPOINT: u32 = 1 << 4;

    fn mock_interface(name: &str, ips: Vec<IpNetwork>, flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: String::new(),
            index: 0,
            mac: Some(MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6)),
            ips,
            flags,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), prefix).unwrap())
    }

    fn physical(_: &NetworkInterface) -> bool {
        true
    }

    #[test]
    fn viable_interface_passes() {
        let intf = mock_interface("eth0", vec![v4(192, 168, 1, 100, 24)], IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&intf, physical), Ok(()));
    }

    #[test]
    fn down_interface_is_rejected() {
        let intf = mock_interface("eth0", vec![v4(192, 168, 1, 100, 24)], IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&intf, physical), Err(ViabilityError::IsDown));
    }

    #[test]
    fn loopback_is_rejected() {
        let intf = mock_interface(
            "lo",
            vec![v4(127, 0, 0, 1, 8)],
            IFF_UP | IFF_LOOPBACK | IFF_BROADCAST,
        );
        assert_eq!(is_viable_lan_interface(&intf, physical), Err(ViabilityError::NotPhysical));
    }

    #[test]
    fn point_to_point_is_rejected() {
        let intf = mock_interface(
            "tun0",
            vec![v4(10, 8, 0, 2, 24)],
            IFF_UP | IFF_BROADCAST | IFF_POINTTOPOINT,
        );
        assert_eq!(is_viable_lan_interface(&intf, physical), Err(ViabilityError::IsPointToPoint));
    }

    #[test]
    fn public_address_is_rejected() {
        let intf = mock_interface("eth0", vec![v4(8, 8, 8, 8, 24)], IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&intf, physical), Err(ViabilityError::NoPrivateIpv4));
    }

    #[test]
    fn wired_interface_wins_over_wireless() {
        let interfaces = vec![
            mock_interface("wlan0", vec![v4(192, 168, 1, 20, 24)], IFF_UP | IFF_BROADCAST),
            mock_interface("eth0", vec![v4(10, 0, 0, 5, 16)], IFF_UP | IFF_BROADCAST),
        ];
        let net = select_lan_network(&interfaces, physical, |i| i.name == "eth0").unwrap();
        assert_eq!(net.ip(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(net.prefix(), 16);
    }

    #[test]
    fn falls_back_to_virtual_interface() {
        let interfaces = vec![
            mock_interface("lo", vec![v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK),
            mock_interface("veth0", vec![v4(172, 17, 0, 2, 16)], IFF_UP | IFF_BROADCAST),
        ];
        let net = select_lan_network(&interfaces, |_| false, |_| false).unwrap();
        assert_eq!(net.ip(), Ipv4Addr::new(172, 17, 0, 2));
    }

    #[test]
    fn nothing_usable_yields_none() {
        let interfaces =
            vec![mock_interface("lo", vec![v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK)];
        assert!(select_lan_network(&interfaces, physical, physical).is_none());
    }
}
