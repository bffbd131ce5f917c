//! # Device Classification
//!
//! Guesses what kind of device a host is from its vendor string and the ports
//! it answered on. Rules are checked in a fixed order and the first match wins,
//! so a Cisco box serving HTTP is a router even though port 22 would also make
//! it a server.

use std::fmt;

const ROUTER_VENDORS: &[&str] = &[
    "cisco", "linksys", "netgear", "tp-link", "d-link", "asus", "ubiquiti",
];
const ROUTER_PORTS: &[u16] = &[80, 443, 8080];

const PHONE_VENDORS: &[&str] = &[
    "apple", "samsung", "google", "htc", "huawei", "xiaomi", "oneplus", "oppo", "vivo", "iphone",
    "galaxy", "pixel", "android",
];

const TABLET_VENDORS: &[&str] = &["ipad", "tablet"];

const LAPTOP_VENDORS: &[&str] = &[
    "dell", "hp", "lenovo", "asus", "acer", "msi", "microsoft", "apple",
];

const PRINTER_VENDORS: &[&str] = &["hp", "canon", "epson", "brother", "xerox"];
const PRINTER_PORTS: &[u16] = &[515, 631, 9100];

const SERVER_PORTS: &[u16] = &[22, 3389, 5900, 3306, 5432, 27017, 6379];

const IOT_VENDORS: &[&str] = &["raspberry", "philips", "nest", "ring", "ecobee", "amazon"];
const IOT_PORTS: &[u16] = &[1883, 8883, 5683];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Router,
    Phone,
    Tablet,
    Laptop,
    Printer,
    Server,
    IotDevice,
    #[default]
    Unknown,
}

impl DeviceType {
    /// Classifies a host. Vendor keywords match case-insensitively anywhere in
    /// the vendor string; without a vendor only port rules can apply.
    pub fn classify(vendor: Option<&str>, open_ports: &[u16]) -> Self {
        let vendor: String = vendor.unwrap_or_default().to_lowercase();
        let made_by = |names: &[&str]| names.iter().any(|name| vendor.contains(name));
        let listens_on = |ports: &[u16]| open_ports.iter().any(|p| ports.contains(p));

        if made_by(ROUTER_VENDORS) && listens_on(ROUTER_PORTS) {
            Self::Router
        } else if made_by(PHONE_VENDORS) {
            Self::Phone
        } else if made_by(TABLET_VENDORS) {
            Self::Tablet
        } else if made_by(LAPTOP_VENDORS) {
            Self::Laptop
        } else if made_by(PRINTER_VENDORS) || listens_on(PRINTER_PORTS) {
            Self::Printer
        } else if listens_on(SERVER_PORTS) {
            Self::Server
        } else if made_by(IOT_VENDORS) || listens_on(IOT_PORTS) {
            Self::IotDevice
        } else {
            Self::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Router => "Router",
            Self::Phone => "Phone",
            Self::Tablet => "Tablet",
            Self::Laptop => "Laptop",
            Self::Printer => "Printer",
            Self::Server => "Server",
            Self::IotDevice => "IoT device",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
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

    #[test]
    fn router_needs_vendor_and_web_port() {
        let cisco = DeviceType::classify(Some("Cisco Systems, Inc"), &[22, 443]);
        assert_eq!(cisco, DeviceType::Router);
        assert_eq!(DeviceType::classify(Some("NETGEAR"), &[53]), DeviceType::Unknown);
    }

    #[test]
    fn vendor_rules_apply_in_order() {
        assert_eq!(DeviceType::classify(Some("Apple, Inc."), &[]), DeviceType::Phone);
        assert_eq!(DeviceType::classify(Some("iPad Maker"), &[]), DeviceType::Tablet);
        assert_eq!(DeviceType::classify(Some("Lenovo"), &[22]), DeviceType::Laptop);
        assert_eq!(DeviceType::classify(Some("Canon Inc."), &[]), DeviceType::Printer);
        let pi = DeviceType::classify(Some("Raspberry Pi Trading Ltd"), &[]);
        assert_eq!(pi, DeviceType::IotDevice);
    }

    #[test]
    fn ports_classify_without_vendor() {
        assert_eq!(DeviceType::classify(None, &[80, 9100]), DeviceType::Printer);
        assert_eq!(DeviceType::classify(None, &[80, 3389]), DeviceType::Server);
        assert_eq!(DeviceType::classify(None, &[1883]), DeviceType::IotDevice);
        assert_eq!(DeviceType::classify(None, &[80, 443]), DeviceType::Unknown);
    }

    #[test]
    fn empty_vendor_matches_nothing() {
        assert_eq!(DeviceType::classify(Some(""), &[]), DeviceType::Unknown);
        assert_eq!(DeviceType::default(), DeviceType::Unknown);
    }
}
