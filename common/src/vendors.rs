use std::net::Ipv4Addr;

use pnet::util::MacAddr;

/// Resolves device manufacturers from MAC addresses.
///
/// Implementations are constructed by the caller and passed in explicitly.
pub trait VendorRepository: Send + Sync {
    /// Returns the vendor name, or `None` when the OUI is unknown.
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String>;
}

/// Resolves the hardware address of a neighbour on the local link.
pub trait NeighborLookup: Send + Sync {
    fn mac_for(&self, addr: Ipv4Addr) -> Option<MacAddr>;
}
