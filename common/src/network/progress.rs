use std::net::IpAddr;

use crate::network::host::NetworkHost;

/// Snapshot of a running subnet scan.
///
/// The scanner owns the accumulator; every snapshot it hands out is a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub total_hosts: usize,
    pub scanned_hosts: usize,
    /// Last address that finished probing, `None` once the scan is over.
    pub current_address: Option<IpAddr>,
    /// Alive hosts in completion order.
    pub found_hosts: Vec<NetworkHost>,
}

impl ScanProgress {
    pub fn percentage(&self) -> usize {
        if self.total_hosts == 0 {
            return 0;
        }
        self.scanned_hosts * 100 / self.total_hosts
    }

    pub fn is_complete(&self) -> bool {
        self.scanned_hosts >= self.total_hosts && self.current_address.is_none()
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
    fn percentage_of_empty_scan_is_zero() {
        assert_eq!(ScanProgress::default().percentage(), 0);
    }

    #[test]
    fn percentage_rounds_down() {
        let progress = ScanProgress {
            total_hosts: 254,
            scanned_hosts: 127,
            current_address: None,
            found_hosts: Vec::new(),
        };
        assert_eq!(progress.percentage(), 50);
        assert!(!progress.is_complete());
    }
}
