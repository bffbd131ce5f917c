#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};

use umbra_common::error::ScanError;
use umbra_common::network::host::NetworkHost;
use umbra_core::scanner;

use crate::util::greeting_listener;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Scans 127.0.0.0/30 with a greeting service on 127.0.0.1.
#[tokio::test]
async fn scan_finds_loopback_service() {
    let port = greeting_listener("UMBRA-TEST 1.0\r\n").await;

    let mut job = scanner::scan_subnet("127.0.0.1", "255.255.255.252", vec![port]).unwrap();
    assert_eq!(job.subnet.total_hosts, 2);

    let mut snapshots = Vec::new();
    while let Some(snapshot) = job.next_progress().await {
        snapshots.push(snapshot);
    }
    let last = job.join().await.unwrap();

    assert_eq!(snapshots.first().map(|s| s.scanned_hosts), Some(0));
    assert!(last.is_complete());
    assert_eq!(last.scanned_hosts, 2);

    let found: Vec<&NetworkHost> = last
        .found_hosts
        .iter()
        .filter(|h| h.address == LOCALHOST)
        .collect();
    assert_eq!(found.len(), 1, "{:?}", last.found_hosts);

    let host = found[0];
    assert!(host.is_alive);
    assert_eq!(host.open_ports, vec![port]);
    assert_eq!(host.banner(port), Some("UMBRA-TEST 1.0"));
}

#[tokio::test]
async fn scan_rejects_malformed_subnet() {
    let err = scanner::scan_subnet("127.0.0.1", "255.255.0.255", vec![]).err();
    assert!(matches!(err, Some(ScanError::Subnet(_))));

    let err = scanner::scan_subnet("localhost", "24", vec![]).err();
    assert!(matches!(err, Some(ScanError::Subnet(_))));
}
