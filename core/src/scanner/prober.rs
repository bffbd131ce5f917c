use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;
use umbra_common::network::host::ProbeOutcome;

/// TCP connect-probes every port in `ports` concurrently.
///
/// Refused connections and timeouts are negative results, never errors. The
/// host is alive when at least one port accepted.
pub async fn probe(address: IpAddr, ports: &[u16], probe_timeout: Duration) -> ProbeOutcome {
    let mut probes: JoinSet<(usize, u16, bool)> = JoinSet::new();
    for (index, &port) in ports.iter().enumerate() {
        probes.spawn(async move {
            let open = port_is_open(address, port, probe_timeout).await;
            (index, port, open)
        });
    }

    let mut open: Vec<(usize, u16)> = Vec::new();
    while let Some(joined) = probes.join_next().await {
        if let Ok((index, port, true)) = joined {
            open.push((index, port));
        }
    }
    open.sort_unstable_by_key(|(index, _)| *index);

    let open_ports: Vec<u16> = open.into_iter().map(|(_, port)| port).collect();
    if !open_ports.is_empty() {
        debug!("{} has open ports {:?}", address, open_ports);
    }

    ProbeOutcome {
        is_alive: !open_ports.is_empty(),
        open_ports,
    }
}

async fn port_is_open(address: IpAddr, port: u16, probe_timeout: Duration) -> bool {
    let socket_addr: SocketAddr = SocketAddr::new(address, port);
    matches!(
        timeout(probe_timeout, TcpStream::connect(socket_addr)).await,
        Ok(Ok(_))
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
