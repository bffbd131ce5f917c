//! # Hostname Resolver
//!
//! Reverse DNS for scanned hosts. A PTR query is sent over UDP to the system
//! nameserver and the first PTR answer becomes the host's name.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use pnet::packet::dns::{DnsPacket, DnsTypes, MutableDnsPacket, Opcode, Retcode};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

pub const RESOLV_CONF: &str = "/etc/resolv.conf";

const DNS_PORT: u16 = 53;
const DNS_HDR_LEN: usize = 12;
const MAX_DNS_MESSAGE: usize = 1500;
const MAX_POINTER_HOPS: usize = 16;

/// Reverse lookup of an address into a hostname.
#[async_trait]
pub trait HostnameLookup: Send + Sync {
    async fn hostname(&self, address: IpAddr) -> Option<String>;
}

/// PTR lookups against a single nameserver.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    server: SocketAddr,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }

    /// Uses the first `nameserver` listed in `/etc/resolv.conf`.
    pub fn system(timeout: Duration) -> anyhow::Result<Self> {
        Self::from_resolv_conf(RESOLV_CONF, timeout)
    }

    pub fn from_resolv_conf(path: impl AsRef<Path>, timeout: Duration) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let server = first_nameserver(&text)
            .with_context(|| format!("no nameserver listed in {}", path.display()))?;
        Ok(Self::new(SocketAddr::new(server, DNS_PORT), timeout))
    }

    /// Name the nameserver returns for `address`, `Ok(None)` when it has none.
    pub async fn lookup(&self, address: IpAddr) -> anyhow::Result<Option<String>> {
        let bind_addr: SocketAddr = match self.server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr).await.context("binding DNS socket")?;

        let id: u16 = rand::random();
        let query: Vec<u8> = create_ptr_query(&address, id)?;
        socket.send_to(&query, self.server).await.context("sending PTR query")?;

        let mut buffer = vec![0u8; MAX_DNS_MESSAGE];
        let answer = timeout(self.timeout, async {
            loop {
                let (len, from) = socket.recv_from(&mut buffer).await?;
                if from.ip() != self.server.ip() {
                    continue;
                }
                if let Some(answer) = parse_ptr_response(&buffer[..len], id) {
                    return Ok::<_, std::io::Error>(answer);
                }
            }
        })
        .await;

        let hostname: Option<String> = match answer {
            Ok(result) => result.context("receiving PTR answer")?,
            Err(_) => bail!("no answer from {} within {:?}", self.server, self.timeout),
        };
        Ok(hostname.filter(|name| *name != address.to_string()))
    }
}

#[async_trait]
impl HostnameLookup for DnsResolver {
    async fn hostname(&self, address: IpAddr) -> Option<String> {
        match self.lookup(address).await {
            Ok(name) => name,
            Err(e) => {
                debug!("Reverse lookup of {} failed: {:#}", address, e);
                None
            }
        }
    }
}

fn first_nameserver(resolv_conf: &str) -> Option<IpAddr> {
    resolv_conf
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => addr.split('%').next()?.parse().ok(),
                _ => None,
            }
        })
}

/// `in-addr.arpa` / `ip6.arpa` name queried for `address`.
pub fn ptr_name(address: &IpAddr) -> String {
    match address {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}.in-addr.arpa")
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(72);
            for byte in v6.octets().iter().rev() {
                name.push_str(&format!("{:x}.{:x}.", byte & 0x0f, byte >> 4));
            }
            name.push_str("ip6.arpa");
            name
        }
    }
}

fn create_ptr_query(address: &IpAddr, id: u16) -> anyhow::Result<Vec<u8>> {
    let mut message: Vec<u8> = vec![0u8; DNS_HDR_LEN];
    {
        let mut header = MutableDnsPacket::new(&mut message).context("creating DNS header")?;
        header.set_id(id);
        header.set_opcode(Opcode::StandardQuery);
        header.set_is_recursion_desirable(1);
        header.set_rcode(Retcode::NoError);
        header.set_query_count(1);
    }

    for label in ptr_name(address).split('.') {
        message.push(label.len() as u8);
        message.extend_from_slice(label.as_bytes());
    }
    message.push(0);
    message.extend_from_slice(&DnsTypes::PTR.0.to_be_bytes());
    message.extend_from_slice(&1u16.to_be_bytes());
    Ok(message)
}

/// Outer `None` means the datagram is not the answer to query `id`.
fn parse_ptr_response(message: &[u8], id: u16) -> Option<Option<String>> {
    let packet = DnsPacket::new(message)?;
    if packet.get_id() != id || packet.get_is_response() == 0 {
        return None;
    }
    if !matches!(packet.get_rcode(), Retcode::NoError) {
        return Some(None);
    }

    let name = packet
        .get_responses()
        .iter()
        .filter(|answer| answer.rtype == DnsTypes::PTR)
        .find_map(|answer| decode_name(message, &answer.data))
        .filter(|name| !name.is_empty());
    Some(name)
}

/// Decodes a wire-format name, following compression pointers into `message`.
fn decode_name(message: &[u8], data: &[u8]) -> Option<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut bytes: &[u8] = data;
    let mut cursor: usize = 0;
    let mut hops: usize = 0;

    loop {
        let len = *bytes.get(cursor)? as usize;
        match len {
            0 => break,
            _ if len & 0xc0 == 0xc0 => {
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return None;
                }
                let low = *bytes.get(cursor + 1)? as usize;
                cursor = ((len & 0x3f) << 8) | low;
                bytes = message;
            }
            _ => {
                let label = bytes.get(cursor + 1..cursor + 1 + len)?;
                labels.push(String::from_utf8_lossy(label).into_owned());
                cursor += 1 + len;
            }
        }
    }

    Some(labels.join("."))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
