use std::time::Duration;

/// Ports probed when the caller does not supply a list.
pub const DEFAULT_PORTS: [u16; 4] = [80, 443, 22, 3389];

/// Presentation flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// 0 prints everything, 1 drops headers and banners, 2 prints only results.
    pub quiet: u8,
    /// Hides the startup banner.
    pub no_banner: bool,
}

#[derive(Debug, Clone)]
pub struct WipeConfig {
    /// Size of every write issued during a pass. The final chunk is clipped to the file length.
    pub chunk_size: usize,
    /// Capacity of the progress channel. The worker blocks when it is full.
    pub channel_capacity: usize,
}

impl Default for WipeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub ports: Vec<u16>,
    pub probe_timeout: Duration,
    pub banner_timeout: Duration,
    /// Upper bound on hosts probed at the same time.
    pub max_concurrent_probes: usize,
    pub grab_banners: bool,
    /// Reverse-resolves the hostname of every live host.
    pub resolve_hostnames: bool,
    pub channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            probe_timeout: Duration::from_millis(1_000),
            banner_timeout: Duration::from_millis(1_000),
            max_concurrent_probes: 20,
            grab_banners: true,
            resolve_hostnames: true,
            channel_capacity: 64,
        }
    }
}

impl ScanConfig {
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        if !ports.is_empty() {
            self.ports = ports;
        }
        self
    }
}
