pub mod device;
pub mod host;
pub mod interface;
pub mod progress;
pub mod range;
pub mod subnet;

pub use device::DeviceType;
pub use host::{NetworkHost, ProbeOutcome};
pub use progress::ScanProgress;
pub use subnet::{SubnetInfo, compute_subnet, compute_subnet_prefix};
