pub mod info;
pub mod methods;
pub mod scan;
pub mod wipe;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::warn;
use umbra_common::cancel::CancelToken;
use umbra_common::deletion::DeletionMethod;

#[derive(Parser)]
#[command(name = "umbra", version)]
#[command(about = "Secure file deletion and local network reconnaissance.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print less (-q hides headers and progress, -qq prints results only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Hide the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the local network a scan would cover
    #[command(alias = "i")]
    Info,
    /// List the available overwrite methods
    #[command(alias = "m")]
    Methods,
    /// Overwrite files in place, then delete them
    #[command(alias = "w")]
    Wipe(WipeArgs),
    /// Find live hosts and open services on a subnet
    #[command(alias = "s")]
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct WipeArgs {
    /// Files to destroy, processed in the given order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Overwrite method: single, dod3, random7 or gutmann35
    #[arg(short, long, default_value = "dod3")]
    pub method: DeletionMethod,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Any address inside the subnet. Defaults to this device's LAN address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Subnet mask as 255.255.255.0, 24 or /24. Only used with --address
    #[arg(short, long, default_value = "24")]
    pub mask: String,

    /// Comma separated ports to probe
    #[arg(short, long, value_delimiter = ',')]
    pub ports: Vec<u16>,

    /// Connect and banner timeout per port, in milliseconds
    #[arg(long, default_value_t = 1_000)]
    pub timeout_ms: u64,

    /// Hosts probed at the same time
    #[arg(short, long, default_value_t = 20)]
    pub concurrency: usize,

    /// Skip banner grabbing on open ports
    #[arg(long)]
    pub no_banners: bool,

    /// Skip reverse DNS lookups of live hosts
    #[arg(long)]
    pub no_dns: bool,

    /// Extra OUI table (PREFIX,Vendor CSV) consulted before the bundled one
    #[arg(long)]
    pub oui: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Token that is cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancelToken {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping at the next safe point");
            trigger.cancel();
        }
    });
    cancel
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
