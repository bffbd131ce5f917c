//! # Vendor Lookup
//!
//! [`VendorRepository`] adapters: a table loaded from `PREFIX,Vendor` CSV text
//! and the OUI database bundled with `mac_oui`. Both are plain values built by
//! the caller and injected into the scan.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, anyhow};
use mac_oui::Oui;
use pnet::util::MacAddr;
use umbra_common::vendors::VendorRepository;

/// OUI prefix to vendor name, keyed by the first six hex digits.
#[derive(Debug, Clone, Default)]
pub struct OuiTable {
    vendors: HashMap<String, String>,
}

impl OuiTable {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open OUI table {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to read OUI table {}", path.display()))
    }

    /// Reads `PREFIX,Vendor` lines. Headers, blank lines and malformed rows are skipped.
    pub fn from_reader(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut vendors = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let Some((prefix, vendor)) = line.split_once(',') else {
                continue;
            };
            let vendor = vendor.trim().trim_matches('"').trim();
            if let Some(key) = oui_key(prefix) {
                if !vendor.is_empty() {
                    vendors.insert(key, vendor.to_string());
                }
            }
        }
        Ok(Self { vendors })
    }

    /// Looks up any MAC or OUI notation: `3C:22:FB`, `3c-22-fb-01-02-03`, `3C22FB`.
    pub fn lookup_str(&self, mac: &str) -> Option<&str> {
        let key = oui_key(mac)?;
        self.vendors.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

impl VendorRepository for OuiTable {
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String> {
        self.lookup_str(&mac_addr.to_string()).map(str::to_string)
    }
}

fn oui_key(text: &str) -> Option<String> {
    let hex: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .take(6)
        .collect();
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex.to_ascii_uppercase())
}

/// The IEEE OUI registry shipped inside the `mac_oui` crate.
pub struct MacOuiRepo {
    db: Oui,
}

impl MacOuiRepo {
    pub fn bundled() -> anyhow::Result<Self> {
        let db = Oui::default().map_err(|e| anyhow!("failed to load OUI database: {e:?}"))?;
        Ok(Self { db })
    }
}

impl VendorRepository for MacOuiRepo {
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String> {
        match self.db.lookup_by_mac(&mac_addr.to_string()) {
            Ok(Some(entry)) => Some(entry.company_name.clone()),
            Ok(None) | Err(_) => None,
        }
    }
}

/// Asks each repository in turn and returns the first answer.
#[derive(Default)]
pub struct VendorChain {
    repos: Vec<Box<dyn VendorRepository>>,
}

impl VendorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, repo: impl VendorRepository + 'static) -> Self {
        self.repos.push(Box::new(repo));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

impl VendorRepository for VendorChain {
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String> {
        self.repos.iter().find_map(|repo| repo.get_vendor(mac_addr))
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
