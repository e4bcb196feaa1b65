//! MAC address lookup for Wake-on-LAN advertisement

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::net::lookup_host;
use tokio::process::Command;

use crate::error::ClientError;

/// Resolves the MAC address of a host on the local network
#[async_trait]
pub trait MacResolver: Send + Sync {
    /// `Ok(None)` when the host has no entry
    async fn resolve_mac(&self, hostname: &str) -> Result<Option<String>, ClientError>;
}

/// Looks hosts up in the system ARP table via the `arp` tool
///
/// Only hosts the machine has recently talked to have an entry.
#[derive(Debug, Clone)]
pub struct ArpMacResolver {
    tool: String,
}

impl ArpMacResolver {
    pub fn new() -> Self {
        Self::with_tool("arp")
    }

    pub fn with_tool(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    fn locate_tool(&self) -> Result<PathBuf, ClientError> {
        which::which(&self.tool)
            .map_err(|e| ClientError::MacLookup(format!("{} not available: {}", self.tool, e)))
    }
}

impl Default for ArpMacResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MacResolver for ArpMacResolver {
    async fn resolve_mac(&self, hostname: &str) -> Result<Option<String>, ClientError> {
        let tool = self.locate_tool()?;

        let address = lookup_host((hostname, 0))
            .await
            .map_err(|e| ClientError::MacLookup(format!("cannot resolve {hostname}: {e}")))?
            .find(|addr| addr.is_ipv4())
            .ok_or_else(|| ClientError::MacLookup(format!("no IPv4 address for {hostname}")))?;

        let output = Command::new(tool)
            .arg("-n")
            .arg(address.ip().to_string())
            .output()
            .await
            .map_err(|e| ClientError::MacLookup(e.to_string()))?;

        if !output.status.success() {
            tracing::debug!(hostname, status = ?output.status, "arp lookup failed");
            return Ok(None);
        }

        Ok(parse_mac(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// First MAC-looking token in `text`, normalized to lowercase `aa:bb:..`
pub fn parse_mac(text: &str) -> Option<String> {
    text.split_whitespace().find_map(|token| {
        let parts: Vec<&str> = token.split([':', '-']).collect();
        let valid = parts.len() == 6
            && parts
                .iter()
                .all(|p| (1..=2).contains(&p.len()) && p.chars().all(|c| c.is_ascii_hexdigit()));
        valid.then(|| {
            parts
                .iter()
                .map(|p| format!("{:0>2}", p.to_ascii_lowercase()))
                .collect::<Vec<_>>()
                .join(":")
        })
    })
}
