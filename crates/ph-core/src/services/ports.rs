use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, TcpListener};
use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RegistryError, Result};

/// Number of candidate ports scanned from the base port.
pub const PORT_WINDOW: u16 = 100;

/// Live check that nothing outside the ledger is bound to a port.
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

/// Binds a TCP listener on the IPv4 and IPv6 wildcard addresses in turn,
/// dropping each immediately. The port is free only if neither is in use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl PortProbe for TcpProbe {
    fn is_free(&self, port: u16) -> bool {
        if TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_err() {
            return false;
        }
        match TcpListener::bind((Ipv6Addr::UNSPECIFIED, port)) {
            Ok(_) => true,
            // Any other error means the host has no usable IPv6 stack.
            Err(e) => e.kind() != ErrorKind::AddrInUse,
        }
    }
}

/// First-fit port search over `[base, base + 99]`.
pub struct PortAllocator {
    probe: Arc<dyn PortProbe>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::with_probe(Arc::new(TcpProbe))
    }

    pub fn with_probe(probe: Arc<dyn PortProbe>) -> Self {
        Self { probe }
    }

    /// Candidate ports for `base_port`, clipped at 65535.
    pub fn window(base_port: u16) -> RangeInclusive<u16> {
        base_port..=base_port.saturating_add(PORT_WINDOW - 1)
    }

    /// Lowest port in the window that is neither `reserved` nor bound by another process.
    pub fn allocate(&self, base_port: u16, reserved: &HashSet<u16>) -> Result<u16> {
        let window = Self::window(base_port);
        for port in window.clone() {
            // Port 0 would ask the OS for an ephemeral port.
            if port == 0 || reserved.contains(&port) {
                continue;
            }
            if self.probe.is_free(port) {
                debug!(port, "port available");
                return Ok(port);
            }
            debug!(port, "port bound by another process, skipping");
        }
        Err(RegistryError::Exhausted {
            start: *window.start(),
            end: *window.end(),
        })
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}
