//! Nanonet network stack - ICMPv6 receive path
//!
//! This crate implements the network-layer input handling for ICMPv6 control
//! messages in a minimal TCP/IP stack:
//! - Neighbor Discovery solicitation/advertisement exchange (RFC 4861)
//! - Echo request/reply (ping) processing (RFC 4443)
//! - In-place reply construction over the shared device buffer
//! - Neighbor cache maintenance as a side effect of solicitation handling
//! - Pseudo-header checksum computation and verification
//!
//! The input processor is synchronous and non-reentrant: it is intended to be
//! called directly on the receive path, from an interrupt-equivalent context
//! or with preemption disabled. It never blocks, never allocates on the
//! packet path, and borrows the device context only for the duration of one
//! call.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod buffer;
pub mod checksum;
pub mod device;
#[cfg(feature = "ping")]
pub mod echo;
pub mod ethernet;
pub mod icmpv6;
pub mod ip;
pub mod neighbor;
pub mod stats;

use alloc::sync::Arc;
use core::fmt;
use lazy_static::lazy_static;

/// Type alias for IPv6 address as a 16-byte array
pub type Ipv6Address = [u8; 16];

/// Type alias for MAC address as a 6-byte array
pub type MacAddress = [u8; 6];

/// Network error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// Invalid packet format
    InvalidPacket,
    /// Buffer too small
    BufferTooSmall,
    /// Buffer overflow
    BufferOverflow,
    /// Invalid address
    InvalidAddress,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkError::InvalidPacket => write!(f, "Invalid packet format"),
            NetworkError::BufferTooSmall => write!(f, "Buffer too small"),
            NetworkError::BufferOverflow => write!(f, "Buffer overflow"),
            NetworkError::InvalidAddress => write!(f, "Invalid address"),
        }
    }
}

/// Network result type
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Display adapter for IPv6 addresses in log output
pub struct Ipv6Display<'a>(pub &'a Ipv6Address);

impl fmt::Display for Ipv6Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

/// Display adapter for MAC addresses in log output
pub struct MacDisplay<'a>(pub &'a MacAddress);

impl fmt::Display for MacDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

lazy_static! {
    static ref NEIGHBOR_CACHE: Arc<neighbor::NeighborCache> =
        Arc::new(neighbor::NeighborCache::new());
    static ref NET_STATS: Arc<stats::NetStats> = Arc::new(stats::NetStats::new());
}

/// Get the global neighbor cache
///
/// Single-interface configurations share this instance; stacks with several
/// interfaces construct one [`neighbor::NeighborCache`] per interface and
/// hand it to the processor instead.
pub fn neighbor_cache() -> Arc<neighbor::NeighborCache> {
    NEIGHBOR_CACHE.clone()
}

/// Get the global network statistics
pub fn net_stats() -> Arc<stats::NetStats> {
    NET_STATS.clone()
}

/// Initialize the network stack globals
pub fn init() -> NetworkResult<()> {
    // Force lazy construction so the first packet does not pay for it.
    let _ = (&*NEIGHBOR_CACHE, &*NET_STATS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv6_display_formatting() {
        let mut addr: Ipv6Address = [0; 16];
        addr[0] = 0xfe;
        addr[1] = 0x80;
        addr[15] = 0x01;
        let formatted = alloc::format!("{}", Ipv6Display(&addr));
        assert_eq!(formatted, "fe80:0000:0000:0000:0000:0000:0000:0001");
    }

    #[test]
    fn test_mac_display_formatting() {
        let mac: MacAddress = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
        assert_eq!(alloc::format!("{}", MacDisplay(&mac)), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }
}
