//! Ethernet frame handling
//!
//! Ethernet II (DIX) header parsing and the in-place address rewrite used
//! when a reply is built inside the received frame. Only the pieces the
//! ICMPv6 receive path needs are implemented; VLAN tagging and LLC/SNAP
//! formats are out of scope.

use crate::{MacAddress, NetworkError, NetworkResult};

/// Ethernet frame header size
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// EtherType for IPv6
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

/// Ethernet frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddress,
    /// Source MAC address
    pub source: MacAddress,
    /// EtherType
    pub ether_type: u16,
}

impl EthernetHeader {
    /// Parse an Ethernet header from the front of a frame
    pub fn parse(frame: &[u8]) -> NetworkResult<Self> {
        if frame.len() < ETHERNET_HEADER_SIZE {
            return Err(NetworkError::InvalidPacket);
        }

        let mut destination = [0u8; 6];
        destination.copy_from_slice(&frame[0..6]);

        let mut source = [0u8; 6];
        source.copy_from_slice(&frame[6..12]);

        let ether_type = u16::from_be_bytes([frame[12], frame[13]]);

        Ok(EthernetHeader {
            destination,
            source,
            ether_type,
        })
    }

    /// Write the header to the front of a frame
    pub fn write_to(&self, frame: &mut [u8]) -> NetworkResult<()> {
        if frame.len() < ETHERNET_HEADER_SIZE {
            return Err(NetworkError::BufferTooSmall);
        }

        frame[0..6].copy_from_slice(&self.destination);
        frame[6..12].copy_from_slice(&self.source);
        frame[12..14].copy_from_slice(&self.ether_type.to_be_bytes());
        Ok(())
    }
}

/// Turn a received frame around in place
///
/// The received source address becomes the destination and `local_mac`
/// becomes the new source. The EtherType is left untouched.
pub fn swap_addresses_in_place(frame: &mut [u8], local_mac: &MacAddress) -> NetworkResult<()> {
    if frame.len() < ETHERNET_HEADER_SIZE {
        return Err(NetworkError::BufferTooSmall);
    }

    frame.copy_within(6..12, 0);
    frame[6..12].copy_from_slice(local_mac);
    Ok(())
}
