//! Network device context
//!
//! Represents the interface a packet arrived on and through which any reply
//! is sent. The context owns the packet buffer for one receive cycle; the
//! input processors borrow it per call and may mutate the buffer, the
//! outbound length, and the per-cycle flags.

use crate::buffer::PacketBuffer;
use crate::ethernet::ETHERNET_HEADER_SIZE;
use crate::{Ipv6Address, MacAddress, NetworkResult};
use alloc::string::{String, ToString};
use bitflags::bitflags;

/// Default device buffer capacity (maximum Ethernet frame without CRC)
pub const DEVICE_BUFFER_SIZE: usize = 1514;

bitflags! {
    /// Per-receive-cycle device flags
    pub struct DeviceFlags: u8 {
        /// The packet in the buffer arrived as IPv6
        const IPV6 = 0b0000_0001;
    }
}

/// Link layer the device speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    /// Frame-based link with a 14-byte header
    Ethernet,
    /// No link-layer framing
    Loopback,
}

impl LinkLayer {
    /// Link-layer header length in front of the IPv6 header
    pub fn header_len(&self) -> usize {
        match self {
            LinkLayer::Ethernet => ETHERNET_HEADER_SIZE,
            LinkLayer::Loopback => 0,
        }
    }
}

/// Network device context
pub struct DeviceContext {
    /// Interface name
    name: String,
    /// Local IPv6 address
    ipv6_addr: Ipv6Address,
    /// Local link (MAC) address
    mac_addr: MacAddress,
    /// Link layer kind
    link_layer: LinkLayer,
    /// Per-cycle flags
    flags: DeviceFlags,
    /// The one packet buffer for this receive cycle
    buffer: PacketBuffer,
}

impl DeviceContext {
    /// Create a device context with an empty buffer
    pub fn new(
        name: &str,
        ipv6_addr: Ipv6Address,
        mac_addr: MacAddress,
        link_layer: LinkLayer,
    ) -> Self {
        Self {
            name: name.to_string(),
            ipv6_addr,
            mac_addr,
            link_layer,
            flags: DeviceFlags::empty(),
            buffer: PacketBuffer::new(DEVICE_BUFFER_SIZE),
        }
    }

    /// Interface name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local IPv6 address
    pub fn ipv6_addr(&self) -> Ipv6Address {
        self.ipv6_addr
    }

    /// Local link address
    pub fn mac_addr(&self) -> MacAddress {
        self.mac_addr
    }

    /// Link layer kind
    pub fn link_layer(&self) -> LinkLayer {
        self.link_layer
    }

    /// Current per-cycle flags
    pub fn flags(&self) -> DeviceFlags {
        self.flags
    }

    /// Mark the current receive cycle as carrying an IPv6 packet
    pub fn mark_ipv6(&mut self) {
        self.flags.insert(DeviceFlags::IPV6);
    }

    /// Whether the current cycle was marked IPv6
    pub fn is_ipv6(&self) -> bool {
        self.flags.contains(DeviceFlags::IPV6)
    }

    /// Load a received frame and reset the per-cycle flags
    pub fn receive(&mut self, frame: &[u8]) -> NetworkResult<()> {
        self.flags = DeviceFlags::empty();
        self.buffer.load(frame)
    }

    /// Outbound data length; zero means nothing to transmit
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds nothing to transmit
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Force the outbound length, zero to drop the packet
    pub fn set_len(&mut self, len: usize) -> NetworkResult<()> {
        self.buffer.set_len(len)
    }

    /// The packet buffer
    pub fn buffer(&self) -> &PacketBuffer {
        &self.buffer
    }

    /// The packet buffer for in-place mutation
    pub fn buffer_mut(&mut self) -> &mut PacketBuffer {
        &mut self.buffer
    }
}
