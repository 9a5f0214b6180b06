//! ICMPv6 input processing
//!
//! Handles inbound ICMPv6 control messages on the network-layer receive
//! path:
//!
//! - Neighbor solicitations for the local address are answered with a
//!   neighbor advertisement built in place inside the received buffer, and
//!   the sender is recorded in the neighbor cache.
//! - Echo requests are turned around into echo replies, again in place.
//! - Echo replies are handed to a registered consumer (feature `ping`).
//! - Everything else is dropped with a type-error count.
//!
//! The processor is called once per inbound packet already classified as
//! ICMPv6 by the upstream next-header check. It runs to completion without
//! blocking or allocating and is safe to call from an interrupt-equivalent
//! context; the only shared state it touches is the neighbor cache and the
//! statistics counters.

use crate::checksum;
use crate::device::{DeviceContext, LinkLayer};
#[cfg(feature = "ping")]
use crate::echo::{EchoSink, PollEvents};
use crate::ethernet;
use crate::ip::{Ipv6HeaderMut, IPV6_HEADER_SIZE};
use crate::neighbor::NeighborCache;
use crate::stats::NetStats;
use crate::{Ipv6Address, NetworkError, NetworkResult};
use alloc::sync::Arc;
use bitflags::bitflags;

/// Raw message-type octet for an echo request
pub const ICMPV6_ECHO_REQUEST: u8 = 128;
/// Raw message-type octet for an echo reply
pub const ICMPV6_ECHO_REPLY: u8 = 129;
/// Raw message-type octet for a neighbor solicitation
pub const ICMPV6_NEIGHBOR_SOLICIT: u8 = 135;
/// Raw message-type octet for a neighbor advertisement
pub const ICMPV6_NEIGHBOR_ADVERTISE: u8 = 136;

/// Source link-layer address option kind
pub const OPT_SOURCE_LINK_ADDRESS: u8 = 1;
/// Target link-layer address option kind
pub const OPT_TARGET_LINK_ADDRESS: u8 = 2;

/// Type, code and checksum prefix common to every ICMPv6 message
pub const ICMPV6_HEADER_SIZE: usize = 4;
/// Echo message header (type, code, checksum, identifier, sequence)
pub const ECHO_HEADER_SIZE: usize = 8;
/// One NDP option unit (kind, length, six address bytes)
pub const NDP_OPTION_SIZE: usize = 8;
/// Neighbor solicitation carrying the option region the reply is written
/// into; solicitations on Ethernet links always include it
pub const NDP_SOLICIT_MIN_SIZE: usize = 32;

const OFF_TYPE: usize = 0;
const OFF_CODE: usize = 1;
const OFF_CHECKSUM: usize = 2;
const OFF_NDP_FLAGS: usize = 4;
const OFF_NDP_TARGET: usize = 8;
const OFF_NDP_OPTIONS: usize = 24;
const OFF_ECHO_IDENT: usize = 4;
const OFF_ECHO_SEQ: usize = 6;

/// ICMPv6 message types seen by the input path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icmpv6Type {
    EchoRequest,
    EchoReply,
    NeighborSolicit,
    NeighborAdvert,
    Unknown(u8),
}

impl From<u8> for Icmpv6Type {
    fn from(value: u8) -> Self {
        match value {
            ICMPV6_ECHO_REQUEST => Icmpv6Type::EchoRequest,
            ICMPV6_ECHO_REPLY => Icmpv6Type::EchoReply,
            ICMPV6_NEIGHBOR_SOLICIT => Icmpv6Type::NeighborSolicit,
            ICMPV6_NEIGHBOR_ADVERTISE => Icmpv6Type::NeighborAdvert,
            other => Icmpv6Type::Unknown(other),
        }
    }
}

impl Icmpv6Type {
    /// Raw message-type octet
    pub fn raw(&self) -> u8 {
        match self {
            Icmpv6Type::EchoRequest => ICMPV6_ECHO_REQUEST,
            Icmpv6Type::EchoReply => ICMPV6_ECHO_REPLY,
            Icmpv6Type::NeighborSolicit => ICMPV6_NEIGHBOR_SOLICIT,
            Icmpv6Type::NeighborAdvert => ICMPV6_NEIGHBOR_ADVERTISE,
            Icmpv6Type::Unknown(other) => *other,
        }
    }
}

bitflags! {
    /// Neighbor advertisement flags octet
    pub struct NeighborFlags: u8 {
        /// Sender is a router
        const ROUTER = 0x80;
        /// Advertisement answers a solicitation
        const SOLICITED = 0x40;
        /// Advertisement should override a cached entry
        const OVERRIDE = 0x20;
    }
}

/// Mutable view over one ICMPv6 message inside the packet buffer
///
/// Construction validates the common header prefix. The NDP and echo
/// accessors index past it; callers check the message against
/// [`NDP_SOLICIT_MIN_SIZE`] or [`ECHO_HEADER_SIZE`] first, shorter messages
/// make those accessors panic on the bounds check.
pub struct Icmpv6Message<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Icmpv6Message<'a> {
    /// Construct a view, validating the span against the common header
    pub fn new_checked(bytes: &'a mut [u8]) -> NetworkResult<Self> {
        if bytes.len() < ICMPV6_HEADER_SIZE {
            return Err(NetworkError::InvalidPacket);
        }
        Ok(Self { bytes })
    }

    /// Message length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the span is empty (never true for a validated view)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw message bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// Message type
    pub fn msg_type(&self) -> Icmpv6Type {
        Icmpv6Type::from(self.bytes[OFF_TYPE])
    }

    /// Set the message type
    pub fn set_msg_type(&mut self, msg_type: Icmpv6Type) {
        self.bytes[OFF_TYPE] = msg_type.raw();
    }

    /// Message code
    pub fn code(&self) -> u8 {
        self.bytes[OFF_CODE]
    }

    /// Stored checksum
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.bytes[OFF_CHECKSUM], self.bytes[OFF_CHECKSUM + 1]])
    }

    /// Store the checksum
    pub fn set_checksum(&mut self, checksum: u16) {
        self.bytes[OFF_CHECKSUM..OFF_CHECKSUM + 2].copy_from_slice(&checksum.to_be_bytes());
    }

    /// Advertisement flags octet
    pub fn ndp_flags(&self) -> NeighborFlags {
        NeighborFlags::from_bits_truncate(self.bytes[OFF_NDP_FLAGS])
    }

    /// Set the advertisement flags octet
    pub fn set_ndp_flags(&mut self, flags: NeighborFlags) {
        self.bytes[OFF_NDP_FLAGS] = flags.bits();
    }

    /// Zero the three reserved bytes after the flags octet
    pub fn zero_ndp_reserved(&mut self) {
        for byte in &mut self.bytes[OFF_NDP_FLAGS + 1..OFF_NDP_TARGET] {
            *byte = 0;
        }
    }

    /// NDP target address
    pub fn target_addr(&self) -> Ipv6Address {
        let mut addr = [0u8; 16];
        addr.copy_from_slice(&self.bytes[OFF_NDP_TARGET..OFF_NDP_TARGET + 16]);
        addr
    }

    /// Set the NDP target address
    pub fn set_target_addr(&mut self, addr: &Ipv6Address) {
        self.bytes[OFF_NDP_TARGET..OFF_NDP_TARGET + 16].copy_from_slice(addr);
    }

    /// The NDP options region; empty for messages without one
    pub fn options(&self) -> &[u8] {
        &self.bytes[OFF_NDP_OPTIONS.min(self.bytes.len())..]
    }

    /// The NDP options region for in-place rewriting
    pub fn options_mut(&mut self) -> &mut [u8] {
        let start = OFF_NDP_OPTIONS.min(self.bytes.len());
        &mut self.bytes[start..]
    }

    /// Echo identifier
    pub fn echo_ident(&self) -> u16 {
        u16::from_be_bytes([self.bytes[OFF_ECHO_IDENT], self.bytes[OFF_ECHO_IDENT + 1]])
    }

    /// Echo sequence number
    pub fn echo_seq(&self) -> u16 {
        u16::from_be_bytes([self.bytes[OFF_ECHO_SEQ], self.bytes[OFF_ECHO_SEQ + 1]])
    }
}

/// Why a packet was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Solicitation target is not the local address
    AddressMismatch,
    /// No handler for this message type
    UnsupportedType,
    /// Echo reply arrived with no taker
    UnconsumedReply,
}

/// What the caller should do with the buffer after processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The buffer holds a reply; transmit it
    Forward,
    /// The packet was delivered to a consumer; nothing to transmit
    Dispatched,
    /// The packet was dropped and the outbound length zeroed
    Dropped(DropReason),
}

/// ICMPv6 input processor
///
/// One instance per interface. The neighbor cache and statistics block are
/// injected so several interfaces can share or isolate them as the stack
/// prefers; the echo consumer registration is per-processor state, not a
/// process-wide global.
pub struct Icmpv6Input {
    neighbors: Arc<NeighborCache>,
    stats: Arc<NetStats>,
    #[cfg(feature = "ping")]
    echo_sink: Option<Arc<dyn EchoSink>>,
}

impl Icmpv6Input {
    /// Create a processor over the given collaborators
    pub fn new(neighbors: Arc<NeighborCache>, stats: Arc<NetStats>) -> Self {
        Self {
            neighbors,
            stats,
            #[cfg(feature = "ping")]
            echo_sink: None,
        }
    }

    /// Create a processor over the crate-global cache and statistics
    pub fn with_defaults() -> Self {
        Self::new(crate::neighbor_cache(), crate::net_stats())
    }

    /// Register the consumer that takes inbound echo replies
    #[cfg(feature = "ping")]
    pub fn with_echo_sink(mut self, sink: Arc<dyn EchoSink>) -> Self {
        self.echo_sink = Some(sink);
        self
    }

    /// Handle one inbound ICMPv6 packet
    ///
    /// The device buffer must hold a well-formed IPv6 packet whose next
    /// header is ICMPv6, starting after the link-layer header. On return
    /// either the buffer holds a reply and the outbound length is untouched
    /// ([`Disposition::Forward`]), the packet went to the echo consumer
    /// ([`Disposition::Dispatched`]), or the outbound length is zero
    /// ([`Disposition::Dropped`]). Abnormal conditions never escalate past
    /// the drop counters; this runs where raising a fault is not an option.
    pub fn process(&self, dev: &mut DeviceContext) -> Disposition {
        self.stats.icmpv6.recv.increment();

        // Distinguish this receive cycle from IPv4 before any dispatch,
        // even for packets that end up dropped.
        dev.mark_ipv6();

        let msg_type = {
            let buf = dev.buffer().as_slice();
            let offset = dev.link_layer().header_len() + IPV6_HEADER_SIZE;
            buf.get(offset).map(|&octet| Icmpv6Type::from(octet))
        };

        let outcome = match msg_type {
            Some(Icmpv6Type::NeighborSolicit) => self.neighbor_solicit(dev),
            Some(Icmpv6Type::EchoRequest) => self.echo_request(dev),
            #[cfg(feature = "ping")]
            Some(Icmpv6Type::EchoReply) => self.echo_reply(dev),
            Some(other) => {
                log::debug!("unknown ICMPv6 type: {}", other.raw());
                Err(DropReason::UnsupportedType)
            }
            None => Err(DropReason::UnsupportedType),
        };

        match outcome {
            Ok(disposition) => {
                log::trace!("outgoing ICMPv6 packet length: {}", dev.len());
                self.stats.icmpv6.sent.increment();
                self.stats.ip.sent.increment();
                disposition
            }
            Err(reason) => {
                if reason == DropReason::UnsupportedType {
                    self.stats.icmpv6.typeerr.increment();
                }
                self.stats.icmpv6.drop.increment();
                // A zero outbound length tells the caller not to transmit.
                dev.set_len(0).ok();
                Disposition::Dropped(reason)
            }
        }
    }

    /// Answer a neighbor solicitation for the local address
    fn neighbor_solicit(&self, dev: &mut DeviceContext) -> Result<Disposition, DropReason> {
        let ll_len = dev.link_layer().header_len();
        let local_addr = dev.ipv6_addr();
        let local_mac = dev.mac_addr();
        let link_layer = dev.link_layer();

        {
            let buf = dev.buffer_mut().as_mut_slice();
            if buf.len() < ll_len + IPV6_HEADER_SIZE + NDP_SOLICIT_MIN_SIZE {
                return Err(DropReason::UnsupportedType);
            }

            let (ip_bytes, icmp_bytes) = buf[ll_len..].split_at_mut(IPV6_HEADER_SIZE);
            let mut ip = Ipv6HeaderMut::new_checked(ip_bytes)
                .map_err(|_| DropReason::UnsupportedType)?;
            let mut icmp = Icmpv6Message::new_checked(icmp_bytes)
                .map_err(|_| DropReason::UnsupportedType)?;

            // Only solicitations for our own address are answered; proxying
            // and duplicate-address-detection handling live elsewhere.
            if icmp.target_addr() != local_addr {
                return Err(DropReason::AddressMismatch);
            }

            let sender = ip.src();

            // A leading source link-layer address option tells us how to
            // reach the sender; later options are not inspected.
            let options = icmp.options();
            if options.len() >= NDP_OPTION_SIZE && options[0] == OPT_SOURCE_LINK_ADDRESS {
                let mut mac = [0u8; 6];
                mac.copy_from_slice(&options[2..8]);
                self.neighbors.upsert(sender, mac);
            }

            // Rewrite the solicitation into a solicited advertisement.
            icmp.set_msg_type(Icmpv6Type::NeighborAdvert);
            icmp.set_ndp_flags(NeighborFlags::SOLICITED);
            icmp.zero_ndp_reserved();

            ip.set_dst(&sender);
            ip.set_src(&local_addr);

            let options = icmp.options_mut();
            options[0] = OPT_TARGET_LINK_ADDRESS;
            options[1] = 1; // length in units of 8 bytes
            options[2..8].copy_from_slice(&local_mac);

            icmp.set_checksum(0);
            let msg_len = (ip.payload_len() as usize).min(icmp.len());
            let sum = checksum::icmpv6_checksum(&local_addr, &sender, &icmp.as_bytes()[..msg_len]);
            icmp.set_checksum(!sum);
        }

        // Turn the frame around so the reply goes back out on the wire the
        // solicitation came in on.
        if link_layer == LinkLayer::Ethernet {
            let buf = dev.buffer_mut().as_mut_slice();
            ethernet::swap_addresses_in_place(buf, &local_mac)
                .map_err(|_| DropReason::UnsupportedType)?;
        }

        Ok(Disposition::Forward)
    }

    /// Turn an echo request into an echo reply
    fn echo_request(&self, dev: &mut DeviceContext) -> Result<Disposition, DropReason> {
        let ll_len = dev.link_layer().header_len();
        let local_addr = dev.ipv6_addr();

        let buf = dev.buffer_mut().as_mut_slice();
        if buf.len() < ll_len + IPV6_HEADER_SIZE + ECHO_HEADER_SIZE {
            return Err(DropReason::UnsupportedType);
        }

        let (ip_bytes, icmp_bytes) = buf[ll_len..].split_at_mut(IPV6_HEADER_SIZE);
        let mut ip = Ipv6HeaderMut::new_checked(ip_bytes).map_err(|_| DropReason::UnsupportedType)?;
        let mut icmp =
            Icmpv6Message::new_checked(icmp_bytes).map_err(|_| DropReason::UnsupportedType)?;

        let sender = ip.src();

        // Identifier, sequence and payload ride along unchanged.
        icmp.set_msg_type(Icmpv6Type::EchoReply);
        ip.set_dst(&sender);
        ip.set_src(&local_addr);

        icmp.set_checksum(0);
        let msg_len = (ip.payload_len() as usize).min(icmp.len());
        let sum = checksum::icmpv6_checksum(&local_addr, &sender, &icmp.as_bytes()[..msg_len]);
        icmp.set_checksum(!sum);

        Ok(Disposition::Forward)
    }

    /// Hand an inbound echo reply to the registered consumer
    #[cfg(feature = "ping")]
    fn echo_reply(&self, dev: &mut DeviceContext) -> Result<Disposition, DropReason> {
        let sink = match &self.echo_sink {
            Some(sink) => sink.clone(),
            // Nobody is waiting; treat like any other unhandled type.
            None => return Err(DropReason::UnsupportedType),
        };

        let offset = dev.link_layer().header_len() + IPV6_HEADER_SIZE;
        if dev.buffer().len() < offset + ECHO_HEADER_SIZE {
            return Err(DropReason::UnsupportedType);
        }

        let flags = {
            let message = &dev.buffer().as_slice()[offset..];
            sink.echo_event(dev, message, PollEvents::ECHO_REPLY)
        };

        if flags == PollEvents::ECHO_REPLY {
            Err(DropReason::UnconsumedReply)
        } else {
            Ok(Disposition::Dispatched)
        }
    }
}

impl Default for Icmpv6Input {
    fn default() -> Self {
        Self::with_defaults()
    }
}
