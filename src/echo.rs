//! Echo-reply delivery
//!
//! When a thread (or task) is waiting for a ping response, it registers an
//! [`EchoSink`] with the input processor. Inbound echo replies are handed to
//! the sink instead of being turned around in the buffer; the sink signals
//! consumption by clearing the event flag it was invoked with.
//!
//! The registration is a handle injected at processor construction, so each
//! interface can have its own consumer without cross-talk.

use crate::device::DeviceContext;
use bitflags::bitflags;

bitflags! {
    /// Events delivered to a registered echo consumer
    pub struct PollEvents: u16 {
        /// An echo reply arrived
        const ECHO_REPLY = 0b0000_0001;
    }
}

/// A consumer waiting for echo replies
///
/// `message` is the raw ICMPv6 echo-reply message (type, code, checksum,
/// identifier, sequence, payload). Implementations return the flags with the
/// bits they consumed cleared; returning them unchanged means the reply was
/// not taken and the packet will be dropped.
pub trait EchoSink: Send + Sync {
    fn echo_event(&self, dev: &DeviceContext, message: &[u8], flags: PollEvents) -> PollEvents;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::LinkLayer;

    struct ConsumeAll;

    impl EchoSink for ConsumeAll {
        fn echo_event(&self, _dev: &DeviceContext, _message: &[u8], flags: PollEvents) -> PollEvents {
            flags - PollEvents::ECHO_REPLY
        }
    }

    #[test]
    fn test_sink_clears_consumed_event() {
        let dev = DeviceContext::new("eth0", [0; 16], [0; 6], LinkLayer::Ethernet);
        let flags = ConsumeAll.echo_event(&dev, &[], PollEvents::ECHO_REPLY);
        assert!(!flags.contains(PollEvents::ECHO_REPLY));
    }
}
