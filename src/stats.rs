//! Protocol statistics counters
//!
//! Counters are relaxed atomics so the receive path can bump them from an
//! interrupt-equivalent context without taking a lock. Nothing in the input
//! processing branches on a counter value; observers that do not care simply
//! never read them.

use core::sync::atomic::{AtomicU64, Ordering};

/// A single monotonically increasing event counter
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Record one event
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// ICMPv6 receive-path counters
#[derive(Debug, Default)]
pub struct Icmpv6Stats {
    /// Messages received
    pub recv: Counter,
    /// Replies produced or delivered
    pub sent: Counter,
    /// Packets dropped without a reply
    pub drop: Counter,
    /// Messages of a type with no handler
    pub typeerr: Counter,
}

/// IP-layer counters
#[derive(Debug, Default)]
pub struct IpStats {
    /// Packets handed to the link layer for transmission
    pub sent: Counter,
}

/// Aggregate network statistics
#[derive(Debug, Default)]
pub struct NetStats {
    /// ICMPv6 counters
    pub icmpv6: Icmpv6Stats,
    /// IP-layer counters
    pub ip: IpStats,
}

impl NetStats {
    /// Create a zeroed statistics block
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_zero() {
        let counter = Counter::default();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_counter_increments() {
        let counter = Counter::default();
        counter.increment();
        counter.increment();
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_net_stats_counters_are_independent() {
        let stats = NetStats::new();
        stats.icmpv6.recv.increment();
        stats.icmpv6.drop.increment();
        assert_eq!(stats.icmpv6.recv.get(), 1);
        assert_eq!(stats.icmpv6.drop.get(), 1);
        assert_eq!(stats.icmpv6.sent.get(), 0);
        assert_eq!(stats.ip.sent.get(), 0);
    }
}
