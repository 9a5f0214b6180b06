//! IPv6 neighbor cache
//!
//! Maps on-link IPv6 addresses to link-layer addresses. The ICMPv6 receive
//! path upserts an entry whenever a neighbor solicitation for the local
//! address carries a source link-layer address option; lookups are used by
//! the transmit side when framing outbound packets.
//!
//! Entries learned from the receive path start out `Reachable`. Aging them
//! to `Stale` is the job of a periodic timer outside this crate.

use crate::{Ipv6Address, Ipv6Display, MacAddress, MacDisplay};
use alloc::collections::BTreeMap;
use spin::RwLock;

/// Neighbor entry states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborState {
    /// Entry was recently confirmed
    Reachable,
    /// Entry may be outdated but is still usable
    Stale,
}

/// Neighbor cache entry
#[derive(Debug, Clone)]
pub struct NeighborEntry {
    /// IPv6 address of the neighbor
    pub ipv6_addr: Ipv6Address,
    /// Link-layer address of the neighbor
    pub mac_addr: MacAddress,
    /// Entry state
    pub state: NeighborState,
    /// Number of times this entry was updated
    pub update_count: u64,
}

/// IPv6 neighbor cache
pub struct NeighborCache {
    entries: RwLock<BTreeMap<Ipv6Address, NeighborEntry>>,
}

impl NeighborCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or update the mapping for a neighbor
    ///
    /// Idempotent; repeated upserts with the same mapping leave one entry.
    /// There is no error channel, a full map simply grows.
    pub fn upsert(&self, ipv6_addr: Ipv6Address, mac_addr: MacAddress) {
        let mut entries = self.entries.write();
        let entry = entries.entry(ipv6_addr).or_insert(NeighborEntry {
            ipv6_addr,
            mac_addr,
            state: NeighborState::Reachable,
            update_count: 0,
        });
        entry.mac_addr = mac_addr;
        entry.state = NeighborState::Reachable;
        entry.update_count += 1;

        log::debug!(
            "neighbor: {} is at {}",
            Ipv6Display(&ipv6_addr),
            MacDisplay(&mac_addr)
        );
    }

    /// Look up a neighbor by IPv6 address
    pub fn lookup(&self, ipv6_addr: &Ipv6Address) -> Option<NeighborEntry> {
        self.entries.read().get(ipv6_addr).cloned()
    }

    /// Number of cached neighbors
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for NeighborCache {
    fn default() -> Self {
        Self::new()
    }
}
