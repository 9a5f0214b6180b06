//! Packet buffer
//!
//! A single mutable byte buffer owned by the device context for the lifetime
//! of one receive-then-possibly-transmit cycle. Header views constructed by
//! the protocol modules write straight into this memory; the bytes that get
//! transmitted are the bytes that were mutated, with no copy step in between.

use crate::{NetworkError, NetworkResult};
use alloc::{vec, vec::Vec};

/// Network packet buffer
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    /// Raw packet data
    data: Vec<u8>,
    /// Valid packet length
    length: usize,
}

impl PacketBuffer {
    /// Create a new packet buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            length: 0,
        }
    }

    /// Create packet buffer from existing data
    pub fn from_data(data: Vec<u8>) -> Self {
        let length = data.len();
        Self { data, length }
    }

    /// Buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Valid packet length
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check whether the buffer holds no packet
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Set the valid packet length
    ///
    /// A length of zero marks the buffer as holding nothing to transmit.
    pub fn set_len(&mut self, length: usize) -> NetworkResult<()> {
        if length > self.data.len() {
            return Err(NetworkError::BufferOverflow);
        }
        self.length = length;
        Ok(())
    }

    /// Load a received packet into the buffer
    pub fn load(&mut self, packet: &[u8]) -> NetworkResult<()> {
        if packet.len() > self.data.len() {
            return Err(NetworkError::BufferTooSmall);
        }
        self.data[..packet.len()].copy_from_slice(packet);
        self.length = packet.len();
        Ok(())
    }

    /// Get the valid packet bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// Get the valid packet bytes for in-place mutation
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.length]
    }
}
