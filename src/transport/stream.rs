//! Packet-id handshake over a memory region.
//!
//! Header layout:
//!
//! | offset | size | field                              |
//! |--------|------|------------------------------------|
//! | 0      | 1    | packet id, bumped by the producer  |
//! | 1      | 4    | payload length, little-endian      |
//! | 5      | 1    | packet id acknowledged by consumer |
//! | 6      | 2    | reserved                           |
//! | 8      | ..   | payload                            |
//!
//! One stream is a single-producer/single-consumer channel. The controller
//! consumes commands on one stream and produces answers on a second one.

use core::sync::atomic::{fence, Ordering};

use crate::error::TransportError;

use super::region::MemoryRegion;

/// Bytes reserved in front of the payload.
pub const HEADER_SIZE: usize = 8;

const ID_OFFSET: usize = 0;
const LENGTH_OFFSET: usize = 1;
const ACK_OFFSET: usize = 5;

/// One direction of the shared memory channel.
#[derive(Debug)]
pub struct PacketStream<R> {
    region: R,
    local_id: u8,
    pending: usize,
}

impl<R: MemoryRegion> PacketStream<R> {
    /// Wrap an opened region.
    ///
    /// The last packet id found in the region counts as already observed,
    /// so a stale packet left by a previous session is not consumed.
    pub fn new(region: R) -> Result<Self, TransportError> {
        if !region.is_open() {
            return Err(TransportError::NotOpen);
        }
        if region.size() <= HEADER_SIZE {
            return Err(TransportError::RegionTooSmall {
                size: region.size(),
                minimum: HEADER_SIZE + 1,
            });
        }
        let mut stream = Self {
            region,
            local_id: 0,
            pending: 0,
        };
        stream.local_id = stream.remote_id()?;
        Ok(stream)
    }

    /// Largest payload a packet can carry.
    pub fn capacity(&self) -> usize {
        self.region.size() - HEADER_SIZE
    }

    /// Last packet id latched or published by this side.
    pub fn local_id(&self) -> u8 {
        self.local_id
    }

    /// The wrapped region.
    pub fn region(&self) -> &R {
        &self.region
    }

    /// Unwrap the region.
    pub fn into_region(self) -> R {
        self.region
    }

    fn remote_id(&self) -> Result<u8, TransportError> {
        let mut id = [0u8; 1];
        self.region.read(ID_OFFSET, &mut id)?;
        fence(Ordering::Acquire);
        Ok(id[0])
    }

    fn ack_id(&self) -> Result<u8, TransportError> {
        let mut ack = [0u8; 1];
        self.region.read(ACK_OFFSET, &mut ack)?;
        fence(Ordering::Acquire);
        Ok(ack[0])
    }

    /// Whether the producer published a packet this side has not latched.
    pub fn readable(&self) -> Result<bool, TransportError> {
        Ok(self.remote_id()? != self.local_id)
    }

    /// Latch the current packet and return its payload length.
    pub fn receive(&mut self) -> Result<usize, TransportError> {
        self.local_id = self.remote_id()?;
        let mut raw = [0u8; 4];
        self.region.read(LENGTH_OFFSET, &mut raw)?;
        let length = u32::from_le_bytes(raw) as usize;
        if length > self.capacity() {
            self.pending = 0;
            return Err(TransportError::PayloadTooLarge {
                length,
                capacity: self.capacity(),
            });
        }
        self.pending = length;
        Ok(length)
    }

    /// Payload length of the latched packet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Copy latched payload bytes starting at `offset` into `out`.
    ///
    /// Returns the number of bytes copied, 0 past the end of the payload.
    pub fn read_payload(&self, offset: usize, out: &mut [u8]) -> Result<usize, TransportError> {
        let count = out.len().min(self.pending.saturating_sub(offset));
        if count > 0 {
            self.region.read(HEADER_SIZE + offset, &mut out[..count])?;
        }
        Ok(count)
    }

    /// Tell the producer the latched packet is consumed.
    pub fn acknowledge(&mut self) -> Result<(), TransportError> {
        fence(Ordering::Release);
        self.region.write(ACK_OFFSET, &[self.local_id])
    }

    /// Whether the consumer acknowledged the last published packet.
    pub fn writable(&self) -> Result<bool, TransportError> {
        Ok(self.ack_id()? == self.local_id)
    }

    /// Write a packet and bump the packet id.
    pub fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > self.capacity() {
            return Err(TransportError::PayloadTooLarge {
                length: payload.len(),
                capacity: self.capacity(),
            });
        }
        self.region.write(HEADER_SIZE, payload)?;
        self.region
            .write(LENGTH_OFFSET, &(payload.len() as u32).to_le_bytes())?;
        fence(Ordering::Release);
        self.local_id = self.local_id.wrapping_add(1);
        self.region.write(ID_OFFSET, &[self.local_id])
    }
}
