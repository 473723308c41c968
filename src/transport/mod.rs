//! Shared memory transport.
//!
//! A [`PacketStream`] moves whole packets through a [`MemoryRegion`] using a
//! one-byte packet id handshake.

#[cfg(feature = "std")]
mod heap;
#[cfg(feature = "std")]
mod mapped;
mod region;
mod stream;

#[cfg(feature = "std")]
pub use heap::HeapRegion;
#[cfg(feature = "std")]
pub use mapped::{open_streams, FileRegion};
pub use region::MemoryRegion;
pub use stream::{PacketStream, HEADER_SIZE};
