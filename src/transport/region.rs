//! Memory region collaborator.

use crate::error::TransportError;

/// Fixed-size byte region shared with another process.
///
/// Accesses copy bytes in and out of the region; the packet stream orders
/// them with atomic fences.
pub trait MemoryRegion {
    /// Attach to the region, zeroing it when `initialize` is set.
    ///
    /// Fails with [`TransportError::AlreadyOpen`] if already attached.
    fn open(&mut self, initialize: bool) -> Result<(), TransportError>;

    /// Detach from the region.
    ///
    /// Fails with [`TransportError::NotOpen`] if not attached.
    fn close(&mut self) -> Result<(), TransportError>;

    /// Whether the region is attached.
    fn is_open(&self) -> bool;

    /// Region size in bytes.
    fn size(&self) -> usize;

    /// Copy `out.len()` bytes starting at `offset` into `out`.
    fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), TransportError>;

    /// Copy `bytes` into the region starting at `offset`.
    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Bounds check shared by region implementations.
pub(crate) fn check_bounds(size: usize, offset: usize, length: usize) -> Result<(), TransportError> {
    match offset.checked_add(length) {
        Some(end) if end <= size => Ok(()),
        _ => Err(TransportError::OutOfBounds { offset, length }),
    }
}
