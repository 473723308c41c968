//! In-process memory region.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::TransportError;

use super::region::{check_bounds, MemoryRegion};

/// Heap-backed region.
///
/// [`HeapRegion::attach`] returns a second handle on the same bytes, which
/// lets a host and a controller talk in one process.
#[derive(Debug, Clone)]
pub struct HeapRegion {
    bytes: Rc<RefCell<Box<[u8]>>>,
    opened: bool,
}

impl HeapRegion {
    /// Allocate a closed region of `size` zeroed bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: Rc::new(RefCell::new(vec![0u8; size].into_boxed_slice())),
            opened: false,
        }
    }

    /// Another closed handle on the same bytes.
    pub fn attach(&self) -> Self {
        Self {
            bytes: Rc::clone(&self.bytes),
            opened: false,
        }
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.opened {
            Ok(())
        } else {
            Err(TransportError::NotOpen)
        }
    }
}

impl MemoryRegion for HeapRegion {
    fn open(&mut self, initialize: bool) -> Result<(), TransportError> {
        if self.opened {
            return Err(TransportError::AlreadyOpen);
        }
        if initialize {
            self.bytes.borrow_mut().fill(0);
        }
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.opened = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn size(&self) -> usize {
        self.bytes.borrow().len()
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), TransportError> {
        self.ensure_open()?;
        let bytes = self.bytes.borrow();
        check_bounds(bytes.len(), offset, out.len())?;
        out.copy_from_slice(&bytes[offset..offset + out.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), TransportError> {
        self.ensure_open()?;
        let mut bytes = self.bytes.borrow_mut();
        check_bounds(bytes.len(), offset, data.len())?;
        bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}
