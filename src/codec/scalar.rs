//! Little-endian scalar fields, assembled or emitted one byte at a time.

/// Width of the widest wire scalar (`f64`).
const MAX_WIDTH: usize = 8;

/// Fixed-width numeric type carried on the wire in little-endian order.
pub trait WireScalar: Copy {
    /// Number of bytes on the wire.
    const WIDTH: usize;

    /// Reinterpret the first `WIDTH` bytes.
    fn from_le(bytes: &[u8; MAX_WIDTH]) -> Self;

    /// Write the value into the first `WIDTH` bytes.
    fn to_le(self, bytes: &mut [u8; MAX_WIDTH]);
}

macro_rules! wire_scalar {
    ($($ty:ty),*) => {
        $(
            impl WireScalar for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn from_le(bytes: &[u8; MAX_WIDTH]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn to_le(self, bytes: &mut [u8; MAX_WIDTH]) {
                    bytes[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

wire_scalar!(u8, u16, i32, u32, f64);

/// Scratch buffer accumulating one scalar field.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeAccumulator {
    bytes: [u8; MAX_WIDTH],
    len: usize,
    width: usize,
}

impl LeAccumulator {
    /// Begin a new field of type `T`.
    #[inline]
    pub fn start<T: WireScalar>(&mut self) {
        self.bytes = [0; MAX_WIDTH];
        self.len = 0;
        self.width = T::WIDTH;
    }

    /// Width of the field in progress (0 before the first `start`).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of bytes accumulated for the field in progress.
    #[inline]
    pub fn filled(&self) -> usize {
        self.len
    }

    /// Append one byte. Returns `true` once the field is complete.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len < self.width {
            self.bytes[self.len] = byte;
            self.len += 1;
        }
        self.len == self.width
    }

    /// Reinterpret the accumulated bytes.
    #[inline]
    pub fn value<T: WireScalar>(&self) -> T {
        T::from_le(&self.bytes)
    }
}

/// Byte source for one scalar field.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeEmitter {
    bytes: [u8; MAX_WIDTH],
    index: usize,
    width: usize,
}

impl LeEmitter {
    /// Emitter for `value`.
    #[inline]
    pub fn of<T: WireScalar>(value: T) -> Self {
        let mut bytes = [0; MAX_WIDTH];
        value.to_le(&mut bytes);
        Self {
            bytes,
            index: 0,
            width: T::WIDTH,
        }
    }

    /// Next byte, or `None` once the field is exhausted.
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        if self.index >= self.width {
            return None;
        }
        let byte = self.bytes[self.index];
        self.index += 1;
        Some(byte)
    }

    /// Whether every byte has been emitted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index >= self.width
    }
}
