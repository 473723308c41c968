//! Register transfer over SPI-driven shift registers.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::BusError;

/// Duplex register transfer, performed once per tick.
pub trait RegisterTransfer {
    /// Shift `out` to the output registers while reading the input
    /// registers into `input`. Both slices have the same length.
    fn transfer(&mut self, out: &[u8], input: &mut [u8]) -> Result<(), BusError>;
}

/// Shift-register chain on an SPI bus.
///
/// Generic over:
/// - `SPI`: bus clocking the chain (must implement `SpiBus`)
/// - `CS`: chip-select line, active low (must implement `OutputPin`)
/// - `PL`: parallel-load line latching the inputs, active low (must
///   implement `OutputPin`)
pub struct RegisterBus<SPI, CS, PL>
where
    SPI: SpiBus,
    CS: OutputPin,
    PL: OutputPin,
{
    spi: SPI,
    cs: CS,
    pl: PL,
}

impl<SPI, CS, PL> RegisterBus<SPI, CS, PL>
where
    SPI: SpiBus,
    CS: OutputPin,
    PL: OutputPin,
{
    /// Wrap the bus and its control lines.
    pub fn new(spi: SPI, cs: CS, pl: PL) -> Self {
        Self { spi, cs, pl }
    }

    /// Release the bus and its control lines.
    pub fn release(self) -> (SPI, CS, PL) {
        (self.spi, self.cs, self.pl)
    }
}

impl<SPI, CS, PL> RegisterTransfer for RegisterBus<SPI, CS, PL>
where
    SPI: SpiBus,
    CS: OutputPin,
    PL: OutputPin,
{
    fn transfer(&mut self, out: &[u8], input: &mut [u8]) -> Result<(), BusError> {
        if out.len() != input.len() {
            return Err(BusError::LengthMismatch {
                out: out.len(),
                input: input.len(),
            });
        }

        // Latch the inputs into the shift registers.
        self.pl.set_low().map_err(|_| BusError::Pin)?;
        self.pl.set_high().map_err(|_| BusError::Pin)?;

        self.cs.set_low().map_err(|_| BusError::Pin)?;
        let result = self
            .spi
            .transfer(input, out)
            .and_then(|_| self.spi.flush())
            .map_err(|_| BusError::Transfer);
        self.cs.set_high().map_err(|_| BusError::Pin)?;
        result
    }
}
