//! PWM controller.

use crate::error::ProtocolError;
use crate::executor::{RegisterImage, PWM_REGISTER};
use crate::payload::PwmPayload;

/// Number of PWM channels, one per bit of the PWM register.
pub const PWM_CHANNELS: usize = 8;

/// Software PWM over the PWM register.
#[derive(Debug, Clone, Default)]
pub struct PwmController {
    channels: [Option<PwmPayload>; PWM_CHANNELS],
}

impl PwmController {
    /// Create a controller with every channel unconfigured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the channel named by `pwm.pin`, replacing any previous duty.
    pub fn configure(&mut self, pwm: PwmPayload) -> Result<(), ProtocolError> {
        let slot = self
            .channels
            .get_mut(usize::from(pwm.pin))
            .ok_or(ProtocolError::InvalidPin(pwm.pin))?;
        *slot = Some(pwm);
        Ok(())
    }

    /// Unconfigure a channel.
    pub fn clear(&mut self, pin: u8) {
        if let Some(slot) = self.channels.get_mut(usize::from(pin)) {
            *slot = None;
        }
    }

    /// Configuration of a channel.
    pub fn channel(&self, pin: u8) -> Option<&PwmPayload> {
        self.channels.get(usize::from(pin)).and_then(Option::as_ref)
    }

    /// Channel mask at `now`; unconfigured channels stay low.
    pub fn mask(&self, now: f64) -> u8 {
        self.channels
            .iter()
            .enumerate()
            .filter_map(|(pin, channel)| channel.as_ref().map(|pwm| (pin, pwm)))
            .filter(|(_, pwm)| pwm.is_active(now))
            .fold(0, |mask, (pin, _)| mask | (1 << pin))
    }

    /// Write the channel mask at `now` into the PWM register.
    pub fn update(&self, now: f64, image: &mut RegisterImage) -> u8 {
        let mask = self.mask(now);
        image.set(PWM_REGISTER, mask);
        mask
    }
}
