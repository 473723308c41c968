//! Stepper movement payload.
//!
//! A movement is a multi-pin stepper motion sharing one acceleration
//! profile. Each participating pin gets one [`StepperMove`], ordered by
//! ascending pin number.

use heapless::Vec;

use crate::codec::{ByteDecoder, ByteEncoder, LeAccumulator, LeEmitter, Step};
use crate::error::ProtocolError;

/// Maximum number of moves in one movement (one per bit of the pin mask).
pub const MAX_MOVES: usize = 8;

/// Per-pin step target within a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperMove {
    /// Stepper pin (0-7).
    pub pin: u8,
    /// Signed step count; the sign is the direction.
    pub target: i32,
    /// Steps issued so far.
    pub current: u32,
}

impl StepperMove {
    /// Create a move with no steps issued.
    #[inline]
    pub fn new(pin: u8, target: i32) -> Self {
        Self {
            pin,
            target,
            current: 0,
        }
    }

    /// Register bit for this pin.
    #[inline]
    pub fn pin_mask(&self) -> u8 {
        1 << self.pin
    }

    /// Total number of steps to issue.
    #[inline]
    pub fn steps(&self) -> u32 {
        self.target.unsigned_abs()
    }

    /// Whether every step has been issued.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.current >= self.steps()
    }
}

/// Stepper movement request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepperMovementPayload {
    /// Nominal duration in seconds.
    pub duration: f64,
    /// Initial normalized speed.
    pub initial_speed: f64,
    /// Normalized acceleration.
    pub acceleration: f64,
    /// Time the movement became current, in seconds.
    pub start_time: f64,
    /// Moves in ascending pin order.
    pub moves: Vec<StepperMove, MAX_MOVES>,
}

impl StepperMovementPayload {
    /// Create a movement with no moves.
    pub fn new(duration: f64, initial_speed: f64, acceleration: f64) -> Self {
        Self {
            duration,
            initial_speed,
            acceleration,
            start_time: 0.0,
            moves: Vec::new(),
        }
    }

    /// Add a move, keeping moves sorted by pin.
    pub fn add_move(&mut self, pin: u8, target: i32) -> Result<(), ProtocolError> {
        if pin as usize >= MAX_MOVES {
            return Err(ProtocolError::InvalidPin(pin));
        }
        if self.moves.iter().any(|m| m.pin == pin) {
            return Err(ProtocolError::DuplicatePin(pin));
        }
        let index = self.moves.iter().position(|m| m.pin > pin).unwrap_or(self.moves.len());
        // Unique pins below MAX_MOVES cannot exceed the capacity.
        self.moves
            .insert(index, StepperMove::new(pin, target))
            .map_err(|_| ProtocolError::InvalidPin(pin))
    }

    /// Builder-style [`StepperMovementPayload::add_move`].
    pub fn with_move(mut self, pin: u8, target: i32) -> Result<Self, ProtocolError> {
        self.add_move(pin, target)?;
        Ok(self)
    }

    /// Mask of every participating pin.
    pub fn pin_mask(&self) -> u8 {
        self.moves.iter().fold(0, |mask, m| mask | m.pin_mask())
    }

    /// Whether duration, initial speed and acceleration are all finite.
    pub fn has_finite_profile(&self) -> bool {
        self.duration.is_finite() && self.initial_speed.is_finite() && self.acceleration.is_finite()
    }

    /// Normalized position along the profile after `elapsed` seconds.
    #[inline]
    pub fn position_factor(&self, elapsed: f64) -> f64 {
        0.5 * self.acceleration * elapsed * elapsed + self.initial_speed * elapsed
    }

    /// Whether every move has issued all of its steps.
    pub fn is_finished(&self) -> bool {
        self.moves.iter().all(StepperMove::is_finished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MovementField {
    PinMask,
    Duration,
    InitialSpeed,
    Acceleration,
    Target(usize),
    Done,
}

/// Decoder: pin mask, duration, initial speed, acceleration, then one
/// `i32` target per set bit of the mask.
///
/// A zero pin mask completes the movement immediately.
#[derive(Debug, Clone)]
pub struct StepperMovementDecoder {
    field: MovementField,
    acc: LeAccumulator,
    partial: StepperMovementPayload,
    output: Option<StepperMovementPayload>,
}

impl Default for StepperMovementDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StepperMovementDecoder {
    /// Create a decoder waiting for the pin mask.
    pub fn new() -> Self {
        Self {
            field: MovementField::PinMask,
            acc: LeAccumulator::default(),
            partial: StepperMovementPayload::default(),
            output: None,
        }
    }

    fn finish(&mut self) -> Step {
        self.output = Some(core::mem::take(&mut self.partial));
        self.field = MovementField::Done;
        Step::Done
    }
}

impl ByteDecoder for StepperMovementDecoder {
    type Output = StepperMovementPayload;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        match self.field {
            MovementField::PinMask => {
                for pin in (0..MAX_MOVES as u8).filter(|pin| byte & (1 << *pin) != 0) {
                    self.partial.add_move(pin, 0)?;
                }
                if byte == 0 {
                    return Ok(self.finish());
                }
                self.acc.start::<f64>();
                self.field = MovementField::Duration;
            }
            MovementField::Duration => {
                if self.acc.push(byte) {
                    self.partial.duration = self.acc.value();
                    self.acc.start::<f64>();
                    self.field = MovementField::InitialSpeed;
                }
            }
            MovementField::InitialSpeed => {
                if self.acc.push(byte) {
                    self.partial.initial_speed = self.acc.value();
                    self.acc.start::<f64>();
                    self.field = MovementField::Acceleration;
                }
            }
            MovementField::Acceleration => {
                if self.acc.push(byte) {
                    self.partial.acceleration = self.acc.value();
                    if !self.partial.has_finite_profile() {
                        return Err(ProtocolError::NonFiniteProfile);
                    }
                    self.acc.start::<i32>();
                    self.field = MovementField::Target(0);
                }
            }
            MovementField::Target(index) => {
                if self.acc.push(byte) {
                    self.partial.moves[index].target = self.acc.value();
                    if index + 1 >= self.partial.moves.len() {
                        return Ok(self.finish());
                    }
                    self.acc.start::<i32>();
                    self.field = MovementField::Target(index + 1);
                }
            }
            MovementField::Done => return Err(ProtocolError::AlreadyDone),
        }
        Ok(Step::Pending)
    }

    fn done(&self) -> bool {
        self.field == MovementField::Done
    }

    fn output(&self) -> Option<&StepperMovementPayload> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<StepperMovementPayload> {
        self.output.take()
    }

    fn reset(&mut self) {
        self.field = MovementField::PinMask;
        self.partial = StepperMovementPayload::default();
        self.output = None;
    }
}

/// Encoder, the dual of [`StepperMovementDecoder`].
#[derive(Debug, Clone)]
pub struct StepperMovementEncoder {
    field: MovementField,
    input: StepperMovementPayload,
    emitter: LeEmitter,
}

impl StepperMovementEncoder {
    /// Create an encoder for `input`.
    pub fn new(input: StepperMovementPayload) -> Self {
        Self {
            field: MovementField::PinMask,
            input,
            emitter: LeEmitter::default(),
        }
    }

    /// Advance to the field after the one whose bytes just ran out.
    fn advance(&mut self) {
        let field = self.field;
        self.field = match field {
            MovementField::Duration => {
                self.emitter = LeEmitter::of(self.input.initial_speed);
                MovementField::InitialSpeed
            }
            MovementField::InitialSpeed => {
                self.emitter = LeEmitter::of(self.input.acceleration);
                MovementField::Acceleration
            }
            MovementField::Acceleration => self.target_field(0),
            MovementField::Target(index) => self.target_field(index + 1),
            field => field,
        };
    }

    fn target_field(&mut self, index: usize) -> MovementField {
        match self.input.moves.get(index) {
            Some(m) => {
                self.emitter = LeEmitter::of(m.target);
                MovementField::Target(index)
            }
            None => MovementField::Done,
        }
    }
}

impl ByteEncoder for StepperMovementEncoder {
    type Input = StepperMovementPayload;

    fn init(&mut self, input: StepperMovementPayload) -> Result<(), ProtocolError> {
        *self = Self::new(input);
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        match self.field {
            MovementField::PinMask => {
                let mask = self.input.pin_mask();
                if self.input.moves.is_empty() {
                    self.field = MovementField::Done;
                } else {
                    self.emitter = LeEmitter::of(self.input.duration);
                    self.field = MovementField::Duration;
                }
                Ok(mask)
            }
            MovementField::Done => Err(ProtocolError::AlreadyDone),
            _ => {
                let byte = self.emitter.pop().ok_or(ProtocolError::AlreadyDone)?;
                if self.emitter.is_empty() {
                    self.advance();
                }
                Ok(byte)
            }
        }
    }

    fn done(&self) -> bool {
        self.field == MovementField::Done
    }
}
