//! Commands executor: the control loop.

use crate::commands::CommandsDecoder;
use crate::error::{Error, Result};
use crate::motion::{PwmController, SteppersController, TimingDiagnostics};
use crate::payload::InputsState;
use crate::protocol::{
    Answer, Command, CommandCode, Payload, DEFAULT_SEQUENCE_MODULUS, STATE_OK, STATE_REJECTED,
};
use crate::transport::{MemoryRegion, PacketStream};

use super::bus::RegisterTransfer;
use super::clock::Clock;
use super::registers::{RegisterImage, MAX_REGISTER_BYTES};

/// Bytes moved from the commands stream into the decoder per read.
const INBOUND_CHUNK: usize = 64;

/// Largest answer packet published in one tick.
const OUTBOUND_PACKET: usize = 256;

/// Executor settings.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Modulus of the 15-bit sequence number.
    pub sequence_modulus: u16,
    /// Minimum interval between two stepper ticks, in seconds.
    pub min_update_interval: f64,
    /// Steppers enabled at startup, one bit per pin.
    pub enabled_mask: u8,
    /// Register image length in bytes.
    pub register_length: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            sequence_modulus: DEFAULT_SEQUENCE_MODULUS,
            min_update_interval: crate::motion::DEFAULT_MIN_UPDATE_INTERVAL,
            enabled_mask: 0xFF,
            register_length: super::registers::DEFAULT_REGISTER_BYTES,
        }
    }
}

/// Single-threaded control loop.
///
/// Reads commands from one packet stream, drives the steppers and PWM
/// controllers, exchanges the register image with the bus every tick and
/// publishes answers on a second packet stream.
///
/// Generic over:
/// - `C`: region carrying commands (must implement `MemoryRegion`)
/// - `A`: region carrying answers (must implement `MemoryRegion`)
/// - `B`: register bus (must implement `RegisterTransfer`)
pub struct CommandsExecutor<C, A, B>
where
    C: MemoryRegion,
    A: MemoryRegion,
    B: RegisterTransfer,
{
    commands: PacketStream<C>,
    answers: PacketStream<A>,
    bus: B,
    sequencer: CommandsDecoder,
    steppers: SteppersController,
    pwm: PwmController,
    image: RegisterImage,
    inbound: [u8; MAX_REGISTER_BYTES],
    /// Movement command occupying the slot; its payload lives in the
    /// steppers controller.
    current: Option<Command>,
    /// Read position in the latched command packet, if any.
    packet_offset: Option<usize>,
}

impl<C, A, B> CommandsExecutor<C, A, B>
where
    C: MemoryRegion,
    A: MemoryRegion,
    B: RegisterTransfer,
{
    /// Create an executor over opened streams.
    pub fn new(
        commands: PacketStream<C>,
        answers: PacketStream<A>,
        bus: B,
        settings: &ExecutorSettings,
    ) -> Result<Self> {
        let mut image = RegisterImage::new(settings.register_length)?;
        let steppers = SteppersController::new(settings.min_update_interval);
        steppers.enable_steppers(settings.enabled_mask, &mut image);

        Ok(Self {
            commands,
            answers,
            bus,
            sequencer: CommandsDecoder::new(settings.sequence_modulus),
            steppers,
            pwm: PwmController::new(),
            image,
            inbound: [0; MAX_REGISTER_BYTES],
            current: None,
            packet_offset: None,
        })
    }

    /// Timing counters of the steppers controller.
    pub fn diagnostics(&self) -> TimingDiagnostics {
        self.steppers.diagnostics()
    }

    /// Register image sent on the last tick.
    pub fn registers(&self) -> &RegisterImage {
        &self.image
    }

    /// Input bytes read on the last tick.
    pub fn inputs(&self) -> &[u8] {
        &self.inbound[..self.image.len()]
    }

    /// Movement command currently executing.
    pub fn current(&self) -> Option<&Command> {
        self.current.as_ref()
    }

    /// The register bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Run ticks until an error stops the loop.
    pub fn run<K: Clock>(&mut self, clock: &mut K) -> Error {
        loop {
            if let Err(e) = self.tick(clock.now()) {
                log::error!("control loop stopped: {}", e);
                return e;
            }
        }
    }

    /// Run one loop iteration at time `now` (seconds).
    pub fn tick(&mut self, now: f64) -> Result<()> {
        self.steppers.update(now, &mut self.image);
        self.retire_movement()?;
        self.pump_commands()?;
        self.run_immediate()?;
        self.run_sequenced()?;
        self.pwm.update(now, &mut self.image);

        let len = self.image.len();
        self.bus
            .transfer(self.image.as_slice(), &mut self.inbound[..len])?;

        self.publish_answers()
    }

    fn retire_movement(&mut self) -> Result<()> {
        if self.steppers.is_busy() || !self.sequencer.can_queue_answer() {
            return Ok(());
        }
        if let Some(command) = self.current.take() {
            self.sequencer
                .queue_answer(Answer::to_command(&command, STATE_OK))?;
        }
        Ok(())
    }

    fn pump_commands(&mut self) -> Result<()> {
        if self.packet_offset.is_none() {
            if !self.commands.readable()? {
                return Ok(());
            }
            self.commands.receive()?;
            self.packet_offset = Some(0);
        }

        let mut offset = self.packet_offset.unwrap_or(0);
        let mut chunk = [0u8; INBOUND_CHUNK];
        loop {
            let read = self.commands.read_payload(offset, &mut chunk)?;
            if read == 0 {
                break;
            }
            let consumed = self.sequencer.feed(&chunk[..read])?;
            offset += consumed;
            if consumed < read {
                // Command queues are full.
                self.packet_offset = Some(offset);
                return Ok(());
            }
        }

        self.commands.acknowledge()?;
        self.packet_offset = None;
        Ok(())
    }

    fn run_immediate(&mut self) -> Result<()> {
        while self.sequencer.can_queue_answer() {
            let Some(command) = self.sequencer.pop_immediate() else {
                break;
            };
            let answer = match command.code {
                CommandCode::Move => {
                    log::debug!("immediate movement {} rejected", command.sequence());
                    Answer::to_command(&command, STATE_REJECTED)
                }
                _ => self.execute(command)?,
            };
            self.sequencer.queue_answer(answer)?;
        }
        Ok(())
    }

    fn run_sequenced(&mut self) -> Result<()> {
        while self.current.is_none() && self.sequencer.can_queue_answer() {
            let Some(command) = self.sequencer.pop_sequenced() else {
                break;
            };
            if let Payload::Movement(movement) = command.payload {
                log::debug!("movement {} installed", command.id);
                if self.steppers.queue_movement(movement).is_err() {
                    // The slot is free, so the controller has nothing queued.
                    log::error!("steppers controller busy without a current command");
                }
                self.current = Some(Command {
                    payload: Payload::Empty,
                    ..command
                });
            } else {
                let answer = self.execute(command)?;
                self.sequencer.queue_answer(answer)?;
            }
        }
        Ok(())
    }

    /// Execute a fire-and-configure command and build its answer.
    fn execute(&mut self, command: Command) -> Result<Answer> {
        match command.payload {
            Payload::Pwm(pwm) => {
                self.pwm.configure(pwm).map_err(|e| {
                    log::error!("command {} rejected: {}", command.id, e);
                    e
                })?;
                Ok(Answer::to_command(&command, STATE_OK))
            }
            Payload::EnableSteppers(enable) => {
                self.steppers.enable_steppers(enable.mask, &mut self.image);
                Ok(Answer::to_command(&command, STATE_OK))
            }
            Payload::Empty if command.code == CommandCode::ReadInputs => {
                let pins = u16::from_le_bytes([self.inbound[0], self.inbound[1]]);
                Ok(Answer::inputs(command.id, InputsState::from_pins(pins)))
            }
            _ => Ok(Answer::to_command(&command, STATE_REJECTED)),
        }
    }

    fn publish_answers(&mut self) -> Result<()> {
        if !self.sequencer.has_pending_answers() || !self.answers.writable()? {
            return Ok(());
        }
        let mut packet = [0u8; OUTBOUND_PACKET];
        let limit = self.answers.capacity().min(OUTBOUND_PACKET);
        let written = self.sequencer.encode_answers(&mut packet[..limit])?;
        if written > 0 {
            self.answers.publish(&packet[..written])?;
        }
        Ok(())
    }
}
