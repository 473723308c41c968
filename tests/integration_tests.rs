//! Integration tests for motion-core.
//!
//! These tests drive the complete path: host-side encoding, the shared
//! memory handshake, the commands executor and the answers coming back.

use motion_core::codec::{decode_from, ByteDecoder, ByteEncoder};
use motion_core::commands::SEQUENCED_QUEUE_CAPACITY;
use motion_core::error::{BusError, Error, ProtocolError};
use motion_core::executor::{
    CommandsExecutor, ExecutorSettings, RegisterTransfer, DIRECTION_REGISTER, ENABLE_REGISTER,
    PWM_REGISTER, STEP_REGISTER,
};
use motion_core::payload::{InputsState, PwmPayload, StepperMove, StepperMovementPayload};
use motion_core::protocol::{
    Answer, AnswerDecoder, AnswerPayload, Command, CommandCode, CommandDecoder, CommandEncoder,
    Payload, STATE_OK, STATE_REJECTED,
};
use motion_core::transport::{HeapRegion, MemoryRegion, PacketStream};

// =============================================================================
// Test fixtures
// =============================================================================

const TICK: f64 = 1e-5;

/// Register bus recording every outbound image and returning fixed inputs.
struct RecordingBus {
    inputs: [u8; 2],
    images: Vec<Vec<u8>>,
}

impl RegisterTransfer for RecordingBus {
    fn transfer(&mut self, out: &[u8], input: &mut [u8]) -> Result<(), BusError> {
        input.fill(0);
        input[..2].copy_from_slice(&self.inputs);
        self.images.push(out.to_vec());
        Ok(())
    }
}

/// Host side of the two streams.
struct Host {
    commands: PacketStream<HeapRegion>,
    answers: PacketStream<HeapRegion>,
    decoder: AnswerDecoder,
}

type Executor = CommandsExecutor<HeapRegion, HeapRegion, RecordingBus>;

fn open_pair(size: usize) -> (HeapRegion, HeapRegion) {
    let mut controller = HeapRegion::new(size);
    let mut host = controller.attach();
    controller.open(true).unwrap();
    host.open(false).unwrap();
    (controller, host)
}

fn setup() -> (Host, Executor) {
    let (commands, host_commands) = open_pair(1024);
    let (answers, host_answers) = open_pair(1024);

    let bus = RecordingBus {
        inputs: [0x34, 0x12],
        images: Vec::new(),
    };
    let executor = CommandsExecutor::new(
        PacketStream::new(commands).unwrap(),
        PacketStream::new(answers).unwrap(),
        bus,
        &ExecutorSettings::default(),
    )
    .unwrap();

    let host = Host {
        commands: PacketStream::new(host_commands).unwrap(),
        answers: PacketStream::new(host_answers).unwrap(),
        decoder: AnswerDecoder::new(),
    };
    (host, executor)
}

fn encode(commands: &[Command]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for command in commands {
        let mut encoder = CommandEncoder::new(command.clone()).unwrap();
        while !encoder.done() {
            bytes.push(encoder.next().unwrap());
        }
    }
    bytes
}

impl Host {
    fn send(&mut self, commands: &[Command]) {
        assert!(self.commands.writable().unwrap());
        self.commands.publish(&encode(commands)).unwrap();
    }

    fn collect(&mut self, answers: &mut Vec<Answer>) {
        if !self.answers.readable().unwrap() {
            return;
        }
        let length = self.answers.receive().unwrap();
        let mut packet = vec![0u8; length];
        self.answers.read_payload(0, &mut packet).unwrap();
        self.answers.acknowledge().unwrap();

        let mut offset = 0;
        while offset < packet.len() {
            offset += decode_from(&mut self.decoder, &packet[offset..]).unwrap();
            if let Some(answer) = self.decoder.take_output() {
                answers.push(answer);
                self.decoder.reset();
            }
        }
    }
}

fn run_ticks(host: &mut Host, executor: &mut Executor, from: usize, count: usize) -> Vec<Answer> {
    let mut answers = Vec::new();
    for k in from..from + count {
        executor.tick(k as f64 * TICK).unwrap();
        host.collect(&mut answers);
    }
    answers
}

fn movement(pin: u8, target: i32, duration: f64) -> StepperMovementPayload {
    StepperMovementPayload::new(duration, 1.0 / duration, 0.0)
        .with_move(pin, target)
        .unwrap()
}

// =============================================================================
// Command decoding
// =============================================================================

#[test]
fn decode_move_command_scenario() {
    let mut bytes = vec![123, 0, 10, 0b0000_0010];
    bytes.extend_from_slice(&10.0f64.to_le_bytes());
    bytes.extend_from_slice(&0.1f64.to_le_bytes());
    bytes.extend_from_slice(&0.15f64.to_le_bytes());
    bytes.extend_from_slice(&17i32.to_le_bytes());

    let mut decoder = CommandDecoder::new();
    assert_eq!(decode_from(&mut decoder, &bytes).unwrap(), bytes.len());

    let command = decoder.take_output().unwrap();
    assert_eq!(command.id, 123);
    assert_eq!(command.code, CommandCode::Move);
    let Payload::Movement(movement) = command.payload else {
        panic!("expected a movement payload");
    };
    assert_eq!(movement.duration, 10.0);
    assert_eq!(movement.initial_speed, 0.1);
    assert_eq!(movement.acceleration, 0.15);
    assert_eq!(movement.moves.as_slice(), &[StepperMove::new(1, 17)]);
    assert_eq!(movement.moves[0].current, 0);
}

#[test]
fn decode_command_split_across_calls() {
    let bytes = encode(&[Command::pwm(9, PwmPayload::new(4, 0.25, 2e-3))]);
    let mut decoder = CommandDecoder::new();
    for &byte in &bytes[..bytes.len() - 1] {
        assert!(!decoder.next(byte).unwrap().is_done());
    }
    assert!(decoder.next(bytes[bytes.len() - 1]).unwrap().is_done());
    assert_eq!(
        decoder.output().unwrap().payload,
        Payload::Pwm(PwmPayload::new(4, 0.25, 2e-3))
    );
}

// =============================================================================
// Executor loopback
// =============================================================================

#[test]
fn executor_starts_with_steppers_enabled() {
    let (mut host, mut executor) = setup();
    run_ticks(&mut host, &mut executor, 1, 1);
    let image = &executor.bus().images[0];
    assert_eq!(image.len(), 6);
    assert_eq!(image[ENABLE_REGISTER], 0);
}

#[test]
fn executor_runs_movement_then_pwm() {
    let (mut host, mut executor) = setup();
    run_ticks(&mut host, &mut executor, 1, 3);

    host.send(&[
        Command::movement(0, movement(1, 5, 1e-3)),
        Command::pwm(1, PwmPayload::new(0, 0.5, 1e-4)),
        Command::read_inputs(0).immediate(),
    ]);
    let answers = run_ticks(&mut host, &mut executor, 4, 400);

    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0].id, 0x8000);
    assert_eq!(
        answers[0].payload,
        AnswerPayload::Inputs(InputsState::from_pins(0x1234))
    );
    assert_eq!(answers[1], Answer::new(0, CommandCode::Move, STATE_OK));
    assert_eq!(answers[2], Answer::new(1, CommandCode::Pwm, STATE_OK));

    let images = &executor.bus().images;
    let steps: Vec<&Vec<u8>> = images
        .iter()
        .filter(|image| image[STEP_REGISTER] != 0)
        .collect();
    assert_eq!(steps.len(), 5);
    for image in &steps {
        assert_eq!(image[STEP_REGISTER], 0b10);
        assert_eq!(image[DIRECTION_REGISTER] & 0b10, 0b10);
    }

    // A step pulse never lasts more than one tick.
    for pair in images.windows(2) {
        assert!(pair[0][STEP_REGISTER] == 0 || pair[1][STEP_REGISTER] == 0);
    }

    // PWM toggles once configured, after the movement.
    let tail = &images[images.len() - 20..];
    assert!(tail.iter().any(|image| image[PWM_REGISTER] & 1 == 1));
    assert!(tail.iter().any(|image| image[PWM_REGISTER] & 1 == 0));
    assert!(executor.diagnostics().is_clean());
}

#[test]
fn executor_rejects_immediate_movement() {
    let (mut host, mut executor) = setup();
    host.send(&[Command::movement(0, movement(0, 3, 1e-3)).immediate()]);
    let answers = run_ticks(&mut host, &mut executor, 1, 3);

    assert_eq!(answers, vec![Answer::new(0x8000, CommandCode::Move, STATE_REJECTED)]);
    assert!(executor.current().is_none());
}

#[test]
fn executor_enables_steppers() {
    let (mut host, mut executor) = setup();
    host.send(&[Command::enable_steppers(0, 0b0000_0011)]);
    let answers = run_ticks(&mut host, &mut executor, 1, 2);

    assert_eq!(answers, vec![Answer::new(0, CommandCode::EnableSteppers, STATE_OK)]);
    assert_eq!(executor.registers().get(ENABLE_REGISTER), 0b1111_1100);
}

#[test]
fn executor_stops_on_sequence_gap() {
    let (mut host, mut executor) = setup();
    host.send(&[Command::read_inputs(5)]);
    assert_eq!(
        executor.tick(TICK),
        Err(Error::Protocol(ProtocolError::SequenceGap {
            expected: 0,
            received: 5
        }))
    );
}

#[test]
fn executor_acknowledges_consumed_packets() {
    let (mut host, mut executor) = setup();
    for id in 0..3 {
        host.send(&[Command::read_inputs(id)]);
        run_ticks(&mut host, &mut executor, 1 + 2 * id as usize, 2);
        assert!(host.commands.writable().unwrap());
    }
}

#[test]
fn executor_holds_packet_until_queues_drain() {
    let (mut host, mut executor) = setup();
    // One movement followed by more reads than the sequenced queue holds.
    let reads = SEQUENCED_QUEUE_CAPACITY as u16 + 4;
    let mut commands = vec![Command::movement(0, movement(2, 4, 1e-3))];
    commands.extend((1..=reads).map(Command::read_inputs));
    host.send(&commands);

    let mut answers = run_ticks(&mut host, &mut executor, 1, 2);
    assert!(answers.is_empty());
    assert!(executor.current().is_some());
    assert!(!host.commands.writable().unwrap());

    answers.extend(run_ticks(&mut host, &mut executor, 3, 400));
    let ids: Vec<u16> = answers.iter().map(|answer| answer.id).collect();
    assert_eq!(ids, (0..=reads).collect::<Vec<u16>>());
    assert!(answers.iter().all(Answer::is_ok));
    assert!(executor.current().is_none());
    assert!(host.commands.writable().unwrap());
}
