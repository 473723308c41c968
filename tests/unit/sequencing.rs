//! Unit tests for command ordering in the commands decoder.

use motion_core::codec::ByteEncoder;
use motion_core::commands::CommandsDecoder;
use motion_core::error::ProtocolError;
use motion_core::payload::StepperMovementPayload;
use motion_core::protocol::{Command, CommandEncoder, IMMEDIATE_FLAG};
use proptest::prelude::*;

fn wire(ids: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for &id in ids {
        let mut encoder = CommandEncoder::new(Command::read_inputs(id)).unwrap();
        while !encoder.done() {
            bytes.push(encoder.next().unwrap());
        }
    }
    bytes
}

/// Feed every id, draining the sequenced queue after each one.
fn feed_all(sequencer: &mut CommandsDecoder, ids: &[u16]) -> Result<(), ProtocolError> {
    for &id in ids {
        sequencer.feed(&wire(&[id]))?;
        sequencer.pop_sequenced();
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_consecutive_ids_wrap_without_gap(shift in 1u32..=8, count in 1usize..600) {
        let modulus = 1u16 << shift;
        let mut sequencer = CommandsDecoder::new(modulus);

        let ids = wire_ids(0, count, modulus);
        prop_assert!(feed_all(&mut sequencer, &ids).is_ok());
        prop_assert_eq!(sequencer.expected_sequence(), (count % modulus as usize) as u16);
    }

    #[test]
    fn prop_skipped_id_raises_gap(accepted in 0u16..100, skip in 1u16..100) {
        let mut sequencer = CommandsDecoder::default();
        feed_all(&mut sequencer, &wire_ids(0, accepted as usize, 0x8000)).unwrap();

        let received = accepted + skip;
        prop_assert_eq!(
            sequencer.feed(&wire(&[received])),
            Err(ProtocolError::SequenceGap { expected: accepted, received })
        );
    }

    #[test]
    fn prop_immediate_never_advances_sequence(sequence in 0u16..0x8000, accepted in 0u16..20) {
        let mut sequencer = CommandsDecoder::default();
        feed_all(&mut sequencer, &wire_ids(0, accepted as usize, 0x8000)).unwrap();

        sequencer.feed(&wire(&[sequence | IMMEDIATE_FLAG])).unwrap();
        prop_assert_eq!(sequencer.expected_sequence(), accepted);
        prop_assert_eq!(sequencer.pop_immediate().map(|c| c.sequence()), Some(sequence));
    }
}

/// `count` consecutive ids starting at `start`, wrapping at `modulus`.
fn wire_ids(start: u16, count: usize, modulus: u16) -> Vec<u16> {
    (0..count)
        .map(|i| ((start as usize + i) % modulus as usize) as u16)
        .collect()
}

#[test]
fn repeated_id_while_queued_overflows() {
    let mut sequencer = CommandsDecoder::default();
    sequencer.feed(&wire(&[0])).unwrap();
    assert_eq!(
        sequencer.feed(&wire(&[0])),
        Err(ProtocolError::QueueOverflow { id: 0 })
    );
}

#[test]
fn repeated_id_after_drain_is_a_gap() {
    let mut sequencer = CommandsDecoder::default();
    sequencer.feed(&wire(&[0])).unwrap();
    sequencer.pop_sequenced();
    assert_eq!(
        sequencer.feed(&wire(&[0])),
        Err(ProtocolError::SequenceGap {
            expected: 1,
            received: 0
        })
    );
}

#[test]
fn unknown_code_is_fatal() {
    let mut sequencer = CommandsDecoder::default();
    assert_eq!(
        sequencer.feed(&[0, 0, 0x03]),
        Err(ProtocolError::UnknownCode(0x03))
    );
}

#[test]
fn non_finite_movement_is_fatal() {
    let movement = StepperMovementPayload::new(f64::NAN, 0.0, 0.0)
        .with_move(0, 10)
        .unwrap();
    let mut encoder = CommandEncoder::new(Command::movement(0, movement)).unwrap();
    let mut bytes = Vec::new();
    while !encoder.done() {
        bytes.push(encoder.next().unwrap());
    }

    let mut sequencer = CommandsDecoder::default();
    assert_eq!(
        sequencer.feed(&bytes),
        Err(ProtocolError::NonFiniteProfile)
    );
    assert!(sequencer.pop_sequenced().is_none());
}
