//! Round-trip properties of the command and answer codecs.

use motion_core::codec::{decode_from, ByteDecoder, ByteEncoder};
use motion_core::payload::{
    InputsState, PwmPayload, StepperMovementDecoder, StepperMovementEncoder,
    StepperMovementPayload, ADC_CHANNELS,
};
use motion_core::protocol::{Answer, AnswerDecoder, AnswerEncoder, Command, CommandDecoder, CommandEncoder};
use proptest::prelude::*;

fn encode_command(command: Command) -> Vec<u8> {
    let mut encoder = CommandEncoder::new(command).unwrap();
    let mut bytes = Vec::new();
    while !encoder.done() {
        bytes.push(encoder.next().unwrap());
    }
    bytes
}

fn decode_command(bytes: &[u8]) -> Command {
    let mut decoder = CommandDecoder::new();
    assert_eq!(decode_from(&mut decoder, bytes).unwrap(), bytes.len());
    assert!(decoder.done());
    decoder.take_output().unwrap()
}

fn finite() -> impl Strategy<Value = f64> {
    -1e6f64..1e6f64
}

fn movement() -> impl Strategy<Value = StepperMovementPayload> {
    (
        finite(),
        finite(),
        finite(),
        1u8..=255,
        prop::collection::vec(any::<i32>(), 8),
    )
        .prop_map(|(duration, speed, acceleration, mask, targets)| {
            let mut movement = StepperMovementPayload::new(duration, speed, acceleration);
            for pin in 0..8u8 {
                if mask & (1 << pin) != 0 {
                    movement.add_move(pin, targets[pin as usize]).unwrap();
                }
            }
            movement
        })
}

proptest! {
    #[test]
    fn prop_pwm_command_roundtrip(id in any::<u16>(), pin in 0u8..8, duty in 0.0f64..=1.0, period in 1e-6f64..10.0) {
        let command = Command::pwm(id, PwmPayload::new(pin, duty, period));
        let bytes = encode_command(command.clone());
        prop_assert_eq!(bytes.len(), 3 + 17);
        prop_assert_eq!(decode_command(&bytes), command);
    }

    #[test]
    fn prop_movement_command_roundtrip(id in any::<u16>(), movement in movement()) {
        let moves = movement.moves.len();
        let command = Command::movement(id, movement);
        let bytes = encode_command(command.clone());
        prop_assert_eq!(bytes.len(), 3 + 1 + 24 + 4 * moves);
        prop_assert_eq!(decode_command(&bytes), command);
    }

    #[test]
    fn prop_inputs_answer_roundtrip(id in any::<u16>(), pins in any::<u16>(), adc in prop::array::uniform8(any::<u16>())) {
        let answer = Answer::inputs(id, InputsState { pins_state: pins, adc_values: adc });
        let mut encoder = AnswerEncoder::new();
        encoder.init(answer).unwrap();
        let mut bytes = Vec::new();
        while !encoder.done() {
            bytes.push(encoder.next().unwrap());
        }
        prop_assert_eq!(bytes.len(), 4 + 2 + 2 * ADC_CHANNELS);

        let mut decoder = AnswerDecoder::new();
        decode_from(&mut decoder, &bytes).unwrap();
        prop_assert_eq!(decoder.output(), Some(&answer));
    }
}

#[test]
fn zero_move_movement_is_mask_only() {
    let movement = StepperMovementPayload::new(1.0, 2.0, 3.0);
    let mut encoder = StepperMovementEncoder::new(movement);
    assert_eq!(encoder.next().unwrap(), 0);
    assert!(encoder.done());

    let mut decoder = StepperMovementDecoder::new();
    assert!(decoder.next(0).unwrap().is_done());
    let decoded = decoder.take_output().unwrap();
    assert!(decoded.moves.is_empty());
    assert!(decoded.is_finished());
}

#[test]
fn zero_duty_pwm_roundtrip() {
    let command = Command::pwm(3, PwmPayload::new(7, 0.0, 0.02));
    assert_eq!(decode_command(&encode_command(command.clone())), command);
}
