//! Commands decoder/sequencer.
//!
//! Sits between the transport and the executor: decodes commands, enforces
//! their ordering and buffers the answers going back to the host.

mod sequencer;

pub use sequencer::{
    CommandsDecoder, ANSWER_QUEUE_CAPACITY, IMMEDIATE_QUEUE_CAPACITY, SEQUENCED_QUEUE_CAPACITY,
};
