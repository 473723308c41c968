//! Commands decoder and sequencer.

use heapless::Deque;

use crate::codec::{ByteDecoder, ByteEncoder};
use crate::error::ProtocolError;
use crate::protocol::{Answer, AnswerEncoder, Command, CommandDecoder, DEFAULT_SEQUENCE_MODULUS};

/// Capacity of the immediate command queue.
pub const IMMEDIATE_QUEUE_CAPACITY: usize = 4;

/// Capacity of the sequenced command queue.
pub const SEQUENCED_QUEUE_CAPACITY: usize = 16;

/// Capacity of the outgoing answer queue.
pub const ANSWER_QUEUE_CAPACITY: usize = 32;

/// Turns transport bytes into ordered commands and answers into bytes.
///
/// Sequenced commands must arrive with consecutive ids modulo the sequence
/// modulus. Immediate commands (bit 15 of the id set) skip the check and
/// go to their own queue.
#[derive(Debug)]
pub struct CommandsDecoder {
    decoder: CommandDecoder,
    immediate: Deque<Command, IMMEDIATE_QUEUE_CAPACITY>,
    sequenced: Deque<Command, SEQUENCED_QUEUE_CAPACITY>,
    answers: Deque<Answer, ANSWER_QUEUE_CAPACITY>,
    encoder: AnswerEncoder,
    expected_sequence: u16,
    sequence_modulus: u16,
}

impl Default for CommandsDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_MODULUS)
    }
}

impl CommandsDecoder {
    /// Create a sequencer expecting id 0 first.
    pub fn new(sequence_modulus: u16) -> Self {
        Self {
            decoder: CommandDecoder::new(),
            immediate: Deque::new(),
            sequenced: Deque::new(),
            answers: Deque::new(),
            encoder: AnswerEncoder::new(),
            expected_sequence: 0,
            sequence_modulus: sequence_modulus.max(1),
        }
    }

    /// Id the next sequenced command must carry.
    pub fn expected_sequence(&self) -> u16 {
        self.expected_sequence
    }

    /// Whether a decoded command could be queued right now.
    pub fn can_accept(&self) -> bool {
        !self.immediate.is_full() && !self.sequenced.is_full()
    }

    /// Feed transport bytes one at a time into the command decoder.
    ///
    /// Stops early while the command queues are full; the return value is
    /// the number of bytes consumed and the caller must offer the rest
    /// again later.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<usize, ProtocolError> {
        let mut consumed = 0;
        for &byte in bytes {
            if !self.decoder.in_progress() && !self.can_accept() {
                break;
            }
            consumed += 1;
            let step = self.decoder.next(byte).map_err(|e| {
                log::error!("command decode failed: {}", e);
                e
            })?;
            if step.is_done() {
                let command = self.decoder.take_output();
                self.decoder.reset();
                if let Some(command) = command {
                    self.accept(command).map_err(|e| {
                        log::error!("command rejected: {}", e);
                        e
                    })?;
                }
            }
        }
        Ok(consumed)
    }

    /// Classify a decoded command into the immediate or sequenced queue.
    pub fn accept(&mut self, command: Command) -> Result<(), ProtocolError> {
        let id = command.id;
        if command.is_immediate() {
            return self
                .immediate
                .push_back(command)
                .map_err(|_| ProtocolError::QueueOverflow { id });
        }

        if self.sequenced.front().map_or(false, |head| head.id == id) {
            return Err(ProtocolError::QueueOverflow { id });
        }
        if id != self.expected_sequence {
            return Err(ProtocolError::SequenceGap {
                expected: self.expected_sequence,
                received: id,
            });
        }
        self.sequenced
            .push_back(command)
            .map_err(|_| ProtocolError::QueueOverflow { id })?;
        self.expected_sequence = (id + 1) % self.sequence_modulus;
        Ok(())
    }

    /// Next immediate command.
    pub fn pop_immediate(&mut self) -> Option<Command> {
        self.immediate.pop_front()
    }

    /// Head of the sequenced queue.
    pub fn peek_sequenced(&self) -> Option<&Command> {
        self.sequenced.front()
    }

    /// Next sequenced command.
    pub fn pop_sequenced(&mut self) -> Option<Command> {
        self.sequenced.pop_front()
    }

    /// Number of queued sequenced commands.
    pub fn sequenced_len(&self) -> usize {
        self.sequenced.len()
    }

    /// Whether another answer fits in the outgoing queue.
    pub fn can_queue_answer(&self) -> bool {
        !self.answers.is_full()
    }

    /// Queue an answer for encoding.
    pub fn queue_answer(&mut self, answer: Answer) -> Result<(), ProtocolError> {
        self.answers
            .push_back(answer)
            .map_err(|_| ProtocolError::AnswerQueueFull)
    }

    /// Whether answer bytes remain to be encoded.
    pub fn has_pending_answers(&self) -> bool {
        !self.answers.is_empty() || !self.encoder.done()
    }

    /// Encode queued answers into `out`.
    ///
    /// Returns the number of bytes written, 0 when no answer is pending. An
    /// answer cut at the end of `out` resumes on the next call.
    pub fn encode_answers(&mut self, out: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut written = 0;
        while written < out.len() {
            if self.encoder.done() {
                match self.answers.pop_front() {
                    Some(answer) => self.encoder.init(answer)?,
                    None => break,
                }
            }
            out[written] = self.encoder.next()?;
            written += 1;
        }
        Ok(written)
    }
}
