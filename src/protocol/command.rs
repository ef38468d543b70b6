//! SBE chip-operation command

use super::{Opcode, WORD_SIZE};

/// Upper 32 bits of a 64-bit value
#[must_use]
pub const fn upper(value: u64) -> u32 {
    ((value & 0xFFFF_FFFF_0000_0000) >> 32) as u32
}

/// Lower 32 bits of a 64-bit value
#[must_use]
pub const fn lower(value: u64) -> u32 {
    (value & 0xFFFF_FFFF) as u32
}

/// Command words in host order
///
/// # Layout
///
/// ```text
/// [word count] [opcode] [operand 0] ... [operand n]
/// ```
///
/// Word 0 always holds the total number of words, itself included; every
/// operand push keeps it current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    words: Vec<u32>,
}

impl Command {
    /// Create a command carrying no operands
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            words: vec![2, opcode.as_u32()],
        }
    }

    /// Append a 32-bit operand
    #[must_use]
    pub fn with_u32(mut self, operand: u32) -> Self {
        self.words.push(operand);
        self.words[0] = self.words.len() as u32;
        self
    }

    /// Append a 64-bit operand, most-significant half first
    #[must_use]
    pub fn with_u64(self, operand: u64) -> Self {
        self.with_u32(upper(operand)).with_u32(lower(operand))
    }

    /// Opcode word
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u32(self.words[1])
    }

    /// All command words, word count first
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of words
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; a command holds at least its count and opcode
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Size on the wire in bytes
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.words.len() * WORD_SIZE
    }
}
