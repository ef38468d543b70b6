//! SBE chip-operation wire format
//!
//! This module provides the command/response layout, status header decoding,
//! FFDC extraction and the error taxonomy shared by the whole crate.

mod codec;
mod command;
mod error;
mod ffdc;
mod header;
mod types;

pub use codec::{decode_words, encode_command, parse_response};
pub use command::{Command, lower, upper};
pub use error::{Error, IoFailure, IoPhase, Result};
pub use ffdc::Ffdc;
pub use header::{ChipOpStatus, StatusHeader};
pub use types::Opcode;

/// Magic code carried in the upper half of every status header word
pub const MAGIC_CODE: u16 = 0xC0DE;

/// Bit position of the magic code inside the status header word
pub const MAGIC_CODE_SHIFT: u32 = 16;

/// Size of one protocol word in bytes
pub const WORD_SIZE: usize = 4;

/// Largest FFDC block the firmware may append to a failed reply, in words
pub const MAX_FFDC_LEN_IN_WORDS: usize = 5120;

/// Status header length in words (header word + status word)
pub const STATUS_HEADER_LEN_IN_WORDS: usize = 2;

/// Length of the trailing distance word
pub const DISTANCE_LEN_IN_WORDS: usize = 1;

/// Status value reported by the firmware for a successful chip operation
pub const SBE_OPERATION_SUCCESSFUL: u32 = 0;
