//! SBE chip-operation opcodes

use std::fmt;

/// Chip operations understood by this crate
///
/// An opcode is a command class in bits 15-8 and a command code in bits 7-0.
/// The firmware echoes both back in the status header of its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    /// Read a SCOM register
    ScomRead = 0x0000_A201,
    /// Write a SCOM register
    ScomWrite = 0x0000_A202,
    /// Start, stop, step or reset a core thread
    ThreadControl = 0x0000_A701,
}

impl Opcode {
    /// Convert from a command word
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x0000_A201 => Some(Self::ScomRead),
            0x0000_A202 => Some(Self::ScomWrite),
            0x0000_A701 => Some(Self::ThreadControl),
            _ => None,
        }
    }

    /// Convert to a command word
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Command class (bits 15-8)
    #[must_use]
    pub const fn class(self) -> u8 {
        ((self as u32 >> 8) & 0xFF) as u8
    }

    /// Command code (bits 7-0)
    #[must_use]
    pub const fn code(self) -> u8 {
        (self as u32 & 0xFF) as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScomRead => "ScomRead",
            Self::ScomWrite => "ScomWrite",
            Self::ThreadControl => "ThreadControl",
        };
        write!(f, "{name}")
    }
}
