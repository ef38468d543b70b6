//! SBE response status header
//!
//! The status header sits near the end of every reply, located through the
//! trailing distance word.

use std::fmt;

use super::{MAGIC_CODE, MAGIC_CODE_SHIFT, Opcode, SBE_OPERATION_SUCCESSFUL};

/// Decoded status header (two words)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Magic (0xC0DE)         | Command Class | Command Code  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Primary Status         |       Secondary Status        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHeader {
    magic: u16,
    class: u8,
    code: u8,
    status: ChipOpStatus,
}

impl StatusHeader {
    /// Build a header for a reply to `opcode`
    #[must_use]
    pub fn new(opcode: Opcode, status: ChipOpStatus) -> Self {
        Self {
            magic: MAGIC_CODE,
            class: opcode.class(),
            code: opcode.code(),
            status,
        }
    }

    /// Decode the header and status words
    #[must_use]
    pub const fn from_words(header: u32, status: u32) -> Self {
        Self {
            magic: (header >> MAGIC_CODE_SHIFT) as u16,
            class: ((header >> 8) & 0xFF) as u8,
            code: (header & 0xFF) as u8,
            status: ChipOpStatus::from_u32(status),
        }
    }

    /// Encode as header and status words
    #[must_use]
    pub const fn to_words(&self) -> [u32; 2] {
        let header = ((self.magic as u32) << MAGIC_CODE_SHIFT)
            | ((self.class as u32) << 8)
            | self.code as u32;
        [header, self.status.as_u32()]
    }

    /// Get magic code
    #[must_use]
    pub const fn magic(&self) -> u16 {
        self.magic
    }

    /// Get command class
    #[must_use]
    pub const fn class(&self) -> u8 {
        self.class
    }

    /// Get command code
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// Get status
    #[must_use]
    pub const fn status(&self) -> ChipOpStatus {
        self.status
    }

    /// Whether the header echoes `opcode`
    #[must_use]
    pub const fn matches(&self, opcode: Opcode) -> bool {
        self.class == opcode.class() && self.code == opcode.code()
    }

    /// Validate the magic code
    pub fn validate(&self) -> super::Result<()> {
        if self.magic != MAGIC_CODE {
            return Err(super::Error::InvalidMagic { found: self.magic });
        }
        Ok(())
    }
}

/// Primary and secondary status of a chip operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChipOpStatus(u32);

impl ChipOpStatus {
    /// Successful status
    pub const SUCCESS: Self = Self(SBE_OPERATION_SUCCESSFUL);

    /// Create from primary and secondary codes
    #[must_use]
    pub const fn new(primary: u16, secondary: u16) -> Self {
        Self(((primary as u32) << 16) | secondary as u32)
    }

    /// Create from the raw status word
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Raw status word
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Primary status (upper 16 bits)
    #[must_use]
    pub const fn primary(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Secondary status (lower 16 bits)
    #[must_use]
    pub const fn secondary(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == SBE_OPERATION_SUCCESSFUL
    }
}

impl fmt::Display for ChipOpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x} (primary {:#06x}, secondary {:#06x})",
            self.0,
            self.primary(),
            self.secondary()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        let header = StatusHeader::from_words(0xC0DE_A201, 0x00FE_000A);

        assert_eq!(header.magic(), MAGIC_CODE);
        assert_eq!(header.class(), 0xA2);
        assert_eq!(header.code(), 0x01);
        assert!(header.matches(Opcode::ScomRead));
        assert!(!header.matches(Opcode::ScomWrite));
        assert_eq!(header.status().primary(), 0x00FE);
        assert_eq!(header.status().secondary(), 0x000A);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_header_words() {
        let header = StatusHeader::new(Opcode::ThreadControl, ChipOpStatus::new(1, 2));
        assert_eq!(header.to_words(), [0xC0DE_A701, 0x0001_0002]);
        assert_eq!(StatusHeader::from_words(0xC0DE_A701, 0x0001_0002), header);
    }

    #[test]
    fn test_invalid_magic() {
        let header = StatusHeader::from_words(0xDEAD_A201, 0);
        assert!(matches!(
            header.validate(),
            Err(super::super::Error::InvalidMagic { found: 0xDEAD })
        ));
    }

    #[test]
    fn test_status_success() {
        assert!(ChipOpStatus::SUCCESS.is_success());
        assert!(!ChipOpStatus::from_u32(5).is_success());
        assert_eq!(ChipOpStatus::from_u32(5).secondary(), 5);
    }
}
