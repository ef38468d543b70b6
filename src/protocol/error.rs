//! Chip-operation error types

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::{ChipOpStatus, Ffdc};

/// Direction of the FIFO handshake a device failure occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPhase {
    /// Waiting for, or performing, the command write
    Write,
    /// Waiting for, or performing, the response read
    Read,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// What went wrong on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFailure {
    /// The readiness wait itself failed
    WaitFailed,
    /// The descriptor signalled an error condition instead of readiness
    ErrorCondition,
    /// The write call failed
    WriteFailed,
    /// The device accepted fewer bytes than the command holds
    ShortWrite,
    /// The read call failed
    ReadFailed,
}

impl fmt::Display for IoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitFailed => "readiness wait failed",
            Self::ErrorCondition => "error condition signalled",
            Self::WriteFailed => "write failed",
            Self::ShortWrite => "short write",
            Self::ReadFailed => "read failed",
        };
        write!(f, "{name}")
    }
}

/// Chip-operation errors
#[derive(Error, Debug)]
pub enum Error {
    /// The FIFO device could not be opened
    #[error("failed to open SBE FIFO device {}: {source}", .path.display())]
    DeviceOpen {
        /// Device path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The FIFO handshake failed on the device
    #[error("SBE FIFO device {} {phase}: {kind}: {source}", .path.display())]
    DeviceIo {
        /// Device path
        path: PathBuf,
        /// Handshake direction
        phase: IoPhase,
        /// Failure kind
        kind: IoFailure,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The distance word points outside the reply
    #[error("distance to status header ({distance}) does not fit a reply of {len} words")]
    MalformedFrame {
        /// Distance word found at the end of the reply
        distance: u32,
        /// Number of words obtained from the device
        len: usize,
    },

    /// The status header does not carry the magic code
    #[error("invalid magic code in response header: expected 0xc0de, got {found:#06x}")]
    InvalidMagic {
        /// Upper 16 bits of the header word
        found: u16,
    },

    /// The firmware reported a non-zero status
    #[error("chip operation failed with SBE response code {status}, {} words of FFDC", .ffdc.len())]
    ChipOperationFailed {
        /// Primary/secondary status
        status: ChipOpStatus,
        /// Diagnostic data attached to the reply
        ffdc: Ffdc,
    },

    /// The payload length differs from what the caller declared
    #[error("chip operation returned {got} payload words, expected {expected}")]
    LengthMismatch {
        /// Words actually returned
        got: usize,
        /// Words the caller expected
        expected: usize,
    },

    /// Caller supplied an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// OS error code behind a device failure, if any
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::DeviceOpen { source, .. } | Self::DeviceIo { source, .. } => {
                source.raw_os_error()
            }
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
