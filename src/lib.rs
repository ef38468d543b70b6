//! SBE chip operations - hardware access through the POWER Self-Boot Engine FIFO
//!
//! This library issues chip operations (SCOM register reads and writes, core
//! thread control) to a processor's Self-Boot Engine over its FIFO character
//! device, and validates the status header and FFDC the firmware returns.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! // Read a SCOM register through the first SBE FIFO
//! let value = sbe_chipop::scom::read("/dev/sbefifo1", 0x0003_0000_0000_000F)?;
//!
//! // Write it back
//! sbe_chipop::scom::write("/dev/sbefifo1", 0x0003_0000_0000_000F, value)?;
//!
//! // Reset thread 0 of core chiplet 0x20
//! sbe_chipop::threadcontrol::reset("/dev/sbefifo1", 0x20, 0)?;
//! # Ok::<(), sbe_chipop::Error>(())
//! ```
//!
//! # Model
//!
//! - **One operation, one handle** - every call opens the device, writes one
//!   command, reads one reply and closes the device again
//! - **Blocking** - readiness waits have no timeout
//! - **No multiplexing** - callers sharing a device path serialise their calls
//!
//! Failures surface as [`Error`]; a non-zero firmware status comes back as
//! [`Error::ChipOperationFailed`] carrying the FFDC words.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod chipop;
pub mod protocol;
pub mod scom;
pub mod threadcontrol;
pub mod transport;

pub use chipop::{ChipOpConfig, ChipOpInvoker, Connector, DeviceConnector};
pub use protocol::{
    ChipOpStatus, Command, Error, Ffdc, IoFailure, IoPhase, MAGIC_CODE, MAX_FFDC_LEN_IN_WORDS,
    Opcode, Result, StatusHeader,
};
pub use transport::{DeviceHandle, FifoDevice, FifoTransport};
