//! Core thread control through the SBE.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::chipop::{ChipOpConfig, ChipOpInvoker, Connector, validate_path};
use crate::protocol::{Command, Error, Opcode, Result};

/// Payload words returned by a thread-control operation.
pub const CONTROL_RESP_LENGTH: usize = 0;

/// Highest thread id the control word can address.
pub const MAX_THREAD_NUM: u8 = 0xF;

/// Thread operation (control word bits 0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ThreadOperation {
    /// Start instructions
    Start = 0x0,
    /// Stop instructions
    Stop = 0x1,
    /// Step one instruction
    Step = 0x2,
    /// System reset
    Sreset = 0x3,
}

impl ThreadOperation {
    /// Convert from the control word field
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::Start),
            0x1 => Some(Self::Stop),
            0x2 => Some(Self::Step),
            0x3 => Some(Self::Sreset),
            _ => None,
        }
    }

    /// Convert to the control word field
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ThreadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Step => "Step",
            Self::Sreset => "Sreset",
        };
        write!(f, "{name}")
    }
}

/// Error handling mode (control word bits 16-19)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ThreadControlMode {
    /// Abort at the first failing thread
    ExitOnFirstError = 0x0,
    /// Keep going after a failure
    #[default]
    ContinueOnError = 0x1,
}

impl ThreadControlMode {
    /// Convert from the control word field
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::ExitOnFirstError),
            0x1 => Some(Self::ContinueOnError),
            _ => None,
        }
    }

    /// Convert to the control word field
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Thread-control operand
///
/// ```text
/// 31       20 19  16 15        8 7    4 3    0
/// +----------+------+-----------+------+------+
/// | reserved | mode | core id   |thread|  op  |
/// +----------+------+-----------+------+------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord(u32);

impl ControlWord {
    /// Pack a control word; thread ids above [`MAX_THREAD_NUM`] are rejected.
    pub fn new(
        core_chiplet_id: u8,
        thread_num: u8,
        operation: ThreadOperation,
        mode: ThreadControlMode,
    ) -> Result<Self> {
        if thread_num > MAX_THREAD_NUM {
            return Err(Error::InvalidArgument("thread number exceeds 4 bits"));
        }

        Ok(Self(
            u32::from(operation.as_u8())
                | (u32::from(thread_num) << 4)
                | (u32::from(core_chiplet_id) << 8)
                | (u32::from(mode.as_u8()) << 16),
        ))
    }

    /// Raw operand word
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Thread operation
    #[must_use]
    pub fn operation(self) -> Option<ThreadOperation> {
        ThreadOperation::from_u8((self.0 & 0xF) as u8)
    }

    /// Thread id
    #[must_use]
    pub const fn thread_num(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    /// Core chiplet id
    #[must_use]
    pub const fn core_chiplet_id(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Error handling mode
    #[must_use]
    pub fn mode(self) -> Option<ThreadControlMode> {
        ThreadControlMode::from_u8(((self.0 >> 16) & 0xF) as u8)
    }
}

/// Build the thread-control command: `[3, 0xA701, control_word]`.
#[must_use]
pub fn control_command(control: ControlWord) -> Command {
    Command::new(Opcode::ThreadControl).with_u32(control.as_u32())
}

/// Run `operation` on one thread of a core.
pub fn control(
    path: impl AsRef<Path>,
    core_chiplet_id: u8,
    thread_num: u8,
    operation: ThreadOperation,
    mode: ThreadControlMode,
) -> Result<()> {
    control_with(
        &ChipOpInvoker::new(&ChipOpConfig::default()),
        path,
        ControlWord::new(core_chiplet_id, thread_num, operation, mode)?,
    )
}

/// Reset instructions on one SMT thread of a core.
pub fn reset(path: impl AsRef<Path>, core_chiplet_id: u8, thread_num: u8) -> Result<()> {
    reset_with(
        &ChipOpInvoker::new(&ChipOpConfig::default()),
        path,
        core_chiplet_id,
        thread_num,
    )
}

/// [`reset`] through a caller-supplied invoker.
pub fn reset_with<C: Connector>(
    invoker: &ChipOpInvoker<C>,
    path: impl AsRef<Path>,
    core_chiplet_id: u8,
    thread_num: u8,
) -> Result<()> {
    let control = ControlWord::new(
        core_chiplet_id,
        thread_num,
        ThreadOperation::Sreset,
        ThreadControlMode::ContinueOnError,
    )?;
    control_with(invoker, path, control)
}

/// Send a packed control word through a caller-supplied invoker.
pub fn control_with<C: Connector>(
    invoker: &ChipOpInvoker<C>,
    path: impl AsRef<Path>,
    control: ControlWord,
) -> Result<()> {
    let path = path.as_ref();
    validate_path(path)?;

    invoker.invoke_fixed::<CONTROL_RESP_LENGTH>(path, &control_command(control))?;
    debug!(control = control.as_u32(), "thread control");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_control_word() {
        let control = ControlWord::new(
            0x20,
            2,
            ThreadOperation::Sreset,
            ThreadControlMode::ContinueOnError,
        )
        .unwrap();

        assert_eq!(control.as_u32(), 0x0001_2023);
        assert_eq!(control.operation(), Some(ThreadOperation::Sreset));
        assert_eq!(control.thread_num(), 2);
        assert_eq!(control.core_chiplet_id(), 0x20);
        assert_eq!(control.mode(), Some(ThreadControlMode::ContinueOnError));
    }

    #[test]
    fn test_control_command_layout() {
        let control =
            ControlWord::new(0x21, 0, ThreadOperation::Stop, ThreadControlMode::ExitOnFirstError)
                .unwrap();
        assert_eq!(control_command(control).words(), &[3, 0xA701, 0x2101]);
    }

    #[test]
    fn test_thread_num_out_of_range() {
        let result = ControlWord::new(0x20, 16, ThreadOperation::Start, ThreadControlMode::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(matches!(reset("/dev/sbefifo1", 0x20, 16), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(reset("", 0x20, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_operation_roundtrip() {
        for op in [
            ThreadOperation::Start,
            ThreadOperation::Stop,
            ThreadOperation::Step,
            ThreadOperation::Sreset,
        ] {
            assert_eq!(ThreadOperation::from_u8(op.as_u8()), Some(op));
        }
        assert_eq!(ThreadOperation::from_u8(4), None);
    }
}
