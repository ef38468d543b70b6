//! SCOM register access through the SBE.

use std::path::Path;

use tracing::debug;

use crate::chipop::{ChipOpConfig, ChipOpInvoker, Connector, validate_path};
use crate::protocol::{Command, Opcode, Result};

/// Payload words returned by a SCOM read.
pub const READ_RESP_LENGTH: usize = 2;

/// Payload words returned by a SCOM write.
pub const WRITE_RESP_LENGTH: usize = 0;

/// Build the SCOM read command: `[4, 0xA201, addr_hi, addr_lo]`.
#[must_use]
pub fn read_command(address: u64) -> Command {
    Command::new(Opcode::ScomRead).with_u64(address)
}

/// Build the SCOM write command: `[6, 0xA202, addr_hi, addr_lo, data_hi, data_lo]`.
#[must_use]
pub fn write_command(address: u64, data: u64) -> Command {
    Command::new(Opcode::ScomWrite).with_u64(address).with_u64(data)
}

/// Read a processor SCOM register.
pub fn read(path: impl AsRef<Path>, address: u64) -> Result<u64> {
    read_with(&ChipOpInvoker::new(&ChipOpConfig::default()), path, address)
}

/// Write a processor SCOM register.
pub fn write(path: impl AsRef<Path>, address: u64, data: u64) -> Result<()> {
    write_with(
        &ChipOpInvoker::new(&ChipOpConfig::default()),
        path,
        address,
        data,
    )
}

/// [`read`] through a caller-supplied invoker.
pub fn read_with<C: Connector>(
    invoker: &ChipOpInvoker<C>,
    path: impl AsRef<Path>,
    address: u64,
) -> Result<u64> {
    let path = path.as_ref();
    validate_path(path)?;

    let [hi, lo] = invoker.invoke_fixed::<READ_RESP_LENGTH>(path, &read_command(address))?;
    let value = (u64::from(hi) << 32) | u64::from(lo);
    debug!(address, value, "SCOM read");
    Ok(value)
}

/// [`write`] through a caller-supplied invoker.
pub fn write_with<C: Connector>(
    invoker: &ChipOpInvoker<C>,
    path: impl AsRef<Path>,
    address: u64,
    data: u64,
) -> Result<()> {
    let path = path.as_ref();
    validate_path(path)?;

    invoker.invoke_fixed::<WRITE_RESP_LENGTH>(path, &write_command(address, data))?;
    debug!(address, data, "SCOM write");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Error;

    #[test]
    fn test_read_command_layout() {
        let cmd = read_command(0x0003_0000_0000_000F);
        assert_eq!(cmd.words(), &[4, 0xA201, 0x0003_0000, 0x0000_000F]);
    }

    #[test]
    fn test_write_command_layout() {
        let cmd = write_command(0x1, 0xDEAD_BEEF_0000_0002);
        assert_eq!(cmd.words(), &[6, 0xA202, 0, 1, 0xDEAD_BEEF, 2]);
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(read("", 0x1), Err(Error::InvalidArgument(_))));
        assert!(matches!(write("", 0x1, 0x2), Err(Error::InvalidArgument(_))));
    }
}
