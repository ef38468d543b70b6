//! Chip-operation invoker: open, exchange, parse, length check.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::protocol::{Command, Error, MAX_FFDC_LEN_IN_WORDS, Result, parse_response};
use crate::transport::{DeviceHandle, FifoDevice, FifoTransport};

/// Invoker configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChipOpConfig {
    /// FFDC capacity, in words, added to every reply buffer.
    pub max_ffdc_words: usize,
}

impl Default for ChipOpConfig {
    fn default() -> Self {
        Self {
            max_ffdc_words: MAX_FFDC_LEN_IN_WORDS,
        }
    }
}

/// Opens the device a chip operation runs against.
pub trait Connector {
    /// Device type produced for each operation.
    type Device: FifoDevice;

    /// Open the device at `path`; it is dropped when the operation ends.
    fn connect(&self, path: &Path) -> Result<Self::Device>;
}

/// Connector opening the SBE FIFO character device.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceConnector;

impl Connector for DeviceConnector {
    type Device = DeviceHandle;

    fn connect(&self, path: &Path) -> Result<DeviceHandle> {
        DeviceHandle::open(path)
    }
}

/// Runs one chip operation per call, each on a freshly opened device.
///
/// The protocol carries no request identifiers, so callers sharing a device
/// path must serialise their calls.
#[derive(Debug, Clone, Default)]
pub struct ChipOpInvoker<C = DeviceConnector> {
    connector: C,
    transport: FifoTransport,
}

impl ChipOpInvoker {
    /// Invoker for the SBE FIFO device with the given configuration.
    #[must_use]
    pub fn new(config: &ChipOpConfig) -> Self {
        Self::with_connector(DeviceConnector, config)
    }
}

impl<C: Connector> ChipOpInvoker<C> {
    /// Invoker opening devices through `connector`.
    #[must_use]
    pub fn with_connector(connector: C, config: &ChipOpConfig) -> Self {
        Self {
            connector,
            transport: FifoTransport::new(config.max_ffdc_words),
        }
    }

    /// Access the connector.
    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Send `command` to the device at `path` and return exactly
    /// `expected_payload_words` payload words.
    #[instrument(
        level = "debug",
        skip(self, path, command),
        fields(path = %path.display(), opcode = ?command.opcode())
    )]
    pub fn invoke(
        &self,
        path: &Path,
        command: &Command,
        expected_payload_words: usize,
    ) -> Result<Vec<u32>> {
        let mut device = self.connector.connect(path)?;
        let mut words = self
            .transport
            .exchange(&mut device, command, expected_payload_words)?;

        let header = match parse_response(&mut words) {
            Ok(header) => header,
            Err(err) => {
                if let Error::ChipOperationFailed { status, ffdc } = &err {
                    warn!(%status, ffdc_words = ffdc.len(), "SBE reported chip operation failure");
                }
                return Err(err);
            }
        };

        if let Some(opcode) = command.opcode() {
            if !header.matches(opcode) {
                debug!(
                    class = header.class(),
                    code = header.code(),
                    %opcode,
                    "status header does not echo the request opcode"
                );
            }
        }

        if words.len() != expected_payload_words {
            return Err(Error::LengthMismatch {
                got: words.len(),
                expected: expected_payload_words,
            });
        }

        debug!(payload_words = words.len(), "chip operation complete");
        Ok(words)
    }

    /// Like [`invoke`](Self::invoke) with the payload length fixed at compile time.
    pub fn invoke_fixed<const N: usize>(&self, path: &Path, command: &Command) -> Result<[u32; N]> {
        let words = self.invoke(path, command, N)?;
        <[u32; N]>::try_from(words).map_err(|words| Error::LengthMismatch {
            got: words.len(),
            expected: N,
        })
    }
}

/// Reject paths no device can be opened from.
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("empty FIFO device path"));
    }
    Ok(())
}
