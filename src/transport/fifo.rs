//! Write/poll/read handshake against the SBE FIFO.
//!
//! One exchange is strictly half-duplex: the command is written only once
//! the device reports writable, and the reply is read only once it reports
//! readable. Both waits are unbounded.

use std::io;
use std::os::fd::{AsFd, AsRawFd};

use tracing::{debug, instrument, trace};

use super::device::FifoDevice;
use crate::protocol::{
    Command, Error, IoFailure, IoPhase, MAX_FFDC_LEN_IN_WORDS, Result, WORD_SIZE, decode_words,
    encode_command,
};

/// Performs the FIFO handshake for a single chip operation.
#[derive(Debug, Clone, Copy)]
pub struct FifoTransport {
    max_ffdc_words: usize,
}

impl FifoTransport {
    /// Create a transport that sizes reply buffers for `max_ffdc_words` of FFDC.
    ///
    /// Values above [`MAX_FFDC_LEN_IN_WORDS`] are capped to it.
    #[must_use]
    pub const fn new(max_ffdc_words: usize) -> Self {
        let max_ffdc_words = if max_ffdc_words > MAX_FFDC_LEN_IN_WORDS {
            MAX_FFDC_LEN_IN_WORDS
        } else {
            max_ffdc_words
        };
        Self { max_ffdc_words }
    }

    /// FFDC capacity in words added to every reply buffer.
    #[must_use]
    pub const fn max_ffdc_words(&self) -> usize {
        self.max_ffdc_words
    }

    /// Reply buffer size in words for an operation returning
    /// `expected_payload_words`, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn reply_capacity(&self, expected_payload_words: usize) -> Option<usize> {
        expected_payload_words.checked_add(self.max_ffdc_words)
    }

    /// Write `command` and return the raw reply words in host order.
    ///
    /// The read accepts whatever the device returns, up to the reply
    /// capacity; only whole words are kept.
    #[instrument(
        level = "debug",
        skip(self, device, command),
        fields(path = %device.path().display(), words = command.len())
    )]
    pub fn exchange<D: FifoDevice>(
        &self,
        device: &mut D,
        command: &Command,
        expected_payload_words: usize,
    ) -> Result<Vec<u32>> {
        let reply_bytes = self
            .reply_capacity(expected_payload_words)
            .and_then(|words| words.checked_mul(WORD_SIZE))
            .ok_or(Error::InvalidArgument("expected payload length overflows the reply buffer"))?;

        wait_ready(device, IoPhase::Write)?;

        let bytes = encode_command(command);
        let written = device
            .write(&bytes)
            .map_err(|source| device_error(device, IoPhase::Write, IoFailure::WriteFailed, source))?;
        if written != bytes.len() {
            let source = io::Error::new(
                io::ErrorKind::WriteZero,
                format!("wrote {written} of {} bytes", bytes.len()),
            );
            return Err(device_error(device, IoPhase::Write, IoFailure::ShortWrite, source));
        }

        wait_ready(device, IoPhase::Read)?;

        let mut buffer = vec![0u8; reply_bytes];
        let read = device
            .read(&mut buffer)
            .map_err(|source| device_error(device, IoPhase::Read, IoFailure::ReadFailed, source))?;

        let words = decode_words(&buffer[..read]);
        debug!(bytes = read, words = words.len(), "received SBE reply");
        Ok(words)
    }
}

impl Default for FifoTransport {
    fn default() -> Self {
        Self::new(MAX_FFDC_LEN_IN_WORDS)
    }
}

/// Block until the device is ready for `phase`.
fn wait_ready<D: FifoDevice>(device: &D, phase: IoPhase) -> Result<()> {
    let wanted = match phase {
        IoPhase::Write => libc::POLLOUT,
        IoPhase::Read => libc::POLLIN,
    };
    let mut poll_fd = libc::pollfd {
        fd: device.as_fd().as_raw_fd(),
        events: wanted | libc::POLLERR,
        revents: 0,
    };

    loop {
        // SAFETY: `poll_fd` is one initialised pollfd whose descriptor stays
        // open for the duration of the call since `device` is borrowed.
        let rc = unsafe { libc::poll(&mut poll_fd, 1, -1) };
        if rc > 0 {
            break;
        }
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                trace!(%phase, "poll interrupted, waiting again");
                continue;
            }
            return Err(device_error(device, phase, IoFailure::WaitFailed, err));
        }
    }

    let revents = poll_fd.revents;
    if is_error_condition(revents, wanted) {
        let source = io::Error::other(format!("poll revents {revents:#x}"));
        return Err(device_error(device, phase, IoFailure::ErrorCondition, source));
    }

    trace!(%phase, revents, "SBE FIFO ready");
    Ok(())
}

/// Error, invalid descriptor, or hang-up without the requested readiness.
fn is_error_condition(revents: libc::c_short, wanted: libc::c_short) -> bool {
    let hung_up = revents & libc::POLLHUP != 0 && revents & wanted == 0;
    revents & (libc::POLLERR | libc::POLLNVAL) != 0 || hung_up
}

fn device_error<D: FifoDevice>(
    device: &D,
    phase: IoPhase,
    kind: IoFailure,
    source: io::Error,
) -> Error {
    Error::DeviceIo {
        path: device.path().to_path_buf(),
        phase,
        kind,
        source,
    }
}
