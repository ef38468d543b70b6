//! SBE FIFO device transport

mod device;
mod fifo;

pub use device::{DeviceHandle, FifoDevice};
pub use fifo::FifoTransport;
