pub mod serialport;

use std::time::Duration;

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS};
use crate::error::ScaleResult;

pub type ComPort = String;
pub type BaudRate = u32;

/// Everything needed to open a serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialportParams {
    pub port: ComPort,
    pub baud: BaudRate,
    pub timeout: Duration,
}

impl SerialportParams {
    pub fn new(port: impl Into<ComPort>) -> Self {
        SerialportParams {
            port: port.into(),
            baud: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_baud(mut self, baud: BaudRate) -> Self {
        self.baud = baud;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An open connection to the scale
pub trait DeviceInterface: Send {
    /// Write every byte to the device
    fn write_all(&mut self, bytes: &[u8]) -> ScaleResult<()>;

    /// Block until written bytes have left the host
    fn flush(&mut self) -> ScaleResult<()>;

    /// Read up to `buffer.len()` bytes, waiting at most the port timeout.
    /// A timeout is not an error and reads zero bytes.
    fn read(&mut self, buffer: &mut [u8]) -> ScaleResult<usize>;

    /// Number of bytes received and not yet read
    fn bytes_to_read(&mut self) -> ScaleResult<usize>;
}

/// Opens device interfaces. Kept separate from the interface itself so the
/// transport can reopen after a disconnect.
pub trait PortOpener {
    fn open(&self, params: &SerialportParams) -> ScaleResult<Box<dyn DeviceInterface>>;
}
