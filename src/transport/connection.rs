use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::constants::{LINE_TERMINATOR, MAX_LINE_LENGTH, MAX_READ_CHUNK};
use crate::error::{ScaleError, ScaleResult};
use crate::interface::serialport::SerialPortOpener;
use crate::interface::{DeviceInterface, PortOpener, SerialportParams};
use crate::protocols::{ByteOrder, Field, FieldKind, layout_size, unpack};

/// Owns the serial handle to one scale.
///
/// Never reconnects on its own: every operation other than `connect` fails
/// with [`ScaleError::NotConnected`] while the handle is closed.
pub struct SerialConnection<O: PortOpener = SerialPortOpener> {
    params: SerialportParams,
    opener: O,
    device: Option<Box<dyn DeviceInterface>>,
}

impl SerialConnection<SerialPortOpener> {
    pub fn new(params: SerialportParams) -> Self {
        Self::with_opener(params, SerialPortOpener)
    }
}

impl<O: PortOpener> SerialConnection<O> {
    pub fn with_opener(params: SerialportParams, opener: O) -> Self {
        SerialConnection {
            params,
            opener,
            device: None,
        }
    }

    pub fn params(&self) -> &SerialportParams {
        &self.params
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    /// Open the port unless it is already open, then drop whatever the
    /// device sent before we were listening.
    pub fn connect(&mut self) -> ScaleResult<()> {
        if self.is_connected() {
            debug!("{} already open", self.params.port);
            return Ok(());
        }

        let mut device = self.opener.open(&self.params)?;
        drain(device.as_mut())?;

        self.device = Some(device);
        info!(
            "Connected to {} at {} baud",
            self.params.port, self.params.baud
        );
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.device.take().is_some() {
            info!("Disconnected from {}", self.params.port);
        }
    }

    fn device(&mut self) -> ScaleResult<&mut Box<dyn DeviceInterface>> {
        let port = &self.params.port;
        self.device
            .as_mut()
            .ok_or_else(|| ScaleError::NotConnected(format!("{} is not open", port)))
    }

    /// Discard all input currently waiting, without blocking
    pub fn clear_buffer(&mut self) -> ScaleResult<()> {
        drain(self.device()?.as_mut())
    }

    /// Clear pending input, then write and flush `bytes`
    pub fn send(&mut self, bytes: &[u8]) -> ScaleResult<()> {
        self.device()?;
        self.clear_buffer()?;

        let device = self.device()?;
        device.write_all(bytes)?;
        device.flush()?;
        debug!("Sent {:?}", String::from_utf8_lossy(bytes));
        Ok(())
    }

    /// Read up to `expected_bytes`, returning fewer if the port times out
    pub fn read(&mut self, expected_bytes: usize) -> ScaleResult<Vec<u8>> {
        let device = self.device()?;
        let mut buffer: Vec<u8> = Vec::with_capacity(expected_bytes);

        // Block and keep reading until we have the expected number of bytes
        while buffer.len() < expected_bytes {
            let mut temp_buffer = vec![0; (expected_bytes - buffer.len()).min(MAX_READ_CHUNK)];
            let bytes_read = device.read(&mut temp_buffer)?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&temp_buffer[..bytes_read]);
        }

        Ok(buffer)
    }

    /// Like [`read`](Self::read), but a short read is a timeout
    pub fn read_exact(&mut self, expected_bytes: usize) -> ScaleResult<Vec<u8>> {
        let buffer = self.read(expected_bytes)?;
        if buffer.len() != expected_bytes {
            return Err(ScaleError::Timeout(format!(
                "Expected {} bytes from {}, received {}",
                expected_bytes,
                self.params.port,
                buffer.len()
            )));
        }

        Ok(buffer)
    }

    /// Read one binary record and unpack it following `layout`
    pub fn read_fields(&mut self, layout: &[FieldKind], order: ByteOrder) -> ScaleResult<Vec<Field>> {
        let raw = self.read_exact(layout_size(layout))?;
        let fields = unpack(&raw, layout, order)?;
        debug!("Unpacked {:?}", fields);
        Ok(fields)
    }

    /// Read until a newline, the port timeout, or `MAX_LINE_LENGTH` bytes.
    /// The timeout covers the whole line, not each byte. The terminator and
    /// surrounding whitespace are stripped; a timeout with nothing received
    /// gives an empty line.
    pub fn read_line(&mut self) -> ScaleResult<String> {
        let deadline = Instant::now() + self.params.timeout;
        let device = self.device()?;
        let mut line: Vec<u8> = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            if device.read(&mut byte)? == 0 || byte[0] == LINE_TERMINATOR {
                break;
            }
            line.push(byte[0]);

            if line.len() >= MAX_LINE_LENGTH || Instant::now() >= deadline {
                warn!("Gave up on unterminated line after {} bytes", line.len());
                break;
            }
        }

        let line = String::from_utf8_lossy(&line).trim().to_string();
        debug!("Received line {:?}", line);
        Ok(line)
    }
}

/// Discard all input currently waiting on `device`
fn drain(device: &mut dyn DeviceInterface) -> ScaleResult<()> {
    let mut buffer = [0u8; MAX_READ_CHUNK];

    loop {
        let waiting = device.bytes_to_read()?;
        if waiting == 0 {
            break;
        }

        let size = device.read(&mut buffer[..waiting.min(MAX_READ_CHUNK)])?;
        if size == 0 {
            break;
        }
        trace!("Discarded {} stale bytes", size);
    }

    Ok(())
}
