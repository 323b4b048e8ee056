use tracing::trace;

use super::{DeviceInterface, PortOpener, SerialportParams};

use crate::error::{ScaleError, ScaleResult};
use std::io::{Read, Write};

/// Serial port device_interface layer
pub struct SerialPortDevice {
    pub serial_port: Box<dyn serialport::SerialPort>,
}

impl SerialPortDevice {
    pub fn new(params: &SerialportParams) -> ScaleResult<SerialPortDevice> {
        let serial_port = serialport::new(params.port.as_str(), params.baud)
            .timeout(params.timeout)
            .open()
            .map_err(|e| ScaleError::Connection {
                port: params.port.clone(),
                reason: e.to_string(),
            })?;

        Ok(SerialPortDevice { serial_port })
    }
}

impl DeviceInterface for SerialPortDevice {
    fn write_all(&mut self, bytes: &[u8]) -> ScaleResult<()> {
        self.serial_port
            .write_all(bytes)
            .map_err(|e| ScaleError::Communication(format!("{:?}", e)))?;
        trace!("Sent bytes {:?}", bytes);
        Ok(())
    }

    fn flush(&mut self) -> ScaleResult<()> {
        self.serial_port
            .flush()
            .map_err(|e| ScaleError::Communication(format!("Failed to flush output, {}", e)))
    }

    fn read(&mut self, buffer: &mut [u8]) -> ScaleResult<usize> {
        let size = self
            .serial_port
            .read(buffer)
            // Timeout error is fine, just continue
            .or_else(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            })
            .map_err(|e| ScaleError::Communication(format!("{:?}", e)))?;

        trace!("Received bytes {:?}", &buffer[..size]);
        Ok(size)
    }

    fn bytes_to_read(&mut self) -> ScaleResult<usize> {
        self.serial_port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| ScaleError::Communication(format!("Failed to query input buffer, {}", e)))
    }
}

/// Opens real serial ports through the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortOpener;

impl PortOpener for SerialPortOpener {
    fn open(&self, params: &SerialportParams) -> ScaleResult<Box<dyn DeviceInterface>> {
        Ok(Box::new(SerialPortDevice::new(params)?))
    }
}
