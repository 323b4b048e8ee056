#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serial_scale::{
    ScaleConfig,
    error::{ScaleError, ScaleResult},
    interface::{DeviceInterface, PortOpener, SerialportParams},
};

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

/// Shared state of a simulated scale, inspected by the tests
#[derive(Default)]
pub struct SimState {
    pub written: Vec<Vec<u8>>,
    pub pending: VecDeque<u8>,
    pub opened: Vec<String>,
    pub flushes: usize,
    /// Make input-buffer queries fail
    pub fail_bytes_to_read: bool,
    /// Make writes of frames carrying this command fail
    pub reject_command: Option<u8>,
}

/// Opens simulated devices on an allow-list of port names
#[derive(Clone)]
pub struct SimOpener {
    pub state: Arc<Mutex<SimState>>,
    responder: Arc<Mutex<Responder>>,
    ports: Arc<HashSet<String>>,
}

impl SimOpener {
    pub fn new(
        ports: &[&str],
        responder: impl FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    ) -> Self {
        SimOpener {
            state: Arc::new(Mutex::new(SimState::default())),
            responder: Arc::new(Mutex::new(Box::new(responder))),
            ports: Arc::new(ports.iter().map(|p| p.to_string()).collect()),
        }
    }

    /// A device on `port` answering framed commands through `reply`
    pub fn replying(port: &str, reply: impl Fn(u8) -> Option<&'static str> + Send + 'static) -> Self {
        Self::new(&[port], move |frame| {
            command_byte(frame)
                .and_then(&reply)
                .map(|line| line.as_bytes().to_vec())
        })
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    /// Bytes waiting to be read, as if the device sent them unprompted
    pub fn inject(&self, bytes: &[u8]) {
        self.state.lock().unwrap().pending.extend(bytes);
    }
}

/// The command byte of a `<x...>` frame
pub fn command_byte(frame: &[u8]) -> Option<u8> {
    match frame {
        [b'<', command, .., b'>'] => Some(*command),
        _ => None,
    }
}

impl PortOpener for SimOpener {
    fn open(&self, params: &SerialportParams) -> ScaleResult<Box<dyn DeviceInterface>> {
        if !self.ports.contains(&params.port) {
            return Err(ScaleError::Connection {
                port: params.port.clone(),
                reason: "No such file or directory".to_string(),
            });
        }

        self.state.lock().unwrap().opened.push(params.port.clone());
        Ok(Box::new(SimDevice {
            state: Arc::clone(&self.state),
            responder: Arc::clone(&self.responder),
        }))
    }
}

struct SimDevice {
    state: Arc<Mutex<SimState>>,
    responder: Arc<Mutex<Responder>>,
}

impl DeviceInterface for SimDevice {
    fn write_all(&mut self, bytes: &[u8]) -> ScaleResult<()> {
        let rejected = self.state.lock().unwrap().reject_command;
        if rejected.is_some() && command_byte(bytes) == rejected {
            return Err(ScaleError::Communication("write rejected".to_string()));
        }

        let reply = {
            let mut responder = self.responder.lock().unwrap();
            (*responder)(bytes)
        };
        let mut state = self.state.lock().unwrap();
        state.written.push(bytes.to_vec());
        if let Some(reply) = reply {
            state.pending.extend(reply);
        }
        Ok(())
    }

    fn flush(&mut self) -> ScaleResult<()> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> ScaleResult<usize> {
        let mut state = self.state.lock().unwrap();
        let mut size = 0;
        while size < buffer.len() {
            match state.pending.pop_front() {
                Some(byte) => {
                    buffer[size] = byte;
                    size += 1;
                }
                None => break,
            }
        }
        Ok(size)
    }

    fn bytes_to_read(&mut self) -> ScaleResult<usize> {
        let state = self.state.lock().unwrap();
        if state.fail_bytes_to_read {
            return Err(ScaleError::Communication("input query failed".to_string()));
        }
        Ok(state.pending.len())
    }
}

/// Config with short timings so failing start-ups end quickly
pub fn fast_config(port: &str) -> ScaleConfig {
    ScaleConfig::new(port)
        .timeout(Duration::from_millis(10))
        .startup_timeout(Duration::from_millis(100))
        .poll_interval(Duration::from_millis(5))
}

/// Captures formatted log output
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with logs going into the returned capture
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, LogCapture) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
