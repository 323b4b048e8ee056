use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::calibration::Confirmation;
use crate::constants::{
    DEFAULT_STARTUP_TIMEOUT_MS, IDENTITY_BANNER, READY_POLL_INTERVAL_MS, WEIGHT_DECIMALS,
};
use crate::error::{ScaleError, ScaleResult};
use crate::interface::serialport::SerialPortOpener;
use crate::interface::{BaudRate, ComPort, PortOpener, SerialportParams};
use crate::protocols::{
    ByteOrder, Command, Field, Framing, Precision, ScaleMessage, parse_reading,
};
use crate::statistics::Reducer;
use crate::transport::SerialConnection;
use crate::util::create_progress_bar;

/// Which probes must pass before a scale counts as ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// A weight read returns a number
    pub numeric_read: bool,

    /// The device answers identify with the expected banner
    pub identity: bool,
}

impl Default for Readiness {
    fn default() -> Self {
        Readiness {
            numeric_read: true,
            identity: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleState {
    Disconnected,
    Connecting,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    pub serial: SerialportParams,
    pub tare_on_connect: bool,
    pub auto_connect: bool,
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
    pub readiness: Readiness,
    pub framing: Framing,
    /// Pause between sending a command and reading its response
    pub write_read_delay: Duration,
}

impl ScaleConfig {
    pub fn new(port: impl Into<ComPort>) -> Self {
        ScaleConfig {
            serial: SerialportParams::new(port),
            tare_on_connect: false,
            auto_connect: false,
            startup_timeout: Duration::from_millis(DEFAULT_STARTUP_TIMEOUT_MS),
            poll_interval: Duration::from_millis(READY_POLL_INTERVAL_MS),
            readiness: Readiness::default(),
            framing: Framing::default(),
            write_read_delay: Duration::ZERO,
        }
    }

    pub fn baud(mut self, baud: BaudRate) -> Self {
        self.serial.baud = baud;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.serial.timeout = timeout;
        self
    }

    pub fn tare_on_connect(mut self, enable: bool) -> Self {
        self.tare_on_connect = enable;
        self
    }

    pub fn auto_connect(mut self, enable: bool) -> Self {
        self.auto_connect = enable;
        self
    }

    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn write_read_delay(mut self, delay: Duration) -> Self {
        self.write_read_delay = delay;
        self
    }

    /// Same settings, different port
    pub fn with_port(mut self, port: impl Into<ComPort>) -> Self {
        self.serial.port = port.into();
        self
    }
}

/// Client for one serial weighing scale
pub struct Scale<O: PortOpener = SerialPortOpener> {
    connection: SerialConnection<O>,
    config: ScaleConfig,
    state: ScaleState,
    progress_bar_enable: bool,
}

impl Scale<SerialPortOpener> {
    pub fn new(config: ScaleConfig) -> ScaleResult<Self> {
        Self::with_opener(config, SerialPortOpener)
    }
}

impl<O: PortOpener> Scale<O> {
    /// Build a scale on top of a custom port opener. Connects right away
    /// when the config asks for auto-connect.
    pub fn with_opener(config: ScaleConfig, opener: O) -> ScaleResult<Self> {
        let mut scale = Scale {
            connection: SerialConnection::with_opener(config.serial.clone(), opener),
            config,
            state: ScaleState::Disconnected,
            progress_bar_enable: false,
        };

        if scale.config.auto_connect {
            scale.connect()?;
        }

        Ok(scale)
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    pub fn port(&self) -> &str {
        &self.config.serial.port
    }

    pub fn state(&self) -> ScaleState {
        self.state
    }

    pub fn connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn progress_bar(&mut self, enable: bool) {
        self.progress_bar_enable = enable;
    }

    /// Open the port and wait until the scale passes its readiness probes.
    ///
    /// Fails with [`ScaleError::Timeout`] when the probes do not pass within
    /// the start-up window. On any failure, including the tare-on-connect,
    /// the port is closed again.
    pub fn connect(&mut self) -> ScaleResult<()> {
        if self.state == ScaleState::Ready && self.connected() {
            return Ok(());
        }

        self.open()?;

        if let Err(e) = self.start() {
            self.disconnect();
            return Err(e);
        }

        self.state = ScaleState::Ready;
        info!("Scale is ready: {}", self.port());
        Ok(())
    }

    fn start(&mut self) -> ScaleResult<()> {
        self.wait_until_ready()?;
        if self.config.tare_on_connect {
            self.tare()?;
        }
        Ok(())
    }

    /// Open the port without waiting for readiness
    pub fn open(&mut self) -> ScaleResult<()> {
        self.connection.connect()?;
        if self.state == ScaleState::Disconnected {
            self.state = ScaleState::Connecting;
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect();
        self.state = ScaleState::Disconnected;
    }

    fn wait_until_ready(&mut self) -> ScaleResult<()> {
        let Readiness {
            numeric_read,
            identity,
        } = self.config.readiness;
        let start = Instant::now();

        loop {
            let numeric_ok = !numeric_read || self.is_ready()?;
            let identity_ok = !identity || self.identify()?;
            if numeric_ok && identity_ok {
                return Ok(());
            }

            if start.elapsed() >= self.config.startup_timeout {
                return Err(ScaleError::Timeout(format!(
                    "{} did not become ready within {:?} (numeric read: {}, identity: {})",
                    self.port(),
                    self.config.startup_timeout,
                    numeric_ok,
                    identity_ok
                )));
            }

            thread::sleep(self.config.poll_interval);
        }
    }

    /// Numeric-read probe: a weight read returns a number
    pub fn is_ready(&mut self) -> ScaleResult<bool> {
        Ok(self.read_weight()?.is_some())
    }

    fn send_command(&mut self, command: Command) -> ScaleResult<()> {
        let frame = command.encode(self.config.framing);
        debug!("Encoded {:?} as {:?}", command.message, frame);
        self.connection.send(&frame)
    }

    fn exchange_line(&mut self, command: Command) -> ScaleResult<String> {
        self.send_command(command)?;
        if !self.config.write_read_delay.is_zero() {
            thread::sleep(self.config.write_read_delay);
        }
        self.connection.read_line()
    }

    /// Read one weight, rounded to two decimals. A response that is not a
    /// number is logged and gives `None`.
    pub fn read_weight(&mut self) -> ScaleResult<Option<f64>> {
        let line = self.exchange_line(Command::new(ScaleMessage::ReadWeight))?;
        let weight = parse_reading(&line, Precision::Decimals(WEIGHT_DECIMALS));
        if weight.is_none() {
            warn!("Failed to convert weight result to float: {:?}", line);
        }
        Ok(weight)
    }

    /// Fire-and-forget; callers wait for the scale to settle themselves
    pub fn tare(&mut self) -> ScaleResult<()> {
        self.send_command(Command::new(ScaleMessage::Tare))?;
        info!("Tare command sent");
        Ok(())
    }

    pub fn identify(&mut self) -> ScaleResult<bool> {
        let line = self.exchange_line(Command::new(ScaleMessage::Identify))?;
        Ok(line == IDENTITY_BANNER)
    }

    pub fn get_calibration_factor(&mut self) -> ScaleResult<Option<f64>> {
        let line = self.exchange_line(Command::new(ScaleMessage::CalibrationFactor))?;
        let factor = parse_reading(&line, Precision::Full);
        if factor.is_none() {
            warn!("Failed to convert calibration result to float: {:?}", line);
        }
        Ok(factor)
    }

    /// Take `n_readings` weights, `delay` apart. Failed readings are
    /// dropped, so the result may be shorter than requested.
    pub fn read_weight_repeated(
        &mut self,
        n_readings: usize,
        delay: Duration,
    ) -> ScaleResult<Vec<f64>> {
        let pb = self
            .progress_bar_enable
            .then(|| create_progress_bar(n_readings as u64, "Reading weight"));
        let mut readings = Vec::with_capacity(n_readings);

        for i in 0..n_readings {
            if i > 0 {
                thread::sleep(delay);
            }

            if let Some(weight) = self.read_weight()? {
                readings.push(weight);
            }

            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} valid readings", readings.len()));
        }

        debug!("Readings {:?}", readings);
        Ok(readings)
    }

    /// Reduce repeated readings to a single value. `None` when none of the
    /// readings were valid; the reducer is not called in that case.
    pub fn read_weight_reliable(
        &mut self,
        n_readings: usize,
        delay: Duration,
        reducer: impl Reducer,
    ) -> ScaleResult<Option<f64>> {
        let readings = self.read_weight_repeated(n_readings, delay)?;
        if readings.is_empty() {
            warn!("No valid readings out of {} attempts", n_readings);
            return Ok(None);
        }

        Ok(Some(reducer.reduce(&readings)))
    }

    /// Run the calibration exchange for a reference mass.
    ///
    /// Sends the mass, waits on `confirmation` for it to be placed on the
    /// scale, then confirms and returns the new calibration value reported by
    /// the firmware (`None` if its reply is not a number). The mass goes on
    /// the wire as an `f32`, so digits beyond its precision are lost.
    pub fn calibrate(
        &mut self,
        known_mass: f64,
        confirmation: &mut impl Confirmation,
    ) -> ScaleResult<Option<f64>> {
        self.send_command(
            Command::new(ScaleMessage::Calibrate)
                .with_payload(vec![Field::F32(known_mass as f32)], ByteOrder::Little),
        )?;
        info!("Calibration started for known mass {}", known_mass);

        confirmation.confirm(known_mass)?;

        let line = self.exchange_line(Command::new(ScaleMessage::ConfirmCalibration))?;
        let factor = parse_reading(&line, Precision::Full);
        match factor {
            Some(factor) => info!("Calibration result: {}", factor),
            None => warn!("Failed to convert calibration result to float: {:?}", line),
        }
        Ok(factor)
    }
}
