use std::time::Duration;

use clap::Args;
use serial_scale::{
    DEFAULT_CANDIDATE_PORTS, Measure, Scale, ScaleConfig, available_scale_ports,
    connect_serial_scale,
    constants::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT, DEFAULT_TIMEOUT_MS},
    error::{ScaleError, ScaleResult},
};
use tracing::info;

use crate::Command;
use crate::prompt::StdinConfirmation;

#[derive(Args, Debug, Clone)]
pub(crate) struct ConnectOptions {
    /// Serial port, searched among /dev/ttyACM0-4 when omitted
    #[clap(short, long, global = true)]
    port: Option<String>,

    /// Baud rate
    #[clap(short, long, global = true, default_value_t = DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Read timeout in milliseconds
    #[clap(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Only open the port, skip waiting for the scale to answer
    #[clap(long, global = true, default_value_t = false)]
    no_start: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ReliableOptions {
    /// Number of readings to take
    #[clap(short = 'n', long, default_value_t = 5)]
    readings: usize,

    /// Delay between readings in milliseconds
    #[clap(short, long, default_value_t = 100)]
    delay_ms: u64,

    /// How to combine the readings
    #[clap(short, long, value_enum, default_value_t = Measure::Median)]
    measure: Measure,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CalibrateOptions {
    /// Mass of the reference object, in the unit the scale should report
    #[clap(short, long)]
    mass: f64,
}

fn connect(opts: &ConnectOptions) -> ScaleResult<Scale> {
    let config = ScaleConfig::new(opts.port.as_deref().unwrap_or(DEFAULT_SERIAL_PORT))
        .baud(opts.baudrate)
        .timeout(Duration::from_millis(opts.timeout_ms));
    let start = !opts.no_start;

    match &opts.port {
        Some(port) => connect_serial_scale(&[port.as_str()], &config, start),
        None => connect_serial_scale(&DEFAULT_CANDIDATE_PORTS, &config, start),
    }
}

fn with_scale(
    opts: &ConnectOptions,
    action: impl FnOnce(&mut Scale) -> ScaleResult<()>,
) -> ScaleResult<()> {
    let mut scale = connect(opts)?;
    let result = action(&mut scale);
    scale.disconnect();
    result
}

fn print_reading(reading: Option<f64>, what: &str) -> ScaleResult<()> {
    match reading {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(ScaleError::Communication(format!(
            "Scale did not return a {}",
            what
        ))),
    }
}

pub(crate) fn handle_command(opts: ConnectOptions, command: Command) -> ScaleResult<()> {
    match command {
        Command::Ports => {
            for port in available_scale_ports()? {
                println!("{}", port);
            }
            Ok(())
        }
        Command::Read => with_scale(&opts, |scale| print_reading(scale.read_weight()?, "weight")),
        Command::Reliable(reliable) => with_scale(&opts, |scale| {
            scale.progress_bar(true);
            let weight = scale
                .read_weight_reliable(
                    reliable.readings,
                    Duration::from_millis(reliable.delay_ms),
                    reliable.measure,
                )?
                .ok_or(ScaleError::EmptyBatch(reliable.readings))?;
            println!("{}", weight);
            Ok(())
        }),
        Command::Tare => with_scale(&opts, |scale| scale.tare()),
        Command::Factor => with_scale(&opts, |scale| {
            print_reading(scale.get_calibration_factor()?, "calibration factor")
        }),
        Command::Identify => with_scale(&opts, |scale| {
            let identified = scale.identify()?;
            println!(
                "{}: {}",
                scale.port(),
                if identified { "scale" } else { "unknown" }
            );
            Ok(())
        }),
        Command::Calibrate(calibrate) => with_scale(&opts, |scale| {
            let factor = scale.calibrate(calibrate.mass, &mut StdinConfirmation)?;
            if let Some(factor) = factor {
                info!("Store {} as the calibration factor in the firmware", factor);
            }
            print_reading(factor, "calibration value")
        }),
    }
}
