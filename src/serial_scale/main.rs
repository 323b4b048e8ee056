use clap::{Parser, Subcommand};
use commands::{ConnectOptions, handle_command};
use serial_scale::error::ScaleResult;

mod commands;
mod prompt;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
struct Cli {
    #[clap(flatten)]
    connect: ConnectOptions,

    /// Log protocol traffic
    #[clap(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Read a single weight
    #[command(name = "read", alias = "r")]
    Read,

    /// Read repeatedly and reduce to one value
    #[command(name = "reliable")]
    Reliable(commands::ReliableOptions),

    /// Zero the scale
    #[command(name = "tare", alias = "t")]
    Tare,

    /// Print the calibration factor stored on the scale
    #[command(name = "factor")]
    Factor,

    /// Check the identity banner
    #[command(name = "identify")]
    Identify,

    /// Calibrate interactively with a reference mass
    #[command(name = "calibrate")]
    Calibrate(commands::CalibrateOptions),

    /// List USB serial ports
    #[command(name = "ports")]
    Ports,
}

fn main() -> ScaleResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    handle_command(cli.connect, cli.command)
}
