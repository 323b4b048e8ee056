//! Client for serial weighing scales.
//!
//! A [`Scale`] sends single-character commands over a serial port and
//! parses the one-line replies into weights and calibration values. Noisy
//! readings can be combined with [`Scale::read_weight_reliable`].

pub use calibration::Confirmation;
pub use discovery::{
    DEFAULT_CANDIDATE_PORTS, available_scale_ports, connect_serial_scale,
    connect_serial_scale_with,
};
pub use error::{ScaleError, ScaleResult};
pub use interface::SerialportParams;
pub use scale::{Readiness, Scale, ScaleConfig, ScaleState};
pub use statistics::{Measure, Reducer};
pub use transport::SerialConnection;

pub mod calibration;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod interface;
pub mod protocols;
pub mod scale;
pub mod statistics;
pub mod transport;
pub(crate) mod util;
