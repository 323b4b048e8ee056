use tracing::{debug, info, warn};

use crate::error::{ScaleError, ScaleResult};
use crate::interface::PortOpener;
use crate::interface::serialport::SerialPortOpener;
use crate::scale::{Scale, ScaleConfig};

/// Ports the Arduino-based scales usually enumerate as on Linux
pub const DEFAULT_CANDIDATE_PORTS: [&str; 5] = [
    "/dev/ttyACM0",
    "/dev/ttyACM1",
    "/dev/ttyACM2",
    "/dev/ttyACM3",
    "/dev/ttyACM4",
];

/// Connect to the first candidate port that holds a scale.
///
/// `config` supplies every setting except the port. With `start` set the
/// scale must also pass its readiness probes, otherwise opening the port is
/// enough. Ports that fail to open or never become ready are skipped.
pub fn connect_serial_scale<S: AsRef<str>>(
    candidates: &[S],
    config: &ScaleConfig,
    start: bool,
) -> ScaleResult<Scale<SerialPortOpener>> {
    connect_serial_scale_with(SerialPortOpener, candidates, config, start)
}

pub fn connect_serial_scale_with<O, S>(
    opener: O,
    candidates: &[S],
    config: &ScaleConfig,
    start: bool,
) -> ScaleResult<Scale<O>>
where
    O: PortOpener + Clone,
    S: AsRef<str>,
{
    for candidate in candidates {
        let port = candidate.as_ref();
        let config = config.clone().with_port(port).auto_connect(false);
        let mut scale = Scale::with_opener(config, opener.clone())?;

        let result = if start { scale.connect() } else { scale.open() };
        match result {
            Ok(()) => {
                info!("Found scale on {}", port);
                return Ok(scale);
            }
            Err(e @ ScaleError::Connection { .. }) => debug!("Skipping {}: {}", port, e),
            Err(e @ ScaleError::Timeout(_)) => warn!("Skipping {}: {}", port, e),
            Err(e) => return Err(e),
        }
    }

    Err(ScaleError::Configuration(format!(
        "Looked at all candidate ports {:?}; none of them holds a responding scale",
        candidates.iter().map(|c| c.as_ref()).collect::<Vec<_>>()
    )))
}

/// Names of the USB serial ports currently present
pub fn available_scale_ports() -> ScaleResult<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| {
        ScaleError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    Ok(ports
        .into_iter()
        .filter(|port| matches!(port.port_type, serialport::SerialPortType::UsbPort(_)))
        .map(|port| port.port_name)
        .collect())
}
