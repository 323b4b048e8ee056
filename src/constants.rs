pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD_RATE: u32 = 115200;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 10_000;
pub const READY_POLL_INTERVAL_MS: u64 = 50;

/// Weights are reported with this many decimal places
pub const WEIGHT_DECIMALS: u32 = 2;

pub const IDENTITY_BANNER: &str = "<SerialWeighingScale>";

pub const FRAME_START: u8 = b'<';
pub const FRAME_END: u8 = b'>';
pub const LINE_TERMINATOR: u8 = b'\n';
/// Longest response line kept before giving up on a terminator
pub const MAX_LINE_LENGTH: usize = 1024;

pub(crate) const MAX_READ_CHUNK: usize = 1024;
