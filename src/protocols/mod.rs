pub mod command;
pub mod fields;
pub mod response;

pub use command::{Command, Framing, ScaleMessage};
pub use fields::{ByteOrder, Field, FieldKind, layout_size, unpack};
pub use response::{Precision, parse_reading};
