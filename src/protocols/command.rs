use crate::constants::{FRAME_END, FRAME_START};

use super::fields::{ByteOrder, Field};

/// Command identifiers understood by the scale firmware
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMessage {
    ReadWeight = b'w',
    Tare = b't',
    CalibrationFactor = b'f',
    Calibrate = b'c',
    ConfirmCalibration = b'a',
    Identify = b'i',
}

/// How a command is put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `<` + command + payload + `>`
    #[default]
    Delimited,

    /// Command and payload only, for older firmware
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub message: ScaleMessage,
    pub payload: Vec<Field>,
    pub order: ByteOrder,
}

impl Command {
    pub fn new(message: ScaleMessage) -> Self {
        Command {
            message,
            payload: Vec::new(),
            order: ByteOrder::default(),
        }
    }

    pub fn with_payload(mut self, payload: Vec<Field>, order: ByteOrder) -> Self {
        self.payload = payload;
        self.order = order;
        self
    }

    pub fn encode(&self, framing: Framing) -> Vec<u8> {
        let mut body = vec![self.message as u8];
        for field in &self.payload {
            body.extend(field.pack(self.order));
        }

        match framing {
            Framing::Delimited => vec![vec![FRAME_START], body, vec![FRAME_END]].concat(),
            Framing::Raw => body,
        }
    }
}
