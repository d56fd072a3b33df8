//! Linux `struct input_event` records: layouts, parsing and symbolic names.

use evdevil::event::{EventType, InputEvent};

use crate::error::{Error, Result};

/// Size of struct input_event with a 32-bit timeval (8 + type 2 + code 2 + value 4).
pub const INPUT_EVENT_SIZE_32: usize = 16;
/// Size of struct input_event with a 64-bit timeval (16 + 2 + 2 + 4).
pub const INPUT_EVENT_SIZE_64: usize = 24;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_SLOT: u16 = 0x2f; // 47
pub const ABS_MT_POSITION_X: u16 = 0x35; // 53
pub const ABS_MT_POSITION_Y: u16 = 0x36; // 54
pub const ABS_MT_TRACKING_ID: u16 = 0x39; // 57

/// Binary layout of one record on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLayout {
    /// 32-bit `timeval` (armv7 and other 32-bit targets).
    Compact,
    /// 64-bit `timeval` (aarch64, x86_64).
    Wide,
}

impl EventLayout {
    /// Layout of the kernel struct on the machine we are compiled for.
    pub fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            EventLayout::Wide
        } else {
            EventLayout::Compact
        }
    }

    pub fn from_record_size(size: usize) -> Result<Self> {
        match size {
            INPUT_EVENT_SIZE_32 => Ok(EventLayout::Compact),
            INPUT_EVENT_SIZE_64 => Ok(EventLayout::Wide),
            other => Err(Error::Config(format!(
                "unsupported input_event size {} (expected {} or {})",
                other, INPUT_EVENT_SIZE_32, INPUT_EVENT_SIZE_64
            ))),
        }
    }

    pub fn record_size(self) -> usize {
        match self {
            EventLayout::Compact => INPUT_EVENT_SIZE_32,
            EventLayout::Wide => INPUT_EVENT_SIZE_64,
        }
    }

    /// Byte offset of the `type` field; `code` and `value` follow it.
    fn header_len(self) -> usize {
        self.record_size() - 8
    }
}

/// One decoded record together with its kernel timestamp.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent {
    pub seconds: i64,
    pub microseconds: i64,
    pub event: InputEvent,
}

impl RawEvent {
    /// Record with a zero timestamp.
    pub fn new(kind: u16, code: u16, value: i32) -> Self {
        Self::with_time(0, 0, kind, code, value)
    }

    pub fn with_time(seconds: i64, microseconds: i64, kind: u16, code: u16, value: i32) -> Self {
        Self {
            seconds,
            microseconds,
            event: InputEvent::new(EventType::from_raw(kind), code, value),
        }
    }

    pub fn kind(&self) -> u16 {
        self.event.event_type().raw()
    }

    pub fn code(&self) -> u16 {
        self.event.raw_code()
    }

    pub fn value(&self) -> i32 {
        self.event.raw_value()
    }

    /// Seconds since the epoch as a float.
    pub fn timestamp(&self) -> f64 {
        self.seconds as f64 + self.microseconds as f64 / 1_000_000.0
    }

    /// Serialize into the given layout (little-endian).
    pub fn encode(&self, layout: EventLayout) -> Vec<u8> {
        let mut buf = Vec::with_capacity(layout.record_size());
        match layout {
            EventLayout::Compact => {
                buf.extend_from_slice(&(self.seconds as i32).to_le_bytes());
                buf.extend_from_slice(&(self.microseconds as i32).to_le_bytes());
            }
            EventLayout::Wide => {
                buf.extend_from_slice(&self.seconds.to_le_bytes());
                buf.extend_from_slice(&self.microseconds.to_le_bytes());
            }
        }
        buf.extend_from_slice(&self.kind().to_le_bytes());
        buf.extend_from_slice(&self.code().to_le_bytes());
        buf.extend_from_slice(&self.value().to_le_bytes());
        buf
    }
}

/// Parse one input_event from a buffer holding exactly one record.
pub fn parse_input_event(buf: &[u8], layout: EventLayout) -> Result<RawEvent> {
    if buf.len() != layout.record_size() {
        return Err(Error::Protocol(format!(
            "record is {} bytes, expected {}",
            buf.len(),
            layout.record_size()
        )));
    }

    let (seconds, microseconds) = match layout {
        EventLayout::Compact => (
            i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as i64,
            i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]) as i64,
        ),
        EventLayout::Wide => (
            i64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]]),
            i64::from_le_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
        ),
    };

    let o = layout.header_len();
    let ty = u16::from_le_bytes([buf[o], buf[o + 1]]);
    let code = u16::from_le_bytes([buf[o + 2], buf[o + 3]]);
    let value = i32::from_le_bytes([buf[o + 4], buf[o + 5], buf[o + 6], buf[o + 7]]);

    Ok(RawEvent::with_time(seconds, microseconds, ty, code, value))
}

/// Human-readable name of an event for dumps and trace logs.
pub fn code_name(ty: u16, code: u16) -> String {
    match ty {
        EV_SYN => "SYN_REPORT".to_string(),
        EV_KEY => format!("KEY/{}", code),
        EV_ABS => {
            let abs = match code {
                ABS_X => "X",
                ABS_Y => "Y",
                0x18 => "PRESSURE",
                ABS_MT_SLOT => "MT_SLOT",
                0x30 => "MT_TOUCH_MAJOR",
                0x31 => "MT_TOUCH_MINOR",
                0x34 => "MT_ORIENTATION",
                ABS_MT_POSITION_X => "MT_POSITION_X",
                ABS_MT_POSITION_Y => "MT_POSITION_Y",
                0x37 => "MT_TOOL_TYPE",
                ABS_MT_TRACKING_ID => "MT_TRACKING_ID",
                0x3a => "MT_PRESSURE",
                _ => "?",
            };
            format!("ABS_{}({})", abs, code)
        }
        _ => format!("type{} code{}", ty, code),
    }
}
