use crate::gesture::Timestamp;

pub const INPUT_EVENT_SIZE_32: usize = 16;
pub const INPUT_EVENT_SIZE_64: usize = 24;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;
pub const SYN_REPORT: u16 = 0;
pub const SYN_DROPPED: u16 = 3;

pub const BTN_LEFT: u16 = 0x110;

pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_TOUCH_MAJOR: u16 = 0x30;
pub const ABS_MT_TOUCH_MINOR: u16 = 0x31;
pub const ABS_MT_WIDTH_MAJOR: u16 = 0x32;
pub const ABS_MT_WIDTH_MINOR: u16 = 0x33;
pub const ABS_MT_ORIENTATION: u16 = 0x34;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
pub const ABS_MT_PRESSURE: u16 = 0x3a;

/// One raw `struct input_event` with its kernel timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub time: Timestamp,
    pub ty: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(time: Timestamp, ty: u16, code: u16, value: i32) -> Self {
        Self { time, ty, code, value }
    }

    pub fn is_sync(&self) -> bool {
        self.ty == EV_SYN && self.code == SYN_REPORT
    }
}

/// What an event means to the contact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Sync,
    Dropped,
    PrimaryButton(bool),
    SelectSlot(i32),
    TrackingId(i32),
    PositionX(i32),
    PositionY(i32),
    Pressure(i32),
    TouchMajor(i32),
    TouchMinor(i32),
    WidthMajor(i32),
    WidthMinor(i32),
    Orientation(i32),
    Ignored,
}

pub fn decode(ev: &RawEvent) -> Decoded {
    let v = ev.value;
    match ev.ty {
        EV_SYN => match ev.code {
            SYN_REPORT => Decoded::Sync,
            SYN_DROPPED => Decoded::Dropped,
            _ => Decoded::Ignored,
        },
        EV_KEY if ev.code == BTN_LEFT => Decoded::PrimaryButton(v != 0),
        EV_ABS => match ev.code {
            ABS_MT_SLOT => Decoded::SelectSlot(v),
            ABS_MT_TRACKING_ID => Decoded::TrackingId(v),
            ABS_MT_POSITION_X => Decoded::PositionX(v),
            ABS_MT_POSITION_Y => Decoded::PositionY(v),
            ABS_MT_PRESSURE => Decoded::Pressure(v),
            ABS_MT_TOUCH_MAJOR => Decoded::TouchMajor(v),
            ABS_MT_TOUCH_MINOR => Decoded::TouchMinor(v),
            ABS_MT_WIDTH_MAJOR => Decoded::WidthMajor(v),
            ABS_MT_WIDTH_MINOR => Decoded::WidthMinor(v),
            ABS_MT_ORIENTATION => Decoded::Orientation(v),
            _ => Decoded::Ignored,
        },
        _ => Decoded::Ignored,
    }
}

/// Parse a Linux input_event from raw bytes (32-bit or 64-bit timeval).
pub fn parse_input_event(buf: &[u8]) -> Option<RawEvent> {
    match buf.len() {
        INPUT_EVENT_SIZE_32 => parse_input_event_32(buf),
        INPUT_EVENT_SIZE_64 => parse_input_event_64(buf),
        _ => None,
    }
}

fn parse_input_event_32(buf: &[u8]) -> Option<RawEvent> {
    let sec = i32::from_le_bytes(buf[0..4].try_into().ok()?);
    let usec = i32::from_le_bytes(buf[4..8].try_into().ok()?);
    let ty = u16::from_le_bytes([buf[8], buf[9]]);
    let code = u16::from_le_bytes([buf[10], buf[11]]);
    let value = i32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);

    let time = Timestamp::from_timeval(i64::from(sec), i64::from(usec));
    Some(RawEvent::new(time, ty, code, value))
}

fn parse_input_event_64(buf: &[u8]) -> Option<RawEvent> {
    let sec = i64::from_le_bytes(buf[0..8].try_into().ok()?);
    let usec = i64::from_le_bytes(buf[8..16].try_into().ok()?);
    let ty = u16::from_le_bytes([buf[16], buf[17]]);
    let code = u16::from_le_bytes([buf[18], buf[19]]);
    let value = i32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);

    Some(RawEvent::new(Timestamp::from_timeval(sec, usec), ty, code, value))
}

/// Symbolic name for dumps and trace logs.
pub fn code_name(ty: u16, code: u16) -> String {
    match ty {
        EV_SYN => match code {
            SYN_REPORT => "SYN_REPORT".into(),
            SYN_DROPPED => "SYN_DROPPED".into(),
            _ => format!("SYN/{}", code),
        },
        EV_KEY => {
            let key = match code {
                BTN_LEFT => "BTN_LEFT",
                0x111 => "BTN_RIGHT",
                0x145 => "BTN_TOOL_FINGER",
                0x14a => "BTN_TOUCH",
                0x14d => "BTN_TOOL_DOUBLETAP",
                0x14e => "BTN_TOOL_TRIPLETAP",
                0x14f => "BTN_TOOL_QUADTAP",
                0x148 => "BTN_TOOL_QUINTTAP",
                _ => return format!("KEY/{}", code),
            };
            key.into()
        }
        EV_ABS => {
            let abs = match code {
                0x00 => "X",
                0x01 => "Y",
                0x18 => "PRESSURE",
                0x2f => "MT_SLOT",
                0x30 => "MT_TOUCH_MAJOR",
                0x31 => "MT_TOUCH_MINOR",
                0x32 => "MT_WIDTH_MAJOR",
                0x33 => "MT_WIDTH_MINOR",
                0x34 => "MT_ORIENTATION",
                0x35 => "MT_POSITION_X",
                0x36 => "MT_POSITION_Y",
                0x37 => "MT_TOOL_TYPE",
                0x39 => "MT_TRACKING_ID",
                0x3a => "MT_PRESSURE",
                _ => "?",
            };
            format!("ABS_{}({})", abs, code)
        }
        _ => format!("type{} code{}", ty, code),
    }
}
