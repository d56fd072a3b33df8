mod decoder;
mod dispatch;
mod event;
mod reader;
mod registry;
mod touch;

pub use decoder::{ProtocolDecoder, Step};
pub use dispatch::{Dispatcher, Handler, Handlers, PositionHandler};
pub use event::{
    code_name, parse_input_event, EventLayout, RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y,
    ABS_MT_SLOT, ABS_MT_TRACKING_ID, ABS_X, ABS_Y, EV_ABS, EV_KEY, EV_SYN, INPUT_EVENT_SIZE_32,
    INPUT_EVENT_SIZE_64,
};
pub use reader::EventReader;
pub use registry::{TouchRegistry, DEFAULT_SLOTS};
pub use touch::{EventSet, Position, TouchEvent, TouchState};
