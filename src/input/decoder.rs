//! Type B multitouch decoder: folds records into the registry and dispatches on SYN.

use crate::error::Result;

use super::dispatch::Dispatcher;
use super::event::{
    code_name, RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, ABS_X, ABS_Y,
    EV_ABS, EV_SYN,
};
use super::registry::TouchRegistry;

/// Outcome of feeding one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Record applied (or ignored); the frame is still open.
    Pending,
    /// SYN seen; callbacks for the frame have fired.
    Frame,
}

pub struct ProtocolDecoder {
    registry: TouchRegistry,
    dispatcher: Dispatcher,
    frame_count: u64,
}

impl ProtocolDecoder {
    pub fn new(slots: usize) -> Self {
        Self {
            registry: TouchRegistry::new(slots),
            dispatcher: Dispatcher::new(slots),
            frame_count: 0,
        }
    }

    pub fn registry(&self) -> &TouchRegistry {
        &self.registry
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Number of SYN barriers processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Apply one record. Mutations accumulate until a SYN record, which fires
    /// the callbacks of every slot with pending events.
    pub fn feed(&mut self, ev: &RawEvent) -> Result<Step> {
        match ev.kind() {
            EV_SYN => {
                let fired = self.dispatcher.dispatch_frame(&mut self.registry);
                self.log_frame_progress(fired);
                Ok(Step::Frame)
            }
            EV_ABS => {
                self.process_abs_event(ev.code(), ev.value())?;
                Ok(Step::Pending)
            }
            _ => Ok(Step::Pending),
        }
    }

    fn process_abs_event(&mut self, code: u16, value: i32) -> Result<()> {
        match code {
            ABS_MT_SLOT => self.registry.select_slot(value)?,
            ABS_MT_TRACKING_ID | ABS_MT_POSITION_X | ABS_MT_POSITION_Y => {
                let Some(touch) = self.registry.current() else {
                    log::trace!("Dropping {} while slot cursor is parked", code_name(EV_ABS, code));
                    return Ok(());
                };
                match code {
                    ABS_MT_TRACKING_ID => touch.set_id(value),
                    ABS_MT_POSITION_X => touch.set_x(value),
                    _ => touch.set_y(value),
                }
            }
            ABS_X => self.registry.position_mut().set_x(value),
            ABS_Y => self.registry.position_mut().set_y(value),
            _ => {}
        }
        Ok(())
    }

    fn log_frame_progress(&mut self, fired: usize) {
        if self.frame_count == 0 {
            log::info!("Touch events flowing");
        }
        self.frame_count += 1;

        if self.frame_count.is_multiple_of(500) {
            log::debug!(
                "Touch frames: {}, contacts: {}, callbacks this frame: {}",
                self.frame_count,
                self.registry.valid_touches().count(),
                fired
            );
        }
    }
}
