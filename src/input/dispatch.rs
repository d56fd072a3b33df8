//! Callback registration and per-frame dispatch.

use std::sync::Arc;

use super::registry::TouchRegistry;
use super::touch::{Position, TouchEvent, TouchState};

/// Callback invoked with the transition that fired and the touch it fired on.
pub type Handler = Arc<dyn Fn(TouchEvent, &TouchState) + Send + Sync>;

/// Callback for the single-touch position.
pub type PositionHandler = Arc<dyn Fn(&Position) + Send + Sync>;

/// Optional handlers for one slot. Missing handlers are skipped.
#[derive(Clone, Default)]
pub struct Handlers {
    pub on_move: Option<Handler>,
    pub on_press: Option<Handler>,
    pub on_release: Option<Handler>,
}

impl Handlers {
    fn for_event(&self, event: TouchEvent) -> Option<&Handler> {
        match event {
            TouchEvent::Move => self.on_move.as_ref(),
            TouchEvent::Press => self.on_press.as_ref(),
            TouchEvent::Release => self.on_release.as_ref(),
        }
    }

    fn set(&mut self, event: TouchEvent, handler: Handler) {
        match event {
            TouchEvent::Move => self.on_move = Some(handler),
            TouchEvent::Press => self.on_press = Some(handler),
            TouchEvent::Release => self.on_release = Some(handler),
        }
    }
}

pub struct Dispatcher {
    handlers: Vec<Handlers>,
    on_position: Option<PositionHandler>,
}

impl Dispatcher {
    pub fn new(slots: usize) -> Self {
        Self {
            handlers: vec![Handlers::default(); slots],
            on_position: None,
        }
    }

    /// Register `handler` for `event` on every slot.
    pub fn on<F>(&mut self, event: TouchEvent, handler: F) -> &mut Self
    where
        F: Fn(TouchEvent, &TouchState) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        for h in &mut self.handlers {
            h.set(event, handler.clone());
        }
        self
    }

    pub fn on_move<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(TouchEvent, &TouchState) + Send + Sync + 'static,
    {
        self.on(TouchEvent::Move, handler)
    }

    pub fn on_press<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(TouchEvent, &TouchState) + Send + Sync + 'static,
    {
        self.on(TouchEvent::Press, handler)
    }

    pub fn on_release<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(TouchEvent, &TouchState) + Send + Sync + 'static,
    {
        self.on(TouchEvent::Release, handler)
    }

    /// Handlers of a single slot, `None` if the slot does not exist.
    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut Handlers> {
        self.handlers.get_mut(slot)
    }

    /// Called when `ABS_X`/`ABS_Y` changed during a frame.
    pub fn on_position<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Position) + Send + Sync + 'static,
    {
        self.on_position = Some(Arc::new(handler));
        self
    }

    /// Fire the pending callbacks of one touch and clear its events.
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, touch: &mut TouchState) -> usize {
        let events = touch.take_events();
        let Some(handlers) = self.handlers.get(touch.slot()) else {
            return 0;
        };

        let mut fired = 0;
        for event in events.in_dispatch_order() {
            if let Some(handler) = handlers.for_event(event) {
                handler(event, &*touch);
                fired += 1;
            }
        }
        fired
    }

    /// End of frame: dispatch every slot and the position, clearing all pending events.
    pub fn dispatch_frame(&self, registry: &mut TouchRegistry) -> usize {
        let mut fired = 0;
        for touch in registry.all_mut() {
            fired += self.dispatch(touch);
        }

        let position = registry.position_mut();
        let moved = !position.take_events().is_empty();
        if let (true, Some(handler)) = (moved, &self.on_position) {
            handler(&*position);
            fired += 1;
        }
        fired
    }
}
