//! Per-slot touch state and the pending-event set it accumulates between frames.

use std::fmt;

/// Lifecycle transition of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TouchEvent {
    Release = 0,
    Press = 1,
    Move = 2,
}

impl TouchEvent {
    /// Order in which callbacks fire when several events land in one frame.
    /// Move comes first so the final position is known before Release.
    pub const DISPATCH_ORDER: [TouchEvent; 3] =
        [TouchEvent::Move, TouchEvent::Press, TouchEvent::Release];
}

impl fmt::Display for TouchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchEvent::Release => write!(f, "Release"),
            TouchEvent::Press => write!(f, "Press"),
            TouchEvent::Move => write!(f, "Move"),
        }
    }
}

/// Insertion-ordered set over the three event kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSet {
    events: [Option<TouchEvent>; 3],
    len: usize,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `event` was already present.
    pub fn insert(&mut self, event: TouchEvent) -> bool {
        if self.contains(event) {
            return false;
        }
        self.events[self.len] = Some(event);
        self.len += 1;
        true
    }

    pub fn contains(&self, event: TouchEvent) -> bool {
        self.iter().any(|e| e == event)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn iter(&self) -> impl Iterator<Item = TouchEvent> + '_ {
        self.events[..self.len].iter().flatten().copied()
    }

    /// Events in callback order rather than insertion order.
    pub fn in_dispatch_order(&self) -> impl Iterator<Item = TouchEvent> + '_ {
        TouchEvent::DISPATCH_ORDER
            .into_iter()
            .filter(move |&e| self.contains(e))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Coordinate pair with history, shared by slots and the single-touch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axes {
    x: i32,
    y: i32,
    last_x: i32,
    last_y: i32,
}

impl Axes {
    fn new(x: i32, y: i32) -> Self {
        Self { x, y, last_x: -1, last_y: -1 }
    }

    fn set_x(&mut self, value: i32, pending: &mut EventSet) {
        if value != self.x {
            pending.insert(TouchEvent::Move);
        }
        self.last_x = self.x;
        self.x = value;
    }

    fn set_y(&mut self, value: i32, pending: &mut EventSet) {
        if value != self.y {
            pending.insert(TouchEvent::Move);
        }
        self.last_y = self.y;
        self.y = value;
    }
}

/// State of one multitouch slot. Slots are recycled by the kernel, so one
/// `TouchState` sees many contacts over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchState {
    slot: usize,
    axes: Axes,
    id: i32,
    pending: EventSet,
}

impl TouchState {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            axes: Axes::new(0, 0),
            id: -1,
            pending: EventSet::new(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn x(&self) -> i32 {
        self.axes.x
    }

    pub fn y(&self) -> i32 {
        self.axes.y
    }

    pub fn last_x(&self) -> i32 {
        self.axes.last_x
    }

    pub fn last_y(&self) -> i32 {
        self.axes.last_y
    }

    pub fn position(&self) -> (i32, i32) {
        (self.axes.x, self.axes.y)
    }

    pub fn last_position(&self) -> (i32, i32) {
        (self.axes.last_x, self.axes.last_y)
    }

    /// Kernel tracking id, -1 when the slot holds no contact.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn valid(&self) -> bool {
        self.id > -1
    }

    pub fn pending_events(&self) -> &EventSet {
        &self.pending
    }

    pub fn set_x(&mut self, value: i32) {
        self.axes.set_x(value, &mut self.pending);
    }

    pub fn set_y(&mut self, value: i32) {
        self.axes.set_y(value, &mut self.pending);
    }

    pub fn set_id(&mut self, value: i32) {
        if value != self.id {
            if value == -1 && !self.pending.contains(TouchEvent::Release) {
                self.pending.insert(TouchEvent::Release);
            } else {
                self.pending.insert(TouchEvent::Press);
            }
        }
        self.id = value;
    }

    /// Hand over the events gathered since the last frame and start a new one.
    pub fn take_events(&mut self) -> EventSet {
        std::mem::take(&mut self.pending)
    }
}

/// Single-touch absolute pointer (`ABS_X`/`ABS_Y`); has no slot or tracking id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    axes: Axes,
    pending: EventSet,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        Self {
            axes: Axes::new(0, 0),
            pending: EventSet::new(),
        }
    }

    pub fn x(&self) -> i32 {
        self.axes.x
    }

    pub fn y(&self) -> i32 {
        self.axes.y
    }

    pub fn last_x(&self) -> i32 {
        self.axes.last_x
    }

    pub fn last_y(&self) -> i32 {
        self.axes.last_y
    }

    pub fn set_x(&mut self, value: i32) {
        self.axes.set_x(value, &mut self.pending);
    }

    pub fn set_y(&mut self, value: i32) {
        self.axes.set_y(value, &mut self.pending);
    }

    pub fn pending_events(&self) -> &EventSet {
        &self.pending
    }

    pub fn take_events(&mut self) -> EventSet {
        std::mem::take(&mut self.pending)
    }
}
