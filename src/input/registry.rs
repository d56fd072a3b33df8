//! Fixed set of touch slots plus the single-touch position and the slot cursor.

use crate::error::{Error, Result};

use super::touch::{Position, TouchState};

/// Default number of slots (FT5406 reports up to 10 contacts).
pub const DEFAULT_SLOTS: usize = 10;

#[derive(Debug, Clone)]
pub struct TouchRegistry {
    touches: Vec<TouchState>,
    position: Position,
    /// `None` while parked after an out-of-range slot select.
    current_slot: Option<usize>,
}

impl Default for TouchRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

impl TouchRegistry {
    /// Allocate `slots` touch states up front; they live as long as the registry.
    pub fn new(slots: usize) -> Self {
        Self {
            touches: (0..slots).map(TouchState::new).collect(),
            position: Position::new(),
            current_slot: Some(0),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.touches.len()
    }

    pub fn current_slot(&self) -> Option<usize> {
        self.current_slot
    }

    /// Move the cursor that `ABS_MT_*` events apply to.
    ///
    /// An out-of-range slot parks the cursor: no slot is current until the
    /// next valid select, so the rest of that contact's updates touch nothing.
    pub fn select_slot(&mut self, slot: i32) -> Result<()> {
        match usize::try_from(slot) {
            Ok(index) if index < self.touches.len() => {
                self.current_slot = Some(index);
                Ok(())
            }
            _ => {
                self.current_slot = None;
                Err(Error::IndexOutOfRange {
                    slot,
                    slots: self.touches.len(),
                })
            }
        }
    }

    /// The slot under the cursor, `None` while parked.
    pub fn current(&mut self) -> Option<&mut TouchState> {
        self.current_slot.map(|slot| &mut self.touches[slot])
    }

    pub fn all(&self) -> &[TouchState] {
        &self.touches
    }

    pub fn all_mut(&mut self) -> &mut [TouchState] {
        &mut self.touches
    }

    pub fn get(&self, slot: usize) -> Option<&TouchState> {
        self.touches.get(slot)
    }

    /// Slots currently holding a contact.
    pub fn valid_touches(&self) -> impl Iterator<Item = &TouchState> + '_ {
        self.touches.iter().filter(|t| t.valid())
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }
}
