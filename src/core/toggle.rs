//! Shared Toggles
//!
//! A flag several objects observe (e.g. "draw agent paths"). The owner hands a
//! clone to each object at construction; flipping any clone is seen by all.

use std::cell::Cell;
use std::rc::Rc;

/// Shared boolean switch. Single-threaded by construction (`Rc`).
#[derive(Debug, Clone, Default)]
pub struct SharedToggle(Rc<Cell<bool>>);

impl SharedToggle {
    /// Create a toggle with an initial value.
    pub fn new(value: bool) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    /// Overwrite the value.
    #[inline]
    pub fn set(&self, value: bool) {
        self.0.set(value);
    }

    /// Flip and return the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.0.get();
        self.0.set(next);
        next
    }
}
