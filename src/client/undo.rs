//! Single-slot undo buffer for destructive equipment actions.
//!
//! At most one compensating action is pending at a time; arming a new one
//! silently discards the previous buffer. The lifecycle is explicit:
//! `Armed` until the notice's window closes, then either `Consumed` (the
//! user clicked undo) or `Expired` (the removal became permanent).

use crate::models::Equipment;

/// Lifecycle of a pending undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    Armed,
    Consumed,
    Expired,
}

/// What a consumed undo reinserts.
#[derive(Debug, Clone)]
pub enum UndoBuffer {
    /// A single removed item
    Single(Equipment),
    /// The full prior list from a bulk removal
    All(Vec<Equipment>),
}

#[derive(Debug)]
struct PendingUndo {
    buffer: UndoBuffer,
    state: UndoState,
}

/// Holder of the at-most-one pending undo.
#[derive(Debug, Default)]
pub struct UndoSlot {
    pending: Option<PendingUndo>,
}

impl UndoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new undo, discarding any prior buffer regardless of its state.
    pub fn arm(&mut self, buffer: UndoBuffer) {
        self.pending = Some(PendingUndo {
            buffer,
            state: UndoState::Armed,
        });
    }

    /// Consume the pending undo, returning its buffer. Only an armed undo
    /// can be consumed; a consumed or expired one yields nothing.
    pub fn consume(&mut self) -> Option<UndoBuffer> {
        match self.pending.as_mut() {
            Some(pending) if pending.state == UndoState::Armed => {
                pending.state = UndoState::Consumed;
                Some(pending.buffer.clone())
            }
            _ => None,
        }
    }

    /// Expire the pending undo. The removal it guarded is already
    /// persisted, so nothing else happens.
    pub fn expire(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            if pending.state == UndoState::Armed {
                pending.state = UndoState::Expired;
            }
        }
    }

    /// State of the current buffer, if any.
    pub fn state(&self) -> Option<UndoState> {
        self.pending.as_ref().map(|p| p.state)
    }

    pub fn is_armed(&self) -> bool {
        self.state() == Some(UndoState::Armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Equipment {
        Equipment {
            id: name.to_lowercase(),
            index: name.to_lowercase(),
            name: name.to_string(),
            value: 5,
        }
    }

    #[test]
    fn test_consume_armed_undo() {
        let mut slot = UndoSlot::new();
        slot.arm(UndoBuffer::Single(item("Dagger")));
        assert!(slot.is_armed());

        let buffer = slot.consume().unwrap();
        match buffer {
            UndoBuffer::Single(equipment) => assert_eq!(equipment.name, "Dagger"),
            UndoBuffer::All(_) => panic!("expected single buffer"),
        }

        assert_eq!(slot.state(), Some(UndoState::Consumed));
        // A consumed undo cannot be consumed twice
        assert!(slot.consume().is_none());
    }

    #[test]
    fn test_expired_undo_is_unavailable() {
        let mut slot = UndoSlot::new();
        slot.arm(UndoBuffer::Single(item("Dagger")));
        slot.expire();

        assert_eq!(slot.state(), Some(UndoState::Expired));
        assert!(slot.consume().is_none());
    }

    #[test]
    fn test_second_arm_discards_prior_buffer() {
        let mut slot = UndoSlot::new();
        slot.arm(UndoBuffer::Single(item("Dagger")));
        slot.arm(UndoBuffer::All(vec![item("Mace"), item("Shield")]));

        let buffer = slot.consume().unwrap();
        match buffer {
            UndoBuffer::All(items) => assert_eq!(items.len(), 2),
            UndoBuffer::Single(_) => panic!("prior buffer should have been discarded"),
        }
    }

    #[test]
    fn test_expire_does_not_revive_consumed() {
        let mut slot = UndoSlot::new();
        slot.arm(UndoBuffer::Single(item("Dagger")));
        slot.consume();
        slot.expire();
        assert_eq!(slot.state(), Some(UndoState::Consumed));
    }
}
