//! Toast bus: transient, non-blocking notifications decoupled from the
//! mutations that trigger them.

use std::time::Duration;

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One notification. `offers_undo` marks the notice that carries the undo
/// affordance for the currently armed buffer.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
    pub offers_undo: bool,
}

/// Collects toasts in display order. Only the newest undoable toast is
/// actionable; showing a new one supersedes the previous.
#[derive(Debug, Default)]
pub struct ToastBus {
    toasts: Vec<Toast>,
}

impl ToastBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            duration,
            offers_undo: false,
        });
    }

    pub fn show_with_undo(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Duration,
    ) {
        // Any earlier undo affordance is no longer actionable
        for toast in &mut self.toasts {
            toast.offers_undo = false;
        }
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            duration,
            offers_undo: true,
        });
    }

    /// The most recent toast, if any.
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    /// Everything shown so far, oldest first.
    pub fn history(&self) -> &[Toast] {
        &self.toasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_and_history() {
        let mut bus = ToastBus::new();
        bus.show("one", ToastKind::Info, Duration::from_secs(3));
        bus.show("two", ToastKind::Success, Duration::from_secs(3));

        assert_eq!(bus.latest().unwrap().message, "two");
        assert_eq!(bus.history().len(), 2);
    }

    #[test]
    fn test_new_undo_toast_supersedes_prior() {
        let mut bus = ToastBus::new();
        bus.show_with_undo("first removed", ToastKind::Info, Duration::from_secs(5));
        bus.show_with_undo("second removed", ToastKind::Info, Duration::from_secs(5));

        let undoable: Vec<&Toast> = bus.history().iter().filter(|t| t.offers_undo).collect();
        assert_eq!(undoable.len(), 1);
        assert_eq!(undoable[0].message, "second removed");
    }
}
