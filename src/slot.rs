//! Single-occupancy cancellation slot.
//!
//! Both the debounce timer and the local in-flight search follow the same
//! discipline: arming the slot cancels whatever occupied it, and only the
//! current occupant may claim it. Holding the lock across replace-and-cancel
//! means two occupants can never both claim the slot.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Handle to one occupancy of a [`CancelSlot`].
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub(crate) id: u64,
    pub(crate) token: CancellationToken,
}

/// A slot holding at most one live cancellation token.
#[derive(Debug, Default)]
pub(crate) struct CancelSlot {
    next_id: AtomicU64,
    current: Mutex<Option<(u64, CancellationToken)>>,
}

impl CancelSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Occupy the slot, cancelling the previous occupant.
    pub(crate) fn arm(&self) -> Ticket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, previous)) = current.replace((id, token.clone())) {
            previous.cancel();
        }
        Ticket { id, token }
    }

    /// Empty the slot if `id` still occupies it.
    ///
    /// Returns false when the occupant was replaced or cancelled.
    pub(crate) fn claim(&self, id: u64) -> bool {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match current.as_ref() {
            Some((occupant, token)) if *occupant == id && !token.is_cancelled() => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel and remove the current occupant, if any.
    pub(crate) fn cancel(&self) -> bool {
        let taken = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match taken {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns true while an occupant is waiting in the slot.
    pub(crate) fn is_armed(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
