// ── Selection tracker ──
//
// Which category filters the item list, and which item (or new-item
// slot) is under edit. State lives in a `watch` channel so hosts can
// observe it; every change goes through `transition`.

mod session;
mod transition;

use tokio::sync::watch;

pub use session::{DraftUpdate, EditSession, ItemDraft, RowState, SessionTarget, SessionToken};
pub use transition::{CloseReason, Intent, SelectionState, Transition, transition};

use crate::model::CategoryId;

/// Owner of the current [`SelectionState`].
pub struct SelectionTracker {
    state: watch::Sender<SelectionState>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SelectionState::default());
        Self { state }
    }

    /// A copy of the current state.
    pub fn current(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.state.borrow().selected_category()
    }

    pub fn active_session(&self) -> Option<EditSession> {
        self.state.borrow().active_session().cloned()
    }

    pub fn is_active(&self, token: SessionToken) -> bool {
        self.state.borrow().is_active(token)
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Apply one intent atomically, returning what changed.
    pub(crate) fn apply(&self, intent: Intent) -> Vec<Transition> {
        let mut transitions = Vec::new();
        self.state.send_if_modified(|state| {
            let (next, out) = transition(state, intent);
            *state = next;
            transitions = out;
            !transitions.is_empty()
        });
        transitions
    }

    /// Mutate the open session's draft. `None` when no session is open.
    pub(crate) fn edit_draft<R>(&self, f: impl FnOnce(&mut ItemDraft) -> R) -> Option<R> {
        let mut result = None;
        self.state.send_if_modified(|state| match state.active_session_mut() {
            Some(session) => {
                result = Some(f(&mut session.draft));
                true
            }
            None => false,
        });
        result
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}
