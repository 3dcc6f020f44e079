// ── Selection state machine ──
//
// `transition` is a pure function from (state, intent) to (state,
// transitions). The tracker applies it atomically and the controller
// turns the transitions into store flags and notifications, in order.

use serde::{Deserialize, Serialize};

use super::session::{EditSession, ItemDraft, RowState, SessionTarget, SessionToken};
use crate::model::{CategoryId, ItemId};

/// Everything the tracker knows. Holds ids only; records live in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected_category: Option<CategoryId>,
    active_session: Option<EditSession>,
    next_token: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_category: None,
            active_session: None,
            next_token: 1,
        }
    }
}

impl SelectionState {
    /// `None` means the "recent items" view.
    pub fn selected_category(&self) -> Option<CategoryId> {
        self.selected_category
    }

    pub fn active_session(&self) -> Option<&EditSession> {
        self.active_session.as_ref()
    }

    pub(crate) fn active_session_mut(&mut self) -> Option<&mut EditSession> {
        self.active_session.as_mut()
    }

    pub fn is_active(&self, token: SessionToken) -> bool {
        self.active_session.as_ref().is_some_and(|s| s.token == token)
    }

    pub fn row_state(&self, item: ItemId) -> RowState {
        match self.active_session {
            Some(ref s) if s.target == SessionTarget::Existing(item) => RowState::Editing,
            _ => RowState::View,
        }
    }

    /// Whether the new-item slot is open.
    pub fn has_new_slot(&self) -> bool {
        self.active_session
            .as_ref()
            .is_some_and(|s| s.target == SessionTarget::New)
    }

    /// State of a presentation slot. The new-item slot only exists while
    /// a `New` session is open, so it yields `None` otherwise.
    pub fn slot_state(&self, slot: SessionTarget) -> Option<RowState> {
        match slot {
            SessionTarget::Existing(id) => Some(self.row_state(id)),
            SessionTarget::New => self.has_new_slot().then_some(RowState::New),
        }
    }
}

/// A requested change to the selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Select a category. Selecting the current one toggles it off;
    /// `None` clears the selection.
    SelectCategory(Option<CategoryId>),
    /// Open a session, superseding any open one.
    BeginEdit {
        target: SessionTarget,
        draft: ItemDraft,
    },
    CancelEdit,
    /// Close the session after a successful save, if `token` is still
    /// the open one.
    EndEdit(SessionToken),
    /// Close whatever session is open because its record went away.
    Invalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Cancelled,
    Superseded,
    Saved,
    Invalidated,
}

/// One observable step of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Deselected(CategoryId),
    Selected(CategoryId),
    SessionClosed {
        token: SessionToken,
        target: SessionTarget,
        reason: CloseReason,
    },
    SessionOpened {
        token: SessionToken,
        target: SessionTarget,
    },
}

/// Compute the next state. Transitions come back in the order they must
/// be published: a deselect always precedes the matching select, a close
/// always precedes the open that caused it.
pub fn transition(state: &SelectionState, intent: Intent) -> (SelectionState, Vec<Transition>) {
    let mut next = state.clone();
    let mut out = Vec::new();

    match intent {
        Intent::SelectCategory(requested) => {
            let current = state.selected_category;
            let target = if requested == current { None } else { requested };

            if let Some(previous) = current {
                out.push(Transition::Deselected(previous));
            }
            if let Some(id) = target {
                out.push(Transition::Selected(id));
            }
            next.selected_category = target;
        }

        Intent::BeginEdit { target, draft } => {
            close(&mut next, CloseReason::Superseded, &mut out);
            let token = SessionToken(next.next_token);
            next.next_token += 1;
            next.active_session = Some(EditSession {
                token,
                target,
                draft,
            });
            out.push(Transition::SessionOpened { token, target });
        }

        Intent::CancelEdit => close(&mut next, CloseReason::Cancelled, &mut out),

        Intent::EndEdit(token) => {
            if state.is_active(token) {
                close(&mut next, CloseReason::Saved, &mut out);
            }
        }

        Intent::Invalidate => close(&mut next, CloseReason::Invalidated, &mut out),
    }

    (next, out)
}

fn close(state: &mut SelectionState, reason: CloseReason, out: &mut Vec<Transition>) {
    if let Some(session) = state.active_session.take() {
        out.push(Transition::SessionClosed {
            token: session.token,
            target: session.target,
            reason,
        });
    }
}
