// ── Change notifications ──
//
// Everything a presentation adapter needs to re-render goes out on one
// broadcast channel, in publication order. Receivers that fall behind
// get `RecvError::Lagged` and should re-read the snapshots.

use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;
use tracing::trace;

use crate::model::{CategoryId, EntityKind, EntityRef, OwnerId};
use crate::selection::{CloseReason, SessionTarget, SessionToken, Transition};

const DEFAULT_CAPACITY: usize = 256;

/// A user-facing operation, named in failure notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    SelectCategory,
    BeginEdit,
    EditDraft,
    SaveItem,
    DeleteItem,
    DeleteImage,
    CreateCategory,
    RenameCategory,
    DeleteCategory,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Opened {
        token: SessionToken,
        target: SessionTarget,
    },
    Closed {
        token: SessionToken,
        target: SessionTarget,
        reason: CloseReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Added(EntityRef),
    Changed(EntityRef),
    Removed(EntityRef),
    /// A collection was replaced wholesale by a fetch.
    Reset(EntityKind),
    SelectionChanged {
        category_id: CategoryId,
        selected: bool,
    },
    SessionChanged(SessionChange),
    UserChanged(Option<OwnerId>),
    /// A user intent failed. Published once per failure, alongside the
    /// `Err` returned to the caller.
    OperationFailed {
        operation: Operation,
        message: String,
    },
}

impl From<Transition> for Notification {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Deselected(category_id) => Self::SelectionChanged {
                category_id,
                selected: false,
            },
            Transition::Selected(category_id) => Self::SelectionChanged {
                category_id,
                selected: true,
            },
            Transition::SessionOpened { token, target } => {
                Self::SessionChanged(SessionChange::Opened { token, target })
            }
            Transition::SessionClosed {
                token,
                target,
                reason,
            } => Self::SessionChanged(SessionChange::Closed {
                token,
                target,
                reason,
            }),
        }
    }
}

/// Fan-out for [`Notification`]s.
pub(crate) struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn publish(&self, notification: Notification) {
        trace!(?notification, "publish");
        // No receivers is fine; notifications are fire-and-forget.
        let _ = self.tx.send(notification);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ItemId;

    #[test]
    fn delivers_in_publication_order() {
        let bus = NotificationBus::default();
        let mut rx = bus.subscribe();

        bus.publish(Notification::Added(ItemId(1).into()));
        bus.publish(Notification::Removed(ItemId(1).into()));

        assert_eq!(rx.try_recv().unwrap(), Notification::Added(EntityRef::Item(ItemId(1))));
        assert_eq!(rx.try_recv().unwrap(), Notification::Removed(EntityRef::Item(ItemId(1))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        NotificationBus::new(4).publish(Notification::Reset(EntityKind::Item));
    }

    #[test]
    fn transitions_map_to_selection_notifications() {
        assert_eq!(
            Notification::from(Transition::Deselected(CategoryId(2))),
            Notification::SelectionChanged {
                category_id: CategoryId(2),
                selected: false
            }
        );
        assert_eq!(Operation::SaveItem.to_string(), "save_item");
    }
}
