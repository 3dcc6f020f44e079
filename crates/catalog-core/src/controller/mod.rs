// ── Controller ──
//
// Session coordinator for one catalog server. Owns the entity store,
// the selection tracker and the notification bus, and sequences every
// multi-step flow against the transport collaborators.

mod session;
mod sync;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use catalog_api::{CatalogClient, TlsMode, TransportConfig};

use crate::command::{Command, CommandResult};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::event::{Notification, NotificationBus, Operation};
use crate::model::{Category, Item, ItemId, OwnerId};
use crate::selection::{
    Intent, RowState, SelectionState, SelectionTracker, SessionTarget, Transition,
};
use crate::store::DataStore;
use crate::stream::EntityStream;
use crate::transport::{CatalogTransport, ImageTransport};

const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for presentation adapters.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Methods may be called
/// concurrently; each flow runs its steps strictly in order, and the
/// only suspension points are transport calls.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    tracker: SelectionTracker,
    bus: NotificationBus,
    catalog: Arc<dyn CatalogTransport>,
    images: Arc<dyn ImageTransport>,
    user: watch::Sender<Option<OwnerId>>,
    /// Serializes tracker transitions with the store flag writes and
    /// notifications they produce.
    selection_lock: Mutex<()>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    task_handles: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller talking HTTP to `config.url`. Does NOT
    /// connect; call [`connect()`](Self::connect) for the initial load.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = Arc::new(CatalogClient::new(
            config.url.clone(),
            &build_transport(&config),
        )?);
        Ok(Self::with_transport(config, client.clone(), client))
    }

    /// Create a controller over arbitrary transport collaborators.
    pub fn with_transport(
        config: ControllerConfig,
        catalog: Arc<dyn CatalogTransport>,
        images: Arc<dyn ImageTransport>,
    ) -> Self {
        let (user, _) = watch::channel(config.user_id);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DataStore::new()),
                tracker: SelectionTracker::new(),
                bus: NotificationBus::new(EVENT_CHANNEL_SIZE),
                catalog,
                images,
                user,
                selection_lock: Mutex::new(()),
                connection_state,
                cancel: CancellationToken::new(),
                task_handles: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Load both collections and start the periodic refresh when
    /// `refresh_interval_secs > 0`.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.refresh().await {
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            return Err(e);
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to catalog");
        Ok(())
    }

    /// Stop background tasks. A disconnected controller is not reused.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Connect, run `f`, disconnect. No background refresh.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    /// Re-fetch both collections. Nothing changes locally unless both
    /// fetches succeed.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let result = self.full_refresh().await;
        self.report(Operation::Refresh, result)
    }

    async fn full_refresh(&self) -> Result<(), CoreError> {
        let (categories, items) = tokio::join!(
            self.inner.catalog.list_categories(),
            self.inner.catalog.list_items(),
        );
        let (categories, items) = (categories?, items?);

        self.apply_categories(categories);
        self.apply_items(items);
        self.inner.store.mark_refreshed();

        debug!(
            categories = self.inner.store.category_count(),
            items = self.inner.store.item_count(),
            "data refresh complete"
        );
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command. Requires a connected controller.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }
        route_command(self, cmd).await
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.bus.subscribe()
    }

    pub fn selection(&self) -> SelectionState {
        self.inner.tracker.current()
    }

    pub fn watch_selection(&self) -> watch::Receiver<SelectionState> {
        self.inner.tracker.subscribe()
    }

    pub fn user(&self) -> Option<OwnerId> {
        *self.inner.user.borrow()
    }

    /// Row state of a stored item; `None` once it is gone.
    pub fn row_state(&self, id: ItemId) -> Option<RowState> {
        self.inner
            .store
            .item_by_id(id)
            .map(|_| self.inner.tracker.current().row_state(id))
    }

    /// State of a presentation slot: a stored item's row, or the
    /// new-item slot while it is open.
    pub fn slot_state(&self, slot: SessionTarget) -> Option<RowState> {
        if let SessionTarget::Existing(id) = slot {
            return self.row_state(id);
        }
        self.inner.tracker.current().slot_state(slot)
    }

    /// Items for the current selection, oldest first.
    pub fn visible_items(&self) -> Vec<Arc<Item>> {
        self.inner.store.visible_items(
            self.inner.tracker.selected_category(),
            self.inner.config.recent_items_limit,
        )
    }

    // ── Snapshot and stream accessors (delegate to DataStore) ────

    pub fn categories_snapshot(&self) -> Arc<Vec<Arc<Category>>> {
        self.inner.store.categories_snapshot()
    }

    pub fn items_snapshot(&self) -> Arc<Vec<Arc<Item>>> {
        self.inner.store.items_snapshot()
    }

    pub fn categories(&self) -> EntityStream<Category> {
        self.inner.store.subscribe_categories()
    }

    pub fn items(&self) -> EntityStream<Item> {
        self.inner.store.subscribe_items()
    }

    // ── Internal plumbing ────────────────────────────────────────

    fn lock_selection(&self) -> MutexGuard<'_, ()> {
        self.inner
            .selection_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an intent while holding the selection lock: mirror
    /// selection flags into the store, then publish, step by step.
    fn transition_locked(&self, _guard: &MutexGuard<'_, ()>, intent: Intent) -> Vec<Transition> {
        let transitions = self.inner.tracker.apply(intent);
        for transition in &transitions {
            match *transition {
                Transition::Deselected(id) => self.inner.store.set_category_selected(id, false),
                Transition::Selected(id) => self.inner.store.set_category_selected(id, true),
                Transition::SessionOpened { .. } | Transition::SessionClosed { .. } => {}
            }
            self.inner.bus.publish(Notification::from(*transition));
        }
        transitions
    }

    fn publish(&self, notification: Notification) {
        self.inner.bus.publish(notification);
    }

    /// Surface a failed intent once on the bus; pass the result through.
    fn report<T>(&self, operation: Operation, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(ref e) = result {
            warn!(%operation, error = %e, "operation failed");
            self.publish(Notification::OperationFailed {
                operation,
                message: e.to_string(),
            });
        }
        result
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Failures are already logged and published by `refresh`.
                let _ = controller.refresh().await;
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::SelectCategory(id) => controller.select_category(id).map(CommandResult::Selection),
        Command::SetUser(user) => {
            controller.set_user(user);
            Ok(CommandResult::Ok)
        }

        Command::BeginEdit(target) => controller.begin_edit(target).map(CommandResult::SessionOpened),
        Command::UpdateDraft(update) => controller.update_draft(update).map(|()| CommandResult::Ok),
        Command::CancelEdit => Ok(CommandResult::SessionClosed(controller.cancel_edit())),
        Command::SaveItem => controller.save_item().await.map(CommandResult::Item),

        Command::DeleteItem { id } => controller.delete_item(id).await.map(|()| CommandResult::Ok),
        Command::CreateCategory { name } => controller
            .add_category(&name)
            .await
            .map(CommandResult::Category),
        Command::RenameCategory { id, name } => controller
            .rename_category(id, &name)
            .await
            .map(CommandResult::Category),
        Command::DeleteCategory { id } => controller
            .delete_category(id)
            .await
            .map(|()| CommandResult::Ok),

        Command::Refresh => controller.refresh().await.map(|()| CommandResult::Ok),
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
        session_token: config.session_token.clone(),
    }
}
