// Shared harness: an in-memory catalog server behind the transport
// traits, with per-call failure injection and gates that hold a call
// open until the test releases it.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{broadcast, oneshot};

use catalog_core::{
    CatalogTransport, Category, CategoryId, Controller, ControllerConfig, CoreError,
    CreateCategoryRequest, CreateItemRequest, ImageId, ImageTransport, Item, ItemId,
    Notification, OwnerId, PatchedCategory, PatchedItem, StagedImage, UpdateCategoryRequest,
    UpdateItemRequest,
};

pub const ME: OwnerId = OwnerId(1);
pub const SOMEONE_ELSE: OwnerId = OwnerId(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    ListCategories,
    ListItems,
    CreateCategory,
    UpdateCategory(i64),
    DeleteCategory(i64),
    CreateItem,
    UpdateItem(i64),
    DeleteItem(i64),
    UploadImage,
    DeleteImage(i64),
}

#[derive(Default)]
struct State {
    categories: BTreeMap<i64, Category>,
    items: BTreeMap<i64, Item>,
    images: Vec<i64>,
    next_id: i64,
    calls: Vec<Call>,
    failures: Vec<(Call, CoreError)>,
    gates: HashMap<Call, oneshot::Receiver<()>>,
    replies: HashMap<Call, oneshot::Receiver<()>>,
    sparse_echoes: bool,
}

pub struct FakeServer {
    state: Mutex<State>,
    acting_user: OwnerId,
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn transport_error(status: u16) -> CoreError {
    CoreError::Transport {
        message: format!("HTTP {status}"),
        status: Some(status),
    }
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
            acting_user: ME,
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    // ── Seeding ──────────────────────────────────────────────────────

    pub fn seed_category(&self, id: i64, name: &str, owner: OwnerId) {
        self.lock().categories.insert(
            id,
            Category {
                id: CategoryId(id),
                name: name.into(),
                owner_id: Some(owner),
                selected: false,
            },
        );
    }

    pub fn seed_item(&self, id: i64, category: i64, owner: OwnerId, image: Option<i64>) {
        let mut state = self.lock();
        if let Some(image) = image {
            state.images.push(image);
        }
        state.items.insert(
            id,
            Item {
                id: ItemId(id),
                name: format!("item-{id}"),
                description: format!("about {id}"),
                category_id: CategoryId(category),
                image_id: image.map(ImageId),
                image_url: image.map(|i| format!("/static/images/{i}.png")),
                owner_id: Some(owner),
                created_on: epoch() + Duration::minutes(id),
            },
        );
    }

    /// Change server state behind the client's back.
    pub fn remove_category_silently(&self, id: i64) {
        let mut state = self.lock();
        state.categories.remove(&id);
        state.items.retain(|_, item| item.category_id != CategoryId(id));
    }

    // ── Scripting ────────────────────────────────────────────────────

    /// The next `call` fails with `err`.
    pub fn fail_next(&self, call: Call, err: CoreError) {
        self.lock().failures.push((call, err));
    }

    /// The next `call` blocks until the returned sender fires or drops.
    pub fn gate(&self, call: Call) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().gates.insert(call, rx);
        tx
    }

    /// The next `call` does its work, then withholds the reply until the
    /// returned sender fires or drops.
    pub fn hold_reply(&self, call: Call) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().replies.insert(call, rx);
        tx
    }

    /// Update replies echo only `id`, `name` and `category_id`.
    pub fn echo_sparsely(&self) {
        self.lock().sparse_echoes = true;
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn images(&self) -> Vec<i64> {
        self.lock().images.clone()
    }

    pub fn item(&self, id: i64) -> Option<Item> {
        self.lock().items.get(&id).cloned()
    }

    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn enter(&self, call: Call) -> Result<(), CoreError> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(call);
            state.gates.remove(&call)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let mut state = self.lock();
        match state.failures.iter().position(|(c, _)| *c == call) {
            Some(pos) => Err(state.failures.remove(pos).1),
            None => Ok(()),
        }
    }

    async fn reply(&self, call: Call) {
        let held = self.lock().replies.remove(&call);
        if let Some(held) = held {
            let _ = held.await;
        }
    }

    fn next_id(state: &mut State) -> i64 {
        state.next_id += 1;
        state.next_id
    }
}

#[async_trait]
impl CatalogTransport for FakeServer {
    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        self.enter(Call::ListCategories).await?;
        Ok(self.lock().categories.values().cloned().collect())
    }

    async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category, CoreError> {
        self.enter(Call::CreateCategory).await?;
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let category = Category {
            id: CategoryId(id),
            name: req.name.clone(),
            owner_id: Some(self.acting_user),
            selected: false,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        req: &UpdateCategoryRequest,
    ) -> Result<PatchedCategory, CoreError> {
        self.enter(Call::UpdateCategory(id.get())).await?;
        let mut state = self.lock();
        let category = state
            .categories
            .get_mut(&id.get())
            .ok_or_else(|| transport_error(404))?;
        if let Some(ref name) = req.name {
            category.name.clone_from(name);
        }
        let echo = PatchedCategory::from(category.clone());
        if state.sparse_echoes {
            return Ok(PatchedCategory {
                owner_id: None,
                ..echo
            });
        }
        Ok(echo)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), CoreError> {
        self.enter(Call::DeleteCategory(id.get())).await?;
        let mut state = self.lock();
        state
            .categories
            .remove(&id.get())
            .ok_or_else(|| transport_error(404))?;
        state.items.retain(|_, item| item.category_id != id);
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<Item>, CoreError> {
        self.enter(Call::ListItems).await?;
        Ok(self.lock().items.values().cloned().collect())
    }

    async fn create_item(&self, req: &CreateItemRequest) -> Result<Item, CoreError> {
        self.enter(Call::CreateItem).await?;
        let item = {
            let mut state = self.lock();
            if !state.categories.contains_key(&req.category_id.get()) {
                return Err(CoreError::Validation {
                    message: "unknown category".into(),
                });
            }
            let id = Self::next_id(&mut state);
            let item = Item {
                id: ItemId(id),
                name: req.name.clone(),
                description: req.description.clone(),
                category_id: req.category_id,
                image_id: req.image_id,
                image_url: req.image_id.map(|i| format!("/static/images/{i}.png")),
                owner_id: Some(self.acting_user),
                created_on: epoch() + Duration::minutes(id),
            };
            state.items.insert(id, item.clone());
            item
        };
        self.reply(Call::CreateItem).await;
        Ok(item)
    }

    async fn update_item(
        &self,
        id: ItemId,
        req: &UpdateItemRequest,
    ) -> Result<PatchedItem, CoreError> {
        self.enter(Call::UpdateItem(id.get())).await?;
        let mut state = self.lock();
        let item = state
            .items
            .get_mut(&id.get())
            .ok_or_else(|| transport_error(404))?;
        if let Some(ref name) = req.name {
            item.name.clone_from(name);
        }
        if let Some(ref description) = req.description {
            item.description.clone_from(description);
        }
        if let Some(category_id) = req.category_id {
            item.category_id = category_id;
        }
        if let Some(image_id) = req.image_id {
            item.image_id = Some(image_id);
            item.image_url = Some(format!("/static/images/{image_id}.png"));
        }
        let echo = PatchedItem::from(item.clone());
        if state.sparse_echoes {
            return Ok(PatchedItem {
                description: None,
                image_id: None,
                image_url: None,
                owner_id: None,
                ..echo
            });
        }
        Ok(echo)
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), CoreError> {
        self.enter(Call::DeleteItem(id.get())).await?;
        self.lock()
            .items
            .remove(&id.get())
            .map(drop)
            .ok_or_else(|| transport_error(404))
    }
}

#[async_trait]
impl ImageTransport for FakeServer {
    async fn upload_image(&self, _image: &StagedImage) -> Result<ImageId, CoreError> {
        self.enter(Call::UploadImage).await?;
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        state.images.push(id);
        Ok(ImageId(id))
    }

    async fn delete_image(&self, id: ImageId) -> Result<(), CoreError> {
        self.enter(Call::DeleteImage(id.get())).await?;
        let mut state = self.lock();
        let pos = state
            .images
            .iter()
            .position(|i| *i == id.get())
            .ok_or_else(|| transport_error(404))?;
        state.images.remove(pos);
        Ok(())
    }
}

// ── Controller helpers ───────────────────────────────────────────────

pub fn config() -> ControllerConfig {
    let mut config = ControllerConfig::new("http://catalog.test".parse().unwrap());
    config.user_id = Some(ME);
    config
}

pub fn controller_with(server: &Arc<FakeServer>, config: ControllerConfig) -> Controller {
    Controller::with_transport(config, server.clone(), server.clone())
}

/// A controller with the default config, already loaded.
pub async fn connected(server: &Arc<FakeServer>) -> Controller {
    let controller = controller_with(server, config());
    controller.connect().await.unwrap();
    controller
}

pub fn png() -> StagedImage {
    StagedImage::new("board.png", "image/png", &b"\x89PNG\r\n"[..]).unwrap()
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Everything published so far.
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

pub fn failures(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|n| matches!(n, Notification::OperationFailed { .. }))
        .count()
}
