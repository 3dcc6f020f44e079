// Item endpoints
//
// `/api/item` collection and `/api/item/{id}` member routes.

use tracing::debug;

use crate::client::CatalogClient;
use crate::error::Error;
use crate::models::{ApiItem, ApiItemPatched, ItemCreate, ItemPatch};

impl CatalogClient {
    /// List every item.
    ///
    /// `GET /api/item`
    pub async fn list_items(&self) -> Result<Vec<ApiItem>, Error> {
        let url = self.api_url("item")?;
        self.get(url).await
    }

    /// Create an item. The server assigns `id`, `owner_id` and `created_on`.
    ///
    /// `POST /api/item`
    pub async fn create_item(&self, body: &ItemCreate) -> Result<ApiItem, Error> {
        let url = self.api_url("item")?;
        debug!(name = %body.name, category_id = body.category_id, "creating item");
        self.post(url, body).await
    }

    /// Partially update an item. The response may echo only some fields.
    ///
    /// `PATCH /api/item/{id}`
    pub async fn update_item(&self, id: i64, body: &ItemPatch) -> Result<ApiItemPatched, Error> {
        let url = self.api_url(&format!("item/{id}"))?;
        self.patch(url, body).await
    }

    /// Delete an item. Its image, if any, is left for the caller to remove.
    ///
    /// `DELETE /api/item/{id}`
    pub async fn delete_item(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("item/{id}"))?;
        debug!(id, "deleting item");
        self.delete(url).await
    }
}
