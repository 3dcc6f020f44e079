// Category endpoints
//
// `/api/category` collection and `/api/category/{id}` member routes.
// Deleting a category cascades to its items on the server.

use tracing::debug;

use crate::client::CatalogClient;
use crate::error::Error;
use crate::models::{ApiCategory, ApiCategoryPatched, CategoryCreate, CategoryPatch};

impl CatalogClient {
    /// List every category.
    ///
    /// `GET /api/category`
    pub async fn list_categories(&self) -> Result<Vec<ApiCategory>, Error> {
        let url = self.api_url("category")?;
        self.get(url).await
    }

    /// Create a category. The server assigns `id` and `owner_id`.
    ///
    /// `POST /api/category`
    pub async fn create_category(&self, body: &CategoryCreate) -> Result<ApiCategory, Error> {
        let url = self.api_url("category")?;
        debug!(name = %body.name, "creating category");
        self.post(url, body).await
    }

    /// Partially update a category.
    ///
    /// `PATCH /api/category/{id}`
    pub async fn update_category(
        &self,
        id: i64,
        body: &CategoryPatch,
    ) -> Result<ApiCategoryPatched, Error> {
        let url = self.api_url(&format!("category/{id}"))?;
        self.patch(url, body).await
    }

    /// Delete a category (and, server-side, every item in it).
    ///
    /// `DELETE /api/category/{id}`
    pub async fn delete_category(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("category/{id}"))?;
        debug!(id, "deleting category");
        self.delete(url).await
    }
}
