// ── Transport seams ──
//
// The coordinator talks to the server only through these traits.
// `CatalogClient` implements both; tests substitute in-memory fakes.

use async_trait::async_trait;
use catalog_api::CatalogClient;

use crate::command::{
    CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest,
};
use crate::error::CoreError;
use crate::model::{
    Category, CategoryId, ImageId, Item, ItemId, PatchedCategory, PatchedItem, StagedImage,
};

/// Persistence of categories and items.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, CoreError>;
    async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category, CoreError>;
    /// The reply may echo only some fields.
    async fn update_category(
        &self,
        id: CategoryId,
        req: &UpdateCategoryRequest,
    ) -> Result<PatchedCategory, CoreError>;
    async fn delete_category(&self, id: CategoryId) -> Result<(), CoreError>;

    async fn list_items(&self) -> Result<Vec<Item>, CoreError>;
    async fn create_item(&self, req: &CreateItemRequest) -> Result<Item, CoreError>;
    /// The reply may echo only some fields.
    async fn update_item(
        &self,
        id: ItemId,
        req: &UpdateItemRequest,
    ) -> Result<PatchedItem, CoreError>;
    async fn delete_item(&self, id: ItemId) -> Result<(), CoreError>;
}

/// Storage of item images.
#[async_trait]
pub trait ImageTransport: Send + Sync {
    async fn upload_image(&self, image: &StagedImage) -> Result<ImageId, CoreError>;
    async fn delete_image(&self, id: ImageId) -> Result<(), CoreError>;
}

#[async_trait]
impl CatalogTransport for CatalogClient {
    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        let raw = CatalogClient::list_categories(self).await?;
        Ok(raw.into_iter().map(Category::from).collect())
    }

    async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category, CoreError> {
        Ok(CatalogClient::create_category(self, &req.into()).await?.into())
    }

    async fn update_category(
        &self,
        id: CategoryId,
        req: &UpdateCategoryRequest,
    ) -> Result<PatchedCategory, CoreError> {
        Ok(CatalogClient::update_category(self, id.get(), &req.into())
            .await?
            .into())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), CoreError> {
        Ok(CatalogClient::delete_category(self, id.get()).await?)
    }

    async fn list_items(&self) -> Result<Vec<Item>, CoreError> {
        let raw = CatalogClient::list_items(self).await?;
        Ok(raw.into_iter().map(Item::from).collect())
    }

    async fn create_item(&self, req: &CreateItemRequest) -> Result<Item, CoreError> {
        Ok(CatalogClient::create_item(self, &req.into()).await?.into())
    }

    async fn update_item(
        &self,
        id: ItemId,
        req: &UpdateItemRequest,
    ) -> Result<PatchedItem, CoreError> {
        Ok(CatalogClient::update_item(self, id.get(), &req.into())
            .await?
            .into())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), CoreError> {
        Ok(CatalogClient::delete_item(self, id.get()).await?)
    }
}

#[async_trait]
impl ImageTransport for CatalogClient {
    async fn upload_image(&self, image: &StagedImage) -> Result<ImageId, CoreError> {
        let uploaded = CatalogClient::upload_image(
            self,
            image.file_name(),
            image.content_type(),
            image.data().clone(),
        )
        .await?;
        Ok(ImageId(uploaded.id))
    }

    async fn delete_image(&self, id: ImageId) -> Result<(), CoreError> {
        Ok(CatalogClient::delete_image(self, id.get()).await?)
    }
}
