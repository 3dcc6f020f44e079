// ── API <-> domain conversions ──
//
// Wire ids are bare integers; the domain wraps them in newtypes. A
// missing item description arrives as `null` and becomes "".

use catalog_api::{
    ApiCategory, ApiCategoryPatched, ApiItem, ApiItemPatched, CategoryCreate, CategoryPatch,
    ItemCreate, ItemPatch,
};

use crate::command::{
    CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest,
};
use crate::model::{
    Category, CategoryId, ImageId, Item, ItemId, OwnerId, PatchedCategory, PatchedItem,
};

// ── Inbound ────────────────────────────────────────────────────────

impl From<ApiCategory> for Category {
    fn from(raw: ApiCategory) -> Self {
        Self {
            id: CategoryId(raw.id),
            name: raw.name,
            owner_id: raw.owner_id.map(OwnerId),
            selected: false,
        }
    }
}

impl From<ApiItem> for Item {
    fn from(raw: ApiItem) -> Self {
        Self {
            id: ItemId(raw.id),
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            category_id: CategoryId(raw.category_id),
            image_id: raw.image_id.map(ImageId),
            image_url: raw.image_url.filter(|u| !u.is_empty()),
            owner_id: raw.owner_id.map(OwnerId),
            created_on: raw.created_on,
        }
    }
}

impl From<ApiCategoryPatched> for PatchedCategory {
    fn from(raw: ApiCategoryPatched) -> Self {
        Self {
            id: CategoryId(raw.id),
            name: raw.name,
            owner_id: raw.owner_id.map(|o| o.map(OwnerId)),
        }
    }
}

impl From<ApiItemPatched> for PatchedItem {
    fn from(raw: ApiItemPatched) -> Self {
        Self {
            id: ItemId(raw.id),
            name: raw.name,
            description: raw.description.map(Option::unwrap_or_default),
            category_id: raw.category_id.map(CategoryId),
            image_id: raw.image_id.map(|i| i.map(ImageId)),
            image_url: raw.image_url.map(|u| u.filter(|u| !u.is_empty())),
            owner_id: raw.owner_id.map(|o| o.map(OwnerId)),
        }
    }
}

// ── Outbound ───────────────────────────────────────────────────────

impl From<&CreateCategoryRequest> for CategoryCreate {
    fn from(req: &CreateCategoryRequest) -> Self {
        Self {
            name: req.name.clone(),
        }
    }
}

impl From<&UpdateCategoryRequest> for CategoryPatch {
    fn from(req: &UpdateCategoryRequest) -> Self {
        Self {
            name: req.name.clone(),
        }
    }
}

impl From<&CreateItemRequest> for ItemCreate {
    fn from(req: &CreateItemRequest) -> Self {
        Self {
            name: req.name.clone(),
            description: req.description.clone(),
            category_id: req.category_id.get(),
            image_id: req.image_id.map(ImageId::get),
        }
    }
}

impl From<&UpdateItemRequest> for ItemPatch {
    fn from(req: &UpdateItemRequest) -> Self {
        Self {
            name: req.name.clone(),
            description: req.description.clone(),
            category_id: req.category_id.map(CategoryId::get),
            image_id: req.image_id.map(ImageId::get),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn item_null_description_becomes_empty() {
        let item = Item::from(ApiItem {
            id: 1,
            name: "Puck".into(),
            description: None,
            category_id: 2,
            image_id: Some(3),
            image_url: Some(String::new()),
            owner_id: Some(4),
            created_on: Utc::now(),
        });
        assert_eq!(item.description, "");
        assert_eq!(item.image_id, Some(ImageId(3)));
        assert_eq!(item.image_url, None);
        assert_eq!(item.owner_id, Some(OwnerId(4)));
    }

    #[test]
    fn patched_item_keeps_absence_and_null_apart() {
        let patched = PatchedItem::from(ApiItemPatched {
            id: 3,
            name: Some("B".into()),
            description: Some(None),
            image_url: Some(Some(String::new())),
            ..ApiItemPatched::default()
        });
        assert_eq!(patched.description.as_deref(), Some(""));
        assert_eq!(patched.image_url, Some(None));
        assert_eq!(patched.image_id, None);
        assert_eq!(patched.owner_id, None);
    }

    #[test]
    fn patch_carries_only_given_fields() {
        let patch = ItemPatch::from(&UpdateItemRequest {
            image_id: Some(ImageId(8)),
            ..UpdateItemRequest::default()
        });
        assert_eq!(patch.image_id, Some(8));
        assert!(patch.name.is_none());
        assert!(patch.category_id.is_none());
    }
}
