// Catalog API wire types
//
// Resource shapes exchanged with `/api/category`, `/api/item` and
// `/api/image`. Optional fields use `#[serde(default)]` because the
// server omits nulls on older deployments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Category ─────────────────────────────────────────────────────────

/// Category record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

/// Body for `POST /api/category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Body for `PATCH /api/category/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response of `PATCH /api/category/{id}`. Fields the server did not
/// echo stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCategoryPatched {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Option<i64>>,
}

// ── Item ─────────────────────────────────────────────────────────────

/// Item record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub image_id: Option<i64>,
    /// Display path of the attached image, resolved by the server.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,
}

/// Body for `POST /api/item`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub description: String,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<i64>,
}

/// Body for `PATCH /api/item/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<i64>,
}

/// Response of `PATCH /api/item/{id}`.
///
/// An absent field is `None`; a field sent as `null` is `Some(None)`.
/// `created_on` never changes on update and is not read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiItemPatched {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Option<i64>>,
}

/// A key that is present deserializes to `Some`, even when its value is
/// `null`. Paired with `#[serde(default)]` for the absent case.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Image ────────────────────────────────────────────────────────────

/// Response of `POST /api/image`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiImage {
    pub id: i64,
}

// ── Timestamps ───────────────────────────────────────────────────────

/// `created_on` arrives as RFC 3339, RFC 2822 (Flask's `jsonify` default),
/// or a naive ISO-8601 string assumed to be UTC. Always written as RFC 3339.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw}")))
    }

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_all_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2018, 3, 4, 12, 30, 0).unwrap();
        assert_eq!(timestamp::parse("2018-03-04T12:30:00Z"), Some(expected));
        assert_eq!(timestamp::parse("Sun, 04 Mar 2018 12:30:00 GMT"), Some(expected));
        assert_eq!(timestamp::parse("2018-03-04T12:30:00.000"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn item_tolerates_missing_optionals() {
        let item: ApiItem = serde_json::from_value(json!({
            "id": 7,
            "name": "Snowboard",
            "category_id": 2,
            "created_on": "2018-03-04T12:30:00Z"
        }))
        .unwrap();

        assert_eq!(item.description, None);
        assert_eq!(item.image_id, None);
        assert_eq!(item.owner_id, None);
    }

    #[test]
    fn patched_item_tells_absent_from_null() {
        let patched: ApiItemPatched = serde_json::from_value(json!({
            "id": 3,
            "name": "B",
            "image_id": null
        }))
        .unwrap();

        assert_eq!(patched.name.as_deref(), Some("B"));
        assert_eq!(patched.image_id, Some(None));
        assert_eq!(patched.description, None);
        assert_eq!(patched.owner_id, None);
        assert_eq!(patched.category_id, None);
    }

    #[test]
    fn patched_category_reads_owner_when_echoed() {
        let patched: ApiCategoryPatched =
            serde_json::from_value(json!({ "id": 1, "name": "Ski", "owner_id": 4 })).unwrap();
        assert_eq!(patched.owner_id, Some(Some(4)));

        let bare: ApiCategoryPatched = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(bare.owner_id, None);
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = ItemPatch {
            name: Some("B".into()),
            ..ItemPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "name": "B" }));
    }
}
