use std::fmt::{Debug, Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identity key of a backend record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    /// Integer primary key.
    Number(i64),
    /// String identifier such as an object id.
    Text(String),
}

impl RecordKey {
    /// Extracts a key from a JSON scalar.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(Self::Number),
            Value::String(text) if !text.trim().is_empty() => Some(Self::Text(text.clone())),
            _ => None,
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(formatter, "{number}"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A record type managed by one dashboard screen.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Backend resource path segment, e.g. `hospitals`.
    const RESOURCE: &'static str;

    /// Singular human-friendly name, e.g. `Hospital`.
    const DISPLAY_NAME: &'static str;

    /// Returns the identity key.
    fn key(&self) -> &RecordKey;
}

/// One page of listed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<E> {
    items: Vec<E>,
    total: Option<u64>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl<E> Page<E> {
    /// Creates an unpaginated page.
    #[must_use]
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            total: None,
            page: None,
            limit: None,
        }
    }

    /// Creates a page with pagination metadata.
    #[must_use]
    pub fn paginated(items: Vec<E>, total: u64, page: u32, limit: u32) -> Self {
        Self {
            items,
            total: Some(total),
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns the records of this page.
    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Returns the backend-reported total.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Returns the one-based page number.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

impl<E: Entity> Page<E> {
    /// Finds a record by key.
    #[must_use]
    pub fn find(&self, key: &RecordKey) -> Option<&E> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Returns a copy with the record matching `item`'s key replaced.
    ///
    /// Pages without a matching record are returned unchanged.
    #[must_use]
    pub fn with_replaced(&self, item: E) -> Self {
        let items = self
            .items
            .iter()
            .map(|existing| {
                if existing.key() == item.key() {
                    item.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();
        Self {
            items,
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }

    /// Returns a copy without the record matching `key`.
    #[must_use]
    pub fn without(&self, key: &RecordKey) -> Self {
        let before = self.items.len();
        let items: Vec<E> = self
            .items
            .iter()
            .filter(|item| item.key() != key)
            .cloned()
            .collect();
        let removed = (before - items.len()) as u64;
        Self {
            items,
            total: self.total.map(|total| total.saturating_sub(removed)),
            page: self.page,
            limit: self.limit,
        }
    }

    /// Returns a copy with `item` appended.
    #[must_use]
    pub fn with_appended(&self, item: E) -> Self {
        let mut items = self.items.clone();
        items.push(item);
        Self {
            items,
            total: self.total.map(|total| total.saturating_add(1)),
            page: self.page,
            limit: self.limit,
        }
    }
}

impl<E> Default for Page<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<E> {
    Bare(Vec<E>),
    Paged {
        #[serde(alias = "rows", alias = "docs")]
        items: Vec<E>,
        #[serde(default, alias = "count")]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        limit: Option<u32>,
    },
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for Page<E> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Bare(items) => Self::new(items),
            PageRepr::Paged {
                items,
                total,
                page,
                limit,
            } => Self {
                items,
                total,
                page,
                limit,
            },
        })
    }
}
