use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{Entity, RecordKey};

/// Hospital listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    /// Identity key.
    pub id: RecordKey,
    /// Hospital name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Publication status code.
    #[serde(default)]
    pub status: Option<i64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Hospital {
    const RESOURCE: &'static str = "hospitals";
    const DISPLAY_NAME: &'static str = "Hospital";

    fn key(&self) -> &RecordKey {
        &self.id
    }
}

/// Doctor attached to a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    /// Identity key.
    pub id: RecordKey,
    /// Owning hospital.
    #[serde(default)]
    pub hospital_id: Option<RecordKey>,
    /// Full name.
    pub name: String,
    /// Medical specialty.
    #[serde(default)]
    pub specialty: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Portrait URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Publication status code.
    #[serde(default)]
    pub status: Option<i64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Doctor {
    const RESOURCE: &'static str = "doctors";
    const DISPLAY_NAME: &'static str = "Doctor";

    fn key(&self) -> &RecordKey {
        &self.id
    }
}

/// Category grouping news articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsCategory {
    /// Identity key.
    pub id: RecordKey,
    /// Category name.
    pub name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Rich-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Publication status code.
    #[serde(default)]
    pub status: Option<i64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for NewsCategory {
    const RESOURCE: &'static str = "news-categories";
    const DISPLAY_NAME: &'static str = "News category";

    fn key(&self) -> &RecordKey {
        &self.id
    }
}

/// Dashboard operator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Identity key.
    pub id: RecordKey,
    /// Login name.
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role name.
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the account may sign in.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for AdminUser {
    const RESOURCE: &'static str = "users";
    const DISPLAY_NAME: &'static str = "User";

    fn key(&self) -> &RecordKey {
        &self.id
    }
}
