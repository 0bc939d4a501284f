use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub read: bool,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Entity for Notification {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection for Notification {
    const COLLECTION: &'static str = "notifications";
}

impl<B: StorageBackend> RecordStore<Notification, B> {
    pub fn find_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.find_by(|n| n.user_id == user_id)
    }

    pub fn find_unread_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.find_by(|n| n.user_id == user_id && !n.read)
    }
}
