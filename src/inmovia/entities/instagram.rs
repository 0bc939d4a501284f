use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OFFICE_ACCOUNT: &str = "office";
pub const AGENT_ACCOUNT: &str = "agent";

/// A connected Instagram account: the office's own, or one per agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramAccount {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string", rename = "type")]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_expires_at: Option<DateTime<Utc>>,
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

impl InstagramAccount {
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|at| at <= now)
    }
}

impl Entity for InstagramAccount {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        if self.kind.is_empty() {
            self.kind = if self.user_id.is_some() {
                AGENT_ACCOUNT
            } else {
                OFFICE_ACCOUNT
            }
            .to_string();
        }
        self.username = self.username.trim_start_matches('@').to_string();
    }
}

impl Collection for InstagramAccount {
    const COLLECTION: &'static str = "instagram_accounts";
}

impl<B: StorageBackend> RecordStore<InstagramAccount, B> {
    pub fn find_office_account(&self) -> Result<Option<InstagramAccount>> {
        self.find_first(|a| a.kind == OFFICE_ACCOUNT)
    }

    pub fn find_by_user(&self, user_id: &str) -> Result<Option<InstagramAccount>> {
        self.find_first(|a| a.kind == AGENT_ACCOUNT && a.user_id.as_deref() == Some(user_id))
    }
}
