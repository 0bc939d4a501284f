//! Internal chat between office users: conversations and their messages.

use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub participants: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// `direct` or `group`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_message_at: Option<DateTime<Utc>>,
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

impl Entity for Conversation {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.participants.sort();
        self.participants.dedup();
    }
}

impl Collection for Conversation {
    const COLLECTION: &'static str = "conversations";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub conversation_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sender_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub read_by: Vec<String>,
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

impl Entity for ChatMessage {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        // The sender has always read their own message.
        if !self.sender_id.is_empty() && !self.read_by.contains(&self.sender_id) {
            self.read_by.push(self.sender_id.clone());
        }
    }
}

impl Collection for ChatMessage {
    const COLLECTION: &'static str = "messages";
}

impl<B: StorageBackend> RecordStore<Conversation, B> {
    pub fn find_by_participant(&self, user_id: &str) -> Result<Vec<Conversation>> {
        self.find_by(|c| c.participants.iter().any(|p| p == user_id))
    }
}

impl<B: StorageBackend> RecordStore<ChatMessage, B> {
    /// Messages of one conversation, oldest first.
    pub fn find_by_conversation(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages = self.find_by(|m| m.conversation_id == conversation_id)?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}
