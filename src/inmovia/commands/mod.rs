//! # Command Layer
//!
//! One module per CLI command, each exposing a `run` function that takes the
//! [`Database`](crate::db::Database) and plain arguments and returns a
//! [`CmdResult`]. Nothing here prints or exits; the binary decides how a
//! result is shown.
//!
//! Collections are addressed by name at this layer, so commands go through
//! [`Database::dyn_store`](crate::db::Database::dyn_store): well-known
//! collections keep their entity behavior, other names are served raw.

use crate::config::StoreConfig;
use crate::model::Record;

pub mod collections;
pub mod config;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod get;
pub mod helpers;
pub mod list;
pub mod migrate;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub records: Vec<Record>,
    pub collections: Vec<String>,
    pub config: Option<StoreConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether any message reports a failure.
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
