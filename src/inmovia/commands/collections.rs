use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(db: &Database<B>) -> Result<CmdResult> {
    let names = db.collections()?;
    let mut result = CmdResult::default();
    if names.is_empty() {
        result.add_message(CmdMessage::info("No collections yet."));
    }
    Ok(result.with_collections(names))
}
