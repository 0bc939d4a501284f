use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: &str,
    id: &str,
) -> Result<CmdResult> {
    let store = db.dyn_store(collection)?;
    let mut result = CmdResult::default();
    match store.get_record(id)? {
        Some(record) => result.records.push(record),
        None => result.add_message(CmdMessage::warning(format!(
            "No record with id {} in {}.",
            id, collection
        ))),
    }
    Ok(result)
}
