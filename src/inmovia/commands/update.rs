use crate::commands::helpers::parse_object;
use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: &str,
    id: &str,
    json: &str,
) -> Result<CmdResult> {
    let patch = parse_object(json)?;
    let store = db.dyn_store(collection)?;

    let mut result = CmdResult::default();
    match store.update_record(id, patch)? {
        Some(record) => {
            result.add_message(CmdMessage::success(format!(
                "Updated {} in {}.",
                id, collection
            )));
            result.records.push(record);
        }
        None => result.add_message(CmdMessage::warning(format!(
            "No record with id {} in {}.",
            id, collection
        ))),
    }
    Ok(result)
}
