use crate::commands::helpers::parse_object;
use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::model::record_id;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: &str,
    json: &str,
) -> Result<CmdResult> {
    let draft = parse_object(json)?;
    let store = db.dyn_store(collection)?;
    let record = store.create_record(draft)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created {} in {}.",
        record_id(&record).unwrap_or_default(),
        collection
    )));
    result.records.push(record);
    Ok(result)
}
