use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;

/// Persist entity defaults into one collection, or every well-known one.
pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: Option<&str>,
) -> Result<CmdResult> {
    let results = match collection {
        Some(name) => vec![(name.to_string(), db.dyn_store(name)?.migrate()?)],
        None => db.migrate_all()?,
    };

    let mut result = CmdResult::default();
    if results.is_empty() {
        result.add_message(CmdMessage::info("Nothing to migrate."));
    }
    for (name, changed) in results {
        let message = format!("{}: {} record(s) rewritten.", name, changed);
        result.add_message(if changed > 0 {
            CmdMessage::success(message)
        } else {
            CmdMessage::info(message)
        });
    }
    Ok(result)
}
