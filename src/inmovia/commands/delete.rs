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
    if store.delete_record(id)? {
        result.add_message(CmdMessage::success(format!(
            "Deleted {} from {}.",
            id, collection
        )));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "No record with id {} in {}.",
            id, collection
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, list, MessageLevel};
    use crate::store::mem_backend::MemBackend;
    use crate::store::StoreOptions;

    #[test]
    fn deleting_twice_warns_the_second_time() {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        let created = create::run(&db, "agenda", r#"{"title": "Visita"}"#).unwrap();
        let id = created.records[0]["id"].as_str().unwrap().to_string();

        let first = run(&db, "agenda", &id).unwrap();
        assert_eq!(first.messages[0].level, MessageLevel::Success);
        let second = run(&db, "agenda", &id).unwrap();
        assert_eq!(second.messages[0].level, MessageLevel::Warning);
        assert!(list::run(&db, "agenda", &[]).unwrap().records.is_empty());
    }
}
