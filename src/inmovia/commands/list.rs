use crate::commands::helpers::matches_filters;
use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;
use serde_json::Value;

pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: &str,
    filters: &[(String, Value)],
) -> Result<CmdResult> {
    let store = db.dyn_store(collection)?;
    let records: Vec<_> = store
        .list_records()?
        .into_iter()
        .filter(|record| matches_filters(record, filters))
        .collect();

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info(format!("No records in {}.", collection)));
    }
    Ok(result.with_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::store::mem_backend::MemBackend;
    use crate::store::StoreOptions;
    use serde_json::json;

    #[test]
    fn lists_in_insertion_order_with_filters() {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        create::run(&db, "users", r#"{"name": "Marta", "role": "admin"}"#).unwrap();
        create::run(&db, "users", r#"{"name": "Pablo", "role": "agente"}"#).unwrap();
        create::run(&db, "users", r#"{"name": "Lucia", "role": "agente"}"#).unwrap();

        let all = run(&db, "users", &[]).unwrap();
        let names: Vec<_> = all.records.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Marta"), json!("Pablo"), json!("Lucia")]);

        let agents = run(&db, "users", &[("role".to_string(), json!("agente"))]).unwrap();
        assert_eq!(agents.records.len(), 2);
    }

    #[test]
    fn empty_collection_is_reported_not_failed() {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        let result = run(&db, "contacts", &[]).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn unreadable_collection_is_an_error() {
        let backend = MemBackend::new();
        backend.set_unreadable("contacts", true);
        let db = Database::new(backend, StoreOptions::default());
        assert!(run(&db, "contacts", &[]).is_err());
    }
}
