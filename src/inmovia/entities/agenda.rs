//! Agenda events: visits, calls and meetings tied to contacts and properties.

use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEvent {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
    /// `visita`, `llamada`, `reunion`, `seguimiento`...
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub google_event_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
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

impl AgendaEvent {
    fn is_after(&self, now: DateTime<Utc>) -> bool {
        self.date.is_some_and(|date| date > now)
    }

    fn kind_in(&self, kinds: Option<&[&str]>) -> bool {
        match kinds {
            None => true,
            Some(kinds) => self
                .kind
                .as_deref()
                .is_some_and(|kind| kinds.contains(&kind)),
        }
    }
}

impl Entity for AgendaEvent {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection for AgendaEvent {
    const COLLECTION: &'static str = "agenda";
}

impl<B: StorageBackend> RecordStore<AgendaEvent, B> {
    pub fn find_by_contact_id(&self, contact_id: &str) -> Result<Vec<AgendaEvent>> {
        self.find_by(|e| e.contact_id.as_deref() == Some(contact_id))
    }

    pub fn find_by_property_id(&self, property_id: &str) -> Result<Vec<AgendaEvent>> {
        self.find_by(|e| e.property_id.as_deref() == Some(property_id))
    }

    /// Drop a contact's events scheduled after `now`, used when a contact is
    /// removed or changes stage. With `kinds`, only events of those types go.
    /// Past events and events without a date are kept as history.
    pub fn delete_future_events_by_contact(
        &self,
        contact_id: &str,
        now: DateTime<Utc>,
        kinds: Option<&[&str]>,
    ) -> Result<usize> {
        self.delete_where(|e| {
            e.contact_id.as_deref() == Some(contact_id) && e.is_after(now) && e.kind_in(kinds)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::store::mem_backend::MemBackend;
    use crate::store::record_store::to_record;
    use crate::store::StoreOptions;
    use chrono::TimeZone;
    use serde_json::json;

    fn seeded() -> Database<MemBackend> {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        db.agenda()
            .create_many(vec![
                json!({"title": "past visit", "contactId": "c1", "type": "visita", "date": "2024-01-10T10:00:00Z"}),
                json!({"title": "future visit", "contactId": "c1", "type": "visita", "date": "2024-06-10T10:00:00Z"}),
                json!({"title": "future call", "contactId": "c1", "type": "llamada", "date": "2024-06-11T10:00:00Z"}),
                json!({"title": "undated", "contactId": "c1", "type": "visita"}),
                json!({"title": "other contact", "contactId": "c2", "type": "visita", "date": "2024-06-10T10:00:00Z"}),
            ])
            .unwrap();
        db
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn titles(db: &Database<MemBackend>) -> Vec<String> {
        db.agenda()
            .find_all()
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect()
    }

    #[test]
    fn deletes_all_future_events_of_a_contact() {
        let db = seeded();
        let removed = db
            .agenda()
            .delete_future_events_by_contact("c1", now(), None)
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(titles(&db), vec!["past visit", "undated", "other contact"]);
    }

    #[test]
    fn allow_list_restricts_deleted_kinds() {
        let db = seeded();
        let removed = db
            .agenda()
            .delete_future_events_by_contact("c1", now(), Some(&["llamada"]))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            titles(&db),
            vec!["past visit", "future visit", "undated", "other contact"]
        );
    }

    #[test]
    fn lookups_by_contact_and_property() {
        let db = seeded();
        db.agenda()
            .create(json!({"title": "open house", "propertyId": "p9"}))
            .unwrap();
        assert_eq!(db.agenda().find_by_contact_id("c1").unwrap().len(), 4);
        assert_eq!(db.agenda().find_by_property_id("p9").unwrap().len(), 1);
    }

    fn legacy() -> Database<MemBackend> {
        let backend = MemBackend::new();
        backend.tamper(
            "agenda",
            [
                json!({"id": "e1", "title": "visita", "contactId": "c1", "date": "2030-06-10T10:00"}),
                json!({"id": "e2", "title": null, "contactId": "c1", "date": "2030-06-10T10:00:00+02:00"}),
                json!({"id": "e3", "title": "sin fecha", "contactId": "c1", "date": "pronto"}),
                json!({"id": "e4", "title": "vieja", "contactId": "c1", "date": 20240101}),
            ]
            .iter()
            .map(|value| to_record(value).unwrap())
            .collect(),
        );
        Database::new(backend, StoreOptions::default())
    }

    #[test]
    fn legacy_dates_stay_readable() {
        let db = legacy();
        let events = db.agenda().find_all().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0].date,
            Some(Utc.with_ymd_and_hms(2030, 6, 10, 10, 0, 0).unwrap())
        );
        assert_eq!(events[1].title, "");
        assert_eq!(
            events[1].date,
            Some(Utc.with_ymd_and_hms(2030, 6, 10, 8, 0, 0).unwrap())
        );
        assert_eq!(events[2].date, None);
        assert_eq!(events[3].date, None);
    }

    #[test]
    fn future_events_are_deleted_from_legacy_records() {
        let db = legacy();
        let removed = db
            .agenda()
            .delete_future_events_by_contact("c1", now(), None)
            .unwrap();
        assert_eq!(removed, 2);

        let left: Vec<_> = db
            .raw("agenda")
            .unwrap()
            .find_all()
            .unwrap()
            .into_iter()
            .map(|r| r["date"].clone())
            .collect();
        assert_eq!(left, vec![json!("pronto"), json!(20240101)]);
    }

    #[test]
    fn title_update_leaves_the_stored_date_untouched() {
        let db = legacy();
        db.agenda()
            .update("e2", json!({"title": "llamada"}))
            .unwrap()
            .unwrap();
        db.agenda()
            .update("e3", json!({"title": "pendiente"}))
            .unwrap()
            .unwrap();

        let raw = db.raw("agenda").unwrap();
        let e2 = raw.find_by_id("e2").unwrap().unwrap();
        assert_eq!(e2["date"], "2030-06-10T10:00:00+02:00");
        assert_eq!(e2["title"], "llamada");
        assert!(e2.contains_key("updatedAt"));
        assert_eq!(raw.find_by_id("e3").unwrap().unwrap()["date"], "pronto");
        assert_eq!(
            raw.find_by_id("e1").unwrap().unwrap()["date"],
            "2030-06-10T10:00"
        );
    }
}
