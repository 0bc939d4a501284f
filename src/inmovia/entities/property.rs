use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub titulo: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub direccion: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ciudad: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub precio: Option<f64>,
    /// `venta` or `alquiler`.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub operacion: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub estado: Option<String>,
    /// Owner contact.
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
    pub agent_user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub imagenes: Vec<String>,
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

impl Entity for Property {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection for Property {
    const COLLECTION: &'static str = "properties";
}

impl<B: StorageBackend> RecordStore<Property, B> {
    pub fn find_by_agent(&self, user_id: &str) -> Result<Vec<Property>> {
        self.find_by(|p| p.agent_user_id.as_deref() == Some(user_id))
    }

    pub fn find_by_contact_id(&self, contact_id: &str) -> Result<Vec<Property>> {
        self.find_by(|p| p.contact_id.as_deref() == Some(contact_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::store::mem_backend::MemBackend;
    use crate::store::record_store::to_record;
    use crate::store::StoreOptions;
    use serde_json::json;

    #[test]
    fn prices_written_as_text_are_read_as_numbers() {
        let backend = MemBackend::new();
        backend.tamper(
            "properties",
            vec![
                to_record(&json!({"id": "p1", "titulo": "Piso", "precio": "250000", "imagenes": null}))
                    .unwrap(),
                to_record(&json!({"id": "p2", "titulo": "Local", "precio": "a consultar", "agentUserId": "u1"}))
                    .unwrap(),
            ],
        );
        let db = Database::new(backend, StoreOptions::default());

        let properties = db.properties().find_all().unwrap();
        assert_eq!(properties[0].precio, Some(250000.0));
        assert!(properties[0].imagenes.is_empty());
        assert_eq!(properties[1].precio, None);
        assert_eq!(db.properties().find_by_agent("u1").unwrap().len(), 1);

        db.properties()
            .update("p2", json!({"estado": "vendido"}))
            .unwrap()
            .unwrap();
        let raw = db.raw("properties").unwrap().find_by_id("p2").unwrap().unwrap();
        assert_eq!(raw["precio"], "a consultar");
        assert_eq!(raw["estado"], "vendido");
    }
}
