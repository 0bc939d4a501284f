//! Documents attached to contacts and properties, with their e-signature state.
//!
//! The `signature` sub-record is merged member by member on update, so a
//! provider callback that only reports `{"status": "FIRMADO"}` keeps the
//! request metadata written when the signature was requested.

use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod signature_status {
    pub const NOT_REQUESTED: &str = "NO_SOLICITADA";
    pub const PENDING: &str = "PENDIENTE";
    pub const APPROVED: &str = "APROBADA";
    pub const SIGNED: &str = "FIRMADO";
    pub const REJECTED: &str = "RECHAZADO";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub requested_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub approved_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub signed_at: Option<DateTime<Utc>>,
}

impl Signature {
    fn normalize(&mut self) {
        if self.status.is_empty() {
            self.status = if self.enabled {
                signature_status::PENDING
            } else {
                signature_status::NOT_REQUESTED
            }
            .to_string();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.enabled && self.status == signature_status::PENDING
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
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
    pub url: Option<String>,
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
    pub uploaded_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub signature: Signature,
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

impl Entity for Document {
    const TRACKS_TIMESTAMPS: bool = true;
    const NESTED_MERGE_FIELDS: &'static [&'static str] = &["signature"];

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.signature.normalize();
    }
}

impl Collection for Document {
    const COLLECTION: &'static str = "documents";
}

impl<B: StorageBackend> RecordStore<Document, B> {
    pub fn find_by_contact_id(&self, contact_id: &str) -> Result<Vec<Document>> {
        self.find_by(|d| d.contact_id.as_deref() == Some(contact_id))
    }

    pub fn find_by_property_id(&self, property_id: &str) -> Result<Vec<Document>> {
        self.find_by(|d| d.property_id.as_deref() == Some(property_id))
    }

    pub fn find_pending_signatures(&self) -> Result<Vec<Document>> {
        self.find_by(|d| d.signature.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::store::mem_backend::MemBackend;
    use crate::store::StoreOptions;
    use serde_json::json;

    fn db() -> Database<MemBackend> {
        Database::new(MemBackend::new(), StoreOptions::default())
    }

    #[test]
    fn new_documents_get_signature_defaults() {
        let db = db();
        let doc = db.documents().create(json!({"name": "Contrato.pdf"})).unwrap();
        assert!(!doc.signature.enabled);
        assert_eq!(doc.signature.status, signature_status::NOT_REQUESTED);
    }

    #[test]
    fn requesting_a_signature_marks_it_pending() {
        let db = db();
        let docs = db.documents();
        let doc = docs
            .create(json!({"name": "Reserva.pdf", "signature": {"enabled": true}}))
            .unwrap();
        assert_eq!(doc.signature.status, signature_status::PENDING);
        assert_eq!(docs.find_pending_signatures().unwrap(), vec![doc]);
    }

    #[test]
    fn status_update_keeps_the_rest_of_the_signature() {
        let db = db();
        let docs = db.documents();
        let doc = docs
            .create(json!({
                "name": "Arras.pdf",
                "contactId": "c1",
                "signature": {
                    "enabled": true,
                    "status": "PENDIENTE",
                    "provider": "signaturit",
                    "requestId": "req-42",
                    "requestedBy": "u1",
                    "requestedAt": "2024-05-01T09:00:00.000Z"
                }
            }))
            .unwrap();

        let signed = docs
            .update(&doc.id, json!({"signature": {"status": "FIRMADO"}}))
            .unwrap()
            .unwrap();

        assert_eq!(signed.signature.status, signature_status::SIGNED);
        assert!(signed.signature.enabled);
        assert_eq!(signed.signature.provider.as_deref(), Some("signaturit"));
        assert_eq!(signed.signature.request_id.as_deref(), Some("req-42"));
        assert_eq!(signed.signature.requested_by.as_deref(), Some("u1"));
        assert_eq!(signed.signature.requested_at, doc.signature.requested_at);
        assert_eq!(signed.name, "Arras.pdf");
        assert_eq!(signed.contact_id.as_deref(), Some("c1"));
        assert!(docs.find_pending_signatures().unwrap().is_empty());
    }

    #[test]
    fn lookups_by_contact_and_property() {
        let db = db();
        let docs = db.documents();
        docs.create_many(vec![
            json!({"name": "a", "contactId": "c1"}),
            json!({"name": "b", "contactId": "c2", "propertyId": "p1"}),
            json!({"name": "c", "propertyId": "p1"}),
        ])
        .unwrap();

        assert_eq!(docs.find_by_contact_id("c1").unwrap().len(), 1);
        assert_eq!(docs.find_by_property_id("p1").unwrap().len(), 2);
        assert!(docs.find_by_contact_id("c3").unwrap().is_empty());
    }
}
