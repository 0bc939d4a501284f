use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nombre: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub apellido: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub telefono: Option<String>,
    /// Buyer, seller, tenant, landlord...
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
    pub agent_user_id: Option<String>,
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

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

impl Entity for Contact {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection for Contact {
    const COLLECTION: &'static str = "contacts";
}

impl<B: StorageBackend> RecordStore<Contact, B> {
    /// Case-insensitive lookup by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Contact>> {
        self.find_first(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }
}
