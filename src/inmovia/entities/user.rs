use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn default_active() -> bool {
    true
}

fn active_flag<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(lenient::opt_flag(d)?.unwrap_or_else(default_active))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// `admin` or `agente`.
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
    #[serde(default = "default_active", deserialize_with = "active_flag")]
    pub active: bool,
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

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            name: String::new(),
            role: String::new(),
            active: default_active(),
            created_at: None,
            updated_at: None,
            extra: Record::new(),
        }
    }
}

impl Entity for User {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

impl Collection for User {
    const COLLECTION: &'static str = "users";
}

impl<B: StorageBackend> RecordStore<User, B> {
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        self.find_first(|u| u.email == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::store::mem_backend::MemBackend;
    use crate::store::StoreOptions;
    use serde_json::json;

    #[test]
    fn emails_are_stored_lowercase() {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        let users = db.users();
        let user = users
            .create(json!({"email": " Marta@Inmovia.es ", "name": "Marta", "role": "agente"}))
            .unwrap();
        assert_eq!(user.email, "marta@inmovia.es");
        assert!(user.active);
        assert_eq!(users.find_by_email("MARTA@inmovia.es").unwrap(), Some(user));
    }
}
