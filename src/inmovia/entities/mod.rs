//! # Office Entities
//!
//! Typed views over the office's collections. Each entity is a serde struct
//! bound to its collection name, with lookup helpers implemented directly on
//! `RecordStore<Entity, _>`. Unknown fields ride along in `extra` so records
//! written by newer code keep their data when older code updates them.
//!
//! | Entity | Collection |
//! |--------|------------|
//! | [`Contact`] | `contacts` |
//! | [`Property`] | `properties` |
//! | [`Document`] | `documents` |
//! | [`User`] | `users` |
//! | [`Notification`] | `notifications` |
//! | [`AgendaEvent`] | `agenda` |
//! | [`Conversation`] | `conversations` |
//! | [`ChatMessage`] | `messages` |
//! | [`RentalContract`] | `rental_contracts` |
//! | [`RentalPayment`] | `rental_payments` |
//! | [`OfficeTemplate`] | `office_templates` |
//! | [`InstagramAccount`] | `instagram_accounts` |

pub mod agenda;
pub mod chat;
pub mod contact;
pub mod document;
pub mod instagram;
pub mod notification;
pub mod office_template;
pub mod property;
pub mod rental;
pub mod user;

pub use agenda::AgendaEvent;
pub use chat::{ChatMessage, Conversation};
pub use contact::Contact;
pub use document::{Document, Signature};
pub use instagram::InstagramAccount;
pub use notification::Notification;
pub use office_template::OfficeTemplate;
pub use property::Property;
pub use rental::{RentalContract, RentalPayment};
pub use user::User;

use crate::db::Database;
use crate::error::Result;
use crate::model::{Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use crate::store::DoctorReport;

/// Every well-known collection, in the order `migrate_all` visits them.
pub const COLLECTIONS: [&str; 12] = [
    Contact::COLLECTION,
    Property::COLLECTION,
    Document::COLLECTION,
    User::COLLECTION,
    Notification::COLLECTION,
    AgendaEvent::COLLECTION,
    Conversation::COLLECTION,
    ChatMessage::COLLECTION,
    RentalContract::COLLECTION,
    RentalPayment::COLLECTION,
    OfficeTemplate::COLLECTION,
    InstagramAccount::COLLECTION,
];

impl<B: StorageBackend> Database<B> {
    pub fn contacts(&self) -> RecordStore<Contact, B> {
        self.collection()
    }

    pub fn properties(&self) -> RecordStore<Property, B> {
        self.collection()
    }

    pub fn documents(&self) -> RecordStore<Document, B> {
        self.collection()
    }

    pub fn users(&self) -> RecordStore<User, B> {
        self.collection()
    }

    pub fn notifications(&self) -> RecordStore<Notification, B> {
        self.collection()
    }

    pub fn agenda(&self) -> RecordStore<AgendaEvent, B> {
        self.collection()
    }

    pub fn conversations(&self) -> RecordStore<Conversation, B> {
        self.collection()
    }

    pub fn messages(&self) -> RecordStore<ChatMessage, B> {
        self.collection()
    }

    pub fn rental_contracts(&self) -> RecordStore<RentalContract, B> {
        self.collection()
    }

    pub fn rental_payments(&self) -> RecordStore<RentalPayment, B> {
        self.collection()
    }

    pub fn office_templates(&self) -> RecordStore<OfficeTemplate, B> {
        self.collection()
    }

    pub fn instagram_accounts(&self) -> RecordStore<InstagramAccount, B> {
        self.collection()
    }

    /// A store for `name` whose records cross the boundary as JSON objects.
    /// Well-known collections keep their entity semantics (timestamps,
    /// defaults, nested merge); any other valid name is served untyped.
    pub fn dyn_store(&self, name: &str) -> Result<Box<dyn DynStore>>
    where
        B: 'static,
    {
        let store: Box<dyn DynStore> = match name {
            "contacts" => Box::new(self.contacts()),
            "properties" => Box::new(self.properties()),
            "documents" => Box::new(self.documents()),
            "users" => Box::new(self.users()),
            "notifications" => Box::new(self.notifications()),
            "agenda" => Box::new(self.agenda()),
            "conversations" => Box::new(self.conversations()),
            "messages" => Box::new(self.messages()),
            "rental_contracts" => Box::new(self.rental_contracts()),
            "rental_payments" => Box::new(self.rental_payments()),
            "office_templates" => Box::new(self.office_templates()),
            "instagram_accounts" => Box::new(self.instagram_accounts()),
            other => Box::new(self.raw(other)?),
        };
        Ok(store)
    }

    /// Run `migrate` over every well-known collection that exists in storage.
    /// Returns the number of rewritten records per collection.
    pub fn migrate_all(&self) -> Result<Vec<(String, usize)>>
    where
        B: 'static,
    {
        let present = self.collections()?;
        let mut results = Vec::new();
        for name in COLLECTIONS {
            if !present.iter().any(|p| p == name) {
                continue;
            }
            let changed = self.dyn_store(name)?.migrate()?;
            results.push((name.to_string(), changed));
        }
        Ok(results)
    }
}

/// Object-safe view of a [`RecordStore`], used where the collection is only
/// known at runtime (the CLI).
pub trait DynStore {
    fn name(&self) -> &str;
    fn list_records(&self) -> Result<Vec<Record>>;
    fn get_record(&self, id: &str) -> Result<Option<Record>>;
    fn create_record(&self, draft: Record) -> Result<Record>;
    fn update_record(&self, id: &str, patch: Record) -> Result<Option<Record>>;
    fn delete_record(&self, id: &str) -> Result<bool>;
    fn migrate(&self) -> Result<usize>;
    fn doctor(&self) -> Result<DoctorReport>;
}

impl<E: Entity, B: StorageBackend> DynStore for RecordStore<E, B> {
    fn name(&self) -> &str {
        RecordStore::name(self)
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        self.find_all_stored()
    }

    fn get_record(&self, id: &str) -> Result<Option<Record>> {
        self.find_stored_by_id(id)
    }

    fn create_record(&self, draft: Record) -> Result<Record> {
        self.create_stored(draft)
    }

    fn update_record(&self, id: &str, patch: Record) -> Result<Option<Record>> {
        self.update_stored(id, patch)
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        self.delete(id)
    }

    fn migrate(&self) -> Result<usize> {
        RecordStore::migrate(self)
    }

    fn doctor(&self) -> Result<DoctorReport> {
        RecordStore::doctor(self)
    }
}
