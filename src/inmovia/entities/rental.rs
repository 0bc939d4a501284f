//! Rental management: contracts over a property and the monthly payments against them.

use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalContract {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub property_id: String,
    /// The tenant.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_rent: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
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

impl RentalContract {
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.status == "activo"
            && self.start_date.map_or(true, |start| start <= day)
            && self.end_date.map_or(true, |end| day <= end)
    }
}

impl Entity for RentalContract {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        if self.currency.is_empty() {
            self.currency = DEFAULT_CURRENCY.to_string();
        }
        if self.status.is_empty() {
            self.status = "activo".to_string();
        }
    }
}

impl Collection for RentalContract {
    const COLLECTION: &'static str = "rental_contracts";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPayment {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub contract_id: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    /// Billing month, `YYYY-MM`.
    #[serde(default, deserialize_with = "lenient::string")]
    pub period: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
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

impl Entity for RentalPayment {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        if self.status.is_empty() {
            self.status = if self.paid_at.is_some() {
                "pagado"
            } else {
                "pendiente"
            }
            .to_string();
        }
    }
}

impl Collection for RentalPayment {
    const COLLECTION: &'static str = "rental_payments";
}

impl<B: StorageBackend> RecordStore<RentalContract, B> {
    pub fn find_by_property_id(&self, property_id: &str) -> Result<Vec<RentalContract>> {
        self.find_by(|c| c.property_id == property_id)
    }

    pub fn find_by_contact_id(&self, contact_id: &str) -> Result<Vec<RentalContract>> {
        self.find_by(|c| c.contact_id.as_deref() == Some(contact_id))
    }
}

impl<B: StorageBackend> RecordStore<RentalPayment, B> {
    /// Payments of one contract, ordered by billing period.
    pub fn find_by_contract(&self, contract_id: &str) -> Result<Vec<RentalPayment>> {
        let mut payments = self.find_by(|p| p.contract_id == contract_id)?;
        payments.sort_by(|a, b| a.period.cmp(&b.period));
        Ok(payments)
    }
}
