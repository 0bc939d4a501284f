//! # Records and Entities
//!
//! On disk every collection is a JSON array of objects. In memory the engine
//! works on [`Record`]s (a `serde_json::Map`), and the typed layer converts
//! them into [`Entity`] structs.
//!
//! An entity describes how the generic engine treats it:
//! - whether it tracks `createdAt` / `updatedAt`
//! - which nested sub-records are merged field by field on update
//! - how defaults are filled before a record is written
//!
//! Defaults are applied on write only. Reads deserialize whatever is stored,
//! with serde `default`s covering fields that older records lack.
//!
//! Only `id` is structurally required. Typed fields go through the
//! [`lenient`] deserializers, so a `null`, a zone-less date or a price stored
//! as text degrades that one field instead of failing the whole collection.
//! The stored value itself is never rewritten by a read.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A single stored record: a JSON object with a string `id`.
pub type Record = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Whether the engine stamps `createdAt` on create and `updatedAt` on every write.
    const TRACKS_TIMESTAMPS: bool = false;

    /// Object-valued fields whose members are merged individually on update.
    const NESTED_MERGE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    /// Fill derived defaults before the record is persisted.
    fn normalize(&mut self) {}
}

/// An entity bound to a well-known collection name.
pub trait Collection: Entity {
    const COLLECTION: &'static str;
}

impl Entity for Record {
    fn id(&self) -> &str {
        self.get(ID_FIELD).and_then(Value::as_str).unwrap_or("")
    }
}

/// Timestamps are stored the way browsers print them: RFC 3339, millisecond precision, `Z`.
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn record_id(record: &Record) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// `deserialize_with` helpers for entity fields written by loosely typed clients.
///
/// Each helper accepts any JSON value and falls back to the field's empty
/// value when the stored one does not fit. Use them with `#[serde(default)]`.
pub mod lenient {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Zone-less forms produced by `<input type="datetime-local">` and older exports.
    const NAIVE_DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn float(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// RFC 3339 first; a zone-less date-time or a bare date is read as UTC.
    pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Some(at.with_timezone(&Utc));
        }
        NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|day| day.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }

    /// A calendar date, also accepted as the date part of a timestamp.
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_datetime(text).map(|at| at.date_naive()))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(Value::deserialize(d)?))
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(text).collect(),
            _ => Vec::new(),
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(float(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(float(&Value::deserialize(d)?))
    }

    pub fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(opt_flag(d)?.unwrap_or_default())
    }

    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => parse_datetime(&s),
            _ => None,
        })
    }

    pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => parse_date(&s),
            _ => None,
        })
    }

    /// A nested sub-record; anything that does not decode reads as the default.
    pub fn nested<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => T::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timestamp_uses_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(timestamp(at), json!("2024-03-05T10:30:00.000Z"));
    }

    #[test]
    fn raw_record_id_falls_back_to_empty() {
        let mut record = Record::new();
        assert_eq!(Entity::id(&record), "");
        record.insert("id".into(), json!("abc"));
        assert_eq!(Entity::id(&record), "abc");
        assert_eq!(record_id(&record), Some("abc"));
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Loose {
        #[serde(default, deserialize_with = "lenient::string")]
        name: String,
        #[serde(default, deserialize_with = "lenient::opt_number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        date: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient::flag")]
        active: bool,
        #[serde(default, deserialize_with = "lenient::strings")]
        tags: Vec<String>,
    }

    fn loose(value: Value) -> Loose {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn lenient_fields_fall_back_instead_of_failing() {
        let parsed = loose(json!({
            "name": null,
            "price": {"amount": 1},
            "date": "next tuesday",
            "active": "maybe",
            "tags": "vip"
        }));
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.price, None);
        assert_eq!(parsed.date, None);
        assert!(!parsed.active);
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn lenient_fields_coerce_what_they_can() {
        let parsed = loose(json!({
            "name": 42,
            "price": "250000",
            "date": "2030-06-10T10:00",
            "active": "true",
            "tags": ["a", 1, null]
        }));
        assert_eq!(parsed.name, "42");
        assert_eq!(parsed.price, Some(250000.0));
        assert_eq!(
            parsed.date,
            Some(Utc.with_ymd_and_hms(2030, 6, 10, 10, 0, 0).unwrap())
        );
        assert!(parsed.active);
        assert_eq!(parsed.tags, vec!["a", "1"]);
    }

    #[test]
    fn lenient_dates_accept_offsets_and_bare_days() {
        assert_eq!(
            lenient::parse_datetime("2030-06-10T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2030, 6, 10, 8, 0, 0).unwrap())
        );
        assert_eq!(
            lenient::parse_datetime("2030-06-10"),
            Some(Utc.with_ymd_and_hms(2030, 6, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            lenient::parse_date("2024-01-31T23:00:00.000Z"),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
        );
    }

    #[test]
    fn missing_lenient_fields_take_defaults() {
        let parsed = loose(json!({}));
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.price, None);
    }
}
