use crate::error::Result;
use crate::model::{lenient, Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::record_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reusable office document or message template with `{{placeholders}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeTemplate {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string", rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub variables: Vec<String>,
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

impl OfficeTemplate {
    /// Substitute `{{name}}` placeholders. Unknown placeholders are left as written.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        values.iter().fold(self.content.clone(), |text, (name, value)| {
            text.replace(&format!("{{{{{}}}}}", name), value)
        })
    }
}

fn placeholders(content: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        let name = after[..end].trim();
        if !name.is_empty() && !found.iter().any(|f| f == name) {
            found.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    found
}

impl Entity for OfficeTemplate {
    const TRACKS_TIMESTAMPS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        if self.variables.is_empty() {
            self.variables = placeholders(&self.content);
        }
    }
}

impl Collection for OfficeTemplate {
    const COLLECTION: &'static str = "office_templates";
}

impl<B: StorageBackend> RecordStore<OfficeTemplate, B> {
    pub fn find_by_kind(&self, kind: &str) -> Result<Vec<OfficeTemplate>> {
        self.find_by(|t| t.kind == kind)
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
    fn variables_are_collected_from_content() {
        assert_eq!(
            placeholders("Hola {{nombre}}, tu visita a {{ direccion }} es el {{fecha}}. {{nombre}}"),
            vec!["nombre", "direccion", "fecha"]
        );
        assert!(placeholders("sin variables {{").is_empty());
    }

    #[test]
    fn templates_render_and_filter_by_kind() {
        let db = Database::new(MemBackend::new(), StoreOptions::default());
        let templates = db.office_templates();
        let welcome = templates
            .create(json!({"name": "Bienvenida", "type": "email", "content": "Hola {{nombre}}"}))
            .unwrap();
        templates
            .create(json!({"name": "Arras", "type": "contrato", "content": "..."}))
            .unwrap();

        assert_eq!(welcome.variables, vec!["nombre"]);
        assert_eq!(welcome.render(&[("nombre", "Ana")]), "Hola Ana");
        assert_eq!(templates.find_by_kind("email").unwrap(), vec![welcome]);
    }
}
