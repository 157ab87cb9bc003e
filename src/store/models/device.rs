use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A device document: a back-reference to its owning project plus whatever
/// fields the caller supplied at creation, flattened onto the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub project: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Device {
    pub fn new(project: Uuid, mut attributes: Map<String, Value>) -> Self {
        // Caller payload must not shadow the document's own fields
        attributes.remove("id");
        attributes.remove("project");
        attributes.remove("created_at");

        Self {
            id: Uuid::new_v4(),
            project,
            created_at: Utc::now(),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caller_fields_flatten_onto_the_document() {
        let mut attrs = Map::new();
        attrs.insert("serial".to_string(), json!("A-100"));
        attrs.insert("firmware".to_string(), json!({"version": 3}));

        let device = Device::new(Uuid::new_v4(), attrs);
        let value = serde_json::to_value(&device).unwrap();

        assert_eq!(value["serial"], json!("A-100"));
        assert_eq!(value["firmware"]["version"], json!(3));
        assert_eq!(value["project"], json!(device.project));
    }

    #[test]
    fn caller_payload_cannot_shadow_document_fields() {
        let mut attrs = Map::new();
        attrs.insert("id".to_string(), json!("spoofed"));
        attrs.insert("project".to_string(), json!("spoofed"));

        let project = Uuid::new_v4();
        let device = Device::new(project, attrs);

        assert!(device.attributes.is_empty());
        assert_eq!(device.project, project);
    }
}
