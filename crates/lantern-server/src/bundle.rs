//! Response bundle assembly.
//!
//! A bundle is a transient, response-only envelope around zero or more
//! records. It is assembled fresh per response — the envelope id and
//! timestamp are never persisted — and discarded after serialization.

use lantern_core::{Utc, generate_id, now_utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub id: String,
    pub updated: Utc,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    pub entry: Vec<Value>,
}

/// Assembles a bundle around the given records. Pure: no I/O, records pass
/// through unmodified.
///
/// `totalResults` is always the number of records handed in — the assembler
/// does not know whether the store applied its internal page cap, so a capped
/// scan reports the capped count, not the collection size.
///
/// When `wrap_entries` is set (a per-resource configuration choice), each
/// record is wrapped in an entry carrying `title` (`"<ResourceName> <id>"`)
/// and the record's own `id`, with the record itself as `content`.
pub fn assemble(resource_name: &str, records: Vec<Value>, wrap_entries: bool) -> Bundle {
    let entry = if wrap_entries {
        records
            .into_iter()
            .map(|record| {
                let id = record.get("id").and_then(|v| v.as_str()).unwrap_or("");
                json!({
                    "title": format!("{resource_name} {id}"),
                    "id": id,
                    "content": record,
                })
            })
            .collect()
    } else {
        records
    };

    Bundle {
        kind: "Bundle".to_string(),
        title: format!("{resource_name} Index"),
        id: generate_id(),
        updated: now_utc(),
        total_results: entry.len(),
        entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: &str) -> Value {
        json!({"id": id, "description": "walk"})
    }

    #[test]
    fn test_plain_bundle() {
        let bundle = assemble("Encounter", vec![goal("e1"), goal("e2")], false);
        assert_eq!(bundle.kind, "Bundle");
        assert_eq!(bundle.title, "Encounter Index");
        assert_eq!(bundle.total_results, 2);
        assert_eq!(bundle.entry[0]["id"], "e1");
        assert!(bundle.entry[0].get("content").is_none());
    }

    #[test]
    fn test_wrapped_bundle() {
        let bundle = assemble("Goal", vec![goal("g1")], true);
        assert_eq!(bundle.total_results, 1);
        let entry = &bundle.entry[0];
        assert_eq!(entry["title"], "Goal g1");
        assert_eq!(entry["id"], "g1");
        assert_eq!(entry["content"]["id"], "g1");
        // entry.id always equals entry.content.id
        assert_eq!(entry["id"], entry["content"]["id"]);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = assemble("Goal", vec![], true);
        assert_eq!(bundle.total_results, 0);
        assert!(bundle.entry.is_empty());
    }

    #[test]
    fn test_envelope_id_is_fresh_per_response() {
        let a = assemble("Goal", vec![goal("g1")], false);
        let b = assemble("Goal", vec![goal("g1")], false);
        assert_ne!(a.id, b.id);
        assert!(lantern_core::validate_id(&a.id).is_ok());
    }

    #[test]
    fn test_records_pass_through_unmodified() {
        let record = json!({"id": "g1", "nested": {"deep": [1, 2, 3]}});
        let bundle = assemble("Goal", vec![record.clone()], false);
        assert_eq!(bundle.entry[0], record);
    }

    #[test]
    fn test_serialized_field_names() {
        let bundle = assemble("Goal", vec![goal("g1")], false);
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["type"], "Bundle");
        assert_eq!(value["totalResults"], 1);
        assert!(value["updated"].is_string());
    }
}
