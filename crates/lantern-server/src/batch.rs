//! Batch submission across resource types.
//!
//! `POST /` accepts a bundle of entries and applies each contained record to
//! the collection named by its `resourceType`. Registered once, outside the
//! per-resource loop, but built with the same middleware-chain conventions.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use lantern_api::ApiError;
use lantern_core::generate_id;
use lantern_storage::{DocumentStore, collection_name};

#[derive(Clone)]
pub struct BatchController {
    store: Arc<dyn DocumentStore>,
    base_url: Arc<str>,
}

impl BatchController {
    pub fn new(store: Arc<dyn DocumentStore>, base_url: &str) -> Self {
        Self {
            store,
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    pub async fn post(
        State(bc): State<Self>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, ApiError> {
        let Json(bundle) =
            body.map_err(|e| ApiError::bad_request(format!("malformed body: {e}")))?;
        let entries = bundle
            .get("entry")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ApiError::bad_request("batch bundle carries no entry array"))?;

        let mut responses = Vec::with_capacity(entries.len());
        for entry in entries {
            // Entries carry the record under `content`; accept `resource`
            // from clients speaking the newer bundle dialect.
            let record = entry.get("content").or_else(|| entry.get("resource"));
            let Some(record) = record.and_then(|v| v.as_object()) else {
                responses.push(json!({"status": "400 Bad Request"}));
                continue;
            };
            let Some(resource_type) = record.get("resourceType").and_then(|v| v.as_str()) else {
                responses.push(json!({"status": "400 Bad Request"}));
                continue;
            };

            let mut document = record.clone();
            let id = generate_id();
            document.insert("id".to_string(), json!(id));
            bc.store
                .insert(&collection_name(resource_type), &Value::Object(document))
                .await?;

            responses.push(json!({
                "status": "201 Created",
                "location": format!("{}/{}/{}", bc.base_url, resource_type, id),
            }));
        }

        let body = json!({
            "type": "transaction-response",
            "entry": responses,
        });
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_db_memory::MemoryStore;
    use lantern_storage::Filter;

    fn controller(store: Arc<MemoryStore>) -> BatchController {
        BatchController::new(store, "http://localhost:3001")
    }

    #[tokio::test]
    async fn test_batch_inserts_into_per_type_collections() {
        let store = Arc::new(MemoryStore::new());
        let body = json!({
            "entry": [
                {"content": {"resourceType": "Goal", "description": "walk"}},
                {"content": {"resourceType": "Encounter", "status": "planned"}},
            ]
        });

        let resp = BatchController::post(State(controller(store.clone())), Ok(Json(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.count_in("goals"), 1);
        assert_eq!(store.count_in("encounters"), 1);
    }

    #[tokio::test]
    async fn test_batch_assigns_fresh_ids() {
        let store = Arc::new(MemoryStore::new());
        let body = json!({
            "entry": [{"content": {"resourceType": "Goal", "id": "client-chosen"}}]
        });

        BatchController::post(State(controller(store.clone())), Ok(Json(body)))
            .await
            .unwrap();

        let missing = store
            .find_one("goals", &Filter::by_id("client-chosen"))
            .await
            .unwrap();
        assert!(missing.is_none());

        let scan = store.find("goals", &Filter::empty(), 10).await.unwrap();
        assert!(lantern_core::validate_id(scan[0]["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_entries_without_resource_type_get_per_entry_errors() {
        let store = Arc::new(MemoryStore::new());
        let body = json!({
            "entry": [
                {"content": {"description": "no type"}},
                {"content": {"resourceType": "Goal"}},
            ]
        });

        let resp = BatchController::post(State(controller(store.clone())), Ok(Json(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.count_in("goals"), 1);
    }

    #[tokio::test]
    async fn test_missing_entry_array_is_bad_request() {
        let store = Arc::new(MemoryStore::new());
        let result =
            BatchController::post(State(controller(store)), Ok(Json(json!({"type": "batch"}))))
                .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
