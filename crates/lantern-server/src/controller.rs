//! The generic resource controller.
//!
//! One implementation of index/show/create/update/delete and the
//! conditional operations, instantiated per resource type from the registry
//! table. The controller owns no request-spanning state: everything lives in
//! the injected document store or in the per-request context channel.

use std::sync::Arc;

use axum::Extension;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, RawQuery, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};

use lantern_api::ApiError;
use lantern_core::{Record, generate_id, validate_id};
use lantern_storage::{DocumentStore, Filter, collection_name};

use crate::bundle;
use crate::context::{Action, ContextPayload, RequestContext};
use crate::registry::ResourceSpec;
use crate::search;

/// Generic CRUD and conditional-search engine for one resource type.
///
/// Cheap to clone; used as the axum state of that resource's route group.
#[derive(Clone)]
pub struct ResourceController {
    spec: &'static ResourceSpec,
    collection: Arc<str>,
    store: Arc<dyn DocumentStore>,
    base_url: Arc<str>,
    page_cap: usize,
}

impl ResourceController {
    pub fn new(
        spec: &'static ResourceSpec,
        store: Arc<dyn DocumentStore>,
        base_url: &str,
        page_cap: usize,
    ) -> Self {
        Self {
            spec,
            collection: collection_name(spec.name).into(),
            store,
            base_url: base_url.trim_end_matches('/').into(),
            page_cap,
        }
    }

    pub fn resource_name(&self) -> &'static str {
        self.spec.name
    }

    fn not_found(&self, id: &str) -> ApiError {
        ApiError::not_found(format!("{}/{id} not found", self.spec.name))
    }

    /// `GET /{R}` — search. An unfiltered scan is capped at the page cap;
    /// recognized reference parameters switch to an equality query.
    pub async fn index(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        RawQuery(query): RawQuery,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Search);

        let filter = search::filter_from_query(rc.spec, query.as_deref());
        let records = rc.store.find(&rc.collection, &filter, rc.page_cap).await?;
        ctx.set_payload(ContextPayload::Matches(records.clone()));

        let bundle = bundle::assemble(rc.spec.name, records, rc.spec.wrap_entries);
        json_response(StatusCode::OK, &bundle)
    }

    /// `GET /{R}/{id}` — read. A malformed id short-circuits before any
    /// store access.
    pub async fn show(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        // Action is recorded before the load attempt so audit middleware can
        // see what was attempted even when the load fails.
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Read);

        validate_id(&id)?;
        let record = rc
            .store
            .find_one(&rc.collection, &Filter::by_id(&id))
            .await?
            .ok_or_else(|| rc.not_found(&id))?;
        ctx.set_payload(ContextPayload::Record(record.clone()));

        json_response(StatusCode::OK, &record)
    }

    /// `POST /{R}` — create. Assigns a fresh id (overwriting any
    /// client-supplied one) and answers 201 with the record's canonical URL
    /// in `Location`.
    pub async fn create(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Create);

        let mut record = decode_body(body)?;
        record.set_id(generate_id());
        let document = record.to_value().map_err(|e| ApiError::internal(e.to_string()))?;

        rc.store.insert(&rc.collection, &document).await?;
        ctx.set_payload(ContextPayload::Record(document));

        let location = format!("{}/{}/{}", rc.base_url, rc.spec.name, record.id);
        Response::builder()
            .status(StatusCode::CREATED)
            .header(header::LOCATION, location)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            )
            .header(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            )
            .body(axum::body::Body::empty())
            .map_err(|e| ApiError::internal(e.to_string()))
    }

    /// `PUT /{R}/{id}` — full replace of one record. The body's id is
    /// ignored; the route id wins.
    pub async fn update(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        Path(id): Path<String>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Update);

        validate_id(&id)?;
        let mut record = decode_body(body)?;
        record.set_id(&id);
        let document = record.to_value().map_err(|e| ApiError::internal(e.to_string()))?;

        let replaced = rc
            .store
            .update(&rc.collection, &Filter::by_id(&id), &document)
            .await?;
        if replaced == 0 {
            return Err(rc.not_found(&id));
        }
        ctx.set_payload(ContextPayload::Record(document));

        empty_response(StatusCode::NO_CONTENT)
    }

    /// `DELETE /{R}/{id}`. The context records the bare id — the record no
    /// longer exists once this succeeds.
    pub async fn delete(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Delete);

        validate_id(&id)?;
        let removed = rc.store.remove(&rc.collection, &Filter::by_id(&id)).await?;
        if removed == 0 {
            return Err(rc.not_found(&id));
        }
        ctx.set_payload(ContextPayload::DeletedId(id));

        empty_response(StatusCode::NO_CONTENT)
    }

    /// `PUT /{R}` — conditional update: replace every record matching the
    /// query filter, preserving each record's own id. Zero matches is a
    /// no-op success, never an implicit create.
    pub async fn conditional_update(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        RawQuery(query): RawQuery,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Update);

        let filter = search::filter_from_query(rc.spec, query.as_deref());
        if filter.is_empty() {
            return Err(ApiError::bad_request(
                "conditional update requires a recognized search parameter",
            ));
        }
        let record = decode_body(body)?;

        let matches = rc.store.find(&rc.collection, &filter, rc.page_cap).await?;
        let mut replaced = 0;
        for existing in &matches {
            let Some(id) = existing.get("id").and_then(|v| v.as_str()) else {
                continue;
            };
            let mut replacement = record.clone();
            replacement.set_id(id);
            let document = replacement
                .to_value()
                .map_err(|e| ApiError::internal(e.to_string()))?;
            replaced += rc
                .store
                .update(&rc.collection, &Filter::by_id(id), &document)
                .await?;
        }
        ctx.set_payload(ContextPayload::Matches(matches));

        json_response(StatusCode::OK, &json!({ "replaced": replaced }))
    }

    /// `DELETE /{R}` — conditional delete: remove every record matching the
    /// query filter. Succeeds whether or not anything matched.
    pub async fn conditional_delete(
        State(rc): State<Self>,
        Extension(ctx): Extension<Arc<RequestContext>>,
        RawQuery(query): RawQuery,
    ) -> Result<Response, ApiError> {
        ctx.set_resource(rc.spec.name);
        ctx.set_action(Action::Delete);

        let filter = search::filter_from_query(rc.spec, query.as_deref());
        if filter.is_empty() {
            return Err(ApiError::bad_request(
                "conditional delete requires a recognized search parameter",
            ));
        }
        let removed = rc.store.remove(&rc.collection, &filter).await?;
        tracing::debug!(resource = rc.spec.name, removed, "conditional delete");

        empty_response(StatusCode::NO_CONTENT)
    }
}

fn decode_body(body: Result<Json<Value>, JsonRejection>) -> Result<Record, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::bad_request(format!("malformed body: {e}")))?;
    Record::from_value(value).map_err(|e| ApiError::bad_request(format!("malformed body: {e}")))
}

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(|e| ApiError::internal(e.to_string()))?;
    Response::builder()
        .status(status)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        )
        .header(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        )
        .body(axum::body::Body::from(body))
        .map_err(|e| ApiError::internal(e.to_string()))
}

fn empty_response(status: StatusCode) -> Result<Response, ApiError> {
    Response::builder()
        .status(status)
        .body(axum::body::Body::empty())
        .map_err(|e| ApiError::internal(e.to_string()))
}
