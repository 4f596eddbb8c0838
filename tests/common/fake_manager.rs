//! In-memory manager used by the integration tests.
//!
//! Implements just enough of the secrets and archive endpoints to exercise
//! the clients end to end: conflicts, not-found, sorting, filtering and
//! timestamps that advance on every write.

use async_trait::async_trait;
use cloudify_rest_client::error::{ClientError, ClientResult};
use cloudify_rest_client::transport::{ApiRequest, RequestBody, Transport};
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Archive upload as received by the fake manager
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub collection: String,
    pub id: String,
    pub params: Vec<(String, String)>,
    pub bytes: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct FakeManager {
    secrets: Mutex<BTreeMap<String, Map<String, Value>>>,
    archives: Mutex<BTreeMap<(String, String), Value>>,
    uploads: Mutex<Vec<ReceivedUpload>>,
    clock: AtomicU64,
}

impl FakeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().clone()
    }

    fn now(&self) -> String {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        format!("2017-06-01T10:00:00.{:06}Z", tick)
    }

    fn not_found(kind: &str, id: &str) -> ClientError {
        ClientError::from_status(
            404,
            format!("Requested `{}` with ID `{}` was not found", kind, id),
            Some("not_found_error".to_string()),
        )
    }

    fn json_body(request: &ApiRequest) -> ClientResult<&Map<String, Value>> {
        match &request.body {
            RequestBody::Json(Value::Object(map)) => Ok(map),
            _ => Err(ClientError::from_status(400, "Expected a JSON object body", None)),
        }
    }

    fn secrets_endpoint(&self, request: &ApiRequest, rest: &[String]) -> ClientResult<Value> {
        let mut secrets = self.secrets.lock();
        match (request.method.as_str(), rest) {
            ("GET", []) => {
                let mut items: Vec<Map<String, Value>> = secrets
                    .values()
                    .filter(|secret| {
                        request
                            .params
                            .iter()
                            .filter(|(k, _)| !k.starts_with('_'))
                            .all(|(k, v)| secret.get(k).and_then(Value::as_str) == Some(v.as_str()))
                    })
                    .cloned()
                    .collect();

                if let Some(sort) = request.param("_sort") {
                    let (field, descending) = match sort.strip_prefix('-') {
                        Some(field) => (field, true),
                        None => (sort, false),
                    };
                    items.sort_by(|a, b| {
                        let a = a.get(field).and_then(Value::as_str).unwrap_or_default();
                        let b = b.get(field).and_then(Value::as_str).unwrap_or_default();
                        a.cmp(b)
                    });
                    if descending {
                        items.reverse();
                    }
                }

                let total = items.len();
                Ok(json!({
                    "items": items,
                    "metadata": {"pagination": {"total": total, "size": 1000, "offset": 0}}
                }))
            }
            ("GET", [key]) => secrets
                .get(key)
                .map(|s| Value::Object(s.clone()))
                .ok_or_else(|| Self::not_found("Secret", key)),
            ("PUT", [key]) => {
                let body = Self::json_body(request)?;
                let update_if_exists = body
                    .get("update_if_exists")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let now = self.now();

                match secrets.get_mut(key) {
                    Some(existing) if update_if_exists => {
                        existing.insert("value".into(), body["value"].clone());
                        existing.insert("updated_at".into(), json!(now));
                        Ok(Value::Object(existing.clone()))
                    }
                    Some(_) => Err(ClientError::from_status(
                        409,
                        format!("Secret `{}` already exists", key),
                        Some("conflict_error".to_string()),
                    )),
                    None => {
                        let secret = json!({
                            "key": key,
                            "value": body["value"],
                            "availability": body.get("availability").cloned().unwrap_or(json!("tenant")),
                            "created_at": now,
                            "updated_at": now,
                            "tenant_name": "default_tenant",
                            "created_by": "admin"
                        });
                        let Value::Object(map) = secret else {
                            unreachable!()
                        };
                        secrets.insert(key.clone(), map.clone());
                        Ok(Value::Object(map))
                    }
                }
            }
            ("PATCH", [key]) => {
                let body = Self::json_body(request)?;
                let now = self.now();
                let secret = secrets
                    .get_mut(key)
                    .ok_or_else(|| Self::not_found("Secret", key))?;
                secret.insert("value".into(), body["value"].clone());
                secret.insert("updated_at".into(), json!(now));
                Ok(Value::Object(secret.clone()))
            }
            ("PATCH", [key, action]) if action == "set-availability" => {
                let body = Self::json_body(request)?;
                let availability = body["availability"].clone();
                if !matches!(availability.as_str(), Some("private" | "tenant" | "global")) {
                    return Err(ClientError::from_status(400, "Invalid availability", None));
                }
                let now = self.now();
                let secret = secrets
                    .get_mut(key)
                    .ok_or_else(|| Self::not_found("Secret", key))?;
                secret.insert("availability".into(), availability);
                secret.insert("updated_at".into(), json!(now));
                Ok(Value::Object(secret.clone()))
            }
            ("DELETE", [key]) => secrets
                .remove(key)
                .map(Value::Object)
                .ok_or_else(|| Self::not_found("Secret", key)),
            _ => Err(ClientError::from_status(405, "Method not allowed", None)),
        }
    }

    async fn archive_endpoint(
        &self,
        request: &ApiRequest,
        collection: &str,
        rest: &[String],
    ) -> ClientResult<Value> {
        match (request.method.as_str(), rest) {
            ("PUT", [id]) => {
                let bytes = match &request.body {
                    RequestBody::File(upload) => Some(upload.clone().read_all().await?),
                    _ => None,
                };
                self.uploads.lock().push(ReceivedUpload {
                    collection: collection.to_string(),
                    id: id.clone(),
                    params: request.params.clone(),
                    bytes,
                });

                let entity = json!({
                    "id": id,
                    "main_file_name": request.param("application_file_name"),
                    "created_at": self.now(),
                    "updated_at": null,
                    "plan": {},
                    "tenant_name": "default_tenant",
                    "created_by": "admin"
                });
                self.archives
                    .lock()
                    .insert((collection.to_string(), id.clone()), entity.clone());
                Ok(entity)
            }
            ("GET", [id]) => self
                .archives
                .lock()
                .get(&(collection.to_string(), id.clone()))
                .cloned()
                .ok_or_else(|| Self::not_found(collection, id)),
            ("DELETE", [id]) => self
                .archives
                .lock()
                .remove(&(collection.to_string(), id.clone()))
                .ok_or_else(|| Self::not_found(collection, id)),
            _ => Err(ClientError::from_status(405, "Method not allowed", None)),
        }
    }
}

#[async_trait]
impl Transport for FakeManager {
    fn endpoint(&self) -> &str {
        "fake://manager/api/v3.1"
    }

    async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let segments: Vec<String> = request
            .path
            .trim_start_matches('/')
            .split('/')
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        match segments.split_first() {
            Some((collection, rest)) if collection == "secrets" => {
                self.secrets_endpoint(&request, rest)
            }
            Some((collection, rest))
                if collection == "blueprints" || collection == "aria-service-templates" =>
            {
                self.archive_endpoint(&request, collection, rest).await
            }
            _ => Err(ClientError::from_status(404, "Unknown endpoint", None)),
        }
    }
}
