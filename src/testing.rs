// In-memory stand-ins for the two I/O seams.
//
// MockHttp    (HttpSource)  - URL -> canned response, records every request
// MemoryStore (ObjectStore) - bucket/key map with write counting, injectable
//                             failures and explicit last-modified timestamps
//
// `clients` wires shared handles into a `Clients` so tests can inspect them after a run.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;

use crate::error::{FetchError, StoreError};
use crate::feed::Clients;
use crate::http::HttpSource;
use crate::store::{ObjectStore, ObjectSummary};

pub fn clients(http: &Arc<MockHttp>, store: &Arc<MemoryStore>) -> Clients {
    Clients {
        http: http.clone(),
        store: store.clone(),
    }
}

#[derive(Clone)]
enum Canned {
    Body(Vec<u8>),
    Status(StatusCode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// Returns `404` for unregistered URLs.
pub struct MockHttp {
    responses: HashMap<String, Canned>,
    requests: Mutex<Vec<Request>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_json(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Body(body.as_bytes().to_vec()));
        self
    }

    pub fn on_bytes(mut self, url: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Body(body.to_vec()));
        self
    }

    pub fn on_status(mut self, url: &str, status: StatusCode) -> Self {
        self.responses.insert(url.to_string(), Canned::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl HttpSource for MockHttp {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(Request {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        match self.responses.get(url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    objects: HashMap<(String, String), StoredObject>,
    puts: Vec<String>,
    probes: Vec<String>,
    clock: i64,
}

/// Bucket-aware object store. Each write advances a fake clock by one second.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failing_probes: HashSet<String>,
    failing_puts: HashSet<String>,
    fail_list: bool,
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.insert(bucket, key, body, None);
        self
    }

    pub fn with_object_at(
        self,
        bucket: &str,
        key: &str,
        body: &[u8],
        last_modified: DateTime<Utc>,
    ) -> Self {
        self.insert(bucket, key, body, Some(last_modified));
        self
    }

    pub fn failing_probe(mut self, key: &str) -> Self {
        self.failing_probes.insert(key.to_string());
        self
    }

    pub fn failing_put(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.to_string());
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn puts(&self) -> Vec<String> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.state.lock().unwrap().probes.clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn insert(&self, bucket: &str, key: &str, body: &[u8], at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let last_modified = at.unwrap_or_else(|| epoch() + Duration::seconds(state.clock));
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: "application/octet-stream".to_string(),
                last_modified,
            },
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.probes.push(key.to_string());
        if self.failing_probes.contains(key) {
            return Err(StoreError::Probe {
                key: key.to_string(),
                source: "access denied".into(),
            });
        }
        Ok(state
            .objects
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if self.failing_puts.contains(key) {
            return Err(StoreError::Put {
                key: key.to_string(),
                source: "service unavailable".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let last_modified = epoch() + Duration::seconds(state.clock);
        state.puts.push(key.to_string());
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                last_modified,
            },
        );
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        if self.fail_list {
            return Err(StoreError::List {
                prefix: prefix.to_string(),
                source: "no credentials".into(),
            });
        }
        let state = self.state.lock().unwrap();
        let mut objects: Vec<ObjectSummary> = state
            .objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), o)| ObjectSummary {
                key: k.clone(),
                last_modified: o.last_modified,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::Get {
                key: key.to_string(),
                source: "no such key".into(),
            })
    }
}
