//! Generic REST resource store.
//!
//! A [`ResourceStore`] mirrors one backend collection in memory. Clones share the
//! same state, so every consumer handed a clone observes every mutation.
//!
//! Reconciliation rules:
//! - `fetch_all` replaces the collection; a failure empties it.
//! - `create` appends the server's record only after the server accepts it.
//! - `update` keeps the submitted payload unless [`UpdatePolicy::AdoptServer`] is set.
//! - `delete` removes the record only after the server accepts it.
//!
//! Responses can outlive the scope that issued them. [`ResourceStore::detach`]
//! moves the store to a new scope generation and anything still in flight from
//! the old one is dropped as [`Outcome::Stale`]. Overlapping fetches, and
//! overlapping updates of the same id, resolve to the last one issued.

pub mod record;

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::http::{join_segment, HttpError, HttpHelper, RequestOptions};

pub use record::{RecordId, Resource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Hold exactly what was submitted, whatever the server echoes.
    #[default]
    KeepSubmitted,
    /// Hold the server echo when it decodes to a record with the same id.
    AdoptServer,
}

/// Result of one store operation.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Applied(R),
    Failed(HttpError),
    /// The response arrived after its scope or ticket was superseded and was discarded.
    Stale,
}

impl<R> Outcome<R> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<R> {
        match self {
            Outcome::Applied(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<R, HttpError> {
        match self {
            Outcome::Applied(r) => Ok(r),
            Outcome::Failed(e) => Err(e),
            Outcome::Stale => Err(HttpError::transport("response discarded as stale")),
        }
    }
}

/// Point-in-time copy of a store's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    pub records: Vec<T>,
    pub loading: bool,
    pub error: Option<HttpError>,
    pub edit_target: Option<T>,
}

#[derive(Debug)]
struct StoreState<T> {
    records: Vec<T>,
    loading: bool,
    error: Option<HttpError>,
    edit_target: Option<T>,
    scope: u64,
    next_ticket: u64,
    fetch_ticket: u64,
    update_tickets: HashMap<RecordId, u64>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            edit_target: None,
            scope: 0,
            next_ticket: 0,
            fetch_ticket: 0,
            update_tickets: HashMap::new(),
        }
    }
}

impl<T> StoreState<T> {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Fetch,
    Update(RecordId),
}

/// Releases a ticket's bookkeeping if the operation is dropped before its
/// response is reconciled. Only the ticket's own entries are touched.
struct InFlight<T: Resource> {
    state: Arc<RwLock<StoreState<T>>>,
    scope: u64,
    ticket: u64,
    pending: Pending,
    armed: bool,
}

impl<T: Resource> InFlight<T> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T> StoreState<T> {
    fn release(&mut self, scope: u64, ticket: u64, pending: &Pending) {
        if self.scope != scope {
            return;
        }
        match pending {
            Pending::Fetch => {
                if self.fetch_ticket == ticket {
                    self.loading = false;
                }
            }
            Pending::Update(id) => {
                if self.update_tickets.get(id) == Some(&ticket) {
                    self.update_tickets.remove(id);
                }
            }
        }
    }
}

impl<T: Resource> Drop for InFlight<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (scope, ticket, pending) = (self.scope, self.ticket, self.pending.clone());
        tracing::debug!("Releasing abandoned {:?} ticket {}", pending, ticket);

        match self.state.try_write() {
            Ok(mut state) => state.release(scope, ticket, &pending),
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let state = self.state.clone();
                    handle.spawn(async move {
                        state.write().await.release(scope, ticket, &pending);
                    });
                }
                Err(_) => tracing::warn!("No runtime to release abandoned ticket {}", ticket),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceStore<T: Resource> {
    http: HttpHelper,
    endpoint: Arc<Url>,
    policy: UpdatePolicy,
    state: Arc<RwLock<StoreState<T>>>,
}

impl<T: Resource> ResourceStore<T> {
    pub fn new(http: HttpHelper, endpoint: Url) -> Self {
        Self {
            http,
            endpoint: Arc::new(endpoint),
            policy: UpdatePolicy::default(),
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a store and load the collection once.
    pub async fn open(http: HttpHelper, endpoint: Url) -> Self {
        let store = Self::new(http, endpoint);
        if let Outcome::Failed(e) = store.fetch_all().await {
            tracing::warn!("Initial load of {} failed: {}", store.endpoint, e);
        }
        store
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub async fn fetch_all(&self) -> Outcome<usize> {
        let (scope, ticket) = {
            let mut state = self.state.write().await;
            state.loading = true;
            let ticket = state.issue_ticket();
            state.fetch_ticket = ticket;
            (state.scope, ticket)
        };
        let mut guard = self.in_flight(scope, ticket, Pending::Fetch);

        let result = self
            .http
            .get(&self.endpoint, RequestOptions::default())
            .await
            .and_then(decode::<Vec<T>>);

        let mut state = self.state.write().await;
        guard.disarm();
        if state.scope != scope || state.fetch_ticket != ticket {
            tracing::debug!("Discarding superseded fetch of {}", self.endpoint);
            return Outcome::Stale;
        }
        state.loading = false;

        match result {
            Ok(records) => {
                tracing::debug!("Loaded {} records from {}", records.len(), self.endpoint);
                let count = records.len();
                state.records = records;
                state.error = None;
                Outcome::Applied(count)
            }
            Err(e) => {
                tracing::warn!("Fetch of {} failed: {}", self.endpoint, e);
                state.records.clear();
                state.error = Some(e.clone());
                Outcome::Failed(e)
            }
        }
    }

    pub async fn create(&self, record: &T) -> Outcome<T> {
        let body = match encode(record) {
            Ok(body) => body,
            Err(e) => return self.fail(e).await,
        };
        let scope = self.state.read().await.scope;

        let result = self
            .http
            .post(&self.endpoint, RequestOptions::json(body))
            .await
            .and_then(decode::<T>);

        let mut state = self.state.write().await;
        if state.scope != scope {
            tracing::debug!("Discarding create on {} from a detached scope", self.endpoint);
            return Outcome::Stale;
        }

        match result {
            Ok(created) => {
                let id = created.id();
                let existing = id
                    .as_ref()
                    .and_then(|id| state.records.iter().position(|r| r.id().as_ref() == Some(id)));
                match existing {
                    // A fetch that finished meanwhile may already hold it.
                    Some(index) => state.records[index] = created.clone(),
                    None => state.records.push(created.clone()),
                }
                tracing::debug!("Created {:?} on {}", id, self.endpoint);
                Outcome::Applied(created)
            }
            Err(e) => {
                tracing::warn!("Create on {} failed: {}", self.endpoint, e);
                state.error = Some(e.clone());
                Outcome::Failed(e)
            }
        }
    }

    pub async fn update(&self, record: T) -> Outcome<T> {
        let Some(id) = record.id() else {
            return self.fail(HttpError::transport("record has no id")).await;
        };
        let body = match encode(&record) {
            Ok(body) => body,
            Err(e) => return self.fail(e).await,
        };
        let url = match join_segment(&self.endpoint, &id.to_string()) {
            Ok(url) => url,
            Err(e) => return self.fail(e).await,
        };

        let (scope, ticket) = {
            let mut state = self.state.write().await;
            let ticket = state.issue_ticket();
            state.update_tickets.insert(id.clone(), ticket);
            (state.scope, ticket)
        };
        let mut guard = self.in_flight(scope, ticket, Pending::Update(id.clone()));

        let result = self.http.put(&url, RequestOptions::json(body)).await;

        let mut state = self.state.write().await;
        guard.disarm();
        if state.scope != scope || state.update_tickets.get(&id) != Some(&ticket) {
            tracing::debug!("Discarding superseded update of {} on {}", id, self.endpoint);
            return Outcome::Stale;
        }
        state.update_tickets.remove(&id);

        match result {
            Ok(echo) => {
                let held = match self.policy {
                    UpdatePolicy::KeepSubmitted => record,
                    UpdatePolicy::AdoptServer => serde_json::from_value::<T>(echo)
                        .ok()
                        .filter(|r| r.id().as_ref() == Some(&id))
                        .unwrap_or(record),
                };
                for slot in state.records.iter_mut().filter(|r| r.id().as_ref() == Some(&id)) {
                    *slot = held.clone();
                }
                Outcome::Applied(held)
            }
            Err(e) => {
                tracing::warn!("Update of {} on {} failed: {}", id, self.endpoint, e);
                state.error = Some(e.clone());
                Outcome::Failed(e)
            }
        }
    }

    pub async fn delete(&self, id: &RecordId) -> Outcome<RecordId> {
        let url = match join_segment(&self.endpoint, &id.to_string()) {
            Ok(url) => url,
            Err(e) => return self.fail(e).await,
        };
        let scope = self.state.read().await.scope;

        let result = self.http.del(&url, RequestOptions::default()).await;

        let mut state = self.state.write().await;
        if state.scope != scope {
            tracing::debug!("Discarding delete of {} from a detached scope", id);
            return Outcome::Stale;
        }

        match result {
            Ok(_) => {
                state.records.retain(|r| r.id().as_ref() != Some(id));
                Outcome::Applied(id.clone())
            }
            Err(e) => {
                tracing::warn!("Delete of {} on {} failed: {}", id, self.endpoint, e);
                state.error = Some(e.clone());
                Outcome::Failed(e)
            }
        }
    }

    /// End the current scope: drop local state and ignore every response still in flight.
    pub async fn detach(&self) {
        let mut state = self.state.write().await;
        let scope = state.scope + 1;
        *state = StoreState {
            scope,
            next_ticket: state.next_ticket,
            ..StoreState::default()
        };
    }

    pub async fn records(&self) -> Vec<T> {
        self.state.read().await.records.clone()
    }

    pub async fn get(&self, id: &RecordId) -> Option<T> {
        self.state
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id().as_ref() == Some(id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<HttpError> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn edit_target(&self) -> Option<T> {
        self.state.read().await.edit_target.clone()
    }

    pub async fn set_edit_target(&self, record: T) {
        self.state.write().await.edit_target = Some(record);
    }

    pub async fn clear_edit_target(&self) {
        self.state.write().await.edit_target = None;
    }

    pub async fn snapshot(&self) -> StoreSnapshot<T> {
        let state = self.state.read().await;
        StoreSnapshot {
            records: state.records.clone(),
            loading: state.loading,
            error: state.error.clone(),
            edit_target: state.edit_target.clone(),
        }
    }

    fn in_flight(&self, scope: u64, ticket: u64, pending: Pending) -> InFlight<T> {
        InFlight {
            state: self.state.clone(),
            scope,
            ticket,
            pending,
            armed: true,
        }
    }

    async fn fail<R>(&self, error: HttpError) -> Outcome<R> {
        tracing::warn!("{} on {}", error, self.endpoint);
        self.state.write().await.error = Some(error.clone());
        Outcome::Failed(error)
    }
}

fn encode<T: Resource>(record: &T) -> Result<Value, HttpError> {
    serde_json::to_value(record).map_err(|e| HttpError::transport(format!("record could not be encoded: {}", e)))
}

fn decode<D: DeserializeOwned>(value: Value) -> Result<D, HttpError> {
    serde_json::from_value(value).map_err(|e| HttpError::transport(format!("invalid response body: {}", e)))
}
