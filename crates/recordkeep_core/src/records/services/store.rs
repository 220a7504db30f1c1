//! Record store service holding the records of one resource type.
//!
//! Provides async insert/lookup helpers and a tower::Service implementation.
//!
//! Identifier assignment and append happen under a single write lock, so
//! concurrent inserts always observe distinct, strictly increasing ids and a
//! lookup never sees a record before all of its fields, derived ones
//! included, are in place.
use std::{future::Future, pin::Pin, sync::Arc, task::Poll, time::SystemTime};

use tokio::sync::RwLock;
use tower::Service;
#[cfg(feature = "recordkeep_tracing")]
use tracing::{debug, info};

use crate::records::{
    api::types::{StoreRequest, StoreResponse},
    error::RecordError,
    infrastructure::{
        schema::FieldSpec,
        value::{NormalizedPayload, Record},
    },
};

/// Gives access to the field specification a service is bound to.
pub trait ResourceSchema {
    fn schema(&self) -> Arc<FieldSpec>;
}

#[derive(Debug, Default)]
struct StoreState {
    /// Sorted by id, ids are never reused
    records: Vec<Record>,
    /// Last assigned id, 0 while empty
    next_id: u64,
}

/// In-memory record store for one resource type
#[derive(Debug, Clone)]
pub struct RecordStore {
    spec: Arc<FieldSpec>,
    state: Arc<RwLock<StoreState>>,
}

impl RecordStore {
    pub fn new(spec: impl Into<Arc<FieldSpec>>) -> Self {
        Self { spec: spec.into(), state: Arc::new(RwLock::new(StoreState::default())) }
    }

    pub fn resource(&self) -> &str {
        self.spec.resource()
    }

    fn now_millis() -> u64 {
        // A clock set before the epoch stamps 0.
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }

    /// Admit a validated payload as a new record.
    ///
    /// Derived fields are computed before the critical section; the id and
    /// creation timestamp are assigned inside it, right before the record is
    /// published. The only failure is a payload validated against another
    /// resource type.
    pub async fn insert(&self, payload: NormalizedPayload) -> Result<Record, RecordError> {
        if payload.resource() != self.spec.resource() {
            return Err(RecordError::ResourceMismatch {
                expected: self.spec.resource().to_string(),
                actual: payload.resource().to_string(),
            });
        }
        let derived: Vec<_> = self
            .spec
            .derived()
            .iter()
            .map(|derivation| (derivation.name.clone(), derivation.rule.derive(&payload)))
            .collect();
        let mut fields = payload.into_fields();
        fields.extend(derived);

        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        assert!(
            state.records.last().is_none_or(|last| last.id() < id),
            "record store '{}' assigned non-increasing id {id}",
            self.spec.resource()
        );
        let record = Record::new(id, self.spec.resource().to_string(), fields, Self::now_millis());
        state.records.push(record.clone());
        #[cfg(feature = "recordkeep_tracing")]
        debug!("[store-{}] Published record: {:?}", self.spec.resource(), record);
        Ok(record)
    }

    /// Fetch the record with the given id.
    pub async fn lookup(&self, id: u64) -> Result<Record, RecordError> {
        let state = self.state.read().await;
        state
            .records
            .binary_search_by_key(&id, Record::id)
            .map(|index| state.records[index].clone())
            .map_err(|_| RecordError::RecordNotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl ResourceSchema for RecordStore {
    fn schema(&self) -> Arc<FieldSpec> {
        self.spec.clone()
    }
}

impl Service<StoreRequest> for RecordStore {
    type Response = StoreResponse;
    type Error = RecordError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                StoreRequest::Insert(payload) => {
                    #[cfg(feature = "recordkeep_tracing")]
                    info!("[store-{}] Insert: {:?}", this.resource(), payload.fields());
                    Ok(StoreResponse::Record(this.insert(payload).await?))
                }
                StoreRequest::Lookup(id) => {
                    #[cfg(feature = "recordkeep_tracing")]
                    info!("[store-{}] Lookup: id: {}", this.resource(), id);
                    Ok(StoreResponse::Record(this.lookup(id).await?))
                }
                StoreRequest::Count => Ok(StoreResponse::Count(this.len().await)),
            }
        })
    }
}
