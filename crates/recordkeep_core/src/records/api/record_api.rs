//! Record API service implementation.
//!
//! This module provides the service a request boundary forwards client
//! requests to. It composes the three stages of the record core:
//!
//! - **Validation**: raw creation payloads are checked against the field
//!   specification of their resource type; a payload with any violation
//!   never reaches the store.
//! - **Storage**: validated payloads are admitted by the store registered
//!   for their resource type, which assigns the identifier and computes
//!   derived fields.
//! - **Projection**: retrieved records are narrowed to the fields the client
//!   requested.
//!
//! ## Store Registry
//!
//! Stores are registered under the resource name of their field
//! specification. The registry is shared between clones of the service, so
//! a service can be cloned into every request task.

use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use serde_json::Value;
use tower::Service;
#[cfg(feature = "recordkeep_tracing")]
use tracing::info;

use crate::records::{
    api::types::{ApiRequest, ApiResponse, StoreRequest, StoreResponse},
    error::RecordError,
    infrastructure::validation::Validator,
    services::{projection::Projector, store::ResourceSchema},
};

type StoreMap<S> = DashMap<String, S>;

/// Record API Service
///
/// Handles creation and retrieval requests for every registered resource
/// type, dispatching them to the matching store service.
#[derive(Debug, Clone)]
pub struct RecordApiService<S> {
    /// Maps resource names to their store service
    stores: Arc<StoreMap<S>>,
    /// Projection policy applied to `Read` requests
    projector: Projector,
}

impl<S> Default for RecordApiService<S> {
    fn default() -> Self {
        Self { stores: Arc::new(StoreMap::new()), projector: Projector::permissive() }
    }
}

impl<S: ResourceSchema> RecordApiService<S> {
    /// Creates a new record API service without any registered store
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store under the resource name of its field specification.
    ///
    /// A store registered under an already known name replaces the previous
    /// one.
    pub fn with_store(self, store: S) -> Self {
        self.stores.insert(store.schema().resource().to_string(), store);
        self
    }

    /// Rejects unknown field names on `Read` instead of dropping them
    pub fn with_strict_projection(self, strict: bool) -> Self {
        let projector = if strict { Projector::strict() } else { Projector::permissive() };
        Self { projector, ..self }
    }

    /// Registered resource names, sorted
    pub fn resources(&self) -> Vec<String> {
        let mut resources: Vec<String> =
            self.stores.iter().map(|entry| entry.key().to_owned()).collect();
        resources.sort();
        resources
    }
}

impl<S> Service<ApiRequest> for RecordApiService<S>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = RecordError>
        + ResourceSchema
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ApiResponse;
    type Error = RecordError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ApiRequest) -> Self::Future {
        let store = self.stores.get(request.resource()).map(|entry| entry.value().clone());
        let projector = self.projector;
        Box::pin(async move {
            let Some(mut store) = store else {
                return Err(RecordError::UnknownResource(request.resource().to_string()));
            };
            match request {
                ApiRequest::Create { payload, .. } => {
                    #[cfg(feature = "recordkeep_tracing")]
                    info!("[records-{}] Create: payload: {}", store.schema().resource(), payload);
                    let Value::Object(raw) = payload else {
                        return Err(RecordError::MalformedPayload);
                    };
                    let normalized = Validator::new(store.schema())
                        .validate(&raw)
                        .map_err(RecordError::ValidationFailed)?;
                    match store.call(StoreRequest::Insert(normalized)).await? {
                        StoreResponse::Record(record) => Ok(ApiResponse::Created(record)),
                        _ => Err(RecordError::InternalRecordError),
                    }
                }
                ApiRequest::Read { id, fields, .. } => {
                    #[cfg(feature = "recordkeep_tracing")]
                    info!(
                        "[records-{}] Read: id: {}, fields: {:?}",
                        store.schema().resource(),
                        id,
                        fields
                    );
                    match store.call(StoreRequest::Lookup(id)).await? {
                        StoreResponse::Record(record) => Ok(ApiResponse::Found(
                            projector.narrow(&store.schema(), &record, &fields)?,
                        )),
                        _ => Err(RecordError::InternalRecordError),
                    }
                }
            }
        })
    }
}
