use std::future::Future;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::domain::common::entities::app_errors::CoreError;

use super::entities::{Entry, Listing, Record};

/// Operations every resource repository exposes.
pub trait ResourceRepository: Send + Sync {
    type Model: Send + Sync;

    /// Runs the listing pipeline against the request parameters.
    fn list(self) -> impl Future<Output = Result<Listing<Self::Model>, CoreError>> + Send
    where
        Self: Sized;

    /// Creates a record from the attributes of a JSON object.
    fn put(&self, data: JsonValue) -> impl Future<Output = Result<Self::Model, CoreError>> + Send;

    fn show(
        &self,
        record: Record<Self::Model>,
    ) -> impl Future<Output = Result<Entry<Self::Model>, CoreError>> + Send;

    fn update(
        &self,
        record: Record<Self::Model>,
        data: JsonValue,
    ) -> impl Future<Output = Result<Self::Model, CoreError>> + Send;

    fn destroy(
        &self,
        _record: Record<Self::Model>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        warn!("destroy is not implemented for this repository");
        std::future::ready(Ok(()))
    }

    fn force_destroy(
        &self,
        _record: Record<Self::Model>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        warn!("force_destroy is not implemented for this repository");
        std::future::ready(Ok(()))
    }
}
