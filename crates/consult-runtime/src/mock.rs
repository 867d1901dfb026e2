//! Mock Backend
//!
//! Scripted [`InferenceBackend`] for tests and offline demos. Every call is
//! recorded so callers can assert on how often and with what the backend
//! was used.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use consult_core::{
    backend::{ConsultRequest, InferenceBackend, ModelDescriptor},
    error::{ConsultError, Result},
};

/// Backend with canned per-model responses
#[derive(Debug)]
pub struct MockBackend {
    listing: std::result::Result<Vec<String>, String>,
    responses: HashMap<String, std::result::Result<String, String>>,
    generate_calls: Mutex<Vec<ConsultRequest>>,
    list_calls: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Empty backend: no installed models, every generation fails
    pub fn new() -> Self {
        Self {
            listing: Ok(Vec::new()),
            responses: HashMap::new(),
            generate_calls: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Installed models reported by `list_models`
    #[must_use]
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listing = Ok(models.into_iter().map(Into::into).collect());
        self
    }

    /// Make `list_models` fail with the given cause
    #[must_use]
    pub fn with_listing_failure(mut self, cause: impl Into<String>) -> Self {
        self.listing = Err(cause.into());
        self
    }

    /// Canned response text for a model
    #[must_use]
    pub fn with_response(mut self, model: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(model.into(), Ok(response.into()));
        self
    }

    /// Make generation with a model fail with the given cause
    #[must_use]
    pub fn with_failure(mut self, model: impl Into<String>, cause: impl Into<String>) -> Self {
        self.responses.insert(model.into(), Err(cause.into()));
        self
    }

    /// Generation requests seen so far, in call order
    pub fn generate_calls(&self) -> Vec<ConsultRequest> {
        self.generate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `list_models` calls seen so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn generate(&self, request: &ConsultRequest) -> Result<String> {
        self.generate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.responses.get(&request.model) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(cause)) => Err(ConsultError::Backend(cause.clone())),
            None => Err(ConsultError::Backend(format!(
                "404 Not Found: model '{}' not found",
                request.model
            ))),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        match &self.listing {
            Ok(names) => Ok(names.iter().map(ModelDescriptor::new).collect()),
            Err(cause) => Err(ConsultError::Backend(cause.clone())),
        }
    }
}
