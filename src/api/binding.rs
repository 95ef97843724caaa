use std::sync::Arc;

use crate::error::ApiError;
use crate::request::RequestStore;
use crate::transport::Endpoints;

/// Builds the endpoint set of one call from the caller's arguments.
pub type Requester<A> = Arc<dyn Fn(A) -> Endpoints + Send + Sync>;

/// Box a closure as a [`Requester`].
pub fn requester<A, F>(f: F) -> Requester<A>
where
    F: Fn(A) -> Endpoints + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Dispatches requests under a fixed key. Returned by
/// [`Api::bind_request`](crate::Api::bind_request).
pub struct RequestTrigger<A> {
    key: String,
    requests: RequestStore,
    requester: Option<Requester<A>>,
}

impl<A> RequestTrigger<A> {
    pub(crate) fn new(key: String, requests: RequestStore, requester: Option<Requester<A>>) -> Self {
        Self {
            key,
            requests,
            requester,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Dispatch the endpoints built from `args`. Fails without touching the
    /// record when no requester was bound.
    pub async fn call(&self, args: A) -> Result<(), ApiError> {
        let requester = self
            .requester
            .as_ref()
            .ok_or_else(|| ApiError::MissingRequester {
                key: self.key.clone(),
            })?;
        let endpoints = requester(args);
        self.requests
            .dispatch(Some(self.key.as_str()), endpoints, None)
            .await?;
        Ok(())
    }
}

impl<A> Clone for RequestTrigger<A> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            requests: self.requests.clone(),
            requester: self.requester.clone(),
        }
    }
}

/// Loads further pages under a fixed key. Returned by
/// [`Api::bind_load_more`](crate::Api::bind_load_more).
pub struct LoadTrigger<A> {
    key: String,
    requests: RequestStore,
    loader: Requester<A>,
}

impl<A> LoadTrigger<A> {
    pub(crate) fn new(key: String, requests: RequestStore, loader: Requester<A>) -> Self {
        Self {
            key,
            requests,
            loader,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn call(&self, args: A) -> Result<(), ApiError> {
        let endpoints = (self.loader)(args);
        self.requests.load_more(&self.key, endpoints, None).await
    }
}

impl<A> Clone for LoadTrigger<A> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            requests: self.requests.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}
