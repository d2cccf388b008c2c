//! Retrying wrapper for any [`ObjectStore`].

use std::future::Future;

use async_trait::async_trait;
use sync_core::RetryPolicy;
use sync_types::{ContainerName, CreateOutcome};
use tracing::warn;

use crate::error::StoreError;
use crate::store::{ListPage, ObjectStore, PutReceipt, PutRequest};

/// Retries transient failures of an inner store with backoff.
///
/// Only errors for which [`StoreError::is_transient`] holds are retried;
/// everything else is returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ObjectStore> RetryingStore<S> {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && self.policy.should_retry(attempt) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        operation = what,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient store error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for RetryingStore<S> {
    async fn list_page(
        &self,
        container: &ContainerName,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.with_retry("list", || self.inner.list_page(container, continuation))
            .await
    }

    async fn put(&self, request: &PutRequest) -> Result<PutReceipt, StoreError> {
        self.with_retry("put", || self.inner.put(request)).await
    }

    async fn create_container(
        &self,
        container: &ContainerName,
    ) -> Result<CreateOutcome, StoreError> {
        self.with_retry("create container", || {
            self.inner.create_container(container)
        })
        .await
    }

    async fn list_containers(&self) -> Result<Vec<ContainerName>, StoreError> {
        self.with_retry("list containers", || self.inner.list_containers())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::time::Duration;
    use sync_types::ObjectKey;
    use tempfile::tempdir;

    fn bucket() -> ContainerName {
        ContainerName::parse("retry-bucket").unwrap()
    }

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn transient_list_failures_recover() {
        let memory = MemoryStore::new().with_container(&bucket());
        memory.fail_next_lists(2);
        let store = RetryingStore::new(memory.clone(), fast_policy(3));

        assert!(store.list_page(&bucket(), None).await.is_ok());
        assert_eq!(memory.list_calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let memory = MemoryStore::new().with_container(&bucket());
        memory.fail_next_lists(5);
        let store = RetryingStore::new(memory.clone(), fast_policy(3));

        let result = store.list_page(&bucket(), None).await;
        assert!(matches!(result, Err(StoreError::Throttled(_))));
        assert_eq!(memory.list_calls(), 3);
    }

    #[tokio::test]
    async fn permanent_errors_not_retried() {
        let memory = MemoryStore::new();
        let store = RetryingStore::new(memory.clone(), fast_policy(5));

        let result = store.list_page(&bucket(), None).await;
        assert!(matches!(result, Err(StoreError::ContainerNotFound { .. })));
        assert_eq!(memory.list_calls(), 1);
    }

    #[tokio::test]
    async fn transient_put_failure_recovers() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"hello").unwrap();

        let memory = MemoryStore::new().with_container(&bucket());
        memory.fail_next_puts(1);
        let store = RetryingStore::new(memory.clone(), fast_policy(2));

        let request = PutRequest {
            container: bucket(),
            key: ObjectKey::parse("a.txt").unwrap(),
            source,
            content_type: "text/plain".into(),
            chunk_size: 8,
        };
        store.put(&request).await.unwrap();
        assert_eq!(memory.put_count(), 1);
        assert_eq!(store.inner().object_count(&bucket()), 1);
    }
}
