use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// A derived credential together with the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCredential<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CachedCredential<T> {
    pub fn new(value: T, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Whether the credential is still usable at `now` with `margin` to
    /// spare. The comparison is strict.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.expires_at > now + margin
    }
}

/// Single-slot cache for one connector's short-lived credential.
///
/// Entries are replaced wholesale, never mutated. Concurrent callers that
/// both find the entry stale each regenerate; the last write wins.
#[derive(Debug)]
pub struct CredentialCache<T> {
    entry: RwLock<Option<Arc<CachedCredential<T>>>>,
}

impl<T> CredentialCache<T> {
    pub fn new() -> Self {
        Self {
            entry: RwLock::new(None),
        }
    }

    /// The cached entry, fresh or not.
    pub async fn current(&self) -> Option<Arc<CachedCredential<T>>> {
        self.entry.read().await.clone()
    }

    /// Drop the cached entry so the next request regenerates.
    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    /// Return the cached credential if it is fresh at `now` with `margin` to
    /// spare, otherwise run `regenerate` and cache its result.
    ///
    /// A failed regeneration leaves the previous entry in place and returns
    /// the error.
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        now: DateTime<Utc>,
        margin: TimeDelta,
        regenerate: F,
    ) -> Result<Arc<CachedCredential<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedCredential<T>, E>>,
    {
        {
            let guard = self.entry.read().await;
            if let Some(entry) = guard.as_ref()
                && entry.is_fresh(now, margin)
            {
                return Ok(Arc::clone(entry));
            }
        }

        debug!("credential missing or stale, regenerating");
        let fresh = Arc::new(regenerate().await?);
        *self.entry.write().await = Some(Arc::clone(&fresh));
        Ok(fresh)
    }
}

impl<T> Default for CredentialCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
