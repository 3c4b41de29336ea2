//! [`CachedKeySource`]: decode the master key once, serve it until invalidated.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use cipher_common::KeyProblem;
use tracing::{debug, info};

use super::{KeySource, MasterKey};

/// Wraps another [`KeySource`] and keeps the last decoded key in memory.
///
/// Reads are lock-free via [`ArcSwapOption`]. Load failures are never cached, so
/// a fixed configuration is picked up on the next call. After
/// [`invalidate`](KeySource::invalidate) the next load goes back to the inner
/// source.
pub struct CachedKeySource<S> {
    inner: S,
    cached: ArcSwapOption<MasterKey>,
}

impl<S: KeySource> CachedKeySource<S> {
    /// Create an empty cache in front of `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: ArcSwapOption::empty(),
        }
    }

    /// Returns `true` if a decoded key is currently held.
    pub fn is_cached(&self) -> bool {
        self.cached.load().is_some()
    }
}

impl<S: KeySource> KeySource for CachedKeySource<S> {
    fn load(&self) -> Result<MasterKey, KeyProblem> {
        if let Some(key) = self.cached.load_full() {
            return Ok(MasterKey::clone(&key));
        }
        let key = self.inner.load()?;
        self.cached.store(Some(Arc::new(key.clone())));
        debug!("master key decoded and cached");
        Ok(key)
    }

    fn invalidate(&self) {
        self.cached.store(None);
        self.inner.invalidate();
        info!("cached master key invalidated");
    }
}

impl<S> std::fmt::Debug for CachedKeySource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedKeySource")
            .field("cached", &self.cached.load().is_some())
            .finish_non_exhaustive()
    }
}
