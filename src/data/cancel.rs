//! Request generations, so a slow request cannot overwrite a newer one.
//!
//! Every analysis request is issued under a generation number. Starting a new
//! request bumps the shared counter, which makes every older token stale:
//! in-flight lookups for the old request see the bump and stop, and
//! `RequestTracker::publish` refuses results from a stale generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Hands out request generations and keeps the latest published result.
#[derive(Debug)]
pub struct RequestTracker<T> {
    current: Arc<AtomicU64>,
    latest: Mutex<Option<(u64, T)>>,
}

impl<T> Default for RequestTracker<T> {
    fn default() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            latest: Mutex::new(None),
        }
    }
}

impl<T: Clone> RequestTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request; all previously issued tokens become stale.
    pub fn begin(&self) -> CancelToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        CancelToken {
            current: Arc::clone(&self.current),
            generation,
        }
    }

    /// Store `value` if `token` is still the latest request.
    ///
    /// Returns `false` (and drops the value) when a newer request has started.
    pub fn publish(&self, token: &CancelToken, value: T) -> bool {
        let Ok(mut slot) = self.latest.lock() else {
            return false;
        };
        if token.is_cancelled() {
            log::debug!("discarding result of superseded request #{}", token.generation);
            return false;
        }
        *slot = Some((token.generation, value));
        true
    }

    /// The most recently published result, with its generation.
    pub fn latest(&self) -> Option<(u64, T)> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }
}

/// Cheap, clonable handle identifying one request.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    /// A token that is never superseded (single-shot CLI runs, tests).
    pub fn detached() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(1)),
            generation: 1,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }
}
