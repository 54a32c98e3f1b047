//! Construct-once holders for expensive, process-wide services.
//!
//! The encoder, the cross-encoder and the vector-store handle are each built at most once and
//! then shared read-only. Construction is serialized by a lock; reads after construction never
//! touch it.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info};

/// A value built on first use and shared read-only afterwards.
pub struct LazyService<T> {
    label: &'static str,
    cell: OnceLock<Arc<T>>,
    init_lock: Mutex<()>,
}

impl<T> std::fmt::Debug for LazyService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyService")
            .field("label", &self.label)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl<T> LazyService<T> {
    /// Creates an empty holder; `label` is used in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns the shared value, building it with `init` if this is the first call.
    ///
    /// A failed `init` leaves the holder empty so a later call can retry.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(Arc::clone(value));
        }

        let _guard = self.init_lock.lock();

        // Another caller may have finished while we waited for the lock.
        if let Some(value) = self.cell.get() {
            debug!(service = self.label, "Service constructed by concurrent caller");
            return Ok(Arc::clone(value));
        }

        let started = Instant::now();
        let value = Arc::new(init()?);
        let _ = self.cell.set(Arc::clone(&value));

        info!(
            service = self.label,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Service constructed"
        );

        Ok(value)
    }

    /// Returns the value if it has been built.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    /// Returns `true` once construction has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the log label.
    pub fn label(&self) -> &'static str {
        self.label
    }
}
