use std::sync::{Arc, Mutex};

type Factory<T: ?Sized> =
    Box<dyn Fn() -> Result<Arc<T>, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// Construct-once holder for an expensive model object.
///
/// The factory runs at most once per holder: concurrent first callers block
/// on the internal lock until one construction finishes, then every caller
/// shares the same `Arc`. A failed construction is returned to the caller
/// and the slot stays empty, so the next `get` retries.
///
/// Holders are created by the host (which knows where the model artifacts
/// live) and injected into the pipeline, keeping "load the model lazily,
/// reuse it for the whole process" out of global state.
pub struct LazyModel<T: ?Sized> {
    factory: Factory<T>,
    slot: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> LazyModel<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(None),
        }
    }

    /// Returns the shared instance, constructing it on first use.
    pub fn get(&self) -> Result<Arc<T>, Box<dyn std::error::Error + Send + Sync>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        if let Some(instance) = slot.as_ref() {
            return Ok(instance.clone());
        }
        let instance = (self.factory)()?;
        *slot = Some(instance.clone());
        Ok(instance)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}
