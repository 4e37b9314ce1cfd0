//! Monotonic logical tick counter, one per project.

use crate::error::Result;
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Surfaces "now" to every other component and advances it on request.
///
/// The counter is monotonic non-decreasing and durable: restarting the
/// process restores the last persisted value via the [`Store`].
#[derive(Clone)]
pub struct Clock {
    store: Arc<dyn Store>,
}

impl Clock {
    /// Construct a clock backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The project's current tick, as last persisted.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::error::Error`] raised by the store.
    pub async fn now(&self, project_id: Uuid) -> Result<u64> {
        self.store.current_tick(project_id).await
    }

    /// Advance the project's tick by one and persist the new value.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::error::Error`] raised by the store.
    pub async fn advance(&self, project_id: Uuid) -> Result<u64> {
        self.store.advance_tick(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn advance_is_monotonic_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        let clock = Clock::new(store);
        let project = Uuid::new_v4();

        assert_eq!(clock.now(project).await.unwrap(), 0);
        assert_eq!(clock.advance(project).await.unwrap(), 1);
        assert_eq!(clock.advance(project).await.unwrap(), 2);
        assert_eq!(clock.now(project).await.unwrap(), 2);
    }
}
