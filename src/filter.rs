//! Contract between migration steps and the filter subsystem.

use crate::core::Result;

pub type FilterId = u64;

/// A filter list as migrations see it.
///
/// The filter's storage and refresh machinery stay with the host; steps
/// only assign identifiers and trigger a refresh or persist.
pub trait Filter {
    /// Source URL of the filter list, used in log output.
    fn url(&self) -> &str;

    /// Assigns the filter's numeric identifier.
    fn set_id(&mut self, id: FilterId);

    /// Refreshes the filter contents regardless of staleness checks.
    /// Returns whether the contents changed.
    fn force_update(&mut self) -> Result<bool>;

    /// Persists the filter contents to its backing store.
    fn save(&mut self) -> Result<()>;
}

/// Sequential identifier source for filters.
///
/// The host picks the starting value and can read the next free
/// identifier back after a migration ran, so other allocation sites stay
/// consistent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterIdAllocator {
    next: FilterId,
}

impl FilterIdAllocator {
    pub fn new(start: FilterId) -> Self {
        Self { next: start }
    }

    /// Returns the next identifier and advances the counter.
    ///
    /// # Panics
    ///
    /// Panics when the identifier space is exhausted; identifiers are never
    /// reused, and the counter does not wrap.
    pub fn allocate(&mut self) -> FilterId {
        let id = self.next;
        self.next = id.checked_add(1).expect("filter ID space exhausted");
        id
    }

    /// The identifier the next [`allocate`](Self::allocate) call would
    /// return.
    pub fn peek(&self) -> FilterId {
        self.next
    }
}
