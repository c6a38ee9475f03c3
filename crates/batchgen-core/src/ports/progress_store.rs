//! Progress persistence port.

use crate::domain::ProgressState;
use crate::error::PersistenceError;

/// Port for durable progress state.
pub trait ProgressStore: Send + Sync {
    /// Loads the persisted state, or an empty state if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if state exists but cannot be read or parsed.
    /// A missing record is never an error.
    fn load(&self) -> Result<ProgressState, PersistenceError>;

    /// Overwrites the persisted state with `state`.
    ///
    /// Safe to call repeatedly with the same state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &ProgressState) -> Result<(), PersistenceError>;

    /// Discards any persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if existing state cannot be removed.
    fn reset(&self) -> Result<(), PersistenceError>;
}
