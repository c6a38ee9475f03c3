//! Work source port for extracting the item list.

use crate::domain::WorkItem;
use crate::error::ParseError;

/// Port for turning an upstream catalog into an ordered list of work items.
pub trait WorkSource: Send + Sync {
    /// Extracts all items, in a stable order.
    ///
    /// Running against an unchanged source must yield the same items in the
    /// same order; resuming by index depends on it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source is unreadable or yields no items.
    fn extract(&self) -> Result<Vec<WorkItem>, ParseError>;

    /// Human-readable description of the source, for logs.
    fn describe(&self) -> String;
}
