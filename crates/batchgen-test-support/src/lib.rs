//! Test support utilities for batchgen.
//!
//! Provides mocks of every core port and builders for work items.
//!
//! # Example
//!
//! ```
//! use batchgen_test_support::{ItemBuilder, MockGenerator, MockWorkSource};
//!
//! let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "C"]));
//! let generator = MockGenerator::new().failing_on("B");
//! ```

mod builders;
mod mocks;

pub use builders::ItemBuilder;
pub use mocks::{MockGenerator, MockProgressSink, MockProgressStore, MockWorkSource, RecordingPacer};
