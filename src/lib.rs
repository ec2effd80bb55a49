//! Segment: deterministic striped index partitioning
//!
//! This crate splits a 1-based sequence of work units across cooperating
//! execution instances ("segments") so every instance sees a disjoint,
//! gap-free, order-preserving share, and the shares together cover the whole
//! exactly once. A segment such as `1/4:1/2` is turned into striping
//! parameters, and a `StripedIndex` walks that segment's units while
//! tracking their positions in the whole.

pub mod execution_segment;
pub mod execution_tuple;
pub mod options;
pub mod ratio;
pub mod registry;
pub mod striped_index;

#[cfg(test)]
mod test_support;

// Re-export main types at crate root
pub use execution_segment::{ExecutionSegment, ExecutionSegmentSequence, SegmentError};
pub use execution_tuple::{ExecutionTuple, Striping, MAX_CYCLE_LENGTH};
pub use options::{ExecutionOptions, StripingSource};
pub use ratio::{RatioError, Rational};
pub use registry::{RegistryError, SharedIndexRegistry};
pub use striped_index::{Position, StripedIndex};
