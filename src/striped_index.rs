//! Striped index: a cursor over one segment's share of the whole
//!
//! The whole work is a 1-based sequence of units (e.g. iterations, virtual
//! users, rows of a data table). A `StripedIndex` walks only the units that
//! belong to one segment, keeping two counters in lock step:
//!
//! - `scaled`: how many of this segment's units have been visited (1-based)
//! - `unscaled`: the position of the current unit in the whole (1-based)
//!
//! Both are 0 before the first `advance()`.
//!
//! # Example
//!
//! ```
//! use segment::{Position, StripedIndex};
//!
//! // the first two thirds of the whole: positions 1, 3, 4, 6, 7, 9, ...
//! let index = StripedIndex::new(0, 3, vec![2, 1]);
//!
//! assert_eq!(index.advance(), Position::new(1, 1));
//! assert_eq!(index.advance(), Position::new(2, 3));
//! assert_eq!(index.advance(), Position::new(3, 4));
//! assert_eq!(index.retreat(), Position::new(2, 3));
//!
//! // largest scaled index whose unscaled position is <= 5
//! assert_eq!(index.seek_to(5), Position::new(3, 4));
//! ```

use parking_lot::RwLock;
use tracing::trace;

use crate::execution_segment::SegmentError;
use crate::execution_tuple::Striping;
use crate::options::StripingSource;

/// A `(scaled, unscaled)` cursor value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// 1-based index within the segment's own units, 0 before the first
    pub scaled: u64,

    /// 1-based index of the same unit within the whole, 0 before the first
    pub unscaled: u64,
}

impl Position {
    pub const fn new(scaled: u64, unscaled: u64) -> Self {
        Self { scaled, unscaled }
    }
}

/// Thread-safe cursor over the units of one segment
///
/// `start`, `cycle_length` and `offsets` are fixed at construction; only the
/// cursor moves. Every navigation call takes the write lock for its whole
/// duration, so concurrent `advance()` calls hand out each scaled index
/// exactly once.
#[derive(Debug)]
pub struct StripedIndex {
    start: u64,
    cycle_length: u64,
    offsets: Vec<u64>,
    cursor: RwLock<Position>,
}

impl StripedIndex {
    /// Create an index from raw striping parameters
    ///
    /// `cycle_length` must be positive and `offsets` non-empty; these are
    /// only checked in debug builds.
    pub fn new(start: u64, cycle_length: u64, offsets: Vec<u64>) -> Self {
        debug_assert!(cycle_length > 0, "cycle_length must be greater than 0");
        debug_assert!(!offsets.is_empty(), "offsets must not be empty");
        Self {
            start,
            cycle_length,
            offsets,
            cursor: RwLock::new(Position::default()),
        }
    }

    pub fn from_striping(striping: Striping) -> Self {
        Self::new(striping.start, striping.cycle_length, striping.offsets)
    }

    /// Create a private index for the instance described by `source`
    ///
    /// # Errors
    ///
    /// Returns the `SegmentError` if the source's segment options cannot be
    /// turned into striping parameters.
    pub fn from_source<S: StripingSource + ?Sized>(source: &S) -> Result<Self, SegmentError> {
        Ok(Self::from_striping(source.striping()?))
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn cycle_length(&self) -> u64 {
        self.cycle_length
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Current cursor value
    pub fn position(&self) -> Position {
        *self.cursor.read()
    }

    /// Gap between unit `scaled` and unit `scaled + 1` (1-based, `scaled >= 1`)
    #[inline]
    fn offset_after(&self, scaled: u64) -> u64 {
        self.offsets[((scaled - 1) % self.offsets.len() as u64) as usize]
    }

    /// Move to the segment's next unit
    pub fn advance(&self) -> Position {
        let mut cursor = self.cursor.write();
        if cursor.scaled == 0 {
            // first unit: 0-based start becomes 1-based
            cursor.unscaled += self.start + 1;
        } else {
            cursor.unscaled += self.offset_after(cursor.scaled);
        }
        cursor.scaled += 1;
        *cursor
    }

    /// Move back to the segment's previous unit
    ///
    /// # Panics
    ///
    /// Panics if no unit has been visited yet (`scaled == 0`).
    pub fn retreat(&self) -> Position {
        let mut cursor = self.cursor.write();
        assert!(
            cursor.scaled > 0,
            "retreat called on a striped index that has not advanced"
        );
        if cursor.scaled == 1 {
            cursor.unscaled -= self.start + 1;
        } else {
            cursor.unscaled -= self.offset_after(cursor.scaled - 1);
        }
        cursor.scaled -= 1;
        *cursor
    }

    /// Jump to the largest scaled index whose unscaled position is `<= value`
    ///
    /// Whole cycles are skipped arithmetically; only the remainder of the
    /// last cycle is walked. Any `u64` target is accepted: the walk runs one
    /// unit past the target, so it is done in 128 bits, and the result never
    /// exceeds `value`.
    pub fn seek_to(&self, value: u64) -> Position {
        let mut cursor = self.cursor.write();
        let value = u128::from(value);
        let cycle_length = u128::from(self.cycle_length);
        let start = u128::from(self.start);
        let offset = |gi: usize| u128::from(self.offsets[gi]);

        let whole_cycles = value / cycle_length;
        let mut scaled = whole_cycles * self.offsets.len() as u128;
        // First unit of the cycle containing `value`, 1-based.
        let mut unscaled = whole_cycles * cycle_length + start + 1;

        // Walk the partial cycle. Each step lands one unit past the last
        // one at or before `value`.
        let remainder = value % cycle_length;
        let mut gi = 0;
        let mut i = start;
        while i < remainder {
            scaled += 1;
            unscaled += offset(gi);
            i += offset(gi);
            gi += 1;
        }

        if gi > 0 {
            unscaled -= offset(gi - 1);
        } else if scaled > 0 {
            // Nothing owned in the partial cycle: step back from the first
            // unit of this cycle to the last unit of the previous one.
            unscaled -= offset(self.offsets.len() - 1);
        }

        if scaled == 0 {
            unscaled = 0;
        }

        // both are at most `value`
        *cursor = Position::new(scaled as u64, unscaled as u64);
        trace!(
            value = value as u64,
            scaled = cursor.scaled,
            unscaled = cursor.unscaled,
            "seek"
        );
        *cursor
    }
}
