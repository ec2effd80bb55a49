//! Striped offsets for a segment within its sequence
//!
//! An `ExecutionTuple` pairs one segment with the (filled) sequence it is
//! part of and computes how the positions of the whole are striped across
//! the sequence's segments.
//!
//! The whole is cut into cycles of `lcd` positions, where `lcd` is the least
//! common multiple of the denominators of all segment lengths. Within a
//! cycle, a segment of length `n / lcd` owns exactly `n` positions, spread as
//! evenly as possible: positions are handed out in order, each to the
//! largest segment that is not ahead of its share. The same pattern repeats
//! every cycle, so each segment's positions are described by the first one
//! (`start`) and the cyclic list of gaps between them (`offsets`).
//!
//! # Example
//!
//! ```
//! use segment::{ExecutionSegment, ExecutionSegmentSequence, ExecutionTuple};
//!
//! let sequence: ExecutionSegmentSequence = "0,2/3,1".parse().unwrap();
//! let segment: ExecutionSegment = "0:2/3".parse().unwrap();
//! let tuple = ExecutionTuple::new(Some(&segment), Some(&sequence)).unwrap();
//!
//! let striping = tuple.striping();
//! assert_eq!(striping.start, 0);
//! assert_eq!(striping.offsets, vec![2, 1]);
//! assert_eq!(striping.cycle_length, 3);
//!
//! // 4 of the first 6 positions go to the first two thirds
//! assert_eq!(tuple.scale(6), 4);
//! ```

use tracing::debug;

use crate::execution_segment::{ExecutionSegment, ExecutionSegmentSequence, SegmentError};

/// Striping parameters of one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Striping {
    /// 0-based position of the segment's first element within a cycle
    pub start: u64,

    /// Gaps between consecutive elements, cyclic
    pub offsets: Vec<u64>,

    /// Number of positions after which the pattern repeats
    pub cycle_length: u64,
}

impl Striping {
    /// Number of the first `value` positions that belong to this striping
    pub fn scale(&self, value: u64) -> u64 {
        let mut result = (value / self.cycle_length) * self.offsets.len() as u64;
        let remainder = value % self.cycle_length;
        let mut i = self.start;
        for offset in self.offsets.iter().cycle() {
            if i >= remainder {
                break;
            }
            result += 1;
            i += offset;
        }
        result
    }
}

/// Largest cycle length a striping is computed for
///
/// Striping walks every position of one cycle, so the cycle length bounds
/// both time and memory.
pub const MAX_CYCLE_LENGTH: u64 = 1 << 24;

/// Compute the striping of every segment of a filled sequence
///
/// Returns one `Striping` per segment, in sequence order.
fn striped_offsets(sequence: &ExecutionSegmentSequence) -> Result<Vec<Striping>, SegmentError> {
    let lcd = sequence.lcd()?;
    if lcd > MAX_CYCLE_LENGTH {
        return Err(SegmentError::CycleTooLong {
            sequence: sequence.to_string(),
            cycle_length: lcd,
            max: MAX_CYCLE_LENGTH,
        });
    }
    let segments = sequence.segments();

    let numerators = segments
        .iter()
        .map(|segment| {
            segment
                .length()
                .ok()
                .and_then(|length| length.checked_scale(lcd))
                .ok_or_else(|| SegmentError::CycleOverflow(sequence.to_string()))
        })
        .collect::<Result<Vec<u64>, _>>()?;

    // Largest segments pick first; ties keep sequence order.
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| numerators[b].cmp(&numerators[a]));

    let mut positions: Vec<Vec<u64>> = vec![Vec::new(); segments.len()];

    for i in 0..lcd {
        // Some segment always qualifies: the counts sum to i while the
        // numerators sum to lcd, so not every count can exceed its share.
        let chosen = order.iter().copied().find(|&j| {
            let taken = positions[j].len() as u128;
            taken * u128::from(lcd) <= u128::from(i) * u128::from(numerators[j])
        });
        if let Some(j) = chosen {
            positions[j].push(i);
        }
    }

    Ok(positions
        .into_iter()
        .map(|owned| {
            let start = owned[0];
            let mut offsets: Vec<u64> = owned.windows(2).map(|w| w[1] - w[0]).collect();
            offsets.push(start + lcd - owned[owned.len() - 1]);
            Striping {
                start,
                offsets,
                cycle_length: lcd,
            }
        })
        .collect())
}

/// A segment located within its filled sequence, with precomputed striping
#[derive(Debug, Clone)]
pub struct ExecutionTuple {
    segment: ExecutionSegment,
    sequence: ExecutionSegmentSequence,
    segment_index: usize,
    striping: Striping,
}

impl ExecutionTuple {
    /// Locate `segment` in `sequence` and compute its striping
    ///
    /// A missing segment means the whole work. A missing or empty sequence
    /// is built around the segment. The sequence is then filled so it
    /// covers `0:1`.
    ///
    /// # Errors
    ///
    /// `SegmentError::SegmentNotInSequence` if the segment is not one of the
    /// sequence's segments, `SegmentError::CycleOverflow` if the cycle
    /// length does not fit in 64 bits, or `SegmentError::CycleTooLong` if it
    /// exceeds `MAX_CYCLE_LENGTH`.
    pub fn new(
        segment: Option<&ExecutionSegment>,
        sequence: Option<&ExecutionSegmentSequence>,
    ) -> Result<Self, SegmentError> {
        let segment = segment.copied().unwrap_or_default();

        let sequence = match sequence {
            Some(sequence) if !sequence.is_empty() => sequence.clone(),
            _ => ExecutionSegmentSequence::new(vec![segment])?,
        }
        .filled();

        let segment_index =
            sequence
                .position(&segment)
                .ok_or_else(|| SegmentError::SegmentNotInSequence {
                    segment: segment.to_string(),
                    sequence: sequence.to_string(),
                })?;

        let striping = striped_offsets(&sequence)?.swap_remove(segment_index);

        debug!(
            %segment,
            %sequence,
            start = striping.start,
            cycle_length = striping.cycle_length,
            offsets = ?striping.offsets,
            "computed striping"
        );

        Ok(Self {
            segment,
            sequence,
            segment_index,
            striping,
        })
    }

    pub fn segment(&self) -> &ExecutionSegment {
        &self.segment
    }

    /// The filled sequence the segment was located in
    pub fn sequence(&self) -> &ExecutionSegmentSequence {
        &self.sequence
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Striping parameters `(start, offsets, cycle_length)` of the segment
    pub fn striping(&self) -> Striping {
        self.striping.clone()
    }

    /// Number of the first `value` units of work that belong to this segment
    pub fn scale(&self, value: u64) -> u64 {
        if self.sequence.len() == 1 {
            return value;
        }
        self.striping.scale(value)
    }
}
