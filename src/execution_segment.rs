//! Execution segments and segment sequences
//!
//! An execution segment is a fractional range `from:to` of the whole work,
//! with `0 <= from < to <= 1`. A sequence is an ordered, contiguous list of
//! segments that defines how the whole is cut into cooperating instances.
//!
//! # Text forms
//!
//! | Text | Meaning |
//! |------|---------|
//! | `1/4:1/2` | second quarter |
//! | `25%:50%` | second quarter |
//! | `0.25:0.5` | second quarter |
//! | `1/4` | `0:1/4` |
//! | (empty) | `0:1`, the whole |
//!
//! Sequences are written as comma-separated boundaries, e.g. `0,1/4,1/2,1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ratio::{checked_lcm, RatioError, Rational};

/// Errors that can occur while building segments, sequences and tuples
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error(transparent)]
    Ratio(#[from] RatioError),

    #[error("segment end value shouldn't be more than 1, got {0}")]
    EndAboveOne(Rational),

    #[error("segment start ({from}) should be less than its end ({to})")]
    EmptySegment { from: Rational, to: Rational },

    #[error("the end of segment {index} ({end}) should equal the start of the next one ({next_start})")]
    NotContiguous {
        index: usize,
        end: Rational,
        next_start: Rational,
    },

    #[error("a segment sequence needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("couldn't find segment {segment} in sequence {sequence}")]
    SegmentNotInSequence { segment: String, sequence: String },

    #[error("cycle length of sequence {0} does not fit in 64 bits")]
    CycleOverflow(String),

    #[error("cycle length {cycle_length} of sequence {sequence} exceeds the maximum of {max}")]
    CycleTooLong {
        sequence: String,
        cycle_length: u64,
        max: u64,
    },
}

/// A fractional range `from:to` of the whole work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionSegment {
    from: Rational,
    to: Rational,
}

impl ExecutionSegment {
    /// Create a segment, validating `from < to <= 1`
    pub fn new(from: Rational, to: Rational) -> Result<Self, SegmentError> {
        if to > Rational::ONE {
            return Err(SegmentError::EndAboveOne(to));
        }
        if from >= to {
            return Err(SegmentError::EmptySegment { from, to });
        }
        Ok(Self { from, to })
    }

    /// The whole work, `0:1`
    pub fn full() -> Self {
        Self {
            from: Rational::ZERO,
            to: Rational::ONE,
        }
    }

    pub fn start(&self) -> Rational {
        self.from
    }

    pub fn end(&self) -> Rational {
        self.to
    }

    /// `to - from`
    ///
    /// # Errors
    ///
    /// `RatioError::Overflow` if the reduced difference of the boundaries
    /// does not fit in 64 bits.
    pub fn length(&self) -> Result<Rational, SegmentError> {
        self.to
            .checked_sub(&self.from)
            .ok_or(SegmentError::Ratio(RatioError::Overflow))
    }

    /// Returns true if this segment covers the whole work
    pub fn is_full(&self) -> bool {
        self.from.is_zero() && self.to == Rational::ONE
    }
}

impl Default for ExecutionSegment {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for ExecutionSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

impl FromStr for ExecutionSegment {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::full());
        }
        let (from, to) = match s.split_once(':') {
            Some((from, to)) => (from.parse::<Rational>()?, to.parse::<Rational>()?),
            None => (Rational::ZERO, s.parse::<Rational>()?),
        };
        Self::new(from, to)
    }
}

impl TryFrom<String> for ExecutionSegment {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionSegment> for String {
    fn from(segment: ExecutionSegment) -> Self {
        segment.to_string()
    }
}

/// An ordered, contiguous list of execution segments
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionSegmentSequence {
    segments: Vec<ExecutionSegment>,
}

impl ExecutionSegmentSequence {
    /// Create a sequence, checking that the segments are contiguous
    pub fn new(segments: Vec<ExecutionSegment>) -> Result<Self, SegmentError> {
        for (index, pair) in segments.windows(2).enumerate() {
            if pair[0].to != pair[1].from {
                return Err(SegmentError::NotContiguous {
                    index,
                    end: pair[0].to,
                    next_start: pair[1].from,
                });
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[ExecutionSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the sequence is the single segment `0:1`
    pub fn is_full(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].is_full()
    }

    /// Position of `segment` within the sequence
    pub fn position(&self, segment: &ExecutionSegment) -> Option<usize> {
        self.segments.iter().position(|s| s == segment)
    }

    /// Least common multiple of the denominators of all segment lengths
    ///
    /// This is the cycle length after which the striping pattern repeats.
    pub fn lcd(&self) -> Result<u64, SegmentError> {
        self.segments.iter().try_fold(1u64, |acc, segment| {
            let length = segment
                .length()
                .map_err(|_| SegmentError::CycleOverflow(self.to_string()))?;
            checked_lcm(acc, length.denom())
                .ok_or_else(|| SegmentError::CycleOverflow(self.to_string()))
        })
    }

    /// Extend the sequence so it starts at 0 and ends at 1
    pub(crate) fn filled(mut self) -> Self {
        if let Some(first) = self.segments.first().copied() {
            if !first.from.is_zero() {
                self.segments.insert(
                    0,
                    ExecutionSegment {
                        from: Rational::ZERO,
                        to: first.from,
                    },
                );
            }
        }
        if let Some(last) = self.segments.last().copied() {
            if last.to != Rational::ONE {
                self.segments.push(ExecutionSegment {
                    from: last.to,
                    to: Rational::ONE,
                });
            }
        }
        self
    }
}

impl fmt::Display for ExecutionSegmentSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.segments.first() else {
            return Ok(());
        };
        write!(f, "{}", first.from)?;
        for segment in &self.segments {
            write!(f, ",{}", segment.to)?;
        }
        Ok(())
    }
}

impl FromStr for ExecutionSegmentSequence {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        let points = s
            .split(',')
            .map(str::parse::<Rational>)
            .collect::<Result<Vec<_>, _>>()?;
        if points.len() < 2 {
            return Err(SegmentError::TooFewPoints(points.len()));
        }
        let segments = points
            .windows(2)
            .map(|pair| ExecutionSegment::new(pair[0], pair[1]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(segments)
    }
}

impl TryFrom<String> for ExecutionSegmentSequence {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionSegmentSequence> for String {
    fn from(sequence: ExecutionSegmentSequence) -> Self {
        sequence.to_string()
    }
}
