//! Execution options and striping sources
//!
//! Striped indexes never read configuration themselves. They are built from
//! a `StripingSource`, which is usually the `ExecutionOptions` of the
//! running instance: the segment it executes and the sequence that segment
//! belongs to.
//!
//! # Example
//!
//! ```
//! use segment::{ExecutionOptions, StripingSource};
//!
//! let options: ExecutionOptions = serde_json::from_str(
//!     r#"{"executionSegment": "1/3:2/3", "executionSegmentSequence": "0,1/3,2/3,1"}"#,
//! )
//! .unwrap();
//!
//! let striping = options.striping().unwrap();
//! assert_eq!(striping.start, 1);
//! assert_eq!(striping.offsets, vec![3]);
//! ```

use serde::{Deserialize, Serialize};

use crate::execution_segment::{ExecutionSegment, ExecutionSegmentSequence, SegmentError};
use crate::execution_tuple::{ExecutionTuple, Striping};

/// Anything that can yield the striping parameters of the current instance
pub trait StripingSource {
    /// Derive `(start, offsets, cycle_length)` for this instance
    fn striping(&self) -> Result<Striping, SegmentError>;
}

impl StripingSource for Striping {
    fn striping(&self) -> Result<Striping, SegmentError> {
        Ok(self.clone())
    }
}

impl StripingSource for ExecutionTuple {
    fn striping(&self) -> Result<Striping, SegmentError> {
        Ok(ExecutionTuple::striping(self))
    }
}

impl<T: StripingSource + ?Sized> StripingSource for &T {
    fn striping(&self) -> Result<Striping, SegmentError> {
        (**self).striping()
    }
}

/// Segment options of one execution instance
///
/// Both fields are optional: no segment means the whole work, and no
/// sequence means the sequence is built around the segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_segment: Option<ExecutionSegment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_segment_sequence: Option<ExecutionSegmentSequence>,
}

impl ExecutionOptions {
    pub fn with_segment(mut self, segment: ExecutionSegment) -> Self {
        self.execution_segment = Some(segment);
        self
    }

    pub fn with_sequence(mut self, sequence: ExecutionSegmentSequence) -> Self {
        self.execution_segment_sequence = Some(sequence);
        self
    }

    /// Locate the segment within the sequence
    pub fn tuple(&self) -> Result<ExecutionTuple, SegmentError> {
        ExecutionTuple::new(
            self.execution_segment.as_ref(),
            self.execution_segment_sequence.as_ref(),
        )
    }
}

impl StripingSource for ExecutionOptions {
    fn striping(&self) -> Result<Striping, SegmentError> {
        Ok(self.tuple()?.striping())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_whole_run() {
        let striping = ExecutionOptions::default().striping().unwrap();
        assert_eq!(
            striping,
            Striping {
                start: 0,
                offsets: vec![1],
                cycle_length: 1
            }
        );
    }

    #[test]
    fn test_builders() {
        let options = ExecutionOptions::default()
            .with_segment("0:2/3".parse().unwrap())
            .with_sequence("0,2/3,1".parse().unwrap());
        let striping = options.striping().unwrap();
        assert_eq!(striping.start, 0);
        assert_eq!(striping.offsets, vec![2, 1]);
        assert_eq!(striping.cycle_length, 3);
    }

    #[test]
    fn test_deserialize() {
        let options: ExecutionOptions =
            serde_json::from_str(r#"{"executionSegment": "25%:50%"}"#).unwrap();
        assert_eq!(
            options.execution_segment,
            Some("1/4:1/2".parse::<ExecutionSegment>().unwrap())
        );
        assert_eq!(options.execution_segment_sequence, None);
        assert_eq!(options.tuple().unwrap().sequence().to_string(), "0,1/4,1/2,1");

        let empty: ExecutionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExecutionOptions::default());
    }

    #[test]
    fn test_deserialize_rejects_invalid_segment() {
        let err = serde_json::from_str::<ExecutionOptions>(r#"{"executionSegment": "1/2:1/4"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("should be less than its end"), "{err}");
    }

    #[test]
    fn test_serialize_round_trip() {
        let options = ExecutionOptions::default()
            .with_segment("1/4:1/2".parse().unwrap())
            .with_sequence("0,1/4,1/2,1".parse().unwrap());
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(
            json,
            r#"{"executionSegment":"1/4:1/2","executionSegmentSequence":"0,1/4,1/2,1"}"#
        );
        assert_eq!(serde_json::from_str::<ExecutionOptions>(&json).unwrap(), options);
    }

    #[test]
    fn test_mismatched_options_fail() {
        let options = ExecutionOptions::default()
            .with_segment("0:1/3".parse().unwrap())
            .with_sequence("0,1/2,1".parse().unwrap());
        assert!(matches!(
            options.striping(),
            Err(SegmentError::SegmentNotInSequence { .. })
        ));
    }
}
