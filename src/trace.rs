//! Request trace reader
//!
//! A trace is a whitespace-separated stream of integer records
//! `process_id units request_time duration`. A record whose `process_id` is
//! negative ends the stream, as does end of input on a record boundary.
//! Anything else that is not a well-formed record is fatal.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::SplitWhitespace;

use thiserror::Error;

use crate::sim::Request;
use crate::ProcessId;

/// Field names of a trace record, in order.
pub const FIELDS: [&str; 4] = ["process_id", "units", "request_time", "duration"];

/// Errors raised while reading a trace. Records are numbered from 1.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("record {record}: {field} is not an integer: {token:?}")]
    InvalidInteger {
        record: usize,
        field: &'static str,
        token: String,
    },
    #[error("record {record}: {field} out of range")]
    OutOfRange { record: usize, field: &'static str },
    #[error("record {record}: {field} must not be negative")]
    NegativeField { record: usize, field: &'static str },
    #[error("record {record}: truncated after {fields} of 4 fields")]
    Truncated { record: usize, fields: usize },
}

pub type TraceResult<T> = Result<T, TraceError>;

/// Iterator over the requests of a trace.
///
/// Stops after the sentinel, at end of input, or after the first error.
pub struct TraceReader<'a> {
    tokens: SplitWhitespace<'a>,
    record: usize,
    done: bool,
}

impl<'a> TraceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace(),
            record: 0,
            done: false,
        }
    }

    fn field(&mut self, index: usize) -> TraceResult<Option<i64>> {
        let Some(token) = self.tokens.next() else {
            if index == 0 {
                return Ok(None);
            }
            return Err(TraceError::Truncated {
                record: self.record,
                fields: index,
            });
        };
        token
            .parse::<i64>()
            .map(Some)
            .map_err(|_| TraceError::InvalidInteger {
                record: self.record,
                field: FIELDS[index],
                token: token.to_string(),
            })
    }

    fn next_record(&mut self) -> TraceResult<Option<Request>> {
        self.record += 1;

        let Some(process_id) = self.field(0)? else {
            return Ok(None);
        };
        if process_id < 0 {
            return Ok(None);
        }
        let process_id = ProcessId::try_from(process_id).map_err(|_| TraceError::OutOfRange {
            record: self.record,
            field: FIELDS[0],
        })?;

        let mut values = [0i64; 3];
        for (slot, index) in values.iter_mut().zip(1..) {
            *slot = self.field(index)?.ok_or(TraceError::Truncated {
                record: self.record,
                fields: index,
            })?;
        }
        let [units, time, duration] = values;

        // A non-positive size is the allocator's to reject, not the reader's.
        let units = match usize::try_from(units) {
            Ok(units) => units,
            Err(_) if units < 0 => 0,
            Err(_) => {
                return Err(TraceError::OutOfRange {
                    record: self.record,
                    field: FIELDS[1],
                })
            }
        };
        let time = self.non_negative(time, 2)?;
        let duration = self.non_negative(duration, 3)?;

        Ok(Some(Request::new(process_id, units, time, duration)))
    }

    fn non_negative(&self, value: i64, index: usize) -> TraceResult<u64> {
        u64::try_from(value).map_err(|_| TraceError::NegativeField {
            record: self.record,
            field: FIELDS[index],
        })
    }
}

impl Iterator for TraceReader<'_> {
    type Item = TraceResult<Request>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(request)) => Some(Ok(request)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Read a whole trace, failing on the first malformed record.
pub fn parse_trace(input: &str) -> TraceResult<Vec<Request>> {
    TraceReader::new(input).collect()
}
