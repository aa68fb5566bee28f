// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! Stream byte reassembly from arbitrarily overlapping ranges.

use std::collections::BTreeSet;

use crate::error::Error;

/// One received range of stream bytes, ordered primarily by `offset` and,
/// for ties, by `upto` ascending — so when two elements share an offset the
/// larger one sorts after and contributes its extra bytes at read time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamElement {
    pub offset: u64,
    pub payload: Vec<u8>,
    pub is_final: bool,
}

impl StreamElement {
    pub fn new(offset: u64, payload: Vec<u8>, is_final: bool) -> Self {
        StreamElement {
            offset,
            payload,
            is_final,
        }
    }

    pub fn upto(&self) -> u64 {
        self.offset + self.payload.len() as u64
    }
}

impl PartialOrd for StreamElement {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StreamElement {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.offset, self.upto()).cmp(&(other.offset, other.upto()))
    }
}

/// Ordered-set walk exposing only the gap-free prefix that's ready to read.
/// Single-writer (receive path) / single-reader (application); the caller
/// is expected to hold the per-stream mutex around both.
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    elements: BTreeSet<StreamElement>,
    processed_to: u64,
    final_length: Option<u64>,
    ceiling: usize,
    buffered_bytes: usize,
}

impl ReassemblyBuffer {
    pub fn new(ceiling: usize) -> Self {
        ReassemblyBuffer {
            elements: BTreeSet::new(),
            processed_to: 0,
            final_length: None,
            ceiling,
            buffered_bytes: 0,
        }
    }

    /// Inserts `element` unless it is already fully consumed. Returns
    /// `false` for already-consumed or exact duplicate inserts, `true`
    /// otherwise. Errors if admitting it would exceed the configured
    /// backpressure ceiling.
    pub fn add(&mut self, element: StreamElement) -> Result<bool, Error> {
        if element.upto() <= self.processed_to {
            return Ok(false);
        }

        if self.elements.contains(&element) {
            return Ok(false);
        }

        let incoming = element.payload.len();
        if self.buffered_bytes + incoming > self.ceiling {
            return Err(Error::ReassemblyOverflow {
                buffered: self.buffered_bytes + incoming,
            });
        }

        if element.is_final {
            self.final_length = Some(element.upto());
        }

        self.buffered_bytes += incoming;
        self.elements.insert(element);
        Ok(true)
    }

    /// Walks the ordered set from `processed_to`, returning the number of
    /// contiguous bytes available without copying them.
    pub fn bytes_available(&self) -> usize {
        let mut r = self.processed_to;
        for e in &self.elements {
            if e.offset > r {
                break;
            }
            if e.upto() > r {
                r = e.upto();
            }
        }
        (r - self.processed_to) as usize
    }

    /// Copies the gap-free prefix into `destination`, advances
    /// `processed_to`, and purges every element fully consumed as a result.
    /// Returns the number of bytes written.
    pub fn read(&mut self, destination: &mut [u8]) -> usize {
        let mut r = self.processed_to;
        let mut written = 0usize;

        for e in &self.elements {
            if e.offset > r {
                break;
            }
            if written >= destination.len() {
                break;
            }
            if e.upto() <= r {
                continue;
            }

            let skip = (r - e.offset) as usize;
            let available = (e.upto() - r) as usize;
            let take = available.min(destination.len() - written);
            destination[written..written + take]
                .copy_from_slice(&e.payload[skip..skip + take]);

            written += take;
            r += take as u64;

            if take < available {
                break;
            }
        }

        self.processed_to = r;
        self.purge_consumed();
        written
    }

    fn purge_consumed(&mut self) {
        let processed_to = self.processed_to;
        self.elements.retain(|e| e.upto() > processed_to);
        self.buffered_bytes = self.elements.iter().map(|e| e.payload.len()).sum();
    }

    /// True once `processed_to` has reached the length fixed by an
    /// `is_final` element.
    pub fn is_closed(&self) -> bool {
        self.final_length.is_some_and(|len| self.processed_to >= len)
    }

    pub fn processed_to(&self) -> u64 {
        self.processed_to
    }
}
