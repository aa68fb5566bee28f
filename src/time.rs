// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

/// A monotonic clock, injected so timing-sensitive code stays deterministic
/// under test.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real wall clock, via `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A manually-advanced clock for deterministic tests: avoids any reliance on
/// real elapsed wall-clock time when driving the literal S1-S6 scenarios.
#[derive(Debug)]
pub struct TestClock {
    base: Instant,
    offset_us: AtomicU64,
}

impl TestClock {
    pub fn new() -> Self {
        TestClock {
            base: Instant::now(),
            offset_us: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_us
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for TestClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
    }
}
