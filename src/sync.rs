// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! A generation-counter wake primitive shared between the
//! `CongestionController` (which bumps it from `register_acked`/`on_lost`,
//! the `wait-for-update` signal it owes admission-blocked callers) and the
//! `Transmitter` (which bumps it when an urgent packet is enqueued or
//! shutdown is requested, and blocks on it from the sender loop between
//! `pump()` calls).
//!
//! Breaks the cyclic coupling between a producer waiting on the controller
//! and the controller being signalled from another context: the waiting
//! side polls state on wake rather than having the controller push deltas
//! directly into it.

use std::sync::Condvar;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct WakeSignal {
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        WakeSignal {
            generation: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    /// Bumps the generation counter and wakes every waiter.
    pub fn bump(&self) {
        let mut gen = self.generation.lock().unwrap();
        *gen = gen.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Blocks until `bump()` is called at least once after this call began,
    /// or `timeout` elapses (whichever is first). A timeout is used rather
    /// than an unbounded wait so the sender loop periodically re-checks
    /// shutdown even if a `bump()` is somehow missed.
    pub fn wait_timeout(&self, timeout: Duration) {
        let guard = self.generation.lock().unwrap();
        let start = *guard;
        let _ = self
            .condvar
            .wait_timeout_while(guard, timeout, |gen| *gen == start);
    }
}
