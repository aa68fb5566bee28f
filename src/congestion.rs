// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! NewReno-style congestion control.
//!
//! `CongestionControl` is a trait object rather than a generic parameter so
//! a future Cubic/BBR implementation can slot in without making
//! `Transmitter` generic over it.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::config::CoreConfig;
use crate::config::MAX_SEGMENT_SIZE;
use crate::sync::WakeSignal;

/// A packet considered for `register_acked`/`on_lost`: just enough of an
/// `InFlightRecord` for the congestion controller to update its books.
#[derive(Clone, Copy, Debug)]
pub struct SettledPacket {
    pub size: usize,
    pub send_time: Instant,
    pub in_flight: bool,
}

pub trait CongestionControl: fmt::Debug + Send + Sync {
    fn congestion_window(&self) -> usize;
    fn bytes_in_flight(&self) -> usize;
    fn can_send(&self, size: usize) -> bool;
    fn wait_for_update(&self, timeout: Duration);
    fn register_in_flight(&self, packet: &SettledPacket);
    fn register_acked(&self, now: Instant, packets: &[SettledPacket]);
    fn on_lost(&self, now: Instant, packets: &[SettledPacket]);
}

struct State {
    congestion_window: usize,
    bytes_in_flight: usize,
    ssthresh: usize,
    recovery_start_time: Option<Instant>,
}

/// NewReno: slow-start doubling per round trip, congestion avoidance at
/// roughly +1 MSS per round trip, multiplicative decrease on loss.
pub struct NewReno {
    state: Mutex<State>,
    wake: Arc<WakeSignal>,
    minimum_window: usize,
    loss_reduction_factor: f64,
}

impl NewReno {
    pub fn new(config: &CoreConfig, wake: Arc<WakeSignal>) -> Self {
        NewReno {
            state: Mutex::new(State {
                congestion_window: config.initial_window,
                bytes_in_flight: 0,
                ssthresh: usize::MAX,
                recovery_start_time: None,
            }),
            wake,
            minimum_window: config.minimum_window,
            loss_reduction_factor: config.loss_reduction_factor,
        }
    }
}

impl fmt::Debug for NewReno {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock().unwrap();
        write!(
            f,
            "NewReno {{ cwnd={} bytes_in_flight={} ssthresh={} }}",
            state.congestion_window, state.bytes_in_flight, state.ssthresh
        )
    }
}

impl CongestionControl for NewReno {
    fn congestion_window(&self) -> usize {
        self.state.lock().unwrap().congestion_window
    }

    fn bytes_in_flight(&self) -> usize {
        self.state.lock().unwrap().bytes_in_flight
    }

    fn can_send(&self, size: usize) -> bool {
        let state = self.state.lock().unwrap();
        state.bytes_in_flight + size <= state.congestion_window
    }

    fn wait_for_update(&self, timeout: Duration) {
        self.wake.wait_timeout(timeout);
    }

    fn register_in_flight(&self, packet: &SettledPacket) {
        if !packet.in_flight {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.bytes_in_flight += packet.size;
    }

    fn register_acked(&self, now: Instant, packets: &[SettledPacket]) {
        let mut state = self.state.lock().unwrap();
        for packet in packets {
            if !packet.in_flight {
                continue;
            }
            state.bytes_in_flight = state.bytes_in_flight.saturating_sub(packet.size);

            let in_recovery = state
                .recovery_start_time
                .is_some_and(|t| packet.send_time <= t);
            if in_recovery {
                continue;
            }

            if state.congestion_window < state.ssthresh {
                // Slow start: one MSS-equivalent growth per acked byte.
                state.congestion_window += packet.size;
            } else {
                // Congestion avoidance: roughly +1 MSS per round trip.
                let growth = (packet.size as f64 * MAX_SEGMENT_SIZE as f64
                    / state.congestion_window as f64) as usize;
                state.congestion_window += growth.max(1);
            }
        }
        drop(state);
        self.wake.bump();
        let _ = now;
    }

    fn on_lost(&self, now: Instant, packets: &[SettledPacket]) {
        let mut state = self.state.lock().unwrap();
        let mut enter_recovery = false;

        for packet in packets {
            if !packet.in_flight {
                continue;
            }
            state.bytes_in_flight = state.bytes_in_flight.saturating_sub(packet.size);

            let after_recovery_start = state
                .recovery_start_time
                .is_none_or(|t| packet.send_time > t);
            if after_recovery_start {
                enter_recovery = true;
            }
        }

        if enter_recovery {
            let reduced = (state.congestion_window as f64 * self.loss_reduction_factor) as usize;
            state.ssthresh = reduced.max(self.minimum_window);
            state.congestion_window = state.ssthresh;
            state.recovery_start_time = Some(now);
        }

        drop(state);
        self.wake.bump();
    }
}
