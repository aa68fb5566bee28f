// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

use std::time::Duration;

/// Maximum Segment Size assumed for window sizing.
pub const MAX_SEGMENT_SIZE: usize = 1460;

const INITIAL_WINDOW_PACKETS: usize = 10;
const MINIMUM_WINDOW_PACKETS: usize = 2;

/// Tunables for the RTT estimator, congestion controller and reassembly
/// ceiling. Kept as a plain struct rather than threading individual
/// parameters through every constructor.
#[derive(Clone, Copy, Debug)]
pub struct CoreConfig {
    /// RTT assumed before the first sample arrives.
    pub initial_rtt: Duration,
    /// Floor under the PTO variance term; also the timer granularity.
    pub granularity: Duration,
    /// Congestion window at startup, in bytes.
    pub initial_window: usize,
    /// Congestion window floor after a loss-triggered reduction, in bytes.
    pub minimum_window: usize,
    /// Multiplicative decrease factor applied to `cwnd` on loss.
    pub loss_reduction_factor: f64,
    /// Reassembly backpressure ceiling, in bytes, per stream.
    pub reassembly_ceiling: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            initial_rtt: Duration::from_millis(100),
            granularity: Duration::from_millis(1),
            initial_window: INITIAL_WINDOW_PACKETS * MAX_SEGMENT_SIZE,
            minimum_window: MINIMUM_WINDOW_PACKETS * MAX_SEGMENT_SIZE,
            loss_reduction_factor: 0.5,
            reassembly_ceiling: 16 * 1024 * 1024,
        }
    }
}
