// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! Diff-based qlog `MetricsUpdated` emission, feature-gated behind `qlog`.
//!
//! We don't need to log every metric on every recovery event. Instead, only
//! the fields that actually changed since the last emission are reported.

use std::time::Duration;

use qlog::events::quic::MetricsUpdated;
use qlog::events::EventData;

#[derive(Default)]
pub struct QlogMetrics {
    min_rtt: Duration,
    smoothed_rtt: Duration,
    rttvar: Duration,
    congestion_window: u64,
    bytes_in_flight: u64,
    ssthresh: u64,
}

/// A snapshot fed into `QlogMetrics::maybe_update` after a recovery event.
pub struct Snapshot {
    pub min_rtt: Duration,
    pub smoothed_rtt: Duration,
    pub rttvar: Duration,
    pub congestion_window: u64,
    pub bytes_in_flight: u64,
    pub ssthresh: u64,
}

impl QlogMetrics {
    /// Diffs `latest` against the last-emitted snapshot, returning a
    /// `MetricsUpdated` event only for the fields that changed, or `None` if
    /// nothing did.
    pub fn maybe_update(&mut self, latest: Snapshot) -> Option<EventData> {
        let mut emit_event = false;

        let new_min_rtt = if self.min_rtt != latest.min_rtt {
            self.min_rtt = latest.min_rtt;
            emit_event = true;
            Some(latest.min_rtt.as_secs_f32() * 1000.0)
        } else {
            None
        };

        let new_smoothed_rtt = if self.smoothed_rtt != latest.smoothed_rtt {
            self.smoothed_rtt = latest.smoothed_rtt;
            emit_event = true;
            Some(latest.smoothed_rtt.as_secs_f32() * 1000.0)
        } else {
            None
        };

        let new_rttvar = if self.rttvar != latest.rttvar {
            self.rttvar = latest.rttvar;
            emit_event = true;
            Some(latest.rttvar.as_secs_f32() * 1000.0)
        } else {
            None
        };

        let new_cwnd = if self.congestion_window != latest.congestion_window {
            self.congestion_window = latest.congestion_window;
            emit_event = true;
            Some(latest.congestion_window)
        } else {
            None
        };

        let new_bytes_in_flight = if self.bytes_in_flight != latest.bytes_in_flight {
            self.bytes_in_flight = latest.bytes_in_flight;
            emit_event = true;
            Some(latest.bytes_in_flight)
        } else {
            None
        };

        let new_ssthresh = if self.ssthresh != latest.ssthresh {
            self.ssthresh = latest.ssthresh;
            emit_event = true;
            Some(latest.ssthresh)
        } else {
            None
        };

        if !emit_event {
            return None;
        }

        Some(EventData::MetricsUpdated(MetricsUpdated {
            min_rtt: new_min_rtt,
            smoothed_rtt: new_smoothed_rtt,
            latest_rtt: None,
            rtt_variance: new_rttvar,
            pto_count: None,
            congestion_window: new_cwnd,
            bytes_in_flight: new_bytes_in_flight,
            ssthresh: new_ssthresh,
            packets_in_flight: None,
            pacing_rate: None,
        }))
    }
}
