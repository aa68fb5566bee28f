// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

use std::time::Duration;
use std::time::Instant;

/// Smoothed RTT / variance / minimum RTT, updated from (send-time,
/// ack-receive-time, peer ack-delay) triples.
///
/// The sample is `receive_time - send_time`; computing it the other way
/// around yields a negative duration on an unsigned `Duration` and panics.
/// Do not invert this subtraction.
#[derive(Clone, Copy, Debug)]
pub struct RttEstimator {
    smoothed_rtt: Duration,
    rttvar: Duration,
    min_rtt: Duration,
    has_sample: bool,
    granularity: Duration,
}

impl RttEstimator {
    pub fn new(initial_rtt: Duration, granularity: Duration) -> Self {
        RttEstimator {
            smoothed_rtt: initial_rtt,
            rttvar: initial_rtt / 2,
            min_rtt: Duration::MAX,
            has_sample: false,
            granularity,
        }
    }

    /// Feeds one (send-time, receive-time, peer ack-delay) sample in.
    /// Samples where `receive_time <= send_time` are ignored as clock skew.
    pub fn add_sample(&mut self, receive_time: Instant, send_time: Instant, peer_ack_delay: Duration) {
        let latest = match receive_time.checked_duration_since(send_time) {
            Some(d) if d > Duration::ZERO => d,
            _ => return,
        };

        self.min_rtt = self.min_rtt.min(latest);

        let adjusted = if latest > self.min_rtt + peer_ack_delay {
            latest - peer_ack_delay
        } else {
            latest
        };

        if !self.has_sample {
            self.smoothed_rtt = adjusted;
            self.rttvar = adjusted / 2;
        } else {
            let diff = self.smoothed_rtt.abs_diff(adjusted);
            self.rttvar = self.rttvar.mul_f64(0.75) + diff.mul_f64(0.25);
            self.smoothed_rtt = self.smoothed_rtt.mul_f64(0.875) + adjusted.mul_f64(0.125);
        }

        self.has_sample = true;
    }

    pub fn smoothed_rtt(&self) -> Duration {
        self.smoothed_rtt
    }

    pub fn rtt_variance(&self) -> Duration {
        self.rttvar
    }

    pub fn min_rtt(&self) -> Duration {
        self.min_rtt
    }

    pub fn has_sample(&self) -> bool {
        self.has_sample
    }

    /// `smoothed + max(4 * variance, granularity)`, the base PTO interval
    /// before any exponential backoff is applied.
    pub fn pto_base(&self) -> Duration {
        self.smoothed_rtt + (self.rttvar * 4).max(self.granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(micros: u64) -> Instant {
        Instant::now() + Duration::from_micros(micros)
    }

    #[test]
    fn first_sample_seeds_smoothed_and_variance() {
        let mut rtt = RttEstimator::new(Duration::from_millis(100), Duration::from_millis(1));
        let send = clock_at(0);
        let recv = clock_at(50_000);
        rtt.add_sample(recv, send, Duration::ZERO);

        assert!(rtt.has_sample());
        assert_eq!(rtt.smoothed_rtt(), Duration::from_micros(50_000));
        assert_eq!(rtt.rtt_variance(), Duration::from_micros(25_000));
        assert_eq!(rtt.min_rtt(), Duration::from_micros(50_000));
    }

    #[test]
    fn non_positive_sample_is_ignored() {
        let mut rtt = RttEstimator::new(Duration::from_millis(100), Duration::from_millis(1));
        let t = clock_at(1_000);
        // receive_time == send_time: zero duration, must be rejected.
        rtt.add_sample(t, t, Duration::ZERO);
        assert!(!rtt.has_sample());
    }

    #[test]
    fn ack_delay_is_subtracted_when_plausible() {
        let mut rtt = RttEstimator::new(Duration::from_millis(100), Duration::from_millis(1));
        // seed min_rtt with a clean sample first.
        rtt.add_sample(clock_at(10_000), clock_at(0), Duration::ZERO);

        // second sample: latest=30ms, ack_delay=5ms, min_rtt=10ms.
        // 30ms > 10ms + 5ms, so adjusted = 25ms.
        rtt.add_sample(clock_at(40_000), clock_at(10_000), Duration::from_micros(5_000));
        // smoothed = 0.875*10ms + 0.125*25ms = 11.875ms
        assert_eq!(rtt.smoothed_rtt(), Duration::from_micros(11_875));
    }

    #[test]
    fn pto_base_floors_on_granularity() {
        let rtt = RttEstimator::new(Duration::from_millis(10), Duration::from_millis(50));
        // variance starts at 5ms, 4*5ms=20ms < 50ms granularity floor.
        assert_eq!(rtt.pto_base(), Duration::from_millis(60));
    }
}
