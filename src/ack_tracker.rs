// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! Per-epoch received-packet-number bookkeeping for outgoing acks. Built on
//! the `RangeSet` merged-interval set from `crate::ranges`.

use std::time::Duration;
use std::time::Instant;

use crate::frame::AckFrame;
use crate::ranges::RangeSet;

#[derive(Debug)]
pub struct AckTracker {
    received: RangeSet,
    dirty: bool,
    largest_received_at: Option<Instant>,
    /// packet number we sent an ack inside → largest-acked it reported.
    sent_acks: std::collections::BTreeMap<u64, u64>,
}

impl Default for AckTracker {
    fn default() -> Self {
        AckTracker {
            received: RangeSet::new(),
            dirty: false,
            largest_received_at: None,
            sent_acks: std::collections::BTreeMap::new(),
        }
    }
}

impl AckTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ack-eliciting packet as received at `now`.
    pub fn on_packet_received(&mut self, packet_number: u64, ack_eliciting: bool, now: Instant) {
        if !ack_eliciting {
            return;
        }
        self.received.insert(packet_number..packet_number + 1);
        self.dirty = true;

        let is_new_largest = self.received.last() == Some(packet_number);
        if is_new_largest {
            self.largest_received_at = Some(now);
        }
    }

    pub fn has_new_ack(&self) -> bool {
        self.dirty
    }

    pub fn has_any_ack(&self) -> bool {
        !self.received.is_empty()
    }

    /// Collapses the received set into an `AckFrame` and remembers which
    /// outgoing packet carried it, so a later `on_peer_ack_of_our_packet`
    /// can retire everything that ack covered. Returns `None` if the
    /// received set is empty; callers must check `has_any_ack()` first.
    pub fn generate_ack(&mut self, current_packet_number: u64, now: Instant) -> Option<AckFrame> {
        let largest_acked = self.received.last()?;
        let ranges = self.received.descending_intervals();

        let ack_delay_us = self
            .largest_received_at
            .and_then(|t| now.checked_duration_since(t))
            .unwrap_or(Duration::ZERO)
            .as_micros() as u64;

        self.sent_acks.insert(current_packet_number, largest_acked);
        self.dirty = false;

        Some(AckFrame {
            ranges,
            ack_delay_us,
        })
    }

    /// The peer has acked `our_packet_number`; if that packet carried an
    /// ack frame, every number it covered no longer needs advertising.
    pub fn on_peer_ack_of_our_packet(&mut self, our_packet_number: u64) {
        if let Some(largest_acked) = self.sent_acks.remove(&our_packet_number) {
            self.received.remove_up_to(largest_acked + 1);
        }
    }
}
