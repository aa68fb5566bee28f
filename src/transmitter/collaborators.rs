// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! External collaborator traits: everything the transmission core consumes
//! from the handshake/wire-encoding/socket layers it doesn't itself
//! implement.

use std::time::Instant;

use crate::error::Error;
use crate::packet::Epoch;

use super::OutgoingPacket;

pub use crate::time::ClockSource;

/// Hands an already-encoded datagram to the network. Key material and
/// framing live entirely on the other side of this boundary.
pub trait DatagramSink: Send + Sync {
    fn send(&self, datagram: &[u8]) -> Result<(), Error>;
}

/// Opaque framing/encryption. What "keys" an encoder needs to do this is
/// its own concern; the core only ever hands it a packet and the number
/// assigned to it.
pub trait PacketEncoder: Send + Sync {
    fn encode(&self, packet: &OutgoingPacket, packet_number: u64) -> Result<Vec<u8>, Error>;
}

/// Enough of a dispatched packet for an external loss-detection timer to
/// arm itself, without exposing the settlement callback it doesn't own.
#[derive(Clone, Copy, Debug)]
pub struct SentSummary {
    pub epoch: Epoch,
    pub number: u64,
    pub send_time: Instant,
    pub size: usize,
    pub in_flight: bool,
    pub ack_eliciting: bool,
}

/// Arms/disarms loss-detection timers and reports expired ones back via
/// `Transmitter::on_lost`.
pub trait LossDetection: Send + Sync {
    fn on_packet_sent(&self, sent: &SentSummary);
    fn on_ack_received(&self, epoch: Epoch, acked_numbers: &[u64]);
}
