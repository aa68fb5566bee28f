// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

use std::fmt;

/// An error in the transmission/reassembly/ack core.
///
/// Mirrors the wider quiche `Error` enum's shape: `Done` is a sentinel for
/// "nothing to do" conditions rather than a hard failure, and is typically
/// matched separately from the fatal variants below.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Nothing to do: e.g. `AckTracker::generate_ack` called with an empty
    /// received set, or an ack referencing only already-retired packets.
    Done,

    /// The datagram sink returned an I/O error. Connection-fatal: the
    /// sender loop that observes this exits.
    DatagramSend(String),

    /// `enqueue` was called after `shutdown()` had already been requested.
    EnqueueAfterShutdown,

    /// The reassembly buffer has more bytes queued than its configured
    /// ceiling allows. Backpressure, not data loss: the caller should stop
    /// accepting new elements until the application reads more out.
    ReassemblyOverflow { buffered: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Done => write!(f, "done"),
            Error::DatagramSend(reason) => write!(f, "datagram send failed: {reason}"),
            Error::EnqueueAfterShutdown => write!(f, "enqueue after shutdown"),
            Error::ReassemblyOverflow { buffered } => {
                write!(f, "reassembly buffer overflow: {buffered} bytes buffered")
            },
        }
    }
}

impl std::error::Error for Error {}
