// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! Packet composition, pacing admission and dispatch.
//!
//! Realized as a dedicated OS thread reading off a `crossbeam_channel`
//! work queue. The sender loop itself (`run`) is a thin blocking wrapper
//! around the non-blocking `pump`, which makes the admission/dispatch
//! logic directly unit-testable without relying on real thread
//! scheduling.

pub mod collaborators;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::error;
use log::trace;
use smallvec::SmallVec;

use crate::ack_tracker::AckTracker;
use crate::config::CoreConfig;
use crate::congestion::CongestionControl;
use crate::congestion::NewReno;
use crate::congestion::SettledPacket;
use crate::error::Error;
use crate::frame::AckFrame;
use crate::frame::Frame;
use crate::packet::Epoch;
use crate::packet::PacketId;
use crate::packet::PerEpoch;
use crate::rtt::RttEstimator;
use crate::sync::WakeSignal;

use collaborators::ClockSource;
use collaborators::DatagramSink;
use collaborators::LossDetection;
use collaborators::PacketEncoder;
use collaborators::SentSummary;

/// Lifecycle state. Start transitions Idle→Running after secrets are
/// installed; shutdown transitions Running→Stopping→Stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransmitterState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// What became of a dispatched, in-flight-tracked packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Acked,
    Lost,
}

/// A packet handed to `Transmitter::enqueue`, not yet assigned a packet
/// number. `size` is the caller's estimate of the encoded length, used for
/// congestion admission before encoding actually happens: admission is
/// decided before `PacketEncoder::encode` ever runs, so the size has to be
/// known ahead of time rather than measured after the fact.
pub struct OutgoingPacket {
    pub epoch: Epoch,
    pub in_flight: bool,
    pub size: usize,
    pub frames: SmallVec<[Frame; 1]>,
    ack_eliciting: bool,
    synthesize_ack: bool,
    on_settled: Box<dyn FnOnce(Outcome) + Send>,
}

impl OutgoingPacket {
    pub fn new(
        epoch: Epoch,
        in_flight: bool,
        size: usize,
        frames: SmallVec<[Frame; 1]>,
        on_settled: impl FnOnce(Outcome) + Send + 'static,
    ) -> Self {
        let ack_eliciting = frames.iter().any(Frame::is_ack_eliciting);
        OutgoingPacket {
            epoch,
            in_flight,
            size,
            frames,
            ack_eliciting,
            synthesize_ack: false,
            on_settled: Box::new(on_settled),
        }
    }

    fn probe(epoch: Epoch) -> Self {
        OutgoingPacket::new(epoch, false, 0, SmallVec::new(), |_| {})
    }

    fn ack_only(epoch: Epoch) -> Self {
        let mut packet = OutgoingPacket::new(epoch, false, 0, SmallVec::new(), |_| {});
        packet.synthesize_ack = true;
        packet
    }
}

/// An emitted, not-yet-settled packet, keyed by packet number within its
/// epoch. A single struct rather than a status-tagged record: this crate
/// removes entries on settlement instead of tombstoning them in place.
struct InFlightRecord {
    size: usize,
    send_time: Instant,
    in_flight: bool,
    ack_eliciting: bool,
    on_settled: Box<dyn FnOnce(Outcome) + Send>,
}

impl InFlightRecord {
    fn as_settled(&self) -> SettledPacket {
        SettledPacket {
            size: self.size,
            send_time: self.send_time,
            in_flight: self.in_flight,
        }
    }
}

/// Result of one non-blocking advancement step.
#[derive(Debug)]
pub enum PumpOutcome {
    Sent(PacketId),
    /// The head-of-line packet is waiting on congestion window room.
    Blocked,
    /// Nothing to do right now.
    Idle,
}

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Packet composition, pacing admission and dispatch for one connection.
///
/// Generic over its four external collaborators rather than boxed trait
/// objects, so a single connection's concrete types are monomorphized once
/// at construction.
pub struct Transmitter<Sink, Enc, Clock, Loss>
where
    Sink: DatagramSink,
    Enc: PacketEncoder,
    Clock: ClockSource,
    Loss: LossDetection,
{
    config: CoreConfig,
    sink: Sink,
    encoder: Enc,
    clock: Arc<Clock>,
    loss: Loss,

    congestion: Arc<dyn CongestionControl>,
    wake: Arc<WakeSignal>,
    rtt: Mutex<RttEstimator>,

    ack_trackers: PerEpoch<Mutex<AckTracker>>,
    in_flight: PerEpoch<Mutex<BTreeMap<u64, InFlightRecord>>>,
    next_packet_number: Mutex<[u64; Epoch::COUNT]>,

    pending: Mutex<Option<OutgoingPacket>>,
    normal_tx: crossbeam_channel::Sender<OutgoingPacket>,
    normal_rx: crossbeam_channel::Receiver<OutgoingPacket>,
    urgent_tx: crossbeam_channel::Sender<OutgoingPacket>,
    urgent_rx: crossbeam_channel::Receiver<OutgoingPacket>,

    state: Mutex<TransmitterState>,

    #[cfg(feature = "qlog")]
    qlog_metrics: Mutex<crate::qlog_metrics::QlogMetrics>,
}

impl<Sink, Enc, Clock, Loss> Transmitter<Sink, Enc, Clock, Loss>
where
    Sink: DatagramSink + 'static,
    Enc: PacketEncoder + 'static,
    Clock: ClockSource + 'static,
    Loss: LossDetection + 'static,
{
    pub fn new(config: CoreConfig, sink: Sink, encoder: Enc, clock: Clock, loss: Loss) -> Arc<Self> {
        let wake = Arc::new(WakeSignal::new());
        let congestion: Arc<dyn CongestionControl> = Arc::new(NewReno::new(&config, Arc::clone(&wake)));
        let rtt = RttEstimator::new(config.initial_rtt, config.granularity);

        let (normal_tx, normal_rx) = crossbeam_channel::unbounded();
        let (urgent_tx, urgent_rx) = crossbeam_channel::unbounded();

        Arc::new(Transmitter {
            config,
            sink,
            encoder,
            clock: Arc::new(clock),
            loss,
            congestion,
            wake,
            rtt: Mutex::new(rtt),
            ack_trackers: [
                Mutex::new(AckTracker::new()),
                Mutex::new(AckTracker::new()),
                Mutex::new(AckTracker::new()),
            ],
            in_flight: [
                Mutex::new(BTreeMap::new()),
                Mutex::new(BTreeMap::new()),
                Mutex::new(BTreeMap::new()),
            ],
            next_packet_number: Mutex::new([0; Epoch::COUNT]),
            pending: Mutex::new(None),
            normal_tx,
            normal_rx,
            urgent_tx,
            urgent_rx,
            state: Mutex::new(TransmitterState::Idle),
            #[cfg(feature = "qlog")]
            qlog_metrics: Mutex::new(crate::qlog_metrics::QlogMetrics::default()),
        })
    }

    /// Idle→Running, then spawns the dedicated sender thread.
    pub fn start(self: &Arc<Self>) -> thread::JoinHandle<()> {
        {
            let mut state = self.state.lock().unwrap();
            debug_assert_eq!(*state, TransmitterState::Idle, "start() called twice");
            *state = TransmitterState::Running;
        }
        let this = Arc::clone(self);
        thread::Builder::new()
            .name("transmitter".to_owned())
            .spawn(move || this.run())
            .expect("failed to spawn transmitter thread")
    }

    /// Running→Stopping. The sender thread drains remaining queued work
    /// and exits on its own; join the handle returned by `start` to wait
    /// for it.
    pub fn shutdown(&self) {
        *self.state.lock().unwrap() = TransmitterState::Stopping;
        self.wake.bump();
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn congestion_window(&self) -> usize {
        self.congestion.congestion_window()
    }

    pub fn bytes_in_flight(&self) -> usize {
        self.congestion.bytes_in_flight()
    }

    /// Diffs current RTT/congestion state against the last-emitted qlog
    /// snapshot, returning a `MetricsUpdated` event only if something
    /// changed. `ssthresh` has no generic accessor on `CongestionControl`
    /// and is reported as 0, since the trait doesn't require algorithms to
    /// expose one.
    #[cfg(feature = "qlog")]
    pub fn maybe_qlog(&self) -> Option<qlog::events::EventData> {
        let rtt = self.rtt.lock().unwrap();
        let snapshot = crate::qlog_metrics::Snapshot {
            min_rtt: rtt.min_rtt(),
            smoothed_rtt: rtt.smoothed_rtt(),
            rttvar: rtt.rtt_variance(),
            congestion_window: self.congestion.congestion_window() as u64,
            bytes_in_flight: self.congestion.bytes_in_flight() as u64,
            ssthresh: 0,
        };
        drop(rtt);
        self.qlog_metrics.lock().unwrap().maybe_update(snapshot)
    }

    /// Appends a packet to the waiting queue. Rejected once shutdown has
    /// been requested.
    pub fn enqueue(&self, packet: OutgoingPacket) -> Result<(), Error> {
        self.enqueue_on(&self.normal_tx, packet)
    }

    fn enqueue_urgent(&self, packet: OutgoingPacket) -> Result<(), Error> {
        self.enqueue_on(&self.urgent_tx, packet)
    }

    fn enqueue_on(
        &self,
        channel: &crossbeam_channel::Sender<OutgoingPacket>,
        packet: OutgoingPacket,
    ) -> Result<(), Error> {
        if self.is_stopping() {
            return Err(Error::EnqueueAfterShutdown);
        }
        channel
            .send(packet)
            .map_err(|_| Error::EnqueueAfterShutdown)?;
        self.wake.bump();
        Ok(())
    }

    /// Bypass-cwnd dispatch to satisfy a probe timeout obligation.
    pub fn send_probe(&self, epoch: Epoch) -> Result<(), Error> {
        self.enqueue_urgent(OutgoingPacket::probe(epoch))
    }

    /// Observation hook for the receive path: records that `packet_number`
    /// arrived in `epoch`.
    pub fn packet_received(&self, epoch: Epoch, packet_number: u64, ack_eliciting: bool) {
        let now = self.clock.now();
        self.ack_trackers[epoch]
            .lock()
            .unwrap()
            .on_packet_received(packet_number, ack_eliciting, now);
    }

    /// Invites the AckTracker to schedule an ack once the receive path has
    /// finished processing an incoming packet. Interrupts any in-progress
    /// `wait_for_update` so acks are not delayed by congestion backpressure.
    pub fn packet_processed(&self, epoch: Epoch) -> Result<(), Error> {
        if !self.ack_trackers[epoch].lock().unwrap().has_new_ack() {
            return Ok(());
        }
        self.enqueue_urgent(OutgoingPacket::ack_only(epoch))
    }

    /// Ack ingestion from the receive path. May run on any thread.
    pub fn process_ack(&self, epoch: Epoch, frame: &AckFrame, receive_time: Instant) {
        let mut in_flight = self.in_flight[epoch].lock().unwrap();

        let largest_acked = frame.largest_acked();
        if let Some(record) = in_flight.get(&largest_acked) {
            if record.ack_eliciting {
                self.rtt.lock().unwrap().add_sample(
                    receive_time,
                    record.send_time,
                    Duration::from_micros(frame.ack_delay_us),
                );
            }
        }

        let mut settled = Vec::new();
        let mut acked_numbers = Vec::new();
        for interval in &frame.ranges {
            let numbers: Vec<u64> = in_flight
                .range(interval.low..=interval.high)
                .map(|(&n, _)| n)
                .collect();
            for number in numbers {
                if let Some(record) = in_flight.remove(&number) {
                    settled.push(record.as_settled());
                    (record.on_settled)(Outcome::Acked);
                    acked_numbers.push(number);
                }
            }
        }
        drop(in_flight);

        if acked_numbers.is_empty() {
            return;
        }

        let mut tracker = self.ack_trackers[epoch].lock().unwrap();
        for number in &acked_numbers {
            tracker.on_peer_ack_of_our_packet(*number);
        }
        drop(tracker);

        self.loss.on_ack_received(epoch, &acked_numbers);
        self.congestion.register_acked(receive_time, &settled);
        trace!(
            "process_ack epoch={:?} acked={} cwnd={}",
            epoch,
            acked_numbers.len(),
            self.congestion.congestion_window()
        );

        #[cfg(feature = "qlog")]
        if let Some(event) = self.maybe_qlog() {
            trace!("qlog metrics_updated: {:?}", event);
        }
    }

    /// Called by the external loss-detection timer when it declares
    /// packets lost.
    pub fn on_lost(&self, epoch: Epoch, packet_numbers: &[u64], now: Instant) {
        let mut in_flight = self.in_flight[epoch].lock().unwrap();
        let mut settled = Vec::new();
        for &number in packet_numbers {
            if let Some(record) = in_flight.remove(&number) {
                settled.push(record.as_settled());
                (record.on_settled)(Outcome::Lost);
            }
        }
        drop(in_flight);

        if settled.is_empty() {
            return;
        }
        self.congestion.on_lost(now, &settled);
        trace!(
            "on_lost epoch={:?} lost={} cwnd={}",
            epoch,
            settled.len(),
            self.congestion.congestion_window()
        );

        #[cfg(feature = "qlog")]
        if let Some(event) = self.maybe_qlog() {
            trace!("qlog metrics_updated: {:?}", event);
        }
    }

    fn is_stopping(&self) -> bool {
        matches!(
            *self.state.lock().unwrap(),
            TransmitterState::Stopping | TransmitterState::Stopped
        )
    }

    fn is_drained(&self) -> bool {
        self.pending.lock().unwrap().is_none()
            && self.urgent_rx.is_empty()
            && self.normal_rx.is_empty()
    }

    /// One non-blocking advancement step: services the urgent queue first,
    /// then a pending or freshly-dequeued normal packet. Never blocks —
    /// the blocking wrapper is `run`.
    pub fn pump(&self) -> Result<PumpOutcome, Error> {
        // Urgent packets bypass cwnd admission entirely, so they must jump
        // ahead of a pending packet still waiting on window room.
        if let Ok(packet) = self.urgent_rx.try_recv() {
            return self.dispatch(packet);
        }

        if let Some(packet) = self.pending.lock().unwrap().take() {
            return self.admit_or_dispatch(packet);
        }

        match self.normal_rx.try_recv() {
            Ok(packet) => self.admit_or_dispatch(packet),
            Err(_) => Ok(PumpOutcome::Idle),
        }
    }

    fn admit_or_dispatch(&self, packet: OutgoingPacket) -> Result<PumpOutcome, Error> {
        if packet.in_flight && !self.congestion.can_send(packet.size) {
            *self.pending.lock().unwrap() = Some(packet);
            return Ok(PumpOutcome::Blocked);
        }
        self.dispatch(packet)
    }

    fn dispatch(&self, mut packet: OutgoingPacket) -> Result<PumpOutcome, Error> {
        let epoch = packet.epoch;

        if packet.synthesize_ack && !self.ack_trackers[epoch].lock().unwrap().has_any_ack() {
            debug!("dropping stale ack-only packet for {:?}: nothing left to say", epoch);
            return Ok(PumpOutcome::Idle);
        }

        let number = {
            let mut next = self.next_packet_number.lock().unwrap();
            let n = next[epoch];
            next[epoch] = n + 1;
            n
        };

        if packet.synthesize_ack {
            let now = self.clock.now();
            let mut tracker = self.ack_trackers[epoch].lock().unwrap();
            if let Some(ack_frame) = tracker.generate_ack(number, now) {
                packet.frames.push(Frame::Ack(ack_frame));
            }
        }
        packet.ack_eliciting = packet.frames.iter().any(Frame::is_ack_eliciting);

        let send_time = self.clock.now();
        let bytes = self.encoder.encode(&packet, number)?;
        self.sink.send(&bytes)?;

        if packet.in_flight {
            self.congestion.register_in_flight(&SettledPacket {
                size: packet.size,
                send_time,
                in_flight: true,
            });
        }

        self.loss.on_packet_sent(&SentSummary {
            epoch,
            number,
            send_time,
            size: packet.size,
            in_flight: packet.in_flight,
            ack_eliciting: packet.ack_eliciting,
        });

        let record = InFlightRecord {
            size: packet.size,
            send_time,
            in_flight: packet.in_flight,
            ack_eliciting: packet.ack_eliciting,
            on_settled: packet.on_settled,
        };
        self.in_flight[epoch].lock().unwrap().insert(number, record);

        trace!(
            "dispatch epoch={:?} number={} size={} in_flight={} ack_eliciting={}",
            epoch,
            number,
            packet.size,
            packet.in_flight,
            packet.ack_eliciting
        );

        Ok(PumpOutcome::Sent(PacketId::new(epoch, number)))
    }

    /// The blocking sender loop. Intended to run on its own thread (see
    /// `start`); exposed directly so tests can drive it deterministically
    /// alongside `pump`.
    pub fn run(&self) {
        loop {
            match self.pump() {
                Ok(PumpOutcome::Sent(_)) => continue,
                Ok(PumpOutcome::Blocked) => self.congestion.wait_for_update(IDLE_POLL_INTERVAL),
                Ok(PumpOutcome::Idle) => {
                    if self.is_stopping() && self.is_drained() {
                        break;
                    }
                    self.wake.wait_timeout(IDLE_POLL_INTERVAL);
                },
                Err(err) => {
                    error!("sender loop terminating: {err}");
                    break;
                },
            }
        }
        *self.state.lock().unwrap() = TransmitterState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TestClock;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        sent: StdMutex<Vec<Vec<u8>>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                sent: StdMutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl DatagramSink for RecordingSink {
        fn send(&self, datagram: &[u8]) -> Result<(), Error> {
            self.sent.lock().unwrap().push(datagram.to_vec());
            Ok(())
        }
    }

    struct LengthEncoder;

    impl PacketEncoder for LengthEncoder {
        fn encode(&self, packet: &OutgoingPacket, packet_number: u64) -> Result<Vec<u8>, Error> {
            let mut bytes = vec![0u8; packet.size.max(1)];
            bytes[0] = (packet_number % 256) as u8;
            Ok(bytes)
        }
    }

    struct NoopLoss;

    impl LossDetection for NoopLoss {
        fn on_packet_sent(&self, _sent: &SentSummary) {}
        fn on_ack_received(&self, _epoch: Epoch, _acked_numbers: &[u64]) {}
    }

    fn transmitter(
        initial_window: usize,
    ) -> Arc<Transmitter<RecordingSink, LengthEncoder, TestClock, NoopLoss>> {
        let config = CoreConfig {
            initial_window,
            ..CoreConfig::default()
        };
        Transmitter::new(config, RecordingSink::new(), LengthEncoder, TestClock::new(), NoopLoss)
    }

    fn in_flight_packet(epoch: Epoch, size: usize, settled: Arc<AtomicUsize>) -> OutgoingPacket {
        OutgoingPacket::new(epoch, true, size, SmallVec::new(), move |_outcome| {
            settled.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn s1_single_send_under_open_window() {
        let t = transmitter(1250);
        let settled = Arc::new(AtomicUsize::new(0));
        t.enqueue(in_flight_packet(Epoch::Application, 1240, settled)).unwrap();

        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_)));
        assert_eq!(t.sink.count(), 1);
        assert_eq!(t.bytes_in_flight(), 1240);
    }

    #[test]
    fn s2_congestion_backpressure_released_by_ack() {
        let t = transmitter(1250);
        let s0 = Arc::new(AtomicUsize::new(0));
        let s1 = Arc::new(AtomicUsize::new(0));
        t.enqueue(in_flight_packet(Epoch::Application, 1240, s0)).unwrap();
        t.enqueue(in_flight_packet(Epoch::Application, 1240, s1)).unwrap();

        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_)));
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Blocked));
        assert_eq!(t.sink.count(), 1);

        let ack = AckFrame {
            ranges: vec![crate::ranges::AckInterval { low: 0, high: 0 }],
            ack_delay_us: 0,
        };
        t.process_ack(Epoch::Application, &ack, t.clock.now());

        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_)));
        assert_eq!(t.sink.count(), 2);
    }

    #[test]
    fn s3_cross_epoch_ack_isolation() {
        let t = transmitter(1250);
        let s_init = Arc::new(AtomicUsize::new(0));
        let s_app0 = Arc::new(AtomicUsize::new(0));
        let s_app1 = Arc::new(AtomicUsize::new(0));
        t.enqueue(in_flight_packet(Epoch::Initial, 12, s_init)).unwrap();
        t.enqueue(in_flight_packet(Epoch::Application, 1230, s_app0)).unwrap();
        t.enqueue(in_flight_packet(Epoch::Application, 1230, s_app1)).unwrap();

        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_))); // initial packet
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_))); // first app packet
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Blocked)); // second app packet
        assert_eq!(t.sink.count(), 2);

        let ack = AckFrame {
            ranges: vec![crate::ranges::AckInterval { low: 0, high: 0 }],
            ack_delay_us: 0,
        };
        t.process_ack(Epoch::Initial, &ack, t.clock.now());

        // initial-epoch ack must not free application-epoch window.
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Blocked));
        assert_eq!(t.sink.count(), 2);
    }

    #[test]
    fn s4_urgent_ack_bypass() {
        let t = transmitter(1212);
        let s0 = Arc::new(AtomicUsize::new(0));
        let s1 = Arc::new(AtomicUsize::new(0));
        t.enqueue(in_flight_packet(Epoch::Application, 1200, s0)).unwrap();
        t.enqueue(in_flight_packet(Epoch::Application, 1200, s1)).unwrap();

        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_)));
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Blocked));

        t.packet_received(Epoch::Application, 7, true);
        t.packet_processed(Epoch::Application).unwrap();

        // the urgent ack-only packet jumps the still-blocked in-flight one.
        assert!(matches!(t.pump().unwrap(), PumpOutcome::Sent(_)));
        assert_eq!(t.sink.count(), 2);
        assert_eq!(t.bytes_in_flight(), 1200);
    }

    #[test]
    fn s6_duplicate_ack_is_a_no_op() {
        let t = transmitter(1250);
        let settled = Arc::new(AtomicUsize::new(0));
        t.enqueue(in_flight_packet(Epoch::Application, 1240, settled.clone())).unwrap();
        t.pump().unwrap();
        assert_eq!(t.bytes_in_flight(), 1240);

        let ack = AckFrame {
            ranges: vec![crate::ranges::AckInterval { low: 0, high: 0 }],
            ack_delay_us: 0,
        };
        t.process_ack(Epoch::Application, &ack, t.clock.now());
        assert_eq!(t.bytes_in_flight(), 0);
        assert_eq!(settled.load(Ordering::SeqCst), 1);

        // a duplicate ack of the same, already-retired packet number.
        t.process_ack(Epoch::Application, &ack, t.clock.now());
        assert_eq!(t.bytes_in_flight(), 0);
        assert_eq!(settled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn packet_numbers_increase_strictly_per_epoch() {
        let t = transmitter(100_000);
        for _ in 0..5 {
            let settled = Arc::new(AtomicUsize::new(0));
            t.enqueue(in_flight_packet(Epoch::Application, 100, settled)).unwrap();
        }
        let mut numbers = Vec::new();
        for _ in 0..5 {
            if let PumpOutcome::Sent(id) = t.pump().unwrap() {
                numbers.push(id.number);
            }
        }
        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn enqueue_after_shutdown_is_rejected() {
        let t = transmitter(1250);
        t.shutdown();
        let settled = Arc::new(AtomicUsize::new(0));
        let err = t.enqueue(in_flight_packet(Epoch::Application, 100, settled));
        assert_eq!(err, Err(Error::EnqueueAfterShutdown));
    }
}
