//! Gateway control loop
//!
//! One [`Gateway::run_tick`] call makes one scheduling decision: poll the
//! next transceiver in the idle time between transmitter windows, or commit
//! to listening for the imminent scheduled transmission. Every branch drains
//! the driver's receive buffer through the same classification pass, so
//! traffic from other devices is never dropped while waiting on one of them.

use crate::clock::Clock;
use crate::commands::{Command, CommandOutcome};
use crate::config::limits::{MAX_TRANSCEIVERS, MAX_TRANSMITTERS};
use crate::config::{polling, timing};
use crate::devices::{
    DeviceKind, DeviceRecord, DeviceTable, TransceiverRecord, TransmitterRecord,
};
use crate::radio::RadioDriver;
use crate::report::{ReportMode, Reporter};
use log::{debug, info, warn};

/// The scheduling-and-classification state machine.
///
/// Owns both device tables and all timing state; collaborators (driver,
/// clock, reporter) are injected. All mutation happens from within a single
/// tick's execution, so the receive buffer is the only concurrent boundary.
pub struct Gateway<R: RadioDriver, C: Clock, P: Reporter> {
    radio: R,
    clock: C,
    reporter: P,
    transmitters: DeviceTable<TransmitterRecord, MAX_TRANSMITTERS>,
    transceivers: DeviceTable<TransceiverRecord, MAX_TRANSCEIVERS>,
    auto_pair: bool,
    pair_target: Option<u32>,
    report_mode: ReportMode,
    /// Consecutive failed polls of the transceiver at the cursor
    retries: u8,
    /// When the cursor last left position 0 to begin a polling round
    round_started_ms: u64,
    /// Transceiver admission awaiting its round-trip confirmation
    pending_admit: Option<u32>,
}

impl<R: RadioDriver, C: Clock, P: Reporter> Gateway<R, C, P> {
    pub fn new(radio: R, clock: C, reporter: P) -> Self {
        Self {
            radio,
            clock,
            reporter,
            transmitters: DeviceTable::new(),
            transceivers: DeviceTable::new(),
            auto_pair: true,
            pair_target: None,
            report_mode: ReportMode::AllValid,
            retries: 0,
            round_started_ms: 0,
            pending_admit: None,
        }
    }

    /// Known periodic transmitters, for operator listings
    pub fn transmitters(&self) -> &DeviceTable<TransmitterRecord, MAX_TRANSMITTERS> {
        &self.transmitters
    }

    /// Known polled transceivers, for operator listings
    pub fn transceivers(&self) -> &DeviceTable<TransceiverRecord, MAX_TRANSCEIVERS> {
        &self.transceivers
    }

    /// Run the control loop forever.
    pub async fn run(&mut self) -> ! {
        loop {
            self.run_tick().await;
            self.clock.sleep_ms(timing::TICK_INTERVAL_MS).await;
        }
    }

    /// One control-loop tick.
    ///
    /// With no transmitters there is nothing to listen for, so every tick
    /// polls. Otherwise transceivers get the slack before the next predicted
    /// transmission; once the window deadline is close the tick commits to
    /// listening. A poll's own timeout is small enough to finish before the
    /// deadline, but it is never preempted once started.
    pub async fn run_tick(&mut self) {
        let window_due = match self.transmitters.current() {
            Some(tx) => self.clock.now_ms() + u64::from(timing::TX_WINDOW_MS / 2) >= tx.eta_ms(),
            None => false,
        };

        if window_due {
            self.listen_for_transmitter().await;
        } else {
            self.poll_next_transceiver().await;
        }

        // Always flush whatever else arrived during the branch
        self.process_buffer(None);

        self.service_pending_admit().await;
    }

    /// Poll the transceiver at the cursor and wait for its reply.
    async fn poll_next_transceiver(&mut self) {
        let id = match self.transceivers.current() {
            Some(rec) => rec.id(),
            None => return,
        };

        // Don't continually re-poll: once a full round has completed, hold
        // off until the sample period elapses. An in-progress retry sequence
        // proceeds regardless, so a failing device is retried promptly.
        if self.transceivers.cursor() == 0 {
            let now = self.clock.now_ms();
            if now < self.round_started_ms + timing::SAMPLE_PERIOD_MS && self.retries == 0 {
                return;
            }
            self.round_started_ms = now;
        }

        if let Err(e) = self.radio.poll(id).await {
            warn!("poll command to transceiver {} failed: {:?}", id, e);
        }

        if self.wait_for_ident(id, timing::TRX_REPLY_TIMEOUT_MS).await {
            self.transceivers.advance();
            self.retries = 0;
        } else if self.retries < polling::MAX_RETRIES {
            debug!(
                "no response from transceiver {}, retries={}, retrying",
                id, self.retries
            );
            self.retries += 1;
        } else {
            info!("no response from transceiver {} after retrying, giving up", id);
            self.transceivers.advance();
            self.retries = 0;
        }
    }

    /// Hold the listening window open for the current transmitter.
    async fn listen_for_transmitter(&mut self) {
        let (id, eta) = match self.transmitters.current() {
            Some(rec) => (rec.id(), rec.eta_ms()),
            None => return,
        };

        debug!("window open, expecting {} at {}", id, eta);
        let heard = self.wait_for_ident(id, timing::TX_WINDOW_MS).await;
        debug!("window closed, heard={}", heard);

        if !heard {
            // Looked up by identity: classification may have advanced the
            // cursor mid-wait if another known transmitter got through.
            let now = self.clock.now_ms();
            if let Some(rec) = self.transmitters.find_mut(id) {
                rec.mark_missed(now);
            }
        }
    }

    /// Block until a packet from `target` arrives or `timeout_ms` elapses.
    ///
    /// Every drain pass processes the whole buffer with full side effects;
    /// the channel is shared, so ignoring non-target traffic here would
    /// silently drop data and pairing requests from every other device.
    async fn wait_for_ident(&mut self, target: u32, timeout_ms: u32) -> bool {
        let deadline = self.clock.now_ms() + u64::from(timeout_ms);
        loop {
            if self.process_buffer(Some(target)) {
                return true;
            }
            if self.clock.now_ms() >= deadline {
                return false;
            }
            self.clock.sleep_ms(timing::DRAIN_INTERVAL_MS).await;
        }
    }

    /// Drain and classify every completed packet in the receive buffer.
    ///
    /// Returns whether a well-formed packet bearing `target`'s identity was
    /// seen; with a `target` of `None` the pass exists purely to flush.
    fn process_buffer(&mut self, target: Option<u32>) -> bool {
        let mut matched = false;

        for packet in self.radio.take_completed() {
            if !packet.well_formed {
                info!("rx'd broken packet");
                if self.report_mode == ReportMode::All {
                    self.reporter.broken(&packet.bytes);
                }
                continue;
            }

            let id = packet.source_id;
            if target == Some(id) {
                matched = true;
            }

            // Pairing requests take priority over data handling
            if packet.pairing_request {
                self.on_pairing_request(packet.kind, id);
                continue;
            }

            match packet.kind {
                DeviceKind::Transmitter => {
                    let now = self.clock.now_ms();
                    if let Some(rec) = self.transmitters.find_mut(id) {
                        rec.update(now, &packet.bytes);
                        self.reporter.data(id, &packet.bytes);
                        self.transmitters.advance();
                    } else {
                        info!("rx'd packet from unknown transmitter {}", id);
                        if self.report_mode >= ReportMode::AllValid {
                            self.reporter.data(id, &packet.bytes);
                        }
                    }
                }
                DeviceKind::Transceiver => {
                    if let Some(rec) = self.transceivers.find_mut(id) {
                        rec.update(&packet.bytes);
                        self.reporter.data(id, &packet.bytes);
                    } else {
                        info!("rx'd packet from unknown transceiver {}", id);
                        if self.report_mode >= ReportMode::AllValid {
                            self.reporter.data(id, &packet.bytes);
                        }
                    }
                }
            }
        }

        matched
    }

    /// Decide what to do with a classified pairing request.
    fn on_pairing_request(&mut self, kind: DeviceKind, id: u32) {
        let already_paired = match kind {
            DeviceKind::Transmitter => self.transmitters.find(id).is_some(),
            DeviceKind::Transceiver => self.transceivers.find(id).is_some(),
        };
        if already_paired {
            return;
        }

        if self.auto_pair {
            self.pair_target = Some(id);
            self.admit(kind, id);
        } else if self.pair_target == Some(id) {
            self.admit(kind, id);
        } else {
            self.reporter.pairing_request(id);
        }
    }

    /// Admit step. Transmitters are appended outright: the packet that
    /// requested pairing already proves the device transmits. A transceiver
    /// is useless unless it answers polls, so its admission is queued for a
    /// round-trip confirmation at the end of the tick.
    fn admit(&mut self, kind: DeviceKind, id: u32) {
        match kind {
            DeviceKind::Transmitter => {
                let accepted = match self.transmitters.append(id) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("could not pair transmitter {}: {:?}", id, e);
                        false
                    }
                };
                self.reporter.pairing_result(id, accepted);
                self.pair_target = None;
            }
            DeviceKind::Transceiver => {
                if self.pending_admit.is_none() {
                    self.pending_admit = Some(id);
                } else {
                    // One admission at a time; the device will re-announce
                    debug!("pairing in progress, ignoring request from {}", id);
                }
            }
        }
    }

    /// Resolve a queued transceiver admission: acknowledge, poll, and append
    /// only if the device answers within the pairing timeout. A silent
    /// device stays unpaired until it repeats its own request.
    async fn service_pending_admit(&mut self) {
        let Some(id) = self.pending_admit.take() else {
            return;
        };

        if let Err(e) = self.radio.acknowledge(id).await {
            warn!("acknowledge to transceiver {} failed: {:?}", id, e);
        }
        if let Err(e) = self.radio.poll(id).await {
            warn!("poll to transceiver {} failed: {:?}", id, e);
        }

        let confirmed = self.wait_for_ident(id, timing::PAIR_REPLY_TIMEOUT_MS).await;
        let accepted = if confirmed {
            match self.transceivers.append(id) {
                Ok(()) => true,
                Err(e) => {
                    warn!("could not pair transceiver {}: {:?}", id, e);
                    false
                }
            }
        } else {
            info!("transceiver {} did not answer the pairing poll", id);
            false
        };

        self.reporter.pairing_result(id, accepted);
        self.pair_target = None;
    }

    /// Apply an operator command to the scheduler state.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::AutoPairOn => {
                self.auto_pair = true;
                CommandOutcome::AutoPairEnabled
            }
            Command::AutoPairOff => {
                self.auto_pair = false;
                CommandOutcome::AutoPairDisabled
            }
            Command::PairWith(id) => {
                if self.auto_pair {
                    CommandOutcome::ManualModeRequired
                } else {
                    self.pair_target = Some(id);
                    CommandOutcome::PairTargetArmed(id)
                }
            }
            Command::SetReportMode(mode) => {
                self.report_mode = mode;
                CommandOutcome::ReportModeSet(mode)
            }
            Command::AddTransmitter(id) => match self.transmitters.append(id) {
                Ok(()) => CommandOutcome::TransmitterAdded(id),
                Err(e) => CommandOutcome::AppendRejected(e),
            },
            Command::ClearTransmitters => {
                self.transmitters.clear();
                CommandOutcome::TransmittersCleared
            }
            Command::ClearTransceivers => {
                self.transceivers.clear();
                // The counter referred to an entry that no longer exists
                self.retries = 0;
                CommandOutcome::TransceiversCleared
            }
        }
    }
}
