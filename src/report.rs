//! Diagnostic output collaborator
//!
//! The gateway describes *what* happened; rendering it for a human (or a
//! host process) is the reporter's business. Verbosity gating stays in the
//! gateway so every implementation sees the same traffic.

use log::info;

/// What the reporter is allowed to see.
///
/// The ordering matters: each level includes everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportMode {
    /// Payloads from paired devices only
    KnownOnly,
    /// Every well-formed payload, paired or not
    AllValid,
    /// Everything, including the raw bytes of broken packets
    All,
}

/// Sink for gateway events.
pub trait Reporter {
    /// A well-formed payload from `source_id`
    fn data(&mut self, source_id: u32, payload: &[u8]);

    /// Raw bytes of a packet that failed validation
    fn broken(&mut self, bytes: &[u8]);

    /// A pairing request the operator must act on (manual mode, unarmed)
    fn pairing_request(&mut self, source_id: u32);

    /// Outcome of a pairing attempt
    fn pairing_result(&mut self, source_id: u32, accepted: bool);
}

/// Reporter that writes through the `log` facade.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn data(&mut self, source_id: u32, payload: &[u8]) {
        info!("{{data: {} {:02x?}}}", source_id, payload);
    }

    fn broken(&mut self, bytes: &[u8]) {
        info!("{{broken: {:02x?}}}", bytes);
    }

    fn pairing_request(&mut self, source_id: u32) {
        info!("{{PR: {}}}", source_id);
    }

    fn pairing_result(&mut self, source_id: u32, accepted: bool) {
        if accepted {
            info!("{{pw: {}}}", source_id);
        } else {
            info!("{{pw: {} rejected}}", source_id);
        }
    }
}
