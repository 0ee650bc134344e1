//! Radio driver trait for abstraction and testability
//!
//! The gateway core never touches the transceiver hardware. Physical
//! reception, per-byte packet assembly and checksum validation all happen in
//! the driver; the core sees a buffer of decoded packets plus two addressed
//! commands. This trait lets the real driver be swapped with a mock in tests.

use crate::config::limits::{MAX_PACKET_BYTES, RX_BUFFER_SLOTS};
use crate::devices::DeviceKind;
use core::future::Future;
use heapless::Vec;

/// Errors that can occur when issuing a radio command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// The command could not be written to the transceiver
    CommandFailed,
    /// The transceiver is mid-operation and cannot accept a command
    Busy,
}

/// One decoded packet out of the driver's receive buffer.
///
/// When `well_formed` is false the packet failed the driver's integrity
/// checks: `source_id`, `kind` and `pairing_request` carry no meaning and
/// only the raw `bytes` may be consumed (for diagnostics).
#[derive(Debug, Clone)]
pub struct RxPacket {
    /// Address of the device that sent the packet
    pub source_id: u32,
    /// Which device class produced it
    pub kind: DeviceKind,
    /// Unsolicited request for admission into the known-device tables
    pub pairing_request: bool,
    /// Passed the driver's checksum/format validation
    pub well_formed: bool,
    /// Decoded payload, opaque to the core
    pub bytes: Vec<u8, MAX_PACKET_BYTES>,
}

impl RxPacket {
    /// Well-formed data packet
    pub fn data(source_id: u32, kind: DeviceKind, payload: &[u8]) -> Self {
        let mut bytes = Vec::new();
        let _ = bytes.extend_from_slice(payload);
        Self {
            source_id,
            kind,
            pairing_request: false,
            well_formed: true,
            bytes,
        }
    }

    /// Well-formed pairing request
    pub fn pairing(source_id: u32, kind: DeviceKind) -> Self {
        Self {
            pairing_request: true,
            ..Self::data(source_id, kind, &[])
        }
    }

    /// Packet that failed validation; only the raw bytes survive
    pub fn broken(raw: &[u8]) -> Self {
        let mut bytes = Vec::new();
        let _ = bytes.extend_from_slice(raw);
        Self {
            source_id: 0,
            kind: DeviceKind::Transmitter,
            pairing_request: false,
            well_formed: false,
            bytes,
        }
    }
}

/// Abstract radio driver interface.
///
/// Command methods are async because the underlying transceiver is driven
/// over a serial bus; failures are reported but the gateway absorbs them.
pub trait RadioDriver {
    /// Address a transceiver so it answers with its current reading
    fn poll(&mut self, id: u32) -> impl Future<Output = Result<(), RadioError>>;

    /// Confirm a pairing to a transceiver
    fn acknowledge(&mut self, id: u32) -> impl Future<Output = Result<(), RadioError>>;

    /// Drain every currently completed packet, in buffer-slot order.
    ///
    /// Ownership of the returned packets is the release operation: the
    /// drained slots go back to the driver's free pool immediately.
    fn take_completed(&mut self) -> Vec<RxPacket, RX_BUFFER_SLOTS>;
}
