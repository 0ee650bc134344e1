//! Operator command and outcome types
//!
//! # Console grammar
//!
//! Commands arrive one per line: a single-letter verb, optionally followed by
//! a whitespace-separated decimal argument.
//!
//! | Line     | Command                                        |
//! |----------|------------------------------------------------|
//! | `a`      | Enable auto-pair mode                          |
//! | `m`      | Manual pairing mode                            |
//! | `p <id>` | Arm the pairing target (manual mode only)      |
//! | `k`      | Report payloads from known devices only        |
//! | `u`      | Report every valid payload                     |
//! | `b`      | Report everything, including broken packets    |
//! | `n <id>` | Add a transmitter without a pairing handshake  |
//! | `c t`    | Clear the transmitter table                    |
//! | `c x`    | Clear the transceiver table                    |

use crate::devices::AppendError;
use crate::report::ReportMode;

/// Parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Admit pairing requests automatically
    AutoPairOn,
    /// Require an armed target before admitting
    AutoPairOff,
    /// Arm the pairing target for one admission
    PairWith(u32),
    /// Change diagnostic verbosity
    SetReportMode(ReportMode),
    /// Append a transmitter directly, bypassing the handshake
    AddTransmitter(u32),
    /// Drop every known transmitter
    ClearTransmitters,
    /// Drop every known transceiver
    ClearTransceivers,
}

/// Why a command line could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Verb not in the grammar
    UnknownCommand,
    /// Verb requires an argument that was not supplied
    MissingArgument,
    /// Argument present but not a valid decimal identity / table name
    InvalidArgument,
}

/// Result of applying a [`Command`] to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    AutoPairEnabled,
    AutoPairDisabled,
    /// The pairing target is armed for the next matching request
    PairTargetArmed(u32),
    /// `p` was issued while auto-pair mode is on
    ManualModeRequired,
    ReportModeSet(ReportMode),
    TransmitterAdded(u32),
    /// Manual append refused by the table
    AppendRejected(AppendError),
    TransmittersCleared,
    TransceiversCleared,
}
