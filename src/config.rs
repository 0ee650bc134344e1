//! Timing budgets and capacity limits for the gateway

/// Table and buffer capacities
pub mod limits {
    /// Maximum number of periodic transmitters the gateway can pair with
    pub const MAX_TRANSMITTERS: usize = 5;

    /// Maximum number of polled transceivers the gateway can pair with
    pub const MAX_TRANSCEIVERS: usize = 32;

    /// Receive buffer slots drained per classification pass
    pub const RX_BUFFER_SLOTS: usize = 8;

    /// Maximum decoded packet size in bytes
    pub const MAX_PACKET_BYTES: usize = 24;
}

/// Timing constants, all in milliseconds
pub mod timing {
    /// Minimum gap between completing one full polling round and starting the next
    pub const SAMPLE_PERIOD_MS: u64 = 6_000;

    /// Nominal interval between a periodic transmitter's broadcasts
    pub const TX_PERIOD_MS: u64 = 6_000;

    /// Listening window held open around a transmitter's predicted arrival
    pub const TX_WINDOW_MS: u32 = 1_000;

    /// How long a polled transceiver gets to answer
    pub const TRX_REPLY_TIMEOUT_MS: u32 = 100;

    /// How long a pairing transceiver gets to answer the confirmation poll
    pub const PAIR_REPLY_TIMEOUT_MS: u32 = 100;

    /// Pause between drain passes while waiting for a specific identity
    pub const DRAIN_INTERVAL_MS: u32 = 5;

    /// Pause between control-loop ticks in [`crate::Gateway::run`]
    pub const TICK_INTERVAL_MS: u32 = 10;
}

/// Retry policy for silent transceivers
pub mod polling {
    /// Consecutive re-polls of a silent transceiver before giving up for the round
    pub const MAX_RETRIES: u8 = 2;
}
