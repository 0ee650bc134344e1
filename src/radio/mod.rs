//! Radio driver abstraction

pub mod traits;

pub use traits::{RadioDriver, RadioError, RxPacket};
