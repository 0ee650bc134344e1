//! Injected time source for the scheduler's bounded waits
//!
//! The control loop never reads wall-clock time directly; everything timing
//! related goes through this trait so tests can simulate elapsed time and
//! response arrival without real delay.

use core::future::Future;

/// Monotonic millisecond clock.
///
/// The clock is assumed not to roll over within any single wait duration
/// used by the gateway.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch (typically boot)
    fn now_ms(&self) -> u64;

    /// Suspend for at least `ms` milliseconds
    fn sleep_ms(&self, ms: u32) -> impl Future<Output = ()>;
}

/// Clock backed by the embassy time driver.
#[cfg(feature = "embedded")]
pub struct EmbassyClock;

#[cfg(feature = "embedded")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    async fn sleep_ms(&self, ms: u32) {
        embassy_time::Timer::after_millis(u64::from(ms)).await;
    }
}

#[cfg(test)]
pub mod mock {
    //! Simulated clock for testing

    use super::Clock;
    use core::cell::Cell;

    /// Clock whose sleeps advance simulated time instantly.
    pub struct SimClock {
        now: Cell<u64>,
    }

    impl SimClock {
        /// Create a clock reading `start_ms`
        pub fn new(start_ms: u64) -> Self {
            Self {
                now: Cell::new(start_ms),
            }
        }

        /// Move simulated time forward
        pub fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for SimClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        async fn sleep_ms(&self, ms: u32) {
            self.advance(u64::from(ms));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sleep_advances_time() {
            let clock = SimClock::new(1_000);

            futures::executor::block_on(async {
                clock.sleep_ms(250).await;
            });

            assert_eq!(clock.now_ms(), 1_250);
        }
    }
}
