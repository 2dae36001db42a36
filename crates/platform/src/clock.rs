//! Monotonic time source

use embassy_time::Instant;

/// Monotonic millisecond clock.
///
/// The animation and playback deadlines are expressed in milliseconds since
/// an arbitrary epoch (boot on hardware). Values never decrease.
pub trait Clock {
    /// Milliseconds elapsed since the clock's epoch.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by the Embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
