//! Monotonic uptime source for hosts that feed real pointer events.

use web_time::Instant;

/// Millisecond uptime measured from the moment the clock was created.
///
/// Pointer events and frame ticks are stamped with these values so that the
/// gesture detectors can compare them against their timeouts.
///
/// ```
/// use clicks_foundation::{Point, PointerEvent, PointerEventKind, SystemUptime};
///
/// let clock = SystemUptime::new();
/// let down = PointerEvent::new(PointerEventKind::Down, Point::ZERO)
///     .with_uptime(clock.now_millis());
/// assert!(down.uptime <= clock.now_millis());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SystemUptime {
    origin: Instant,
}

impl SystemUptime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for SystemUptime {
    fn default() -> Self {
        Self::new()
    }
}
