//! Shared gesture constants for consistent touch/pointer handling.
//!
//! These values are in logical pixels and milliseconds. Hosts that know the
//! device density or the platform long-press timeout should build a
//! [`ViewConfiguration`] instead of relying on the defaults.

/// Drag threshold in logical pixels.
///
/// If the pointer moves more than this distance from the initial press
/// position, a pending tap or long-press is cancelled and no outcome
/// callback fires on release.
///
/// Matches common platform conventions (Android uses ~8dp for
/// ViewConfiguration.TOUCH_SLOP).
pub const DRAG_THRESHOLD: f32 = 8.0;

/// Time a pointer has to stay down before a press turns into a long-press.
pub const LONG_PRESS_TIMEOUT_MILLIS: u64 = 500;

/// Platform thresholds consumed by the gesture detectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfiguration {
    pub long_press_timeout_millis: u64,
    pub touch_slop: f32,
}

impl ViewConfiguration {
    pub const fn new(long_press_timeout_millis: u64, touch_slop: f32) -> Self {
        Self {
            long_press_timeout_millis,
            touch_slop,
        }
    }
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        Self::new(LONG_PRESS_TIMEOUT_MILLIS, DRAG_THRESHOLD)
    }
}
