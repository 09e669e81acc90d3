//! Gesture detectors that run inside a [`pointer_input`](crate::Modifier::pointer_input) task.

mod tap_gesture_detector;

pub use tap_gesture_detector::{detect_tap_gestures, PressGuard, TapGestureHandlers};
