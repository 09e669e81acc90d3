//! Testing utilities for the clicks modifiers.
//!
//! [`ClicksTestRule`] hosts a single component headlessly with a manual
//! clock; [`TouchInjector`] feeds it touch gestures the way
//! `performTouchInput` does in Jetpack Compose tests.

mod testing;
mod touch_injection;

pub use testing::ClicksTestRule;
pub use touch_injection::{TouchInjector, TouchInputError, CLICK_DURATION_MILLIS};
