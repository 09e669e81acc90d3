//! Tap and long-press classification.
//!
//! [`detect_tap_gestures`] turns the raw pointer stream of one node into at
//! most one outcome per gesture: a tap, a long-press, or nothing when the
//! gesture is cancelled. Press feedback is represented by a [`PressGuard`]
//! owned by the gesture session, so the matching release runs on every exit
//! path, including when the pointer input task itself is dropped.

use crate::modifier::{AwaitPointerEventScope, PointerInputScope};
use clicks_foundation::{Point, PointerEvent, PointerEventKind, PointerId};
use std::fmt;
use std::rc::Rc;

/// Pending release of press feedback.
///
/// Dropping the guard runs the release exactly once.
#[must_use = "dropping a PressGuard releases the press immediately"]
pub struct PressGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl PressGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard without feedback to release.
    pub fn empty() -> Self {
        Self { release: None }
    }

    /// Releases the press now instead of at the end of the scope.
    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for PressGuard {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for PressGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PressGuard")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

/// Callbacks invoked by [`detect_tap_gestures`]. Every callback is optional.
#[derive(Clone, Default)]
pub struct TapGestureHandlers {
    /// Called on pointer down. The returned guard is dropped when the gesture ends.
    pub on_press: Option<Rc<dyn Fn(Point) -> PressGuard>>,
    pub on_tap: Option<Rc<dyn Fn(Point)>>,
    /// When absent, a held pointer never times out into a long-press.
    pub on_long_press: Option<Rc<dyn Fn(Point)>>,
}

impl TapGestureHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_press(mut self, handler: impl Fn(Point) -> PressGuard + 'static) -> Self {
        self.on_press = Some(Rc::new(handler));
        self
    }

    pub fn on_tap(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_tap = Some(Rc::new(handler));
        self
    }

    pub fn on_long_press(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_long_press = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for TapGestureHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapGestureHandlers")
            .field("on_press", &self.on_press.is_some())
            .field("on_tap", &self.on_tap.is_some())
            .field("on_long_press", &self.on_long_press.is_some())
            .finish()
    }
}

/// How a press that did not time out ended.
enum PressOutcome {
    Up(PointerEvent),
    Cancelled,
}

/// Detects taps and long-presses until the surrounding task is cancelled.
///
/// A gesture resolves as a long-press as soon as the pointer has been down
/// for the configured timeout, even if the up event is already queued.
/// The session follows the pointer that went down first; other pointers
/// neither resolve nor cancel it.
pub async fn detect_tap_gestures(scope: PointerInputScope, handlers: TapGestureHandlers) {
    scope
        .await_pointer_event_scope(|scope| async move {
            loop {
                let down = await_first_down(&scope).await;
                let pointer = down.id;
                let origin = down.position;
                let guard = handlers.on_press.as_ref().map(|on_press| on_press(origin));
                let configuration = scope.view_configuration();

                let outcome = match &handlers.on_long_press {
                    Some(_) => {
                        scope
                            .with_timeout_or_null(
                                configuration.long_press_timeout_millis,
                                move |scope| async move {
                                    wait_for_up_or_cancellation(
                                        &scope,
                                        pointer,
                                        origin,
                                        configuration.touch_slop,
                                    )
                                    .await
                                },
                            )
                            .await
                    }
                    None => Some(
                        wait_for_up_or_cancellation(
                            &scope,
                            pointer,
                            origin,
                            configuration.touch_slop,
                        )
                        .await,
                    ),
                };

                match outcome {
                    Some(PressOutcome::Up(up)) => {
                        log::debug!("tap at ({}, {})", up.position.x, up.position.y);
                        if let Some(on_tap) = &handlers.on_tap {
                            on_tap(up.position);
                        }
                        up.consume();
                    }
                    Some(PressOutcome::Cancelled) => {
                        log::debug!("press cancelled before resolving");
                    }
                    None => {
                        log::debug!("long press at ({}, {})", origin.x, origin.y);
                        if let Some(on_long_press) = &handlers.on_long_press {
                            on_long_press(origin);
                        }
                        wait_for_lift(&scope, pointer).await;
                    }
                }
                drop(guard);
            }
        })
        .await
}

async fn await_first_down(scope: &AwaitPointerEventScope) -> PointerEvent {
    loop {
        let event = scope.await_pointer_event().await;
        if event.kind == PointerEventKind::Down && !event.is_consumed() {
            return event;
        }
    }
}

/// Waits for `pointer` to go up inside the node.
///
/// Cancel events, consumed events and moves past `touch_slop` or outside a
/// measured node end the press without an outcome. Events of other pointers
/// are skipped.
async fn wait_for_up_or_cancellation(
    scope: &AwaitPointerEventScope,
    pointer: PointerId,
    origin: Point,
    touch_slop: f32,
) -> PressOutcome {
    loop {
        let event = scope.await_pointer_event().await;
        if event.id != pointer {
            continue;
        }
        if event.is_consumed() {
            return PressOutcome::Cancelled;
        }
        match event.kind {
            PointerEventKind::Up => {
                if is_out_of_bounds(scope, event.position) {
                    return PressOutcome::Cancelled;
                }
                return PressOutcome::Up(event);
            }
            PointerEventKind::Cancel => return PressOutcome::Cancelled,
            PointerEventKind::Move => {
                if event.position.distance_to(origin) > touch_slop
                    || is_out_of_bounds(scope, event.position)
                {
                    return PressOutcome::Cancelled;
                }
            }
            PointerEventKind::Down => {}
        }
    }
}

async fn wait_for_lift(scope: &AwaitPointerEventScope, pointer: PointerId) {
    loop {
        let event = scope.await_pointer_event().await;
        if event.id != pointer {
            continue;
        }
        match event.kind {
            PointerEventKind::Up => {
                event.consume();
                return;
            }
            PointerEventKind::Cancel => return,
            PointerEventKind::Down | PointerEventKind::Move => {}
        }
    }
}

fn is_out_of_bounds(scope: &AwaitPointerEventScope, position: Point) -> bool {
    let size = scope.size();
    !size.is_empty() && !size.contains(position)
}

#[cfg(test)]
#[path = "tests/tap_gesture_detector_tests.rs"]
mod tests;
