use clicks_foundation::{
    Point, PointerButton, PointerButtons, PointerEvent, PointerEventKind, Size, ViewConfiguration,
};
use clicks_ui::ModifierChainHandle;
use std::fmt;

/// Time between down and up of an injected click.
pub const CLICK_DURATION_MILLIS: u64 = 50;

/// Extra hold on top of the long-press timeout for an injected long click.
const LONG_CLICK_MARGIN_MILLIS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchInputError {
    /// No content was installed on the rule.
    NoContent,
    PointerAlreadyDown,
    PointerNotDown,
}

impl fmt::Display for TouchInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchInputError::NoContent => write!(f, "no content set on the test rule"),
            TouchInputError::PointerAlreadyDown => write!(f, "pointer is already down"),
            TouchInputError::PointerNotDown => write!(f, "pointer is not down"),
        }
    }
}

impl std::error::Error for TouchInputError {}

/// Injects a single touch pointer into a hosted component.
///
/// Event times come from the rule's clock. Advancing event time does not
/// deliver a frame; a timeout expires when the next event arrives.
pub struct TouchInjector<'a> {
    handle: &'a mut ModifierChainHandle,
    uptime: &'a mut u64,
    pointer: &'a mut Option<Point>,
    size: Size,
    view_configuration: ViewConfiguration,
}

impl<'a> TouchInjector<'a> {
    pub(crate) fn new(
        handle: &'a mut ModifierChainHandle,
        uptime: &'a mut u64,
        pointer: &'a mut Option<Point>,
        size: Size,
        view_configuration: ViewConfiguration,
    ) -> Self {
        Self {
            handle,
            uptime,
            pointer,
            size,
            view_configuration,
        }
    }

    /// Center of the hosted component.
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn current_position(&self) -> Option<Point> {
        *self.pointer
    }

    pub fn event_time(&self) -> u64 {
        *self.uptime
    }

    pub fn advance_event_time(&mut self, millis: u64) {
        *self.uptime += millis;
    }

    pub fn down(&mut self, position: Point) -> Result<(), TouchInputError> {
        if self.pointer.is_some() {
            return Err(TouchInputError::PointerAlreadyDown);
        }
        *self.pointer = Some(position);
        self.send(PointerEventKind::Down, position);
        Ok(())
    }

    pub fn move_to(&mut self, position: Point) -> Result<(), TouchInputError> {
        if self.pointer.is_none() {
            return Err(TouchInputError::PointerNotDown);
        }
        *self.pointer = Some(position);
        self.send(PointerEventKind::Move, position);
        Ok(())
    }

    pub fn move_by(&mut self, delta: Point) -> Result<(), TouchInputError> {
        let current = self.pointer.ok_or(TouchInputError::PointerNotDown)?;
        self.move_to(Point::new(current.x + delta.x, current.y + delta.y))
    }

    pub fn up(&mut self) -> Result<(), TouchInputError> {
        let position = self.pointer.take().ok_or(TouchInputError::PointerNotDown)?;
        self.send(PointerEventKind::Up, position);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TouchInputError> {
        let position = self.pointer.take().ok_or(TouchInputError::PointerNotDown)?;
        self.send(PointerEventKind::Cancel, position);
        Ok(())
    }

    /// Down and up at `position`, [`CLICK_DURATION_MILLIS`] apart.
    pub fn click(&mut self, position: Point) -> Result<(), TouchInputError> {
        self.down(position)?;
        self.advance_event_time(CLICK_DURATION_MILLIS);
        self.up()
    }

    /// Down at `position`, held past the long-press timeout, then up.
    pub fn long_click(&mut self, position: Point) -> Result<(), TouchInputError> {
        self.down(position)?;
        self.advance_event_time(
            self.view_configuration.long_press_timeout_millis + LONG_CLICK_MARGIN_MILLIS,
        );
        self.up()
    }

    fn send(&mut self, kind: PointerEventKind, position: Point) {
        let buttons = if kind == PointerEventKind::Up || kind == PointerEventKind::Cancel {
            PointerButtons::NONE
        } else {
            PointerButtons::new().with(PointerButton::Primary)
        };
        let event = PointerEvent::new(kind, position)
            .with_buttons(buttons)
            .with_uptime(*self.uptime);
        log::trace!("injecting {kind:?} at ({}, {}) t={}", position.x, position.y, *self.uptime);
        self.handle.dispatch_pointer_event(event);
    }
}

#[cfg(test)]
#[path = "tests/touch_injection_tests.rs"]
mod tests;
