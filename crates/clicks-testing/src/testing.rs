use clicks_foundation::{
    DrawPrimitive, DrawScopeDefault, ModifierInvalidation, Point, Size, ViewConfiguration,
};
use clicks_ui::{Modifier, ModifierChainHandle};

use crate::touch_injection::{TouchInjector, TouchInputError};

/// Size given to the hosted component unless the test picks another one.
const DEFAULT_CONTENT_SIZE: Size = Size::new(100.0, 100.0);

/// Headless harness for exercising modifiers in tests.
///
/// The rule owns a [`ModifierChainHandle`] standing in for one laid out
/// component and a manual uptime clock. Time only moves when a test asks it
/// to, either through [`advance_time_by`](Self::advance_time_by) or through
/// the touch injector.
pub struct ClicksTestRule {
    handle: ModifierChainHandle,
    content: Option<Modifier>,
    view_configuration: ViewConfiguration,
    size: Size,
    uptime: u64,
    pointer: Option<Point>,
}

impl ClicksTestRule {
    /// Create a new test rule with the default view configuration.
    pub fn new() -> Self {
        Self::with_view_configuration(ViewConfiguration::default())
    }

    pub fn with_view_configuration(view_configuration: ViewConfiguration) -> Self {
        let mut handle = ModifierChainHandle::new();
        handle.set_view_configuration(view_configuration);
        Self {
            handle,
            content: None,
            view_configuration,
            size: DEFAULT_CONTENT_SIZE,
            uptime: 0,
            pointer: None,
        }
    }

    /// Install `modifier` on the hosted component, measured at the rule's size.
    pub fn set_content(&mut self, modifier: Modifier) {
        self.handle.on_remeasured(self.size);
        self.handle.update(&modifier);
        self.content = Some(modifier);
    }

    /// Rebuild the hosted component with `modifier`, as a recomposition would.
    pub fn recompose(&mut self, modifier: Modifier) {
        self.handle.update(&modifier);
        self.content = Some(modifier);
    }

    /// Resize the hosted component.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.handle.on_remeasured(size);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn view_configuration(&self) -> ViewConfiguration {
        self.view_configuration
    }

    /// Current value of the manual clock in milliseconds.
    pub fn current_time(&self) -> u64 {
        self.uptime
    }

    /// Moves the clock forward and delivers a frame at the new time.
    pub fn advance_time_by(&mut self, millis: u64) {
        self.uptime += millis;
        self.handle.on_frame(self.uptime);
    }

    /// Runs `block` with a touch injector bound to the hosted component.
    ///
    /// The pointer state carries over between calls, so a press started in
    /// one block can be released in the next.
    pub fn perform_touch_input<R>(
        &mut self,
        block: impl FnOnce(&mut TouchInjector<'_>) -> Result<R, TouchInputError>,
    ) -> Result<R, TouchInputError> {
        if self.content.is_none() {
            return Err(TouchInputError::NoContent);
        }
        let mut injector = TouchInjector::new(
            &mut self.handle,
            &mut self.uptime,
            &mut self.pointer,
            self.size,
            self.view_configuration,
        );
        block(&mut injector)
    }

    /// Whether the injector still holds a pointer down.
    pub fn is_pointer_down(&self) -> bool {
        self.pointer.is_some()
    }

    /// Records the draw output of the hosted component.
    pub fn draw(&self) -> Vec<DrawPrimitive> {
        let mut scope = DrawScopeDefault::new(self.size);
        self.handle.draw(&mut scope);
        scope.into_primitives()
    }

    pub fn take_invalidations(&mut self) -> Vec<ModifierInvalidation> {
        self.handle.take_invalidations()
    }

    pub fn handle(&self) -> &ModifierChainHandle {
        &self.handle
    }

    /// Removes the component, cancelling any gesture in flight.
    pub fn dispose(&mut self) {
        self.handle.dispose();
        self.content = None;
        self.pointer = None;
    }
}

impl Default for ClicksTestRule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
