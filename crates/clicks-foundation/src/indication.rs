//! Visual indication of interactions.
//!
//! An [`Indication`] is a factory for [`IndicationInstance`]s. Each instance
//! is bound to one component, consumes the interactions of that component's
//! interaction source and draws feedback over its content.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::graphics::{Color, DrawScope};
use crate::interaction::{Interaction, PressId};

pub trait Indication: fmt::Debug {
    fn create_instance(&self) -> Box<dyn IndicationInstance>;
}

pub trait IndicationInstance {
    fn on_interaction(&mut self, interaction: &Interaction);

    /// Draws the content followed by any feedback for the current state.
    fn draw_indication(&self, scope: &mut dyn DrawScope);
}

/// Default indication: a translucent overlay while at least one press is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightIndication {
    pub color: Color,
}

impl HighlightIndication {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for HighlightIndication {
    fn default() -> Self {
        Self::new(Color::BLACK.with_alpha(0.3))
    }
}

impl Indication for HighlightIndication {
    fn create_instance(&self) -> Box<dyn IndicationInstance> {
        Box::new(HighlightIndicationInstance {
            color: self.color,
            presses: SmallVec::new(),
        })
    }
}

struct HighlightIndicationInstance {
    color: Color,
    presses: SmallVec<[PressId; 2]>,
}

impl IndicationInstance for HighlightIndicationInstance {
    fn on_interaction(&mut self, interaction: &Interaction) {
        match interaction {
            Interaction::Press(press) => self.presses.push(press.id()),
            Interaction::Release(press) => self.presses.retain(|id| *id != press.id()),
        }
    }

    fn draw_indication(&self, scope: &mut dyn DrawScope) {
        scope.draw_content();
        if !self.presses.is_empty() {
            scope.draw_rect(self.color);
        }
    }
}

/// Indication that draws nothing besides the content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoIndication;

impl Indication for NoIndication {
    fn create_instance(&self) -> Box<dyn IndicationInstance> {
        Box::new(NoIndicationInstance)
    }
}

struct NoIndicationInstance;

impl IndicationInstance for NoIndicationInstance {
    fn on_interaction(&mut self, _interaction: &Interaction) {}

    fn draw_indication(&self, scope: &mut dyn DrawScope) {
        scope.draw_content();
    }
}

thread_local! {
    static LOCAL_INDICATION: RefCell<Rc<dyn Indication>> =
        RefCell::new(Rc::new(HighlightIndication::default()) as Rc<dyn Indication>);
}

/// Host-provided indication used by the modifiers that do not take one explicitly.
pub struct LocalIndication;

impl LocalIndication {
    pub fn current() -> Rc<dyn Indication> {
        LOCAL_INDICATION.with(|local| local.borrow().clone())
    }

    /// Runs `content` with `indication` installed as the current indication,
    /// restoring the previous one afterwards (also on unwind).
    pub fn provide<R>(indication: Rc<dyn Indication>, content: impl FnOnce() -> R) -> R {
        struct Restore(Option<Rc<dyn Indication>>);

        impl Drop for Restore {
            fn drop(&mut self) {
                if let Some(previous) = self.0.take() {
                    LOCAL_INDICATION.with(|local| *local.borrow_mut() = previous);
                }
            }
        }

        let previous = LOCAL_INDICATION.with(|local| local.replace(indication));
        let _restore = Restore(Some(previous));
        content()
    }
}
