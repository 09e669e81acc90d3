//! Interaction sources: the stream of press/release events a component
//! reports while it is being touched.
//!
//! A [`MutableInteractionSource`] is shared between the gesture handler that
//! emits interactions and any number of observers (usually an indication)
//! that render feedback for them.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::graphics::Point;

/// Process-unique identity of a single physical press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PressId(u64);

impl PressId {
    fn next() -> Self {
        static NEXT_PRESS_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_PRESS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A press that started at `position`, in local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Press {
    id: PressId,
    position: Point,
}

impl Press {
    pub fn new(position: Point) -> Self {
        Self {
            id: PressId::next(),
            position,
        }
    }

    pub fn id(&self) -> PressId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    Press(Press),
    /// Ends the given press, whether it resolved to a tap, a long-press or
    /// was cancelled.
    Release(Press),
}

impl Interaction {
    pub fn press(&self) -> Press {
        match self {
            Interaction::Press(press) | Interaction::Release(press) => *press,
        }
    }
}

pub type InteractionObserver = Rc<dyn Fn(&Interaction)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct InteractionSourceState {
    observers: IndexMap<SubscriptionId, InteractionObserver>,
    active_presses: SmallVec<[Press; 2]>,
    next_subscription: u64,
}

/// Shared, observable stream of [`Interaction`]s.
///
/// Clones share the same underlying stream; equality and hashing follow
/// identity, so a source can be used as a pointer input key.
#[derive(Clone, Default)]
pub struct MutableInteractionSource {
    state: Rc<RefCell<InteractionSourceState>>,
}

impl MutableInteractionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `interaction` to every observer, in subscription order.
    ///
    /// Observers run after the internal borrow is released, so they may
    /// subscribe, unsubscribe or emit again.
    pub fn emit(&self, interaction: Interaction) {
        let observers: SmallVec<[InteractionObserver; 2]> = {
            let mut state = self.state.borrow_mut();
            match interaction {
                Interaction::Press(press) => state.active_presses.push(press),
                Interaction::Release(press) => {
                    let before = state.active_presses.len();
                    state.active_presses.retain(|active| active.id != press.id);
                    if state.active_presses.len() == before {
                        log::warn!("release for unknown press {:?}", press.id);
                    }
                }
            }
            state.observers.values().cloned().collect()
        };
        log::trace!("interaction emitted: {interaction:?}");
        for observer in observers {
            observer(&interaction);
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&Interaction) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.observers.insert(id, Rc::new(observer));
        id
    }

    /// Removes an observer. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.borrow_mut().observers.shift_remove(&id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Whether a press has been emitted that was not released yet.
    pub fn is_pressed(&self) -> bool {
        !self.state.borrow().active_presses.is_empty()
    }

    pub fn active_presses(&self) -> Vec<Press> {
        self.state.borrow().active_presses.to_vec()
    }
}

impl PartialEq for MutableInteractionSource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for MutableInteractionSource {}

impl Hash for MutableInteractionSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.state) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for MutableInteractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MutableInteractionSource")
            .field("observers", &state.observers.len())
            .field("active_presses", &state.active_presses.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/interaction_tests.rs"]
mod tests;
