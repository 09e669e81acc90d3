//! Tap and long-press modifiers.
//!
//! Every factory builds a [`ClicksElement`]. Its node runs
//! [`detect_tap_gestures`] in a suspending pointer input task and reports
//! press feedback to an interaction source, which also drives the node's
//! indication.
//!
//! The task is keyed on the enabled flag, the interaction source, the
//! optional caller key and whether a long-click callback exists. Changing any
//! of them restarts the task, which drops the in-flight gesture and flushes
//! its pending release. Callbacks are not keys: rebuilding the modifier with
//! fresh closures swaps them into the running task.

use super::indication::{same_indication, IndicationNode};
use super::pointer_input::{pointer_input_handler, KeyToken, PointerInputHandler};
use super::{inspector_metadata, Modifier, SuspendingPointerInputNode};
use crate::gestures::{detect_tap_gestures, PressGuard, TapGestureHandlers};
use clicks_foundation::{
    impl_modifier_node, DelegatableNode, DrawModifierNode, DrawScope, Indication, Interaction,
    LocalIndication, ModifierNode, ModifierNodeContext, ModifierNodeElement,
    MutableInteractionSource, NodeCapabilities, NodeState, PointerEvent, PointerInputNode, Press,
    Size,
};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

type ClickCallback = Rc<dyn Fn()>;

impl Modifier {
    /// Calls `block` when the component is tapped.
    pub fn on_click(self, enabled: bool, block: impl Fn() + 'static) -> Self {
        let element = ClicksElement::new(
            enabled,
            None,
            LocalIndication::current(),
            None,
            Some(Rc::new(block)),
            None,
        );
        self.then(clicks_modifier("onClick", element))
    }

    /// [`on_click`](Self::on_click) reporting to a caller-owned interaction source.
    pub fn on_click_with(
        self,
        enabled: bool,
        interaction_source: MutableInteractionSource,
        indication: Rc<dyn Indication>,
        block: impl Fn() + 'static,
    ) -> Self {
        let element = ClicksElement::new(
            enabled,
            Some(interaction_source),
            indication,
            None,
            Some(Rc::new(block)),
            None,
        );
        self.then(clicks_modifier("onClick", element))
    }

    /// Calls `on_click` on tap and `on_long_click` once the pointer has been
    /// held for the long-press timeout.
    pub fn clicks(
        self,
        enabled: bool,
        on_click: impl Fn() + 'static,
        on_long_click: impl Fn() + 'static,
    ) -> Self {
        let element = ClicksElement::new(
            enabled,
            None,
            LocalIndication::current(),
            None,
            Some(Rc::new(on_click)),
            Some(Rc::new(on_long_click)),
        );
        self.then(clicks_modifier("clicks", element))
    }

    pub fn clicks_with(
        self,
        enabled: bool,
        interaction_source: MutableInteractionSource,
        indication: Rc<dyn Indication>,
        on_click: impl Fn() + 'static,
        on_long_click: impl Fn() + 'static,
    ) -> Self {
        let element = ClicksElement::new(
            enabled,
            Some(interaction_source),
            indication,
            None,
            Some(Rc::new(on_click)),
            Some(Rc::new(on_long_click)),
        );
        self.then(clicks_modifier("clicks", element))
    }

    /// Calls `block` on long-press. Taps still produce press feedback but no callback.
    pub fn on_long_click(self, block: impl Fn() + 'static) -> Self {
        let element = ClicksElement::new(
            true,
            None,
            LocalIndication::current(),
            None,
            None,
            Some(Rc::new(block)),
        );
        self.then(clicks_modifier("onLongClick", element))
    }

    /// [`on_long_click`](Self::on_long_click) with an explicit enabled flag,
    /// identity key and interaction source. Changing `key` abandons the
    /// gesture in flight.
    pub fn on_long_click_with(
        self,
        enabled: bool,
        key: Option<u64>,
        interaction_source: MutableInteractionSource,
        indication: Rc<dyn Indication>,
        block: impl Fn() + 'static,
    ) -> Self {
        let element = ClicksElement::new(
            enabled,
            Some(interaction_source),
            indication,
            key,
            None,
            Some(Rc::new(block)),
        );
        self.then(clicks_modifier("onLongClick", element))
    }
}

fn clicks_modifier(name: &'static str, element: ClicksElement) -> Modifier {
    let enabled = element.enabled;
    let has_click = element.on_click.is_some();
    let has_long_click = element.on_long_click.is_some();
    let indication = format!("{:?}", element.indication);
    let source = if element.interaction_source.is_some() {
        "provided"
    } else {
        "internal"
    };
    let key = element.key;
    Modifier::with_element(element).with_inspector_metadata(inspector_metadata(
        name,
        move |info| {
            info.add_property("enabled", enabled.to_string());
            info.add_property("onClick", provided(has_click));
            info.add_property("onLongClick", provided(has_long_click));
            info.add_property("indication", indication);
            info.add_property("interactionSource", source);
            if let Some(key) = key {
                info.add_property("key1", key.to_string());
            }
        },
    ))
}

fn provided(present: bool) -> &'static str {
    if present {
        "provided"
    } else {
        "none"
    }
}

/// Token of the press currently reported to the interaction source.
///
/// Set when a press starts and cleared exactly once when it is released.
/// Starting a press while a stale one is still recorded releases the stale
/// one first, so observers never see two presses from the same node.
#[derive(Clone, Default)]
pub struct LastPressState {
    press: Rc<RefCell<Option<Press>>>,
}

impl LastPressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Press> {
        *self.press.borrow()
    }

    pub fn begin(&self, interaction_source: &MutableInteractionSource, press: Press) {
        let stale = self.press.borrow_mut().replace(press);
        if let Some(stale) = stale {
            log::debug!("releasing stale press {:?}", stale.id());
            interaction_source.emit(Interaction::Release(stale));
        }
        log::trace!("press {:?} at ({}, {})", press.id(), press.position().x, press.position().y);
        interaction_source.emit(Interaction::Press(press));
    }

    /// Releases `press` if it is still the recorded one. Returns whether a
    /// release was emitted.
    pub fn end(&self, interaction_source: &MutableInteractionSource, press: Press) -> bool {
        let matches = self.current().map(|current| current.id()) == Some(press.id());
        if !matches {
            return false;
        }
        self.press.borrow_mut().take();
        log::trace!("release {:?}", press.id());
        interaction_source.emit(Interaction::Release(press));
        true
    }
}

impl fmt::Debug for LastPressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastPressState")
            .field("press", &self.current())
            .finish()
    }
}

#[derive(Clone, Default)]
struct ClickCallbacks {
    on_click: Option<ClickCallback>,
    on_long_click: Option<ClickCallback>,
}

/// Element shared by all clicks modifiers.
#[derive(Clone)]
pub struct ClicksElement {
    enabled: bool,
    interaction_source: Option<MutableInteractionSource>,
    indication: Rc<dyn Indication>,
    key: Option<u64>,
    on_click: Option<ClickCallback>,
    on_long_click: Option<ClickCallback>,
}

impl ClicksElement {
    /// `interaction_source` of `None` lets the node own a source for its lifetime.
    pub fn new(
        enabled: bool,
        interaction_source: Option<MutableInteractionSource>,
        indication: Rc<dyn Indication>,
        key: Option<u64>,
        on_click: Option<Rc<dyn Fn()>>,
        on_long_click: Option<Rc<dyn Fn()>>,
    ) -> Self {
        Self {
            enabled,
            interaction_source,
            indication,
            key,
            on_click,
            on_long_click,
        }
    }

    fn callbacks(&self) -> ClickCallbacks {
        ClickCallbacks {
            on_click: self.on_click.clone(),
            on_long_click: self.on_long_click.clone(),
        }
    }
}

impl fmt::Debug for ClicksElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClicksElement")
            .field("enabled", &self.enabled)
            .field("interaction_source", &self.interaction_source)
            .field("indication", &self.indication)
            .field("key", &self.key)
            .field("on_click", &self.on_click.is_some())
            .field("on_long_click", &self.on_long_click.is_some())
            .finish()
    }
}

impl PartialEq for ClicksElement {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.interaction_source == other.interaction_source
            && same_indication(&self.indication, &other.indication)
            && self.key == other.key
            && self.on_click.is_some() == other.on_click.is_some()
            && self.on_long_click.is_some() == other.on_long_click.is_some()
    }
}

impl Hash for ClicksElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.enabled.hash(state);
        self.interaction_source.hash(state);
        self.key.hash(state);
        self.on_click.is_some().hash(state);
        self.on_long_click.is_some().hash(state);
    }
}

impl ModifierNodeElement for ClicksElement {
    type Node = ClicksNode;

    fn create(&self) -> Self::Node {
        ClicksNode::new(self)
    }

    fn update(&self, node: &mut Self::Node) {
        node.update(self);
    }

    fn inspector_name(&self) -> &'static str {
        "clicks"
    }

    fn inspector_properties(&self, inspector: &mut dyn FnMut(&'static str, String)) {
        inspector("enabled", self.enabled.to_string());
        inspector("onClick", provided(self.on_click.is_some()).to_string());
        inspector("onLongClick", provided(self.on_long_click.is_some()).to_string());
        inspector("indication", format!("{:?}", self.indication));
        if let Some(key) = self.key {
            inspector("key1", key.to_string());
        }
    }

    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::POINTER_INPUT | NodeCapabilities::DRAW
    }

    // Closures are left out of `eq`, so fresh callbacks still need to reach the node.
    fn always_update(&self) -> bool {
        true
    }
}

/// Node behind every clicks modifier.
///
/// Delegates gesture handling to a [`SuspendingPointerInputNode`] and
/// drawing to an [`IndicationNode`] bound to the same interaction source.
pub struct ClicksNode {
    enabled: bool,
    key: Option<u64>,
    owns_source: bool,
    callbacks: Rc<RefCell<ClickCallbacks>>,
    last_press: LastPressState,
    indication: IndicationNode,
    pointer_input: SuspendingPointerInputNode,
    state: NodeState,
}

impl ClicksNode {
    fn new(element: &ClicksElement) -> Self {
        let owns_source = element.interaction_source.is_none();
        let interaction_source = element.interaction_source.clone().unwrap_or_default();
        let callbacks = Rc::new(RefCell::new(element.callbacks()));
        let last_press = LastPressState::new();
        let has_long_click = element.on_long_click.is_some();
        let keys = pointer_keys(element.enabled, &interaction_source, element.key, has_long_click);
        let handler = gesture_handler(
            element.enabled,
            has_long_click,
            interaction_source.clone(),
            last_press.clone(),
            callbacks.clone(),
        );
        Self {
            enabled: element.enabled,
            key: element.key,
            owns_source,
            callbacks,
            last_press,
            indication: IndicationNode::new(interaction_source, element.indication.clone()),
            pointer_input: SuspendingPointerInputNode::new(keys, handler),
            state: NodeState::new(),
        }
    }

    fn update(&mut self, element: &ClicksElement) {
        *self.callbacks.borrow_mut() = element.callbacks();
        self.enabled = element.enabled;
        self.key = element.key;

        let interaction_source = match &element.interaction_source {
            Some(source) => {
                self.owns_source = false;
                source.clone()
            }
            None if self.owns_source => self.indication.interaction_source().clone(),
            None => {
                self.owns_source = true;
                MutableInteractionSource::new()
            }
        };
        self.indication
            .set(interaction_source.clone(), element.indication.clone());

        let has_long_click = element.on_long_click.is_some();
        let keys = pointer_keys(self.enabled, &interaction_source, self.key, has_long_click);
        let handler = gesture_handler(
            self.enabled,
            has_long_click,
            interaction_source,
            self.last_press.clone(),
            self.callbacks.clone(),
        );
        self.pointer_input.update(keys, handler);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interaction_source(&self) -> &MutableInteractionSource {
        self.indication.interaction_source()
    }

    pub fn last_press(&self) -> &LastPressState {
        &self.last_press
    }

    pub fn is_gesture_task_running(&self) -> bool {
        self.pointer_input.is_running()
    }
}

fn pointer_keys(
    enabled: bool,
    interaction_source: &MutableInteractionSource,
    key: Option<u64>,
    has_long_click: bool,
) -> Vec<KeyToken> {
    vec![
        KeyToken::new(&enabled),
        KeyToken::new(interaction_source),
        KeyToken::new(&key),
        KeyToken::new(&has_long_click),
    ]
}

fn gesture_handler(
    enabled: bool,
    has_long_click: bool,
    interaction_source: MutableInteractionSource,
    last_press: LastPressState,
    callbacks: Rc<RefCell<ClickCallbacks>>,
) -> PointerInputHandler {
    pointer_input_handler(move |scope| {
        let handlers = if enabled {
            tap_handlers(
                has_long_click,
                interaction_source.clone(),
                last_press.clone(),
                callbacks.clone(),
            )
        } else {
            // A disabled node keeps observing the stream without reporting anything.
            TapGestureHandlers::new()
        };
        detect_tap_gestures(scope, handlers)
    })
}

fn tap_handlers(
    has_long_click: bool,
    interaction_source: MutableInteractionSource,
    last_press: LastPressState,
    callbacks: Rc<RefCell<ClickCallbacks>>,
) -> TapGestureHandlers {
    let tap_callbacks = callbacks.clone();
    let handlers = TapGestureHandlers::new()
        .on_press(move |position| {
            let press = Press::new(position);
            last_press.begin(&interaction_source, press);
            let source = interaction_source.clone();
            let last_press = last_press.clone();
            PressGuard::new(move || {
                last_press.end(&source, press);
            })
        })
        .on_tap(move |_| {
            // Cloned out so the callback may rebuild the modifier.
            let on_click = tap_callbacks.borrow().on_click.clone();
            if let Some(on_click) = on_click {
                on_click();
            }
        });
    if !has_long_click {
        return handlers;
    }
    handlers.on_long_press(move |_| {
        let on_long_click = callbacks.borrow().on_long_click.clone();
        if let Some(on_long_click) = on_long_click {
            on_long_click();
        }
    })
}

impl fmt::Debug for ClicksNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClicksNode")
            .field("enabled", &self.enabled)
            .field("key", &self.key)
            .field("last_press", &self.last_press)
            .field("pointer_input", &self.pointer_input)
            .finish()
    }
}

impl DelegatableNode for ClicksNode {
    fn node_state(&self) -> &NodeState {
        &self.state
    }
}

impl ModifierNode for ClicksNode {
    fn on_attach(&mut self, context: &mut dyn ModifierNodeContext) {
        self.indication.on_attach(context);
        self.pointer_input.on_attach(context);
    }

    fn on_detach(&mut self) {
        self.pointer_input.on_detach();
        self.indication.on_detach();
    }

    impl_modifier_node!(draw, pointer_input);
}

impl DrawModifierNode for ClicksNode {
    fn draw(&self, draw_scope: &mut dyn DrawScope) {
        self.indication.draw_indication(draw_scope);
    }
}

impl PointerInputNode for ClicksNode {
    fn pointer_input_handler(&self) -> Option<Rc<dyn Fn(PointerEvent)>> {
        self.pointer_input.pointer_input_handler()
    }

    fn frame_handler(&self) -> Option<Rc<dyn Fn(u64)>> {
        self.pointer_input.frame_handler()
    }

    fn on_remeasured(&mut self, size: Size) {
        self.pointer_input.on_remeasured(size);
    }
}

#[cfg(test)]
#[path = "tests/clicks_tests.rs"]
mod tests;
