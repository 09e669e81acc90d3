//! Modifier node scaffolding.
//!
//! This module defines the pieces of the `Modifier.Node` system that the
//! clicks modifiers build on: traits for modifier nodes and their contexts,
//! strongly typed elements with a type-erased counterpart, and a light-weight
//! chain container that reconciles nodes across updates so that a running
//! gesture survives a rebuild of the modifier with equal keys.

use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;

use crate::gesture_constants::ViewConfiguration;
use crate::graphics::{DrawScope, Size};
use crate::nodes::input::types::PointerEvent;

/// Identifies which part of the pipeline should be invalidated after a
/// modifier node changes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationKind {
    Draw,
    PointerInput,
}

/// Runtime services exposed to modifier nodes while attached to a tree.
pub trait ModifierNodeContext {
    /// Requests that a particular pipeline stage be invalidated.
    fn invalidate(&mut self, _kind: InvalidationKind) {}

    /// Platform thresholds for gesture detection on this node's host.
    fn view_configuration(&self) -> ViewConfiguration {
        ViewConfiguration::default()
    }

    /// Signals that a node with `capabilities` is about to interact with this context.
    fn push_active_capabilities(&mut self, _capabilities: NodeCapabilities) {}

    /// Signals that the most recent node interaction has completed.
    fn pop_active_capabilities(&mut self) {}
}

/// Lightweight [`ModifierNodeContext`] implementation that records
/// invalidation requests.
///
/// Callers can inspect or drain this state after driving a
/// [`ModifierNodeChain`] reconciliation pass.
#[derive(Default, Debug, Clone)]
pub struct BasicModifierNodeContext {
    invalidations: Vec<ModifierInvalidation>,
    active_capabilities: Vec<NodeCapabilities>,
    view_configuration: ViewConfiguration,
}

impl BasicModifierNodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ordered list of invalidations requested since the last
    /// call to [`take_invalidations`](Self::take_invalidations). Duplicate
    /// requests for the same kind are coalesced.
    pub fn invalidations(&self) -> &[ModifierInvalidation] {
        &self.invalidations
    }

    pub fn take_invalidations(&mut self) -> Vec<ModifierInvalidation> {
        std::mem::take(&mut self.invalidations)
    }

    /// Sets the configuration handed to nodes that attach through this context.
    pub fn set_view_configuration(&mut self, configuration: ViewConfiguration) {
        self.view_configuration = configuration;
    }

    fn push_invalidation(&mut self, kind: InvalidationKind) {
        let mut capabilities = self.current_capabilities();
        capabilities.insert(NodeCapabilities::for_invalidation(kind));
        if let Some(existing) = self
            .invalidations
            .iter_mut()
            .find(|entry| entry.kind() == kind)
        {
            let updated = existing.capabilities() | capabilities;
            *existing = ModifierInvalidation::new(kind, updated);
        } else {
            self.invalidations
                .push(ModifierInvalidation::new(kind, capabilities));
        }
    }

    fn current_capabilities(&self) -> NodeCapabilities {
        self.active_capabilities
            .last()
            .copied()
            .unwrap_or_else(NodeCapabilities::empty)
    }
}

impl ModifierNodeContext for BasicModifierNodeContext {
    fn invalidate(&mut self, kind: InvalidationKind) {
        self.push_invalidation(kind);
    }

    fn view_configuration(&self) -> ViewConfiguration {
        self.view_configuration
    }

    fn push_active_capabilities(&mut self, capabilities: NodeCapabilities) {
        self.active_capabilities.push(capabilities);
    }

    fn pop_active_capabilities(&mut self) {
        self.active_capabilities.pop();
    }
}

/// Runtime state tracked for every [`ModifierNode`].
///
/// Nodes own one of these and hand it out through [`DelegatableNode`]; the
/// chain uses it to remember capabilities and attachment.
#[derive(Debug)]
pub struct NodeState {
    capabilities: Cell<NodeCapabilities>,
    attached: Cell<bool>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeState {
    pub const fn new() -> Self {
        Self {
            capabilities: Cell::new(NodeCapabilities::NONE),
            attached: Cell::new(false),
        }
    }

    pub fn set_capabilities(&self, capabilities: NodeCapabilities) {
        self.capabilities.set(capabilities);
    }

    pub fn capabilities(&self) -> NodeCapabilities {
        self.capabilities.get()
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.set(attached);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

pub trait DelegatableNode {
    fn node_state(&self) -> &NodeState;
}

/// Core trait implemented by modifier nodes.
///
/// Nodes declare their capabilities through
/// [`ModifierNodeElement::capabilities`] and implement the matching
/// specialized trait ([`DrawModifierNode`], [`PointerInputNode`]). The
/// `impl_modifier_node!` macro wires up the `as_*` accessors.
///
/// Nodes receive lifecycle callbacks when they attach to or detach from a
/// chain.
pub trait ModifierNode: Any + DelegatableNode {
    fn on_attach(&mut self, _context: &mut dyn ModifierNodeContext) {}

    fn on_detach(&mut self) {}

    fn as_draw_node(&self) -> Option<&dyn DrawModifierNode> {
        None
    }

    fn as_draw_node_mut(&mut self) -> Option<&mut dyn DrawModifierNode> {
        None
    }

    fn as_pointer_input_node(&self) -> Option<&dyn PointerInputNode> {
        None
    }

    fn as_pointer_input_node_mut(&mut self) -> Option<&mut dyn PointerInputNode> {
        None
    }
}

/// Draw nodes paint on top of (or around) the wrapped content.
pub trait DrawModifierNode: ModifierNode {
    fn draw(&self, draw_scope: &mut dyn DrawScope) {
        draw_scope.draw_content();
    }
}

/// Pointer input nodes receive the pointer events that hit their layout node.
///
/// Event delivery goes through handler closures rather than `&mut self` so
/// the host can release every chain borrow before user callbacks run.
pub trait PointerInputNode: ModifierNode {
    /// Handler that receives pointer events routed to this node.
    fn pointer_input_handler(&self) -> Option<Rc<dyn Fn(PointerEvent)>> {
        None
    }

    /// Handler that receives host uptime ticks in milliseconds. Detectors
    /// waiting on a timeout resume from here when no pointer event arrives.
    fn frame_handler(&self) -> Option<Rc<dyn Fn(u64)>> {
        None
    }

    /// Called when the size of the layout node this modifier is attached to changes.
    fn on_remeasured(&mut self, _size: Size) {}
}

impl fmt::Debug for dyn ModifierNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierNode").finish_non_exhaustive()
    }
}

impl dyn ModifierNode {
    pub fn as_any(&self) -> &dyn Any {
        self
    }

    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Strongly typed modifier elements that can create and update nodes while
/// exposing equality/hash/inspector contracts that mirror Jetpack Compose.
pub trait ModifierNodeElement: fmt::Debug + Hash + PartialEq + 'static {
    type Node: ModifierNode;

    /// Creates a new modifier node instance for this element.
    fn create(&self) -> Self::Node;

    /// Brings an existing modifier node up to date with the element's data.
    fn update(&self, node: &mut Self::Node);

    /// Optional key used to disambiguate multiple instances of the same element type.
    fn key(&self) -> Option<u64> {
        None
    }

    /// Human readable name surfaced to inspector tooling.
    fn inspector_name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Records inspector properties for tooling.
    fn inspector_properties(&self, _inspector: &mut dyn FnMut(&'static str, String)) {}

    /// Returns the capabilities of nodes created by this element.
    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::default()
    }

    /// Whether this element requires `update` to be called even if `eq` returns true.
    ///
    /// Elements that ignore closures in `eq` (so the node is reused) still need
    /// the fresh closures pushed into the node.
    fn always_update(&self) -> bool {
        false
    }
}

/// Capability flags indicating which specialized traits a modifier node implements.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeCapabilities(u32);

impl NodeCapabilities {
    pub const NONE: Self = Self(0);
    /// Modifier participates in draw.
    pub const DRAW: Self = Self(1 << 1);
    /// Modifier participates in pointer input.
    pub const POINTER_INPUT: Self = Self(1 << 2);

    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Returns whether all bits in `other` are present in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns whether any bit in `other` is present in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the capability bit mask required for the given invalidation.
    pub const fn for_invalidation(kind: InvalidationKind) -> Self {
        match kind {
            InvalidationKind::Draw => Self::DRAW,
            InvalidationKind::PointerInput => Self::POINTER_INPUT,
        }
    }
}

impl Default for NodeCapabilities {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for NodeCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCapabilities")
            .field("draw", &self.contains(Self::DRAW))
            .field("pointer_input", &self.contains(Self::POINTER_INPUT))
            .finish()
    }
}

impl BitOr for NodeCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for NodeCapabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Records an invalidation request together with the capability mask that triggered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierInvalidation {
    kind: InvalidationKind,
    capabilities: NodeCapabilities,
}

impl ModifierInvalidation {
    pub const fn new(kind: InvalidationKind, capabilities: NodeCapabilities) -> Self {
        Self { kind, capabilities }
    }

    pub const fn kind(self) -> InvalidationKind {
        self.kind
    }

    pub const fn capabilities(self) -> NodeCapabilities {
        self.capabilities
    }
}

/// Type-erased modifier element used by the runtime to reconcile chains.
pub trait AnyModifierElement: fmt::Debug {
    fn node_type(&self) -> TypeId;

    fn element_type(&self) -> TypeId;

    fn create_node(&self) -> Box<dyn ModifierNode>;

    fn update_node(&self, node: &mut dyn ModifierNode);

    fn key(&self) -> Option<u64>;

    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::default()
    }

    fn hash_code(&self) -> u64;

    fn equals_element(&self, other: &dyn AnyModifierElement) -> bool;

    fn inspector_name(&self) -> &'static str;

    fn record_inspector_properties(&self, visitor: &mut dyn FnMut(&'static str, String));

    fn requires_update(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

struct TypedModifierElement<E: ModifierNodeElement> {
    element: E,
}

impl<E> fmt::Debug for TypedModifierElement<E>
where
    E: ModifierNodeElement,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedModifierElement")
            .field("type", &type_name::<E>())
            .finish()
    }
}

impl<E> AnyModifierElement for TypedModifierElement<E>
where
    E: ModifierNodeElement,
{
    fn node_type(&self) -> TypeId {
        TypeId::of::<E::Node>()
    }

    fn element_type(&self) -> TypeId {
        TypeId::of::<E>()
    }

    fn create_node(&self) -> Box<dyn ModifierNode> {
        Box::new(self.element.create())
    }

    fn update_node(&self, node: &mut dyn ModifierNode) {
        match node.as_any_mut().downcast_mut::<E::Node>() {
            Some(typed) => self.element.update(typed),
            None => log::error!(
                "modifier node type mismatch while updating {}",
                type_name::<E>()
            ),
        }
    }

    fn key(&self) -> Option<u64> {
        self.element.key()
    }

    fn capabilities(&self) -> NodeCapabilities {
        self.element.capabilities()
    }

    fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.element.hash(&mut hasher);
        hasher.finish()
    }

    fn equals_element(&self, other: &dyn AnyModifierElement) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .map(|typed| typed.element == self.element)
            .unwrap_or(false)
    }

    fn inspector_name(&self) -> &'static str {
        self.element.inspector_name()
    }

    fn record_inspector_properties(&self, visitor: &mut dyn FnMut(&'static str, String)) {
        self.element.inspector_properties(visitor);
    }

    fn requires_update(&self) -> bool {
        self.element.always_update()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenience helper for callers to construct a type-erased modifier
/// element without having to mention the internal wrapper type.
pub fn modifier_element<E: ModifierNodeElement>(element: E) -> DynModifierElement {
    Rc::new(TypedModifierElement { element })
}

pub type DynModifierElement = Rc<dyn AnyModifierElement>;

struct ModifierNodeEntry {
    element_type: TypeId,
    key: Option<u64>,
    element: DynModifierElement,
    node: RefCell<Box<dyn ModifierNode>>,
}

fn with_node_context<F, R>(
    node: &mut dyn ModifierNode,
    context: &mut dyn ModifierNodeContext,
    f: F,
) -> R
where
    F: FnOnce(&mut dyn ModifierNode, &mut dyn ModifierNodeContext) -> R,
{
    context.push_active_capabilities(node.node_state().capabilities());
    let result = f(node, context);
    context.pop_active_capabilities();
    result
}

fn request_auto_invalidations(
    context: &mut dyn ModifierNodeContext,
    capabilities: NodeCapabilities,
) {
    if capabilities.is_empty() {
        return;
    }

    context.push_active_capabilities(capabilities);
    if capabilities.contains(NodeCapabilities::DRAW) {
        context.invalidate(InvalidationKind::Draw);
    }
    if capabilities.contains(NodeCapabilities::POINTER_INPUT) {
        context.invalidate(InvalidationKind::PointerInput);
    }
    context.pop_active_capabilities();
}

fn attach_node(node: &mut dyn ModifierNode, context: &mut dyn ModifierNodeContext) {
    if !node.node_state().is_attached() {
        node.node_state().set_attached(true);
        with_node_context(node, context, |node, ctx| node.on_attach(ctx));
    }
}

fn detach_node(node: &mut dyn ModifierNode) {
    if node.node_state().is_attached() {
        node.on_detach();
        node.node_state().set_attached(false);
    }
}

/// Chain of modifier nodes attached to a layout node.
///
/// The chain tracks ownership of modifier nodes and reuses them across
/// updates when the incoming element list still contains an element of the
/// same type and key. Removed nodes detach automatically so callers do not
/// need to manually manage their lifetimes.
#[derive(Default)]
pub struct ModifierNodeChain {
    entries: Vec<ModifierNodeEntry>,
    aggregated_capabilities: NodeCapabilities,
}

impl ModifierNodeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the chain against the provided elements, attaching newly
    /// created nodes and detaching nodes that are no longer required.
    pub fn update_from_slice(
        &mut self,
        elements: &[DynModifierElement],
        context: &mut dyn ModifierNodeContext,
    ) {
        let mut old_entries: Vec<Option<ModifierNodeEntry>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        let mut new_entries = Vec::with_capacity(elements.len());

        for element in elements {
            let element_type = element.element_type();
            let key = element.key();
            let capabilities = element.capabilities();

            // Prefer an identical element, then any element of the same type and key.
            let matched = old_entries
                .iter()
                .position(|slot| {
                    slot.as_ref().is_some_and(|entry| {
                        entry.element_type == element_type
                            && entry.key == key
                            && entry.element.equals_element(element.as_ref())
                    })
                })
                .or_else(|| {
                    old_entries.iter().position(|slot| {
                        slot.as_ref().is_some_and(|entry| {
                            entry.element_type == element_type && entry.key == key
                        })
                    })
                });

            let entry = match matched.and_then(|index| old_entries[index].take()) {
                Some(mut entry) => {
                    let same_element = entry.element.equals_element(element.as_ref());
                    {
                        let mut node = entry.node.borrow_mut();
                        attach_node(&mut **node, context);
                        if !same_element || element.requires_update() {
                            element.update_node(&mut **node);
                        }
                        node.node_state().set_capabilities(capabilities);
                    }
                    if !same_element {
                        request_auto_invalidations(context, capabilities);
                    }
                    entry.element = element.clone();
                    entry
                }
                None => {
                    let node = element.create_node();
                    node.node_state().set_capabilities(capabilities);
                    let entry = ModifierNodeEntry {
                        element_type,
                        key,
                        element: element.clone(),
                        node: RefCell::new(node),
                    };
                    attach_node(&mut **entry.node.borrow_mut(), context);
                    request_auto_invalidations(context, capabilities);
                    entry
                }
            };
            new_entries.push(entry);
        }

        for entry in old_entries.into_iter().flatten() {
            detach_node(&mut **entry.node.borrow_mut());
        }

        self.entries = new_entries;
        self.aggregated_capabilities = self.entries.iter().fold(
            NodeCapabilities::empty(),
            |acc, entry| acc | entry.element.capabilities(),
        );
    }

    /// Convenience wrapper that accepts any iterator of type-erased
    /// modifier elements.
    pub fn update<I>(&mut self, elements: I, context: &mut dyn ModifierNodeContext)
    where
        I: IntoIterator<Item = DynModifierElement>,
    {
        let collected: Vec<DynModifierElement> = elements.into_iter().collect();
        self.update_from_slice(&collected, context);
    }

    /// Detaches every node in the chain and clears internal storage.
    pub fn detach_all(&mut self) {
        for entry in std::mem::take(&mut self.entries) {
            detach_node(&mut **entry.node.borrow_mut());
        }
        self.aggregated_capabilities = NodeCapabilities::empty();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the aggregated capability mask for the entire chain.
    pub fn capabilities(&self) -> NodeCapabilities {
        self.aggregated_capabilities
    }

    pub fn has_capability(&self, capability: NodeCapabilities) -> bool {
        self.aggregated_capabilities.contains(capability)
    }

    /// Downcasts the node at `index` to `N`.
    pub fn node<N: ModifierNode + 'static>(&self, index: usize) -> Option<Ref<'_, N>> {
        let entry = self.entries.get(index)?;
        Ref::filter_map(entry.node.borrow(), |node| {
            node.as_any().downcast_ref::<N>()
        })
        .ok()
    }

    pub fn node_mut<N: ModifierNode + 'static>(&self, index: usize) -> Option<RefMut<'_, N>> {
        let entry = self.entries.get(index)?;
        RefMut::filter_map(entry.node.borrow_mut(), |node| {
            node.as_any_mut().downcast_mut::<N>()
        })
        .ok()
    }

    /// Returns the inspector name of the element at `index`.
    pub fn inspector_name(&self, index: usize) -> Option<&'static str> {
        self.entries
            .get(index)
            .map(|entry| entry.element.inspector_name())
    }

    /// Visits every node whose element declared capabilities intersecting `mask`,
    /// head to tail.
    pub fn for_each_node_with_capability<F>(&self, mask: NodeCapabilities, mut f: F)
    where
        F: FnMut(&dyn ModifierNode),
    {
        for entry in &self.entries {
            if entry.element.capabilities().intersects(mask) {
                f(&**entry.node.borrow());
            }
        }
    }

    /// Mutable counterpart of [`for_each_node_with_capability`](Self::for_each_node_with_capability).
    pub fn for_each_node_with_capability_mut<F>(&self, mask: NodeCapabilities, mut f: F)
    where
        F: FnMut(&mut dyn ModifierNode),
    {
        for entry in &self.entries {
            if entry.element.capabilities().intersects(mask) {
                f(&mut **entry.node.borrow_mut());
            }
        }
    }
}

impl fmt::Debug for ModifierNodeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierNodeChain")
            .field("len", &self.entries.len())
            .field("capabilities", &self.aggregated_capabilities)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/modifier_tests.rs"]
mod tests;
