use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug)]
struct CountingNode {
    value: i32,
    attaches: Rc<Cell<usize>>,
    detaches: Rc<Cell<usize>>,
    state: NodeState,
}

impl DelegatableNode for CountingNode {
    fn node_state(&self) -> &NodeState {
        &self.state
    }
}

impl ModifierNode for CountingNode {
    fn on_attach(&mut self, context: &mut dyn ModifierNodeContext) {
        self.attaches.set(self.attaches.get() + 1);
        context.invalidate(InvalidationKind::PointerInput);
    }

    fn on_detach(&mut self) {
        self.detaches.set(self.detaches.get() + 1);
    }

    crate::impl_modifier_node!(pointer_input);
}

impl PointerInputNode for CountingNode {}

#[derive(Debug, Clone)]
struct CountingElement {
    value: i32,
    key: Option<u64>,
    attaches: Rc<Cell<usize>>,
    detaches: Rc<Cell<usize>>,
}

impl CountingElement {
    fn new(value: i32, attaches: &Rc<Cell<usize>>, detaches: &Rc<Cell<usize>>) -> Self {
        Self {
            value,
            key: None,
            attaches: attaches.clone(),
            detaches: detaches.clone(),
        }
    }

    fn keyed(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }
}

impl PartialEq for CountingElement {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for CountingElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl ModifierNodeElement for CountingElement {
    type Node = CountingNode;

    fn create(&self) -> Self::Node {
        CountingNode {
            value: self.value,
            attaches: self.attaches.clone(),
            detaches: self.detaches.clone(),
            state: NodeState::new(),
        }
    }

    fn update(&self, node: &mut Self::Node) {
        node.value = self.value;
    }

    fn key(&self) -> Option<u64> {
        self.key
    }

    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::POINTER_INPUT
    }
}

fn counters() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
    (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)))
}

#[test]
fn attaches_new_nodes_and_records_invalidation() {
    let (attaches, detaches) = counters();
    let mut chain = ModifierNodeChain::new();
    let mut context = BasicModifierNodeContext::new();

    chain.update(
        vec![modifier_element(CountingElement::new(1, &attaches, &detaches))],
        &mut context,
    );

    assert_eq!(chain.len(), 1);
    assert_eq!(attaches.get(), 1);
    assert!(chain.has_capability(NodeCapabilities::POINTER_INPUT));
    let invalidations = context.take_invalidations();
    assert_eq!(invalidations.len(), 1);
    assert_eq!(invalidations[0].kind(), InvalidationKind::PointerInput);
}

#[test]
fn reuses_node_when_element_changes() {
    let (attaches, detaches) = counters();
    let mut chain = ModifierNodeChain::new();
    let mut context = BasicModifierNodeContext::new();

    chain.update(
        vec![modifier_element(CountingElement::new(1, &attaches, &detaches))],
        &mut context,
    );
    let first = {
        let node = chain.node::<CountingNode>(0).unwrap();
        &*node as *const CountingNode
    };

    chain.update(
        vec![modifier_element(CountingElement::new(2, &attaches, &detaches))],
        &mut context,
    );
    let second = {
        let node = chain.node::<CountingNode>(0).unwrap();
        &*node as *const CountingNode
    };

    assert_eq!(first, second, "expected the node to be reused");
    assert_eq!(chain.node::<CountingNode>(0).unwrap().value, 2);
    assert_eq!(attaches.get(), 1);
    assert_eq!(detaches.get(), 0);
}

#[test]
fn different_key_recreates_node() {
    let (attaches, detaches) = counters();
    let mut chain = ModifierNodeChain::new();
    let mut context = BasicModifierNodeContext::new();

    chain.update(
        vec![modifier_element(
            CountingElement::new(1, &attaches, &detaches).keyed(1),
        )],
        &mut context,
    );
    chain.update(
        vec![modifier_element(
            CountingElement::new(1, &attaches, &detaches).keyed(2),
        )],
        &mut context,
    );

    assert_eq!(attaches.get(), 2);
    assert_eq!(detaches.get(), 1);
}

#[test]
fn removed_elements_detach_their_nodes() {
    let (attaches, detaches) = counters();
    let mut chain = ModifierNodeChain::new();
    let mut context = BasicModifierNodeContext::new();

    chain.update(
        vec![
            modifier_element(CountingElement::new(1, &attaches, &detaches)),
            modifier_element(CountingElement::new(2, &attaches, &detaches)),
        ],
        &mut context,
    );
    chain.update(
        vec![modifier_element(CountingElement::new(2, &attaches, &detaches))],
        &mut context,
    );

    assert_eq!(chain.len(), 1);
    assert_eq!(detaches.get(), 1);
    assert_eq!(chain.node::<CountingNode>(0).unwrap().value, 2);

    chain.detach_all();
    assert!(chain.is_empty());
    assert_eq!(detaches.get(), 2);
    assert!(!chain.has_capability(NodeCapabilities::POINTER_INPUT));
}

#[test]
fn capability_visitor_only_sees_matching_nodes() {
    let (attaches, detaches) = counters();
    let mut chain = ModifierNodeChain::new();
    let mut context = BasicModifierNodeContext::new();
    chain.update(
        vec![modifier_element(CountingElement::new(1, &attaches, &detaches))],
        &mut context,
    );

    let mut pointer_nodes = 0;
    chain.for_each_node_with_capability(NodeCapabilities::POINTER_INPUT, |node| {
        assert!(node.as_pointer_input_node().is_some());
        pointer_nodes += 1;
    });
    let mut draw_nodes = 0;
    chain.for_each_node_with_capability(NodeCapabilities::DRAW, |_| draw_nodes += 1);

    assert_eq!(pointer_nodes, 1);
    assert_eq!(draw_nodes, 0);
}

#[test]
fn invalidations_are_coalesced_per_kind() {
    let mut context = BasicModifierNodeContext::new();
    context.invalidate(InvalidationKind::Draw);
    context.invalidate(InvalidationKind::Draw);
    context.invalidate(InvalidationKind::PointerInput);

    let kinds: Vec<_> = context
        .invalidations()
        .iter()
        .map(|invalidation| invalidation.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![InvalidationKind::Draw, InvalidationKind::PointerInput]
    );
    assert_eq!(context.take_invalidations().len(), 2);
    assert!(context.invalidations().is_empty());
}
