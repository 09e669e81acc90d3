use super::{inspector_metadata, Modifier};
use clicks_foundation::{
    impl_draw_node, DelegatableNode, DrawModifierNode, DrawScope, Indication, IndicationInstance,
    InvalidationKind, ModifierNode, ModifierNodeContext, ModifierNodeElement,
    MutableInteractionSource, NodeCapabilities, NodeState, SubscriptionId,
};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

impl Modifier {
    /// Draws `indication` for the interactions emitted by `interaction_source`.
    pub fn indication(
        self,
        interaction_source: MutableInteractionSource,
        indication: Rc<dyn Indication>,
    ) -> Self {
        let description = format!("{indication:?}");
        let element = IndicationElement::new(interaction_source, indication);
        self.then(
            Self::with_element(element).with_inspector_metadata(inspector_metadata(
                "indication",
                move |info| {
                    info.add_property("indication", description);
                    info.add_property("interactionSource", "provided");
                },
            )),
        )
    }
}

pub(crate) fn same_indication(a: &Rc<dyn Indication>, b: &Rc<dyn Indication>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Element for [`Modifier::indication`].
#[derive(Clone)]
pub struct IndicationElement {
    interaction_source: MutableInteractionSource,
    indication: Rc<dyn Indication>,
}

impl IndicationElement {
    pub fn new(interaction_source: MutableInteractionSource, indication: Rc<dyn Indication>) -> Self {
        Self {
            interaction_source,
            indication,
        }
    }
}

impl fmt::Debug for IndicationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicationElement")
            .field("interaction_source", &self.interaction_source)
            .field("indication", &self.indication)
            .finish()
    }
}

impl PartialEq for IndicationElement {
    fn eq(&self, other: &Self) -> bool {
        self.interaction_source == other.interaction_source
            && same_indication(&self.indication, &other.indication)
    }
}

impl Hash for IndicationElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.interaction_source.hash(state);
        (Rc::as_ptr(&self.indication) as *const () as usize).hash(state);
    }
}

impl ModifierNodeElement for IndicationElement {
    type Node = IndicationNode;

    fn create(&self) -> Self::Node {
        IndicationNode::new(self.interaction_source.clone(), self.indication.clone())
    }

    fn update(&self, node: &mut Self::Node) {
        node.set(self.interaction_source.clone(), self.indication.clone());
    }

    fn inspector_name(&self) -> &'static str {
        "indication"
    }

    fn inspector_properties(&self, inspector: &mut dyn FnMut(&'static str, String)) {
        inspector("indication", format!("{:?}", self.indication));
    }

    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::DRAW
    }
}

/// Draw node that feeds one interaction source into one indication instance.
///
/// The instance is subscribed while the node is attached; presses that were
/// already active at attach time are replayed into it.
pub struct IndicationNode {
    interaction_source: MutableInteractionSource,
    indication: Rc<dyn Indication>,
    instance: Rc<RefCell<Box<dyn IndicationInstance>>>,
    subscription: Option<SubscriptionId>,
    state: NodeState,
}

impl IndicationNode {
    pub fn new(interaction_source: MutableInteractionSource, indication: Rc<dyn Indication>) -> Self {
        let instance = Rc::new(RefCell::new(indication.create_instance()));
        Self {
            interaction_source,
            indication,
            instance,
            subscription: None,
            state: NodeState::new(),
        }
    }

    pub fn interaction_source(&self) -> &MutableInteractionSource {
        &self.interaction_source
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Points the node at a new source or indication, resubscribing if attached.
    pub(crate) fn set(
        &mut self,
        interaction_source: MutableInteractionSource,
        indication: Rc<dyn Indication>,
    ) {
        if self.interaction_source == interaction_source
            && same_indication(&self.indication, &indication)
        {
            return;
        }
        let was_subscribed = self.subscription.is_some();
        self.unsubscribe();
        self.interaction_source = interaction_source;
        self.indication = indication;
        self.instance = Rc::new(RefCell::new(self.indication.create_instance()));
        if was_subscribed {
            self.subscribe();
        }
    }

    pub(crate) fn subscribe(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        {
            let mut instance = self.instance.borrow_mut();
            for press in self.interaction_source.active_presses() {
                instance.on_interaction(&clicks_foundation::Interaction::Press(press));
            }
        }
        let instance = self.instance.clone();
        self.subscription = Some(self.interaction_source.subscribe(move |interaction| {
            match instance.try_borrow_mut() {
                Ok(mut instance) => instance.on_interaction(interaction),
                Err(_) => log::warn!("indication busy, dropped {interaction:?}"),
            }
        }));
    }

    pub(crate) fn unsubscribe(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.interaction_source.unsubscribe(id);
        }
    }

    pub(crate) fn draw_indication(&self, draw_scope: &mut dyn DrawScope) {
        self.instance.borrow().draw_indication(draw_scope);
    }
}

impl fmt::Debug for IndicationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicationNode")
            .field("indication", &self.indication)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

impl DelegatableNode for IndicationNode {
    fn node_state(&self) -> &NodeState {
        &self.state
    }
}

impl ModifierNode for IndicationNode {
    fn on_attach(&mut self, context: &mut dyn ModifierNodeContext) {
        self.subscribe();
        context.invalidate(InvalidationKind::Draw);
    }

    fn on_detach(&mut self) {
        self.unsubscribe();
    }

    impl_draw_node!();
}

impl DrawModifierNode for IndicationNode {
    fn draw(&self, draw_scope: &mut dyn DrawScope) {
        self.draw_indication(draw_scope);
    }
}
