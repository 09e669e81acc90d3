//! Modifier builder.
//!
//! A [`Modifier`] is an immutable, cheaply clonable list of modifier
//! elements plus the inspector metadata contributed by the factories that
//! produced them. Hosts reconcile the element list into a
//! [`ModifierNodeChain`](clicks_foundation::ModifierNodeChain) through
//! [`ModifierChainHandle`].

use clicks_foundation::{modifier_element, DynModifierElement, ModifierNodeElement, PointerEvent};
use std::fmt;
use std::rc::Rc;

mod chain;
mod clicks;
mod indication;
mod pointer_input;

pub use chain::ModifierChainHandle;
pub use clicks::{ClicksElement, ClicksNode, LastPressState};
pub use indication::{IndicationElement, IndicationNode};
pub use pointer_input::{
    AwaitPointerEventScope, KeyToken, PointerInputScope, SuspendingPointerInputNode,
};

/// Minimal inspector metadata storage.
#[derive(Clone, Debug, Default)]
pub struct InspectorInfo {
    properties: Vec<InspectorProperty>,
}

impl InspectorInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property<V: Into<String>>(&mut self, name: &'static str, value: V) {
        self.properties.push(InspectorProperty {
            name,
            value: value.into(),
        });
    }

    pub fn properties(&self) -> &[InspectorProperty] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn debug_properties(&self) -> Vec<(&'static str, String)> {
        self.properties
            .iter()
            .map(|property| (property.name, property.value.clone()))
            .collect()
    }

    pub fn describe(&self) -> String {
        self.properties
            .iter()
            .map(|property| format!("{}={}", property.name, property.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Single inspector entry recording a property exposed by a modifier.
#[derive(Clone, Debug)]
pub struct InspectorProperty {
    pub name: &'static str,
    pub value: String,
}

/// Helper describing the metadata contributed by a modifier factory.
#[derive(Clone, Debug)]
pub(crate) struct InspectorMetadata {
    name: &'static str,
    info: InspectorInfo,
}

impl InspectorMetadata {
    pub(crate) fn new<F>(name: &'static str, recorder: F) -> Self
    where
        F: FnOnce(&mut InspectorInfo),
    {
        let mut info = InspectorInfo::new();
        recorder(&mut info);
        Self { name, info }
    }

    fn append_to(&self, target: &mut InspectorInfo) {
        target.add_property("name", self.name);
        for property in self.info.properties() {
            target.add_property(property.name, property.value.clone());
        }
    }
}

pub(crate) fn inspector_metadata<F>(name: &'static str, recorder: F) -> InspectorMetadata
where
    F: FnOnce(&mut InspectorInfo),
{
    InspectorMetadata::new(name, recorder)
}

/// Trait implemented by modifiers that can describe themselves for tooling.
pub trait InspectableModifier {
    /// Human-readable name exposed to inspector tooling.
    fn inspector_name(&self) -> &'static str {
        "Modifier"
    }

    /// Records inspector metadata for the modifier chain.
    fn inspect(&self, _info: &mut InspectorInfo) {}
}

#[derive(Clone, Default)]
pub struct Modifier {
    elements: Rc<Vec<DynModifierElement>>,
    inspector: Rc<Vec<InspectorMetadata>>,
}

impl Modifier {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps a single element.
    pub fn with_element<E: ModifierNodeElement>(element: E) -> Self {
        Self {
            elements: Rc::new(vec![modifier_element(element)]),
            inspector: Rc::new(Vec::new()),
        }
    }

    pub(crate) fn with_inspector_metadata(self, metadata: InspectorMetadata) -> Self {
        let mut inspector = (*self.inspector).clone();
        inspector.push(metadata);
        Self {
            elements: self.elements,
            inspector: Rc::new(inspector),
        }
    }

    /// Concatenates `next` after this modifier.
    pub fn then(&self, next: Modifier) -> Modifier {
        if self.is_trivially_empty() {
            return next;
        }
        if next.is_trivially_empty() {
            return self.clone();
        }
        let mut elements = Vec::with_capacity(self.elements.len() + next.elements.len());
        elements.extend(self.elements.iter().cloned());
        elements.extend(next.elements.iter().cloned());
        let mut inspector = Vec::with_capacity(self.inspector.len() + next.inspector.len());
        inspector.extend(self.inspector.iter().cloned());
        inspector.extend(next.inspector.iter().cloned());
        Modifier {
            elements: Rc::new(elements),
            inspector: Rc::new(inspector),
        }
    }

    pub fn elements(&self) -> &[DynModifierElement] {
        &self.elements
    }

    fn is_trivially_empty(&self) -> bool {
        self.elements.is_empty() && self.inspector.is_empty()
    }
}

impl InspectableModifier for Modifier {
    fn inspect(&self, info: &mut InspectorInfo) {
        for metadata in self.inspector.iter() {
            metadata.append_to(info);
        }
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements) && Rc::ptr_eq(&self.inspector, &other.inspector)
    }
}

impl Eq for Modifier {}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("elements", &self.elements.len())
            .field("inspector_entries", &self.inspector.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/modifier_tests.rs"]
mod tests;
