//! Foundation for the clicks modifiers: modifier nodes, pointer input,
//! interaction sources and indications.

pub mod gesture_constants;
pub mod graphics;
pub mod indication;
pub mod interaction;
pub mod modifier;
pub mod modifier_helpers;
pub mod nodes;
pub mod uptime;

// Re-export commonly used items
pub use gesture_constants::*;
pub use graphics::*;
pub use indication::*;
pub use interaction::*;
pub use modifier::*;
pub use nodes::input::{
    PointerButton, PointerButtons, PointerDispatcher, PointerEvent, PointerEventKind, PointerId,
};
pub use uptime::SystemUptime;

pub mod prelude {
    pub use crate::gesture_constants::{ViewConfiguration, DRAG_THRESHOLD};
    pub use crate::graphics::{Color, DrawScope, Point, Size};
    pub use crate::indication::{HighlightIndication, Indication, LocalIndication, NoIndication};
    pub use crate::interaction::{Interaction, MutableInteractionSource, Press};
    pub use crate::modifier::{
        BasicModifierNodeContext, DelegatableNode, DrawModifierNode, InvalidationKind,
        ModifierNode, ModifierNodeChain, ModifierNodeContext, ModifierNodeElement, NodeState,
        PointerInputNode,
    };
    pub use crate::nodes::input::prelude::*;
    pub use crate::{impl_draw_node, impl_modifier_node, impl_pointer_input_node};
}
