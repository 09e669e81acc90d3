//! Tap and long-press modifiers built on the clicks foundation node system.

pub mod gestures;
mod modifier;

pub use clicks_foundation::{
    Color, DrawScope, HighlightIndication, Indication, Interaction, LocalIndication,
    MutableInteractionSource, NoIndication, Point, PointerEvent, PointerEventKind, Press, Size,
    ViewConfiguration,
};
pub use gestures::{detect_tap_gestures, PressGuard, TapGestureHandlers};
pub use modifier::{
    AwaitPointerEventScope, ClicksElement, ClicksNode, IndicationElement, IndicationNode,
    InspectableModifier, InspectorInfo, InspectorProperty, KeyToken, LastPressState, Modifier,
    ModifierChainHandle, PointerInputScope, SuspendingPointerInputNode,
};

pub mod prelude {
    pub use crate::gestures::{detect_tap_gestures, TapGestureHandlers};
    pub use crate::modifier::{InspectableModifier, Modifier, ModifierChainHandle};
    pub use clicks_foundation::prelude::*;
}
