//! Helper macros to reduce boilerplate when implementing modifier nodes.
//!
//! Setting capability bits on the element and implementing the specialized
//! trait is enough for a node to take part in the corresponding phase; these
//! macros provide the `as_*` accessors that expose the trait object.

/// Implements the as_draw_node methods for a type that implements DrawModifierNode.
///
/// # Example
///
/// ```text
/// impl ModifierNode for MyNode {
///     impl_draw_node!();
/// }
/// ```
#[macro_export]
macro_rules! impl_draw_node {
    () => {
        fn as_draw_node(&self) -> Option<&dyn $crate::DrawModifierNode> {
            Some(self)
        }

        fn as_draw_node_mut(&mut self) -> Option<&mut dyn $crate::DrawModifierNode> {
            Some(self)
        }
    };
}

/// Implements the as_pointer_input_node methods for a type that implements PointerInputNode.
#[macro_export]
macro_rules! impl_pointer_input_node {
    () => {
        fn as_pointer_input_node(&self) -> Option<&dyn $crate::PointerInputNode> {
            Some(self)
        }

        fn as_pointer_input_node_mut(&mut self) -> Option<&mut dyn $crate::PointerInputNode> {
            Some(self)
        }
    };
}

/// Implements all capability accessors for a modifier node in one go.
///
/// # Example
///
/// ```text
/// impl ModifierNode for MyPointerNode {
///     impl_modifier_node!(pointer_input);
/// }
///
/// impl ModifierNode for MyComplexNode {
///     impl_modifier_node!(draw, pointer_input);
/// }
/// ```
#[macro_export]
macro_rules! impl_modifier_node {
    (draw) => {
        $crate::impl_draw_node!();
    };
    (pointer_input) => {
        $crate::impl_pointer_input_node!();
    };
    (draw, $($rest:tt)*) => {
        $crate::impl_draw_node!();
        $crate::impl_modifier_node!($($rest)*);
    };
    (pointer_input, $($rest:tt)*) => {
        $crate::impl_pointer_input_node!();
        $crate::impl_modifier_node!($($rest)*);
    };
}
