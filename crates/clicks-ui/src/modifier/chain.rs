use clicks_foundation::{
    BasicModifierNodeContext, Color, DrawScope, ModifierInvalidation, ModifierNodeChain,
    NodeCapabilities, PointerDispatcher, PointerEvent, Size, ViewConfiguration,
};
use smallvec::SmallVec;
use std::rc::Rc;

use super::Modifier;

/// Runtime helper that keeps a [`ModifierNodeChain`] in sync with a [`Modifier`].
///
/// Hosts keep one handle per component, feed it the latest `Modifier` on
/// every rebuild and route pointer events, frame ticks and size changes
/// through it.
#[derive(Default)]
pub struct ModifierChainHandle {
    chain: ModifierNodeChain,
    context: BasicModifierNodeContext,
    dispatcher: PointerDispatcher,
    size: Size,
}

impl ModifierChainHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the underlying [`ModifierNodeChain`] with the elements stored in `modifier`.
    pub fn update(&mut self, modifier: &Modifier) {
        self.chain
            .update_from_slice(modifier.elements(), &mut self.context);
        if !self.size.is_empty() {
            let size = self.size;
            self.chain
                .for_each_node_with_capability_mut(NodeCapabilities::POINTER_INPUT, |node| {
                    if let Some(pointer) = node.as_pointer_input_node_mut() {
                        pointer.on_remeasured(size);
                    }
                });
        }
    }

    /// Returns the modifier node chain for read-only traversal.
    pub fn chain(&self) -> &ModifierNodeChain {
        &self.chain
    }

    /// Returns the aggregated capability mask for the reconciled chain.
    pub fn capabilities(&self) -> NodeCapabilities {
        self.chain.capabilities()
    }

    pub fn has_draw_nodes(&self) -> bool {
        self.chain.has_capability(NodeCapabilities::DRAW)
    }

    pub fn has_pointer_input_nodes(&self) -> bool {
        self.chain.has_capability(NodeCapabilities::POINTER_INPUT)
    }

    /// Configuration handed to nodes attached after this call.
    pub fn set_view_configuration(&mut self, configuration: ViewConfiguration) {
        self.context.set_view_configuration(configuration);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Propagates a new layout size to every pointer input node.
    pub fn on_remeasured(&mut self, size: Size) {
        if self.size == size {
            return;
        }
        self.size = size;
        self.chain
            .for_each_node_with_capability_mut(NodeCapabilities::POINTER_INPUT, |node| {
                if let Some(pointer) = node.as_pointer_input_node_mut() {
                    pointer.on_remeasured(size);
                }
            });
    }

    /// Queues `event` and delivers everything queued.
    ///
    /// Each event reaches the innermost pointer input node first, so an inner
    /// modifier consumes a tap before the ones wrapping it see the event.
    /// Handlers are collected before any of them runs, so callbacks fired by
    /// a gesture may rebuild the modifier of this component.
    pub fn dispatch_pointer_event(&mut self, event: PointerEvent) {
        self.dispatcher.push(event);
        let handlers = self.pointer_handlers();
        if handlers.is_empty() {
            log::debug!(
                "dropping {} pointer event(s), no pointer input nodes",
                self.dispatcher.len()
            );
        }
        self.dispatcher.drain(|_, event| {
            for handler in handlers.iter().rev() {
                handler(event.clone());
            }
        });
    }

    /// Advances host uptime for nodes waiting on a timeout.
    pub fn on_frame(&mut self, uptime_millis: u64) {
        let mut handlers: SmallVec<[Rc<dyn Fn(u64)>; 2]> = SmallVec::new();
        self.chain
            .for_each_node_with_capability(NodeCapabilities::POINTER_INPUT, |node| {
                if let Some(handler) = node
                    .as_pointer_input_node()
                    .and_then(|pointer| pointer.frame_handler())
                {
                    handlers.push(handler);
                }
            });
        for handler in handlers {
            handler(uptime_millis);
        }
    }

    /// Draws every draw node head to tail. Content is recorded once, by the
    /// first node that asks for it.
    pub fn draw(&self, draw_scope: &mut dyn DrawScope) {
        let mut drew = false;
        self.chain
            .for_each_node_with_capability(NodeCapabilities::DRAW, |node| {
                if let Some(draw) = node.as_draw_node() {
                    let mut layer = NoContentScope {
                        inner: &mut *draw_scope,
                        first: !drew,
                    };
                    draw.draw(&mut layer);
                    drew = true;
                }
            });
        if !drew {
            draw_scope.draw_content();
        }
    }

    /// Drains invalidations requested since the last call.
    pub fn take_invalidations(&mut self) -> Vec<ModifierInvalidation> {
        self.context.take_invalidations()
    }

    /// Detaches every node. Gestures in flight are cancelled and their
    /// pending releases flushed.
    pub fn dispose(&mut self) {
        self.chain.detach_all();
    }

    fn pointer_handlers(&self) -> SmallVec<[Rc<dyn Fn(PointerEvent)>; 2]> {
        let mut handlers = SmallVec::new();
        self.chain
            .for_each_node_with_capability(NodeCapabilities::POINTER_INPUT, |node| {
                if let Some(handler) = node
                    .as_pointer_input_node()
                    .and_then(|pointer| pointer.pointer_input_handler())
                {
                    handlers.push(handler);
                }
            });
        handlers
    }
}

/// Forwards to the host scope, letting only the outermost draw node emit the content.
struct NoContentScope<'a, 'b> {
    inner: &'a mut (dyn DrawScope + 'b),
    first: bool,
}

impl DrawScope for NoContentScope<'_, '_> {
    fn size(&self) -> Size {
        self.inner.size()
    }

    fn draw_content(&mut self) {
        if self.first {
            self.inner.draw_content();
        }
    }

    fn draw_rect(&mut self, color: Color) {
        self.inner.draw_rect(color);
    }
}

impl Drop for ModifierChainHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "tests/chain_tests.rs"]
mod tests;
