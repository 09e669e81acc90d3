use super::{inspector_metadata, Modifier, PointerEvent};
use clicks_foundation::{
    impl_pointer_input_node, DelegatableNode, ModifierNode, ModifierNodeContext,
    ModifierNodeElement, NodeCapabilities, NodeState, PointerInputNode, Size, ViewConfiguration,
};
use futures_task::{waker, ArcWake};
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::{hash_map::DefaultHasher, HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

impl Modifier {
    /// Runs `handler` as a suspending pointer input task for this component.
    ///
    /// The task is started when the node attaches and restarted whenever
    /// `key` changes; a restart drops the running future.
    pub fn pointer_input<K, F, Fut>(self, key: K, handler: F) -> Self
    where
        K: Hash + 'static,
        F: Fn(PointerInputScope) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let element =
            PointerInputElement::new(vec![KeyToken::new(&key)], pointer_input_handler(handler));
        let key_count = element.key_count();
        let handler_id = element.handler_id();
        self.then(
            Self::with_element(element).with_inspector_metadata(inspector_metadata(
                "pointerInput",
                move |info| {
                    info.add_property("keyCount", key_count.to_string());
                    info.add_property("handlerId", handler_id.to_string());
                },
            )),
        )
    }
}

pub(crate) fn pointer_input_handler<F, Fut>(handler: F) -> PointerInputHandler
where
    F: Fn(PointerInputScope) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    Rc::new(move |scope| Box::pin(handler(scope)))
}

type PointerInputFuture = Pin<Box<dyn Future<Output = ()>>>;
pub(crate) type PointerInputHandler = Rc<dyn Fn(PointerInputScope) -> PointerInputFuture>;

thread_local! {
    static POINTER_INPUT_TASKS: RefCell<HashMap<u64, Rc<PointerInputTaskInner>>> = RefCell::new(HashMap::new());
}

#[derive(Clone)]
struct PointerInputElement {
    keys: Vec<KeyToken>,
    handler: PointerInputHandler,
    handler_id: u64,
}

impl PointerInputElement {
    fn new(keys: Vec<KeyToken>, handler: PointerInputHandler) -> Self {
        static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);
        let handler_id = NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            keys,
            handler,
            handler_id,
        }
    }

    fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn handler_id(&self) -> u64 {
        self.handler_id
    }
}

impl fmt::Debug for PointerInputElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerInputElement")
            .field("keys", &self.keys)
            .field("handler_id", &self.handler_id)
            .finish()
    }
}

impl PartialEq for PointerInputElement {
    fn eq(&self, other: &Self) -> bool {
        // Elements are equal when their keys match, even if the handler
        // closure was recreated by the rebuild.
        self.keys == other.keys
    }
}

impl Eq for PointerInputElement {}

impl Hash for PointerInputElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.keys.hash(state);
    }
}

impl ModifierNodeElement for PointerInputElement {
    type Node = SuspendingPointerInputNode;

    fn create(&self) -> Self::Node {
        SuspendingPointerInputNode::new(self.keys.clone(), self.handler.clone())
    }

    fn update(&self, node: &mut Self::Node) {
        node.update(self.keys.clone(), self.handler.clone());
    }

    fn inspector_name(&self) -> &'static str {
        "pointerInput"
    }

    fn capabilities(&self) -> NodeCapabilities {
        NodeCapabilities::POINTER_INPUT
    }

    fn always_update(&self) -> bool {
        true
    }
}

#[derive(Clone)]
pub struct PointerInputScope {
    state: Rc<PointerInputScopeState>,
}

impl PointerInputScope {
    fn new(state: Rc<PointerInputScopeState>) -> Self {
        Self { state }
    }

    pub fn size(&self) -> Size {
        self.state.size.get()
    }

    pub fn view_configuration(&self) -> ViewConfiguration {
        self.state.view_configuration.get()
    }

    pub async fn await_pointer_event_scope<R, F, Fut>(&self, block: F) -> R
    where
        F: FnOnce(AwaitPointerEventScope) -> Fut,
        Fut: Future<Output = R>,
    {
        let scope = AwaitPointerEventScope {
            state: self.state.clone(),
        };
        block(scope).await
    }
}

#[derive(Clone)]
pub struct AwaitPointerEventScope {
    state: Rc<PointerInputScopeState>,
}

impl AwaitPointerEventScope {
    pub fn size(&self) -> Size {
        self.state.size.get()
    }

    pub fn view_configuration(&self) -> ViewConfiguration {
        self.state.view_configuration.get()
    }

    /// Latest uptime seen through a pointer event or a frame tick.
    pub fn uptime(&self) -> u64 {
        self.state.uptime.get()
    }

    pub async fn await_pointer_event(&self) -> PointerEvent {
        NextPointerEvent {
            state: self.state.clone(),
        }
        .await
    }

    /// Runs `block` until it completes or `time_millis` of uptime elapse,
    /// whichever comes first. On timeout the block's future is dropped and
    /// `None` is returned; events it did not take stay queued.
    pub async fn with_timeout_or_null<R, F, Fut>(&self, time_millis: u64, block: F) -> Option<R>
    where
        F: FnOnce(AwaitPointerEventScope) -> Fut,
        Fut: Future<Output = R>,
    {
        let deadline = self.state.uptime.get().saturating_add(time_millis);
        WithTimeout {
            state: self.state.clone(),
            deadline,
            inner: Box::pin(block(self.clone())),
        }
        .await
    }
}

struct NextPointerEvent {
    state: Rc<PointerInputScopeState>,
}

impl Future for NextPointerEvent {
    type Output = PointerEvent;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.state.poll_event(cx)
    }
}

struct WithTimeout<Fut> {
    state: Rc<PointerInputScopeState>,
    deadline: u64,
    inner: Pin<Box<Fut>>,
}

impl<Fut: Future> Future for WithTimeout<Fut> {
    type Output = Option<Fut::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        // Uptime only moves before the task is woken, so an event stamped at
        // or past the deadline loses against the timeout.
        if this.state.uptime.get() >= this.deadline {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll(cx) {
            Poll::Ready(value) => Poll::Ready(Some(value)),
            Poll::Pending => Poll::Pending,
        }
    }
}

struct PointerInputScopeState {
    events: RefCell<VecDeque<PointerEvent>>,
    waiting: RefCell<Option<Waker>>,
    size: Cell<Size>,
    uptime: Cell<u64>,
    view_configuration: Cell<ViewConfiguration>,
}

impl PointerInputScopeState {
    fn new(size: Size, view_configuration: ViewConfiguration) -> Self {
        Self {
            events: RefCell::new(VecDeque::new()),
            waiting: RefCell::new(None),
            size: Cell::new(size),
            uptime: Cell::new(0),
            view_configuration: Cell::new(view_configuration),
        }
    }

    fn push_event(&self, event: PointerEvent) {
        self.uptime.set(self.uptime.get().max(event.uptime));
        self.events.borrow_mut().push_back(event);
        self.wake();
    }

    fn advance_uptime(&self, uptime: u64) {
        if uptime > self.uptime.get() {
            self.uptime.set(uptime);
            self.wake();
        }
    }

    fn wake(&self) {
        let waker = self.waiting.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn poll_event(&self, cx: &mut Context<'_>) -> Poll<PointerEvent> {
        let next = self.events.borrow_mut().pop_front();
        match next {
            Some(event) => Poll::Ready(event),
            None => {
                *self.waiting.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

struct PointerEventDispatcher {
    state: Rc<RefCell<Option<Rc<PointerInputScopeState>>>>,
    handler: Rc<dyn Fn(PointerEvent)>,
    frame_handler: Rc<dyn Fn(u64)>,
}

impl PointerEventDispatcher {
    fn new() -> Self {
        let state = Rc::new(RefCell::new(None::<Rc<PointerInputScopeState>>));
        let state_for_handler = state.clone();
        let handler = Rc::new(move |event: PointerEvent| {
            let current = state_for_handler.borrow().clone();
            match current {
                Some(inner) => inner.push_event(event),
                None => log::debug!("pointer event dropped, no running pointer input task"),
            }
        });
        let state_for_frames = state.clone();
        let frame_handler = Rc::new(move |uptime: u64| {
            let current = state_for_frames.borrow().clone();
            if let Some(inner) = current {
                inner.advance_uptime(uptime);
            }
        });
        Self {
            state,
            handler,
            frame_handler,
        }
    }

    fn handler(&self) -> Rc<dyn Fn(PointerEvent)> {
        self.handler.clone()
    }

    fn frame_handler(&self) -> Rc<dyn Fn(u64)> {
        self.frame_handler.clone()
    }

    fn set_state(&self, state: Option<Rc<PointerInputScopeState>>) {
        *self.state.borrow_mut() = state;
    }

    fn current(&self) -> Option<Rc<PointerInputScopeState>> {
        self.state.borrow().clone()
    }
}

struct PointerInputTask {
    id: u64,
    inner: Rc<PointerInputTaskInner>,
}

impl PointerInputTask {
    fn new(future: PointerInputFuture) -> Self {
        static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let inner = Rc::new(PointerInputTaskInner::new(future));
        POINTER_INPUT_TASKS.with(|registry| {
            registry.borrow_mut().insert(id, inner.clone());
        });
        Self { id, inner }
    }

    fn poll(&self) {
        self.inner.poll(self.id);
    }

    fn cancel(self) {
        POINTER_INPUT_TASKS.with(|registry| {
            registry.borrow_mut().remove(&self.id);
        });
        self.inner.cancel();
    }
}

struct PointerInputTaskInner {
    future: RefCell<Option<PointerInputFuture>>,
    is_polling: Cell<bool>,
    needs_poll: Cell<bool>,
    cancelled: Cell<bool>,
}

impl PointerInputTaskInner {
    fn new(future: PointerInputFuture) -> Self {
        Self {
            future: RefCell::new(Some(future)),
            is_polling: Cell::new(false),
            needs_poll: Cell::new(false),
            cancelled: Cell::new(false),
        }
    }

    /// Drops the future, running the destructors of everything it owns.
    ///
    /// A task cancelled from inside its own poll (a callback that rebuilt the
    /// modifier) is dropped once that poll returns.
    fn cancel(&self) {
        self.cancelled.set(true);
        if self.is_polling.get() {
            return;
        }
        let future = self.future.borrow_mut().take();
        drop(future);
    }

    fn request_poll(&self, task_id: u64) {
        if self.is_polling.get() {
            self.needs_poll.set(true);
        } else {
            self.poll(task_id);
        }
    }

    fn poll(&self, task_id: u64) {
        if self.is_polling.replace(true) {
            self.needs_poll.set(true);
            return;
        }
        loop {
            self.needs_poll.set(false);
            if self.cancelled.get() {
                break;
            }
            let waker = waker(Arc::new(PointerInputTaskWaker { task_id }));
            let mut cx = Context::from_waker(&waker);
            let mut future_slot = self.future.borrow_mut();
            if let Some(future) = future_slot.as_mut() {
                if future.as_mut().poll(&mut cx).is_ready() {
                    future_slot.take();
                }
            }
            drop(future_slot);
            if !self.needs_poll.get() {
                break;
            }
        }
        self.is_polling.set(false);
        if self.cancelled.get() {
            let future = self.future.borrow_mut().take();
            drop(future);
        }
    }
}

struct PointerInputTaskWaker {
    task_id: u64,
}

impl ArcWake for PointerInputTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        let task = POINTER_INPUT_TASKS.with(|registry| registry.borrow().get(&arc_self.task_id).cloned());
        if let Some(task) = task {
            task.request_poll(arc_self.task_id);
        }
    }
}

/// Node that runs a pointer input handler as a cooperative task.
pub struct SuspendingPointerInputNode {
    keys: Vec<KeyToken>,
    handler: PointerInputHandler,
    dispatcher: PointerEventDispatcher,
    task: Option<PointerInputTask>,
    size: Size,
    view_configuration: ViewConfiguration,
    state: NodeState,
}

impl SuspendingPointerInputNode {
    pub(crate) fn new(keys: Vec<KeyToken>, handler: PointerInputHandler) -> Self {
        Self {
            keys,
            handler,
            dispatcher: PointerEventDispatcher::new(),
            task: None,
            size: Size::ZERO,
            view_configuration: ViewConfiguration::default(),
            state: NodeState::new(),
        }
    }

    /// Swaps in the latest handler and restarts the task only if the keys changed.
    pub(crate) fn update(&mut self, keys: Vec<KeyToken>, handler: PointerInputHandler) {
        let should_restart = self.keys != keys;
        self.keys = keys;
        self.handler = handler;
        if should_restart && self.task.is_some() {
            log::debug!("pointer input keys changed, restarting task");
            self.restart();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn restart(&mut self) {
        self.cancel();
        self.start();
    }

    fn start(&mut self) {
        let state = Rc::new(PointerInputScopeState::new(
            self.size,
            self.view_configuration,
        ));
        self.dispatcher.set_state(Some(state.clone()));
        let scope = PointerInputScope::new(state);
        let future = (self.handler)(scope);
        let task = PointerInputTask::new(future);
        self.task = Some(task);
        if let Some(task) = &self.task {
            task.poll();
        }
    }

    fn cancel(&mut self) {
        self.dispatcher.set_state(None);
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

impl Drop for SuspendingPointerInputNode {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for SuspendingPointerInputNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspendingPointerInputNode")
            .field("keys", &self.keys)
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl ModifierNode for SuspendingPointerInputNode {
    fn on_attach(&mut self, context: &mut dyn ModifierNodeContext) {
        self.view_configuration = context.view_configuration();
        self.start();
    }

    fn on_detach(&mut self) {
        self.cancel();
    }

    impl_pointer_input_node!();
}

impl DelegatableNode for SuspendingPointerInputNode {
    fn node_state(&self) -> &NodeState {
        &self.state
    }
}

impl PointerInputNode for SuspendingPointerInputNode {
    fn pointer_input_handler(&self) -> Option<Rc<dyn Fn(PointerEvent)>> {
        Some(self.dispatcher.handler())
    }

    fn frame_handler(&self) -> Option<Rc<dyn Fn(u64)>> {
        Some(self.dispatcher.frame_handler())
    }

    fn on_remeasured(&mut self, size: Size) {
        self.size = size;
        if let Some(state) = self.dispatcher.current() {
            state.size.set(size);
        }
    }
}

/// Hashed identity of a pointer input key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyToken {
    type_id: TypeId,
    hash: u64,
}

impl KeyToken {
    pub fn new<T: Hash + 'static>(value: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self {
            type_id: TypeId::of::<T>(),
            hash: hasher.finish(),
        }
    }
}

#[cfg(test)]
#[path = "tests/pointer_input_tests.rs"]
mod tests;
