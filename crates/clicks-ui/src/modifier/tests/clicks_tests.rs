use super::*;
use crate::modifier::{InspectableModifier, InspectorInfo, ModifierChainHandle};
use clicks_foundation::{
    DrawPrimitive, DrawScopeDefault, HighlightIndication, NoIndication, Point, PointerEventKind,
};
use std::cell::Cell;

fn event(kind: PointerEventKind, uptime: u64) -> PointerEvent {
    let position = Point::new(20.0, 20.0);
    PointerEvent::new(kind, position).with_uptime(uptime)
}

fn hosted(modifier: &Modifier) -> ModifierChainHandle {
    let mut handle = ModifierChainHandle::new();
    handle.on_remeasured(Size::new(100.0, 100.0));
    handle.update(modifier);
    handle
}

fn record_interactions(source: &MutableInteractionSource) -> Rc<RefCell<Vec<&'static str>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let recorder = log.clone();
    source.subscribe(move |interaction| {
        recorder.borrow_mut().push(match interaction {
            Interaction::Press(_) => "press",
            Interaction::Release(_) => "release",
        })
    });
    log
}

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let count = Rc::new(Cell::new(0));
    let increment = {
        let count = count.clone();
        move || count.set(count.get() + 1)
    };
    (count, increment)
}

#[test]
fn last_press_state_releases_each_press_once() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let state = LastPressState::new();
    let press = Press::new(Point::ZERO);

    state.begin(&source, press);
    assert_eq!(state.current(), Some(press));
    assert!(state.end(&source, press));
    assert!(!state.end(&source, press));

    assert_eq!(*log.borrow(), vec!["press", "release"]);
    assert!(!source.is_pressed());
}

#[test]
fn new_press_releases_the_stale_one_first() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let state = LastPressState::new();
    let first = Press::new(Point::ZERO);
    let second = Press::new(Point::new(1.0, 1.0));

    state.begin(&source, first);
    state.begin(&source, second);
    // The stale press was already released, so its guard is a no-op.
    assert!(!state.end(&source, first));
    assert!(state.end(&source, second));

    assert_eq!(*log.borrow(), vec!["press", "release", "press", "release"]);
}

#[test]
fn element_equality_ignores_closures() {
    let source = MutableInteractionSource::new();
    let indication: Rc<dyn Indication> = Rc::new(NoIndication);
    let make = |enabled: bool| {
        ClicksElement::new(
            enabled,
            Some(source.clone()),
            indication.clone(),
            None,
            Some(Rc::new(|| {})),
            None,
        )
    };

    assert_eq!(make(true), make(true));
    assert_ne!(make(true), make(false));
}

#[test]
fn tap_reports_press_and_release_to_the_source() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let (clicks, on_click) = counter();
    let modifier =
        Modifier::empty().on_click_with(true, source.clone(), Rc::new(NoIndication), on_click);
    let mut handle = hosted(&modifier);

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    assert!(source.is_pressed());
    handle.dispatch_pointer_event(event(PointerEventKind::Up, 80));

    assert_eq!(clicks.get(), 1);
    assert_eq!(*log.borrow(), vec!["press", "release"]);
    assert!(!source.is_pressed());
}

#[test]
fn disabled_node_reports_nothing() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let (clicks, on_click) = counter();
    let (long_clicks, on_long_click) = counter();
    let modifier = Modifier::empty().clicks_with(
        false,
        source.clone(),
        Rc::new(NoIndication),
        on_click,
        on_long_click,
    );
    let mut handle = hosted(&modifier);

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    handle.dispatch_pointer_event(event(PointerEventKind::Up, 50));
    handle.dispatch_pointer_event(event(PointerEventKind::Down, 100));
    handle.dispatch_pointer_event(event(PointerEventKind::Up, 800));

    assert_eq!(clicks.get(), 0);
    assert_eq!(long_clicks.get(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn disabling_mid_press_flushes_the_release() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let indication: Rc<dyn Indication> = Rc::new(NoIndication);
    let (clicks, on_click) = counter();
    let mut handle = hosted(&Modifier::empty().on_click_with(
        true,
        source.clone(),
        indication.clone(),
        on_click,
    ));

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    handle.update(&Modifier::empty().on_click_with(false, source.clone(), indication, || {}));
    assert_eq!(*log.borrow(), vec!["press", "release"]);

    handle.dispatch_pointer_event(event(PointerEventKind::Up, 50));
    assert_eq!(clicks.get(), 0);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn rebuilt_callbacks_reach_the_running_gesture() {
    let (first, on_first) = counter();
    let (second, on_second) = counter();
    let mut handle = hosted(&Modifier::empty().on_click(true, on_first));

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    handle.update(&Modifier::empty().on_click(true, on_second));
    {
        let node = handle.chain().node::<ClicksNode>(0);
        assert!(node.is_some_and(|node| node.last_press().current().is_some()));
    }
    handle.dispatch_pointer_event(event(PointerEventKind::Up, 40));

    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn internal_source_survives_rebuilds() {
    let mut handle = hosted(&Modifier::empty().clicks(true, || {}, || {}));
    let before = handle
        .chain()
        .node::<ClicksNode>(0)
        .map(|node| node.interaction_source().clone());

    handle.update(&Modifier::empty().clicks(true, || {}, || {}));
    let after = handle
        .chain()
        .node::<ClicksNode>(0)
        .map(|node| node.interaction_source().clone());

    assert!(before.is_some());
    assert_eq!(before, after);
}

#[test]
fn changing_key_abandons_the_gesture() {
    let source = MutableInteractionSource::new();
    let log = record_interactions(&source);
    let indication: Rc<dyn Indication> = Rc::new(NoIndication);
    let (long_clicks, on_long_click) = counter();
    let mut handle = hosted(&Modifier::empty().on_long_click_with(
        true,
        Some(1),
        source.clone(),
        indication.clone(),
        on_long_click,
    ));

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    handle.update(&Modifier::empty().on_long_click_with(
        true,
        Some(2),
        source.clone(),
        indication,
        || {},
    ));
    handle.on_frame(700);

    assert_eq!(long_clicks.get(), 0);
    assert_eq!(*log.borrow(), vec!["press", "release"]);
}

#[test]
fn node_draws_highlight_while_pressed() {
    let indication: Rc<dyn Indication> = Rc::new(HighlightIndication::default());
    let modifier = Modifier::empty().on_click_with(
        true,
        MutableInteractionSource::new(),
        indication,
        || {},
    );
    let mut handle = hosted(&modifier);
    let draw = |handle: &ModifierChainHandle| {
        let mut scope = DrawScopeDefault::new(Size::new(100.0, 100.0));
        handle.draw(&mut scope);
        scope.into_primitives()
    };

    assert_eq!(draw(&handle), vec![DrawPrimitive::Content]);

    handle.dispatch_pointer_event(event(PointerEventKind::Down, 0));
    assert_eq!(
        draw(&handle),
        vec![
            DrawPrimitive::Content,
            DrawPrimitive::Rect {
                size: Size::new(100.0, 100.0),
                color: HighlightIndication::default().color,
            },
        ]
    );

    handle.dispatch_pointer_event(event(PointerEventKind::Up, 30));
    assert_eq!(draw(&handle), vec![DrawPrimitive::Content]);
}

#[test]
fn inspector_records_key_and_source() {
    let modifier = Modifier::empty().on_long_click_with(
        true,
        Some(9),
        MutableInteractionSource::new(),
        Rc::new(NoIndication),
        || {},
    );
    let mut info = InspectorInfo::new();
    modifier.inspect(&mut info);
    let properties = info.debug_properties();

    assert!(properties.contains(&("key1", "9".to_string())));
    assert!(properties.contains(&("interactionSource", "provided".to_string())));
    assert!(properties.contains(&("onClick", "none".to_string())));

    let mut element_properties = Vec::new();
    modifier.elements()[0].record_inspector_properties(&mut |name, value| {
        element_properties.push((name, value))
    });
    assert!(element_properties.contains(&("enabled", "true".to_string())));
}
