use clicks_foundation::{PointerButton, PointerButtons, SystemUptime};
use clicks_ui::{
    Modifier, ModifierChainHandle, MutableInteractionSource, LocalIndication, Point,
    PointerEvent, PointerEventKind, Size,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::cell::Cell;
use std::rc::Rc;

const CONTENT_SIZE: Size = Size {
    width: 200.0,
    height: 80.0,
};
const STACK_DEPTH_SAMPLES: &[usize] = &[1, 4, 16];

fn event(kind: PointerEventKind, position: Point, uptime: u64) -> PointerEvent {
    let buttons = if kind == PointerEventKind::Down {
        PointerButtons::new().with(PointerButton::Primary)
    } else {
        PointerButtons::NONE
    };
    PointerEvent::new(kind, position)
        .with_buttons(buttons)
        .with_uptime(uptime)
}

fn clicks_stack(depth: usize, taps: &Rc<Cell<u64>>) -> Modifier {
    (0..depth).fold(Modifier::empty(), |modifier, _| {
        let taps = taps.clone();
        modifier.clicks_with(
            true,
            MutableInteractionSource::new(),
            LocalIndication::current(),
            move || taps.set(taps.get() + 1),
            || {},
        )
    })
}

fn dispatch_click_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_click_sequence");
    for &depth in STACK_DEPTH_SAMPLES {
        let taps = Rc::new(Cell::new(0));
        let mut handle = ModifierChainHandle::new();
        handle.on_remeasured(CONTENT_SIZE);
        handle.update(&clicks_stack(depth, &taps));
        let center = Point::new(CONTENT_SIZE.width / 2.0, CONTENT_SIZE.height / 2.0);
        let clock = SystemUptime::new();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let down = clock.now_millis();
                handle.dispatch_pointer_event(event(PointerEventKind::Down, center, down));
                handle.dispatch_pointer_event(event(PointerEventKind::Up, center, clock.now_millis()));
                handle.on_frame(clock.now_millis());
                black_box(taps.get());
            });
        });
    }
    group.finish();
}

fn rebuild_with_fresh_callbacks(c: &mut Criterion) {
    let taps = Rc::new(Cell::new(0));
    let source = MutableInteractionSource::new();
    let mut handle = ModifierChainHandle::new();
    handle.on_remeasured(CONTENT_SIZE);

    c.bench_function("rebuild_with_fresh_callbacks", |b| {
        b.iter(|| {
            let taps = taps.clone();
            let modifier = Modifier::empty().clicks_with(
                true,
                source.clone(),
                LocalIndication::current(),
                move || taps.set(taps.get() + 1),
                || {},
            );
            handle.update(black_box(&modifier));
        });
    });
}

criterion_group!(benches, dispatch_click_sequence, rebuild_with_fresh_callbacks);
criterion_main!(benches);
