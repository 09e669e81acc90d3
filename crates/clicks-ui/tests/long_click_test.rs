//! Long-press behavior of `Modifier::on_long_click`.

use clicks_testing::ClicksTestRule;
use clicks_ui::*;
use std::cell::Cell;
use std::rc::Rc;

fn toggle(value: &Rc<Cell<bool>>) -> impl Fn() + 'static {
    let value = value.clone();
    move || value.set(!value.get())
}

fn long_click(rule: &mut ClicksTestRule) {
    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.long_click(center)
    })
    .expect("long click");
}

fn assert_enabled_toggles(rule: &mut ClicksTestRule, value: &Rc<Cell<bool>>) {
    assert!(!value.get());
    long_click(rule);
    assert!(value.get());
    long_click(rule);
    assert!(!value.get());
}

fn assert_disabled_ignores(rule: &mut ClicksTestRule, value: &Rc<Cell<bool>>) {
    assert!(!value.get());
    long_click(rule);
    assert!(!value.get());
    long_click(rule);
    assert!(!value.get());
}

#[test]
fn on_long_click_default() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().on_long_click(toggle(&value)));
    assert_enabled_toggles(&mut rule, &value);
}

#[test]
fn on_long_click_with_enabled() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().on_long_click_with(
        true,
        None,
        MutableInteractionSource::new(),
        LocalIndication::current(),
        toggle(&value),
    ));
    assert_enabled_toggles(&mut rule, &value);
}

#[test]
fn on_long_click_with_disabled() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().on_long_click_with(
        false,
        None,
        MutableInteractionSource::new(),
        LocalIndication::current(),
        toggle(&value),
    ));
    assert_disabled_ignores(&mut rule, &value);
}

#[test]
fn quick_tap_is_not_a_long_click() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().on_long_click(toggle(&value)));

    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.click(center)
    })
    .expect("click");

    assert!(!value.get());
}

#[test]
fn long_press_fires_while_the_pointer_is_still_down() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().on_long_click(toggle(&value)));

    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.down(center)
    })
    .expect("down");
    rule.advance_time_by(499);
    assert!(!value.get());
    rule.advance_time_by(101);
    assert!(value.get());
    assert!(rule.is_pointer_down());

    rule.perform_touch_input(|touch| touch.up()).expect("up");
    assert!(value.get());
}

#[test]
fn custom_timeout_from_view_configuration() {
    let value = Rc::new(Cell::new(false));
    let mut rule = ClicksTestRule::with_view_configuration(ViewConfiguration::new(200, 8.0));
    rule.set_content(Modifier::empty().on_long_click(toggle(&value)));

    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.down(center)?;
        touch.advance_event_time(250);
        touch.up()
    })
    .expect("hold");

    assert!(value.get());
}
