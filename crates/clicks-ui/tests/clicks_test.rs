//! Combined tap and long-press behavior of `Modifier::clicks`.

use clicks_testing::{ClicksTestRule, TouchInputError};
use clicks_ui::*;
use std::cell::Cell;
use std::rc::Rc;

struct Flags {
    click: Rc<Cell<bool>>,
    long_click: Rc<Cell<bool>>,
}

impl Flags {
    fn new() -> Self {
        Self {
            click: Rc::new(Cell::new(false)),
            long_click: Rc::new(Cell::new(false)),
        }
    }

    fn on_click(&self) -> impl Fn() + 'static {
        let value = self.click.clone();
        move || value.set(!value.get())
    }

    fn on_long_click(&self) -> impl Fn() + 'static {
        let value = self.long_click.clone();
        move || value.set(!value.get())
    }

    fn get(&self) -> (bool, bool) {
        (self.click.get(), self.long_click.get())
    }
}

fn click(rule: &mut ClicksTestRule) -> Result<(), TouchInputError> {
    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.click(center)
    })
}

fn long_click(rule: &mut ClicksTestRule) -> Result<(), TouchInputError> {
    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.long_click(center)
    })
}

fn assert_enabled(rule: &mut ClicksTestRule, flags: &Flags) -> Result<(), TouchInputError> {
    assert_eq!(flags.get(), (false, false));
    click(rule)?;
    assert_eq!(flags.get(), (true, false));
    click(rule)?;
    assert_eq!(flags.get(), (false, false));
    long_click(rule)?;
    assert_eq!(flags.get(), (false, true));
    long_click(rule)?;
    assert_eq!(flags.get(), (false, false));
    click(rule)?;
    long_click(rule)?;
    assert_eq!(flags.get(), (true, true));
    click(rule)?;
    long_click(rule)?;
    assert_eq!(flags.get(), (false, false));
    Ok(())
}

fn assert_disabled(rule: &mut ClicksTestRule, flags: &Flags) -> Result<(), TouchInputError> {
    for _ in 0..2 {
        click(rule)?;
        assert_eq!(flags.get(), (false, false));
        long_click(rule)?;
        assert_eq!(flags.get(), (false, false));
    }
    Ok(())
}

#[test]
fn clicks_default() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks(true, flags.on_click(), flags.on_long_click()));
    assert_enabled(&mut rule, &flags)
}

#[test]
fn clicks_disabled() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks(false, flags.on_click(), flags.on_long_click()));
    assert_disabled(&mut rule, &flags)
}

#[test]
fn clicks_with_source_and_indication() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks_with(
        true,
        MutableInteractionSource::new(),
        LocalIndication::current(),
        flags.on_click(),
        flags.on_long_click(),
    ));
    assert_enabled(&mut rule, &flags)
}

#[test]
fn clicks_with_disabled() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks_with(
        false,
        MutableInteractionSource::new(),
        LocalIndication::current(),
        flags.on_click(),
        flags.on_long_click(),
    ));
    assert_disabled(&mut rule, &flags)
}

#[test]
fn hold_of_six_hundred_millis_is_only_a_long_click() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks(true, flags.on_click(), flags.on_long_click()));

    rule.perform_touch_input(|touch| {
        let center = touch.center();
        touch.down(center)?;
        touch.advance_event_time(600);
        touch.up()
    })?;

    assert_eq!(flags.get(), (false, true));
    Ok(())
}

#[test]
fn enabling_later_starts_reporting() -> Result<(), TouchInputError> {
    let flags = Flags::new();
    let mut rule = ClicksTestRule::new();
    rule.set_content(Modifier::empty().clicks(false, flags.on_click(), flags.on_long_click()));
    click(&mut rule)?;
    assert_eq!(flags.get(), (false, false));

    rule.recompose(Modifier::empty().clicks(true, flags.on_click(), flags.on_long_click()));
    click(&mut rule)?;
    assert_eq!(flags.get(), (true, false));
    Ok(())
}
