//! Capability toggles.

use std::collections::BTreeMap;

use crate::{
  driver::{Capability, Driver},
  stack::{BindingStack, Popped},
  state::State,
};

#[derive(Debug, Default)]
pub struct BoolStateTable {
  stacks: BTreeMap<Capability, BindingStack<bool>>,
}

impl BoolStateTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn stack(&mut self, cap: Capability) -> &mut BindingStack<bool> {
    self.stacks.entry(cap).or_default()
  }

  pub fn cached(&self, cap: Capability) -> Option<bool> {
    self
      .stacks
      .get(&cap)
      .and_then(|stack| stack.top().copied())
  }

  pub fn depth(&self, cap: Capability) -> usize {
    self.stacks.get(&cap).map_or(0, BindingStack::depth)
  }
}

fn toggle(driver: &mut dyn Driver, cap: Capability, enabled: bool) {
  trace!("{} {:?}", if enabled { "enabling" } else { "disabling" }, cap);

  if enabled {
    driver.enable(cap);
  } else {
    driver.disable(cap);
  }
}

impl State {
  pub(crate) fn bool_state(&mut self, cap: Capability) -> bool {
    let driver = &self.driver;
    self
      .bool_states
      .stack(cap)
      .get_or_query(|| driver.is_enabled(cap))
  }

  pub(crate) fn set_bool_state(&mut self, cap: Capability, enabled: bool) {
    self.set_bool_state_with(cap, enabled, |driver, enabled| {
      toggle(driver, cap, enabled)
    });
  }

  /// Like [`State::set_bool_state`], with a custom native setter.
  pub(crate) fn set_bool_state_with(
    &mut self,
    cap: Capability,
    enabled: bool,
    setter: impl FnOnce(&mut dyn Driver, bool),
  ) {
    if self.bool_states.stack(cap).set(enabled) {
      setter(&mut *self.driver, enabled);
    }
  }

  pub(crate) fn push_bool_state(&mut self, cap: Capability, enabled: bool) {
    self.bool_state(cap);

    if self.bool_states.stack(cap).push(enabled) {
      toggle(&mut *self.driver, cap, enabled);
    }
  }

  pub(crate) fn push_bool_state_current(&mut self, cap: Capability) {
    self.bool_state(cap);
    self.bool_states.stack(cap).push_top();
  }

  pub(crate) fn pop_bool_state(&mut self, cap: Capability) {
    match self.bool_states.stack(cap).pop() {
      Popped::Restore(enabled) => toggle(&mut *self.driver, cap, enabled),

      Popped::Underflow => {
        error!("bool state stack underflow for {:?}", cap);
        self.bool_state(cap);
      }

      _ => (),
    }
  }
}
