//! Texture and sampler bindings.
//!
//! Textures are bound per (unit, target) pair. The driver only binds on the active unit, so
//! touching another unit goes through the active-texture stack: switch, bind, switch back.

use std::collections::BTreeMap;

use crate::{
  binding::scalar::ActiveTexture,
  driver::{Driver, TextureTarget},
  stack::{BindingStack, Popped},
  state::State,
};

#[derive(Debug, Default)]
pub struct TextureBindingTable {
  textures: BTreeMap<(u32, TextureTarget), BindingStack<u32>>,
  samplers: BTreeMap<u32, BindingStack<u32>>,
}

impl TextureBindingTable {
  pub fn new() -> Self {
    Self::default()
  }

  fn stack(&mut self, unit: u32, target: TextureTarget) -> &mut BindingStack<u32> {
    self.textures.entry((unit, target)).or_default()
  }

  fn sampler_stack(&mut self, unit: u32) -> &mut BindingStack<u32> {
    self.samplers.entry(unit).or_default()
  }

  pub fn cached(&self, unit: u32, target: TextureTarget) -> Option<u32> {
    self
      .textures
      .get(&(unit, target))
      .and_then(|stack| stack.top().copied())
  }

  pub fn depth(&self, unit: u32, target: TextureTarget) -> usize {
    self
      .textures
      .get(&(unit, target))
      .map_or(0, BindingStack::depth)
  }

  /// Record a freshly queried binding.
  pub fn seed(&mut self, unit: u32, target: TextureTarget, id: u32) {
    self.stack(unit, target).get_or_query(|| id);
  }

  pub fn set(&mut self, unit: u32, target: TextureTarget, id: u32) -> bool {
    self.stack(unit, target).set(id)
  }

  pub fn push(&mut self, unit: u32, target: TextureTarget, id: u32) -> bool {
    self.stack(unit, target).push(id)
  }

  pub fn push_current(&mut self, unit: u32, target: TextureTarget) {
    self.stack(unit, target).push_top();
  }

  pub fn pop(&mut self, unit: u32, target: TextureTarget) -> Popped<u32> {
    self.stack(unit, target).pop()
  }

  /// Zero the binding of `target` on every unit it's bound to.
  pub fn deleted(&mut self, target: TextureTarget, id: u32) {
    for ((_, t), stack) in &mut self.textures {
      if *t == target && stack.top() == Some(&id) {
        stack.set(0);
      }
    }
  }

  pub fn cached_sampler(&self, unit: u32) -> Option<u32> {
    self
      .samplers
      .get(&unit)
      .and_then(|stack| stack.top().copied())
  }
}

impl State {
  /// Run `f` with `unit` active, restoring the previously active unit afterwards.
  fn on_unit<R>(&mut self, unit: u32, f: impl FnOnce(&mut dyn Driver) -> R) -> R {
    self.push_scalar::<ActiveTexture>(unit);
    let r = f(&mut *self.driver);
    self.pop_scalar::<ActiveTexture>();
    r
  }

  pub(crate) fn texture_binding(&mut self, target: TextureTarget, unit: u32) -> u32 {
    if let Some(id) = self.textures.cached(unit, target) {
      return id;
    }

    let id = self.on_unit(unit, |driver| driver.texture_binding(target));
    self.textures.seed(unit, target, id);
    id
  }

  pub(crate) fn bind_texture(&mut self, target: TextureTarget, id: u32, unit: u32) {
    if self.texture_binding(target, unit) != id {
      self.textures.set(unit, target, id);
      self.issue_texture_bind(target, id, unit);
    }
  }

  pub(crate) fn push_texture_binding(&mut self, target: TextureTarget, id: u32, unit: u32) {
    self.texture_binding(target, unit);

    if self.textures.push(unit, target, id) {
      self.issue_texture_bind(target, id, unit);
    }
  }

  pub(crate) fn push_texture_binding_current(&mut self, target: TextureTarget, unit: u32) {
    self.texture_binding(target, unit);
    self.textures.push_current(unit, target);
  }

  pub(crate) fn pop_texture_binding(&mut self, target: TextureTarget, unit: u32) {
    match self.textures.pop(unit, target) {
      Popped::Restore(id) => self.issue_texture_bind(target, id, unit),

      Popped::Underflow => {
        error!("texture binding stack underflow for {:?} on unit {}", target, unit);
        self.texture_binding(target, unit);
      }

      _ => (),
    }
  }

  fn issue_texture_bind(&mut self, target: TextureTarget, id: u32, unit: u32) {
    trace!("binding texture {} to {:?} on unit {}", id, target, unit);
    self.on_unit(unit, |driver| driver.bind_texture(target, id));
  }

  pub(crate) fn texture_deleted(&mut self, target: TextureTarget, id: u32) {
    self.textures.deleted(target, id);
  }

  pub(crate) fn sampler_binding(&mut self, unit: u32) -> u32 {
    if !self.caps.samplers {
      return 0;
    }

    if let Some(id) = self.textures.cached_sampler(unit) {
      return id;
    }

    let id = self.on_unit(unit, |driver| driver.sampler_binding());
    self.textures.sampler_stack(unit).get_or_query(|| id)
  }

  pub(crate) fn bind_sampler(&mut self, unit: u32, id: u32) {
    if !self.caps.samplers {
      warn!("sampler objects are not supported; ignoring sampler {}", id);
      return;
    }

    if self.sampler_binding(unit) != id {
      self.textures.sampler_stack(unit).set(id);
      self.driver.bind_sampler(unit, id);
    }
  }

  pub(crate) fn push_sampler_binding(&mut self, unit: u32, id: u32) {
    if !self.caps.samplers {
      warn!("sampler objects are not supported; ignoring sampler {}", id);
      return;
    }

    self.sampler_binding(unit);

    if self.textures.sampler_stack(unit).push(id) {
      self.driver.bind_sampler(unit, id);
    }
  }

  pub(crate) fn pop_sampler_binding(&mut self, unit: u32) {
    if !self.caps.samplers {
      return;
    }

    match self.textures.sampler_stack(unit).pop() {
      Popped::Restore(id) => self.driver.bind_sampler(unit, id),

      Popped::Underflow => {
        error!("sampler binding stack underflow on unit {}", unit);
        self.sampler_binding(unit);
      }

      _ => (),
    }
  }
}
