//! Buffer bindings.

use std::collections::BTreeMap;

use crate::{
  driver::BufferTarget,
  stack::{BindingStack, Popped},
  state::State,
};

/// Per-target buffer binding stacks.
///
/// A `None` frame is an invalidated binding: raw code changed it behind the cache's back and the
/// next read re-queries the driver.
#[derive(Debug, Default)]
pub struct BufferBindingTable {
  stacks: BTreeMap<BufferTarget, BindingStack<Option<u32>>>,
}

impl BufferBindingTable {
  pub fn new() -> Self {
    Self::default()
  }

  fn stack(&mut self, target: BufferTarget) -> &mut BindingStack<Option<u32>> {
    self.stacks.entry(target).or_default()
  }

  /// Known binding of `target`, if any.
  pub fn cached(&self, target: BufferTarget) -> Option<u32> {
    self
      .stacks
      .get(&target)
      .and_then(|stack| stack.top().copied())
      .flatten()
  }

  pub fn is_invalidated(&self, target: BufferTarget) -> bool {
    self
      .stacks
      .get(&target)
      .and_then(|stack| stack.top())
      .map_or(false, Option::is_none)
  }

  pub fn depth(&self, target: BufferTarget) -> usize {
    self.stacks.get(&target).map_or(0, BindingStack::depth)
  }

  pub fn frames(&self, target: BufferTarget) -> &[Option<u32>] {
    self
      .stacks
      .get(&target)
      .map(BindingStack::frames)
      .unwrap_or(&[])
  }

  /// Binding of `target`, querying the driver if unknown or invalidated.
  pub fn get(&mut self, target: BufferTarget, query: impl FnOnce() -> u32) -> u32 {
    if let Some(id) = self.cached(target) {
      return id;
    }

    let stack = self.stack(target);

    if stack.is_empty() {
      stack.get_or_query(|| Some(query())).unwrap_or_default()
    } else {
      let id = query();
      stack.set(Some(id));
      id
    }
  }

  /// Overwrite the top. Returns `true` if it changed.
  pub fn set(&mut self, target: BufferTarget, id: u32) -> bool {
    self.stack(target).set(Some(id))
  }

  /// Push a frame. Returns `true` if it differs from the previous top.
  pub fn push(&mut self, target: BufferTarget, id: u32) -> bool {
    self.stack(target).push(Some(id))
  }

  pub fn push_current(&mut self, target: BufferTarget) {
    self.stack(target).push_top();
  }

  pub fn pop(&mut self, target: BufferTarget) -> Popped<Option<u32>> {
    self.stack(target).pop()
  }

  /// Record that the driver now has `id` bound to `target`.
  pub fn reflect(&mut self, target: BufferTarget, id: u32) {
    self.stack(target).set(Some(id));
  }

  /// Forget what is bound to `target`.
  pub fn invalidate(&mut self, target: BufferTarget) {
    self.stack(target).set(None);
  }

  /// Zero the binding of `target` if it's `id`. Returns `true` if it was.
  pub fn deleted(&mut self, target: BufferTarget, id: u32) -> bool {
    if self.cached(target) == Some(id) {
      self.stack(target).set(Some(0));
      true
    } else {
      false
    }
  }
}

impl State {
  pub(crate) fn buffer_binding(&mut self, target: BufferTarget) -> u32 {
    let driver = &self.driver;
    self.buffers.get(target, || driver.buffer_binding(target))
  }

  pub(crate) fn bind_buffer(&mut self, target: BufferTarget, id: u32) {
    if self.buffer_binding(target) != id {
      self.buffers.set(target, id);
      self.issue_buffer_bind(target, id);
    }
  }

  pub(crate) fn push_buffer_binding(&mut self, target: BufferTarget, id: u32) {
    self.buffer_binding(target);

    if self.buffers.push(target, id) {
      self.issue_buffer_bind(target, id);
    }
  }

  pub(crate) fn push_buffer_binding_current(&mut self, target: BufferTarget) {
    self.buffer_binding(target);
    self.buffers.push_current(target);
  }

  pub(crate) fn pop_buffer_binding(&mut self, target: BufferTarget) {
    match self.buffers.pop(target) {
      Popped::Restore(Some(id)) => self.issue_buffer_bind(target, id),

      Popped::Underflow => {
        error!("buffer binding stack underflow for {:?}", target);
        self.buffer_binding(target);
      }

      _ => (),
    }
  }

  /// Record a binding made behind the cache's back, in the bound VAO too for the targets it owns.
  pub(crate) fn reflect_buffer_binding(&mut self, target: BufferTarget, id: u32) {
    self.buffers.reflect(target, id);

    if target.is_vao_owned() {
      if let Some(vao) = self.current_vao() {
        vao.state.borrow_mut().layout.reflect_buffer(target, id);
      }
    }
  }

  pub(crate) fn invalidate_buffer_binding(&mut self, target: BufferTarget) {
    self.buffers.invalidate(target);
  }

  /// Re-issue the cached binding of `target`, or resynchronize with the driver if the cached value
  /// got invalidated.
  pub(crate) fn restore_invalidated_buffer_binding(&mut self, target: BufferTarget) {
    match self.buffers.cached(target) {
      Some(id) => {
        trace!("restoring buffer binding {:?} = {}", target, id);
        self.driver.bind_buffer(target, id);
      }

      None => {
        self.buffer_binding(target);
      }
    }
  }

  pub(crate) fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: u32) {
    if target.is_vao_owned() {
      warn!("{:?} has no indexed binding points", target);
      return;
    }

    self.driver.bind_buffer_base(target, index, id);
    self.buffers.reflect(target, id);
  }

  pub(crate) fn bind_buffer_range(
    &mut self,
    target: BufferTarget,
    index: u32,
    id: u32,
    offset: usize,
    size: usize,
  ) {
    if target.is_vao_owned() {
      warn!("{:?} has no indexed binding points", target);
      return;
    }

    self.driver.bind_buffer_range(target, index, id, offset, size);
    self.buffers.reflect(target, id);
  }

  /// Keep the cache in line with a buffer the driver just deleted.
  pub(crate) fn buffer_deleted(&mut self, target: BufferTarget, id: u32) {
    if self.buffers.deleted(target, id) && target.is_vao_owned() {
      if let Some(vao) = self.current_vao() {
        vao.state.borrow_mut().layout.reflect_buffer(target, 0);
      }
    }
  }

  /// Tell the driver about a new binding, through the bound VAO for the targets it owns.
  pub(crate) fn issue_buffer_bind(&mut self, target: BufferTarget, id: u32) {
    if target.is_vao_owned() {
      if let Some(vao) = self.current_vao() {
        let backend = vao.backend;
        backend.reflect_bind_buffer_impl(&mut vao.state.borrow_mut(), self, target, id);
        return;
      }
    }

    trace!("binding buffer {} to {:?}", id, target);
    self.driver.bind_buffer(target, id);
  }
}
