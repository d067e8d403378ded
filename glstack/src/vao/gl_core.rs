//! Native vertex array objects.

use crate::{
  driver::{BufferTarget, VaoKind},
  state::State,
  vao::{issue_pointer, replay_layout, Divisors, VaoBackend, VaoState, VertexAttrib},
};

#[derive(Debug)]
pub(crate) struct CoreVao;

/// Bind a native VAO of flavour `kind`, reassigning it to `state` first if needed.
///
/// Returns `false`, leaving `vao` untouched, if reassignment could not allocate a native object.
pub(super) fn bind_hardware(kind: VaoKind, vao: &mut VaoState, state: &mut State) -> bool {
  if vao.owner != state.id {
    if !reassign(kind, vao, state) {
      return false;
    }
  } else {
    trace!("binding vertex array {}", vao.id);
    kind.bind_native(&mut *state.driver, vao.id);
  }

  state
    .buffers
    .reflect(BufferTarget::ElementArray, vao.layout.element_array_buffer());
  let array_buffer = state.buffer_binding(BufferTarget::Array);
  vao.layout.set_cached_array_buffer(array_buffer);

  true
}

/// Native objects can't cross contexts: allocate a new one in `state` and replay the layout into
/// it. The old object is left to its context.
fn reassign(kind: VaoKind, vao: &mut VaoState, state: &mut State) -> bool {
  let id = kind.gen(&mut *state.driver);

  if id == 0 {
    error!(
      "cannot allocate a vertex array to reassign {} into context {}",
      vao.id, state.id
    );
    return false;
  }

  debug!(
    "vertex array {} of context {} is now {} in context {}",
    vao.id, vao.owner, id, state.id
  );

  vao.id = id;
  vao.owner = state.id;
  kind.bind_native(&mut *state.driver, id);

  let array_buffer = state.buffer_binding(BufferTarget::Array);
  let divisors = Divisors::new(state.caps.instanced_arrays, true);
  replay_layout(&mut *state.driver, &vao.layout, array_buffer, divisors);

  true
}

pub(super) fn unbind_hardware(kind: VaoKind, state: &mut State) {
  trace!("unbinding vertex array");
  kind.bind_native(&mut *state.driver, 0);
  state.buffers.invalidate(BufferTarget::ElementArray);
}

pub(super) fn bind_buffer_hardware(
  vao: &mut VaoState,
  state: &mut State,
  target: BufferTarget,
  id: u32,
) {
  vao.layout.reflect_buffer(target, id);
  trace!("binding buffer {} to {:?} in vertex array {}", id, target, vao.id);
  state.driver.bind_buffer(target, id);
}

impl VaoBackend for CoreVao {
  fn bind_impl(&self, vao: &mut VaoState, state: &mut State) -> bool {
    bind_hardware(VaoKind::Core, vao, state)
  }

  fn unbind_impl(&self, _: &mut VaoState, state: &mut State) {
    unbind_hardware(VaoKind::Core, state);
  }

  fn vertex_attrib_pointer_impl(
    &self,
    vao: &mut VaoState,
    state: &mut State,
    index: u32,
    attrib: VertexAttrib,
  ) {
    vao.layout.set_pointer(index, attrib);
    issue_pointer(&mut *state.driver, index, &attrib);
  }

  fn reflect_bind_buffer_impl(
    &self,
    vao: &mut VaoState,
    state: &mut State,
    target: BufferTarget,
    id: u32,
  ) {
    bind_buffer_hardware(vao, state, target, id);
  }
}
