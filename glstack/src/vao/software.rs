//! Vertex arrays without driver support.
//!
//! Attribute state is global: binding replays the recorded layout, unbinding disables every
//! attribute the layout enabled. There is no native object, so reassignment only changes hands.

use crate::{
  driver::BufferTarget,
  state::State,
  vao::{issue_pointer, replay_layout, Divisors, VaoBackend, VaoState, VertexAttrib},
};

#[derive(Debug)]
pub(crate) struct SoftwareVao;

impl VaoBackend for SoftwareVao {
  fn bind_impl(&self, vao: &mut VaoState, state: &mut State) -> bool {
    vao.owner = state.id;

    let array_buffer = state.buffer_binding(BufferTarget::Array);
    let divisors = Divisors::new(state.caps.instanced_arrays, false);
    trace!("replaying software vertex array layout");
    replay_layout(&mut *state.driver, &vao.layout, array_buffer, divisors);

    state
      .buffers
      .reflect(BufferTarget::ElementArray, vao.layout.element_array_buffer());
    vao.layout.set_cached_array_buffer(array_buffer);

    true
  }

  fn unbind_impl(&self, vao: &mut VaoState, state: &mut State) {
    for index in vao.layout.enabled() {
      state.driver.disable_vertex_attrib_array(index);
    }

    state.buffers.invalidate(BufferTarget::ElementArray);
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
    vao.layout.reflect_buffer(target, id);
    state.driver.bind_buffer(target, id);
  }
}
