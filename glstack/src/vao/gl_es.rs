//! Vertex array objects through the OES extension.
//!
//! Same model as native VAOs, with narrower attribute support: integer pointers are only available
//! when the driver says so and degrade to float pointers otherwise.

use crate::{
  driver::{BufferTarget, VaoKind},
  state::State,
  vao::{
    gl_core::{bind_buffer_hardware, bind_hardware, unbind_hardware},
    issue_pointer, PointerType, VaoBackend, VaoState, VertexAttrib,
  },
};

#[derive(Debug)]
pub(crate) struct EsVao;

impl VaoBackend for EsVao {
  fn bind_impl(&self, vao: &mut VaoState, state: &mut State) -> bool {
    bind_hardware(VaoKind::Es, vao, state)
  }

  fn unbind_impl(&self, _: &mut VaoState, state: &mut State) {
    unbind_hardware(VaoKind::Es, state);
  }

  fn vertex_attrib_pointer_impl(
    &self,
    vao: &mut VaoState,
    state: &mut State,
    index: u32,
    mut attrib: VertexAttrib,
  ) {
    if attrib.pointer == PointerType::Integer && !state.caps.integer_attributes {
      warn!(
        "integer attributes are not supported; attribute {} falls back to a float pointer",
        index
      );
      attrib.pointer = PointerType::Float;
    }

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
