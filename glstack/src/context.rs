//! Graphics context.
//!
//! A [`Context`] is the entry point of the crate: it wraps a [`Driver`] and caches every piece of
//! binding state the driver holds, so that binding something already bound costs nothing, and
//! nested code can save and restore state with push / pop pairs.
//!
//! Every piece of state follows the same rules:
//!
//! - `set_*` / `bind_*` overwrite the current value and only call into the driver if it changed.
//! - `push_*` saves the current value and sets a new one; `push_*_current` only saves.
//! - `pop_*` restores the saved value, calling into the driver only if it differs.
//! - reading a value never set or pushed queries the driver once.
//!
//! Contexts are cheap handles: cloning one gives another handle on the same cached state.

use std::{
  cell::RefCell,
  rc::{Rc, Weak},
};

use crate::{
  binding::scalar::{
    ActiveTexture, Blend, CullFace, DepthFunc, DepthMask, LineWidth, Polygon, Program,
    Renderbuffer as RenderbufferSlot, Scissor, Viewport, Winding,
  },
  driver::{
    AttribType, BlendFactor, BlendFunc, BufferTarget, Capabilities, Capability, Comparison, Driver,
    Face, FramebufferTarget, FrontFace, PolygonMode, Rect, TextureTarget, VaoKind,
  },
  registry::{LiveObject, ObjectKind},
  sanity::SanityReport,
  state::{ContextId, ContextOptions, State, StateError, StateRef},
  vao::{PointerType, VaoRef, VertexAttrib},
};

thread_local! {
  static CURRENT: RefCell<Weak<RefCell<State>>> = RefCell::new(Weak::new());
}

/// Generate the getter / setter / push / pop quintet of a single-valued piece of state.
macro_rules! scalar_api {
  ($($what:literal, $slot:ty, $value:ty => $get:ident, $set:ident, $push:ident, $push_current:ident, $pop:ident;)*) => {
    $(
      #[doc = concat!("Current ", $what, ".")]
      pub fn $get(&self) -> $value {
        self.state.borrow_mut().scalar::<$slot>()
      }

      #[doc = concat!("Set the ", $what, ".")]
      pub fn $set(&self, value: $value) {
        self.state.borrow_mut().set_scalar::<$slot>(value);
      }

      #[doc = concat!("Save the ", $what, " and set a new one.")]
      pub fn $push(&self, value: $value) {
        self.state.borrow_mut().push_scalar::<$slot>(value);
      }

      #[doc = concat!("Save the ", $what, ".")]
      pub fn $push_current(&self) {
        self.state.borrow_mut().push_scalar_current::<$slot>();
      }

      #[doc = concat!("Restore the last saved ", $what, ".")]
      pub fn $pop(&self) {
        self.state.borrow_mut().pop_scalar::<$slot>();
      }
    )*
  };
}

/// Cached graphics context.
#[derive(Clone, Debug)]
pub struct Context {
  state: StateRef,
}

impl Context {
  /// Wrap `driver` with the default options.
  pub fn new(driver: impl Driver + 'static) -> Result<Self, StateError> {
    Self::with_options(driver, ContextOptions::default())
  }

  pub fn with_options(
    driver: impl Driver + 'static,
    options: ContextOptions,
  ) -> Result<Self, StateError> {
    State::new(Box::new(driver), options).map(|state| Context { state })
  }

  pub(crate) fn state(&self) -> &StateRef {
    &self.state
  }

  pub fn id(&self) -> ContextId {
    self.state.borrow().id
  }

  pub fn capabilities(&self) -> Capabilities {
    self.state.borrow().caps
  }

  /// Flavour of the VAOs created through this context.
  pub fn vao_kind(&self) -> VaoKind {
    self.state.borrow().vao_kind
  }

  /// Install this context as the current one of the calling thread.
  ///
  /// The slot doesn't keep the context alive.
  pub fn make_current(&self) {
    CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(&self.state));
  }

  /// Current context of the calling thread, if any is installed and still alive.
  pub fn current() -> Option<Self> {
    CURRENT.with(|current| current.borrow().upgrade().map(|state| Context { state }))
  }

  pub fn clear_current() {
    CURRENT.with(|current| *current.borrow_mut() = Weak::new());
  }

  /// Tell the context its native context is gone.
  ///
  /// Resources dropped afterwards skip their native deletion: the driver already released them.
  pub fn deactivate(&self) {
    self.state.borrow_mut().context_active = false;
  }

  pub fn is_active(&self) -> bool {
    self.state.borrow().context_active
  }

  /// Live objects, when object tracking is enabled.
  pub fn live_objects(&self) -> Vec<LiveObject> {
    self.state.borrow().registry.live().copied().collect()
  }

  pub fn live_objects_of(&self, kind: ObjectKind) -> Vec<LiveObject> {
    self.state.borrow().registry.live_of(kind).copied().collect()
  }

  /// Compare the cache against the driver's true state.
  pub fn sanity_check(&self) -> SanityReport {
    self.state.borrow().sanity_check()
  }

  /// Short summary of the driver's true binding state.
  pub fn print_state(&self) -> String {
    let state = self.state.borrow();

    format!(
      "{{ARRAY_BUFFER:{}, ELEMENT_ARRAY_BUFFER:{}, VERTEX_ARRAY_BINDING:{}}}",
      state.driver.buffer_binding(BufferTarget::Array),
      state.driver.buffer_binding(BufferTarget::ElementArray),
      state.driver.vertex_array_binding()
    )
  }

  // vertex arrays

  /// VAO currently bound, if any.
  pub fn vao(&self) -> Option<VaoRef> {
    self.state.borrow().current_vao()
  }

  /// Bind `vao`, or unbind the current VAO with `None`.
  pub fn bind_vao(&self, vao: Option<&VaoRef>) {
    self.state.borrow_mut().bind_vao(vao);
  }

  pub fn push_vao(&self, vao: Option<&VaoRef>) {
    self.state.borrow_mut().push_vao(vao);
  }

  pub fn push_vao_current(&self) {
    self.state.borrow_mut().push_vao_current();
  }

  pub fn pop_vao(&self) {
    self.state.borrow_mut().pop_vao();
  }

  /// Rebind the current VAO after raw code changed the driver's binding.
  pub fn restore_invalidated_vao(&self) {
    self.state.borrow_mut().restore_invalidated_vao();
  }

  /// Enable an attribute of the bound VAO.
  pub fn enable_vertex_attrib_array(&self, index: u32) {
    self.state.borrow_mut().enable_vertex_attrib_array(index);
  }

  pub fn disable_vertex_attrib_array(&self, index: u32) {
    self.state.borrow_mut().disable_vertex_attrib_array(index);
  }

  /// Source an attribute of the bound VAO from the bound array buffer, converted to floats.
  pub fn vertex_attrib_pointer(
    &self,
    index: u32,
    size: i32,
    ty: AttribType,
    normalized: bool,
    stride: i32,
    offset: usize,
  ) {
    let attrib = VertexAttrib {
      size,
      ty,
      normalized,
      stride,
      pointer: PointerType::Float,
      offset,
      ..VertexAttrib::default()
    };

    self.state.borrow_mut().vertex_attrib_pointer(index, attrib);
  }

  /// Source an attribute of the bound VAO from the bound array buffer, kept as integers.
  pub fn vertex_attrib_i_pointer(
    &self,
    index: u32,
    size: i32,
    ty: AttribType,
    stride: i32,
    offset: usize,
  ) {
    let attrib = VertexAttrib {
      size,
      ty,
      stride,
      pointer: PointerType::Integer,
      offset,
      ..VertexAttrib::default()
    };

    self.state.borrow_mut().vertex_attrib_pointer(index, attrib);
  }

  pub fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
    self.state.borrow_mut().vertex_attrib_divisor(index, divisor);
  }

  // buffers

  pub fn buffer_binding(&self, target: BufferTarget) -> u32 {
    self.state.borrow_mut().buffer_binding(target)
  }

  /// Bind buffer `id` to `target`. Array and element array bindings go through the bound VAO.
  pub fn bind_buffer(&self, target: BufferTarget, id: u32) {
    self.state.borrow_mut().bind_buffer(target, id);
  }

  pub fn push_buffer_binding(&self, target: BufferTarget, id: u32) {
    self.state.borrow_mut().push_buffer_binding(target, id);
  }

  pub fn push_buffer_binding_current(&self, target: BufferTarget) {
    self.state.borrow_mut().push_buffer_binding_current(target);
  }

  pub fn pop_buffer_binding(&self, target: BufferTarget) {
    self.state.borrow_mut().pop_buffer_binding(target);
  }

  /// Forget the binding of `target`; the next read queries the driver.
  ///
  /// Use after binding buffers with raw driver calls.
  pub fn invalidate_buffer_binding_cache(&self, target: BufferTarget) {
    self.state.borrow_mut().invalidate_buffer_binding(target);
  }

  /// Put the cached binding of `target` back into the driver after raw driver calls changed it.
  pub fn restore_invalidated_buffer_binding(&self, target: BufferTarget) {
    self
      .state
      .borrow_mut()
      .restore_invalidated_buffer_binding(target);
  }

  /// Record that `id` got bound to `target` without going through the context.
  pub fn reflect_buffer_binding(&self, target: BufferTarget, id: u32) {
    self.state.borrow_mut().reflect_buffer_binding(target, id);
  }

  pub fn bind_buffer_base(&self, target: BufferTarget, index: u32, id: u32) {
    self.state.borrow_mut().bind_buffer_base(target, index, id);
  }

  pub fn bind_buffer_range(
    &self,
    target: BufferTarget,
    index: u32,
    id: u32,
    offset: usize,
    size: usize,
  ) {
    self
      .state
      .borrow_mut()
      .bind_buffer_range(target, index, id, offset, size);
  }

  /// Tell the cache a buffer was deleted with a raw driver call.
  pub fn buffer_deleted(&self, target: BufferTarget, id: u32) {
    self.state.borrow_mut().buffer_deleted(target, id);
  }

  // capabilities

  pub fn bool_state(&self, cap: Capability) -> bool {
    self.state.borrow_mut().bool_state(cap)
  }

  pub fn set_bool_state(&self, cap: Capability, enabled: bool) {
    self.state.borrow_mut().set_bool_state(cap, enabled);
  }

  /// Like [`Context::set_bool_state`], with a custom native setter.
  pub fn set_bool_state_with(
    &self,
    cap: Capability,
    enabled: bool,
    setter: impl FnOnce(&mut dyn Driver, bool),
  ) {
    self
      .state
      .borrow_mut()
      .set_bool_state_with(cap, enabled, setter);
  }

  pub fn push_bool_state(&self, cap: Capability, enabled: bool) {
    self.state.borrow_mut().push_bool_state(cap, enabled);
  }

  pub fn push_bool_state_current(&self, cap: Capability) {
    self.state.borrow_mut().push_bool_state_current(cap);
  }

  pub fn pop_bool_state(&self, cap: Capability) {
    self.state.borrow_mut().pop_bool_state(cap);
  }

  pub fn enable(&self, cap: Capability) {
    self.set_bool_state(cap, true);
  }

  pub fn disable(&self, cap: Capability) {
    self.set_bool_state(cap, false);
  }

  // textures

  /// Texture bound to `target` on `unit`.
  pub fn texture_binding(&self, target: TextureTarget, unit: u32) -> u32 {
    self.state.borrow_mut().texture_binding(target, unit)
  }

  /// Bind `id` to `target` on the active unit.
  pub fn bind_texture(&self, target: TextureTarget, id: u32) {
    let mut state = self.state.borrow_mut();
    let unit = state.scalar::<ActiveTexture>();
    state.bind_texture(target, id, unit);
  }

  /// Bind `id` to `target` on `unit`, leaving the active unit as it was.
  pub fn bind_texture_on(&self, target: TextureTarget, id: u32, unit: u32) {
    self.state.borrow_mut().bind_texture(target, id, unit);
  }

  pub fn push_texture_binding(&self, target: TextureTarget, id: u32, unit: u32) {
    self.state.borrow_mut().push_texture_binding(target, id, unit);
  }

  pub fn push_texture_binding_current(&self, target: TextureTarget, unit: u32) {
    self
      .state
      .borrow_mut()
      .push_texture_binding_current(target, unit);
  }

  pub fn pop_texture_binding(&self, target: TextureTarget, unit: u32) {
    self.state.borrow_mut().pop_texture_binding(target, unit);
  }

  /// Tell the cache a texture was deleted with a raw driver call.
  pub fn texture_deleted(&self, target: TextureTarget, id: u32) {
    self.state.borrow_mut().texture_deleted(target, id);
  }

  pub fn sampler_binding(&self, unit: u32) -> u32 {
    self.state.borrow_mut().sampler_binding(unit)
  }

  pub fn bind_sampler(&self, unit: u32, id: u32) {
    self.state.borrow_mut().bind_sampler(unit, id);
  }

  pub fn push_sampler_binding(&self, unit: u32, id: u32) {
    self.state.borrow_mut().push_sampler_binding(unit, id);
  }

  pub fn pop_sampler_binding(&self, unit: u32) {
    self.state.borrow_mut().pop_sampler_binding(unit);
  }

  // framebuffers

  pub fn framebuffer_binding(&self, target: FramebufferTarget) -> u32 {
    self.state.borrow_mut().framebuffer_binding(target)
  }

  pub fn bind_framebuffer(&self, target: FramebufferTarget, id: u32) {
    self.state.borrow_mut().bind_framebuffer(target, id);
  }

  pub fn push_framebuffer(&self, target: FramebufferTarget, id: u32) {
    self.state.borrow_mut().push_framebuffer(target, id);
  }

  pub fn push_framebuffer_current(&self, target: FramebufferTarget) {
    self.state.borrow_mut().push_framebuffer_current(target);
  }

  pub fn pop_framebuffer(&self, target: FramebufferTarget) {
    self.state.borrow_mut().pop_framebuffer(target);
  }

  /// Tell the cache a framebuffer was deleted with a raw driver call.
  pub fn framebuffer_deleted(&self, id: u32) {
    self.state.borrow_mut().framebuffer_deleted(id);
  }

  pub fn renderbuffer_binding(&self) -> u32 {
    self.state.borrow_mut().scalar::<RenderbufferSlot>()
  }

  pub fn bind_renderbuffer(&self, id: u32) {
    self.state.borrow_mut().set_scalar::<RenderbufferSlot>(id);
  }

  pub fn push_renderbuffer(&self, id: u32) {
    self.state.borrow_mut().push_scalar::<RenderbufferSlot>(id);
  }

  pub fn pop_renderbuffer(&self) {
    self.state.borrow_mut().pop_scalar::<RenderbufferSlot>();
  }

  /// Tell the cache a renderbuffer was deleted with a raw driver call.
  pub fn renderbuffer_deleted(&self, id: u32) {
    self.state.borrow_mut().renderbuffer_deleted(id);
  }

  // programs and fixed state

  scalar_api! {
    "active texture unit", ActiveTexture, u32 =>
      active_texture, set_active_texture, push_active_texture, push_active_texture_current,
      pop_active_texture;
    "program in use", Program, u32 =>
      program, bind_program, push_program, push_program_current, pop_program;
    "viewport", Viewport, Rect =>
      viewport, set_viewport, push_viewport, push_viewport_current, pop_viewport;
    "scissor box", Scissor, Rect =>
      scissor, set_scissor, push_scissor, push_scissor_current, pop_scissor;
    "blend function", Blend, BlendFunc =>
      blend_func, set_blend_func_separate, push_blend_func_separate, push_blend_func_current,
      pop_blend_func;
    "line width", LineWidth, f32 =>
      line_width, set_line_width, push_line_width, push_line_width_current, pop_line_width;
    "depth mask", DepthMask, bool =>
      depth_mask, set_depth_mask, push_depth_mask, push_depth_mask_current, pop_depth_mask;
    "depth function", DepthFunc, Comparison =>
      depth_func, set_depth_func, push_depth_func, push_depth_func_current, pop_depth_func;
    "culled face", CullFace, Face =>
      cull_face, set_cull_face, push_cull_face, push_cull_face_current, pop_cull_face;
    "front face winding", Winding, FrontFace =>
      front_face, set_front_face, push_front_face, push_front_face_current, pop_front_face;
  }

  /// Same factors for color and alpha.
  pub fn set_blend_func(&self, src: BlendFactor, dst: BlendFactor) {
    self.set_blend_func_separate(BlendFunc::new(src, dst));
  }

  pub fn push_blend_func(&self, src: BlendFactor, dst: BlendFactor) {
    self.push_blend_func_separate(BlendFunc::new(src, dst));
  }

  /// Polygon mode of both faces.
  pub fn polygon_mode(&self) -> PolygonMode {
    self.state.borrow_mut().scalar::<Polygon>()
  }

  /// Set the polygon mode. Only [`Face::FrontAndBack`] is supported.
  pub fn set_polygon_mode(&self, face: Face, mode: PolygonMode) {
    if self.check_polygon_mode(face) {
      self.state.borrow_mut().set_scalar::<Polygon>(mode);
    }
  }

  pub fn push_polygon_mode(&self, face: Face, mode: PolygonMode) {
    if self.check_polygon_mode(face) {
      self.state.borrow_mut().push_scalar::<Polygon>(mode);
    }
  }

  pub fn push_polygon_mode_current(&self) {
    if self.capabilities().polygon_mode {
      self.state.borrow_mut().push_scalar_current::<Polygon>();
    }
  }

  pub fn pop_polygon_mode(&self) {
    if self.capabilities().polygon_mode {
      self.state.borrow_mut().pop_scalar::<Polygon>();
    }
  }

  fn check_polygon_mode(&self, face: Face) -> bool {
    if !self.capabilities().polygon_mode {
      warn!("polygon mode is not supported by the driver");
      return false;
    }

    if face != Face::FrontAndBack {
      error!("polygon mode can only be set for both faces, not {:?}; setting both", face);
    }

    true
  }
}
