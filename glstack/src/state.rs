//! Per-context cached state.
//!
//! [`State`] shadows every piece of binding state of one native context. It's shared between the
//! [`Context`](crate::context::Context) façade and the resources created through it, which call
//! back into it when dropped.

use std::{
  cell::RefCell,
  error::Error,
  fmt,
  rc::{Rc, Weak},
  sync::atomic::{AtomicU64, Ordering},
};

use crate::{
  binding::{BoolStateTable, BufferBindingTable, FramebufferBindingTable, TextureBindingTable},
  driver::{
    BlendFunc, BufferTarget, Capabilities, Capability, Comparison, Driver, Face,
    FramebufferTarget, FrontFace, PolygonMode, Rect, VaoKind,
  },
  registry::Registry,
  stack::BindingStack,
  vao::VaoLink,
};

/// Identity of a context, unique for the whole process.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContextId(u64);

impl ContextId {
  fn next() -> Self {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for ContextId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Error that can occur when creating a context.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateError {
  /// The driver has no native context to talk to.
  Unavailable,
}

impl fmt::Display for StateError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StateError::Unavailable => f.write_str("no native graphics context available"),
    }
  }
}

impl Error for StateError {}

/// Context creation options.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ContextOptions {
  /// Keep a registry of live objects.
  pub object_tracking: bool,
  /// Force a VAO flavour instead of the one the driver reports.
  pub vao_kind: Option<VaoKind>,
  /// Seed the stacks with the values of a fresh native context instead of querying them.
  pub seed_defaults: bool,
}

impl Default for ContextOptions {
  fn default() -> Self {
    ContextOptions {
      object_tracking: false,
      vao_kind: None,
      seed_defaults: true,
    }
  }
}

impl ContextOptions {
  pub fn set_object_tracking(self, object_tracking: bool) -> Self {
    ContextOptions {
      object_tracking,
      ..self
    }
  }

  pub fn set_vao_kind(self, vao_kind: impl Into<Option<VaoKind>>) -> Self {
    ContextOptions {
      vao_kind: vao_kind.into(),
      ..self
    }
  }

  pub fn set_seed_defaults(self, seed_defaults: bool) -> Self {
    ContextOptions {
      seed_defaults,
      ..self
    }
  }
}

pub(crate) type StateRef = Rc<RefCell<State>>;

#[derive(Debug)]
pub(crate) struct State {
  pub(crate) id: ContextId,
  pub(crate) weak_self: Weak<RefCell<State>>,

  // whether the native context is still alive; when it's not, resources dropping must not call
  // into the driver anymore
  pub(crate) context_active: bool,

  pub(crate) driver: Box<dyn Driver>,
  pub(crate) caps: Capabilities,
  pub(crate) vao_kind: VaoKind,

  pub(crate) bool_states: BoolStateTable,
  pub(crate) buffers: BufferBindingTable,
  pub(crate) textures: TextureBindingTable,
  pub(crate) framebuffers: FramebufferBindingTable,
  pub(crate) vaos: BindingStack<Option<VaoLink>>,
  // native VAOs of VAOs reassigned to other contexts, deleted on the next VAO switch
  pub(crate) orphaned_vaos: Vec<(VaoKind, u32)>,

  pub(crate) active_texture: BindingStack<u32>,
  pub(crate) program: BindingStack<u32>,
  pub(crate) renderbuffer: BindingStack<u32>,
  pub(crate) viewport: BindingStack<Rect>,
  pub(crate) scissor: BindingStack<Rect>,
  pub(crate) blend_func: BindingStack<BlendFunc>,
  pub(crate) line_width: BindingStack<f32>,
  pub(crate) polygon_mode: BindingStack<PolygonMode>,
  pub(crate) depth_mask: BindingStack<bool>,
  pub(crate) depth_func: BindingStack<Comparison>,
  pub(crate) cull_face: BindingStack<Face>,
  pub(crate) front_face: BindingStack<FrontFace>,

  pub(crate) registry: Registry,
}

impl State {
  pub(crate) fn new(
    driver: Box<dyn Driver>,
    options: ContextOptions,
  ) -> Result<StateRef, StateError> {
    let version = driver.version().ok_or(StateError::Unavailable)?;
    let caps = driver.capabilities();
    let vao_kind = options.vao_kind.unwrap_or(caps.vao);

    let state = Rc::new_cyclic(|weak_self| {
      let mut state = State {
        id: ContextId::next(),
        weak_self: weak_self.clone(),
        context_active: true,
        driver,
        caps,
        vao_kind,
        bool_states: BoolStateTable::new(),
        buffers: BufferBindingTable::new(),
        textures: TextureBindingTable::new(),
        framebuffers: FramebufferBindingTable::new(caps.separate_read_draw_framebuffers),
        vaos: BindingStack::new(),
        orphaned_vaos: Vec::new(),
        active_texture: BindingStack::new(),
        program: BindingStack::new(),
        renderbuffer: BindingStack::new(),
        viewport: BindingStack::new(),
        scissor: BindingStack::new(),
        blend_func: BindingStack::new(),
        line_width: BindingStack::new(),
        polygon_mode: BindingStack::new(),
        depth_mask: BindingStack::new(),
        depth_func: BindingStack::new(),
        cull_face: BindingStack::new(),
        front_face: BindingStack::new(),
        registry: Registry::new(options.object_tracking),
      };

      if options.seed_defaults {
        state.seed_defaults();
      }

      RefCell::new(state)
    });

    debug!(
      "created context {} on {} ({} vertex arrays)",
      state.borrow().id,
      version,
      vao_kind
    );

    Ok(state)
  }

  /// Record the values every fresh native context starts with.
  fn seed_defaults(&mut self) {
    self.buffers.reflect(BufferTarget::Array, 0);
    self.buffers.reflect(BufferTarget::ElementArray, 0);
    self.vaos.set(None);
    self.active_texture.set(0);
    self.program.set(0);
    self.renderbuffer.set(0);
    self.polygon_mode.set(PolygonMode::Fill);
    self.depth_mask.set(true);
    self.bool_states.stack(Capability::DepthTest).set(false);
    self.framebuffers.set(FramebufferTarget::Framebuffer, 0);
  }
}
