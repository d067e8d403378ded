//! Vertex array objects.
//!
//! A [`Vao`] records a [`Layout`]: the state of every vertex attribute slot plus the element array
//! buffer binding. How that layout reaches the driver depends on what the driver supports, which is
//! abstracted behind [`VaoBackend`]:
//!
//! - [`VaoKind::Core`]: native vertex array objects.
//! - [`VaoKind::Es`]: native vertex array objects through the OES entry points.
//! - [`VaoKind::Software`]: no native object; the layout is replayed on every bind.
//!
//! A VAO is bound through a context's VAO stack. When it gets bound under a context other than the
//! one that created it, it's reassigned: a native object is allocated in the new context and the
//! recorded layout is replayed into it.

pub mod gl_core;
pub mod gl_es;
pub mod software;

use std::{
  cell::RefCell,
  collections::BTreeMap,
  error::Error,
  fmt,
  rc::{Rc, Weak},
};

use crate::{
  context::Context,
  driver::{AttribType, BufferTarget, Driver, VaoKind},
  registry::{LiveObject, ObjectKind, Registration},
  stack::Popped,
  state::{ContextId, State, StateRef},
};

/// VAO error.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VaoError {
  /// The driver could not allocate a vertex array object.
  Creation,
}

impl fmt::Display for VaoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      VaoError::Creation => f.write_str("cannot create vertex array object"),
    }
  }
}

impl Error for VaoError {}

/// How an attribute is fetched by shaders.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PointerType {
  /// Converted to floating point (possibly normalized).
  Float,
  /// Kept as integers.
  Integer,
}

/// Recorded state of one vertex attribute slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttrib {
  pub enabled: bool,
  pub size: i32,
  pub ty: AttribType,
  pub normalized: bool,
  pub stride: i32,
  pub pointer: PointerType,
  pub offset: usize,
  /// Array buffer bound when the pointer was set.
  pub array_buffer: u32,
  pub divisor: u32,
}

impl Default for VertexAttrib {
  fn default() -> Self {
    VertexAttrib {
      enabled: false,
      size: 4,
      ty: AttribType::Float,
      normalized: false,
      stride: 0,
      pointer: PointerType::Float,
      offset: 0,
      array_buffer: 0,
      divisor: 0,
    }
  }
}

/// Attribute and buffer state recorded by a [`Vao`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Layout {
  attribs: BTreeMap<u32, VertexAttrib>,
  element_array_buffer: u32,
  cached_array_buffer: u32,
}

impl Layout {
  pub fn attrib(&self, index: u32) -> Option<&VertexAttrib> {
    self.attribs.get(&index)
  }

  /// Every attribute slot ever touched, by index.
  pub fn attribs(&self) -> impl Iterator<Item = (u32, &VertexAttrib)> + '_ {
    self.attribs.iter().map(|(&index, attrib)| (index, attrib))
  }

  /// Indices of the enabled attributes.
  pub fn enabled(&self) -> impl Iterator<Item = u32> + '_ {
    self
      .attribs()
      .filter(|(_, attrib)| attrib.enabled)
      .map(|(index, _)| index)
  }

  pub fn is_enabled(&self, index: u32) -> bool {
    self.attribs.get(&index).map_or(false, |attrib| attrib.enabled)
  }

  pub fn element_array_buffer(&self) -> u32 {
    self.element_array_buffer
  }

  /// Array buffer last known bound while this layout was active.
  pub fn cached_array_buffer(&self) -> u32 {
    self.cached_array_buffer
  }

  /// Returns `true` if the attribute was disabled.
  pub(crate) fn enable(&mut self, index: u32) -> bool {
    let attrib = self.attribs.entry(index).or_default();
    !std::mem::replace(&mut attrib.enabled, true)
  }

  /// Returns `true` if the attribute was enabled.
  pub(crate) fn disable(&mut self, index: u32) -> bool {
    match self.attribs.get_mut(&index) {
      Some(attrib) => std::mem::replace(&mut attrib.enabled, false),
      None => false,
    }
  }

  /// Record a pointer, keeping the enabled flag and divisor.
  pub(crate) fn set_pointer(&mut self, index: u32, attrib: VertexAttrib) {
    let slot = self.attribs.entry(index).or_default();
    *slot = VertexAttrib {
      enabled: slot.enabled,
      divisor: slot.divisor,
      ..attrib
    };
  }

  pub(crate) fn set_divisor(&mut self, index: u32, divisor: u32) {
    self.attribs.entry(index).or_default().divisor = divisor;
  }

  /// Record a buffer binding of one of the targets owned by VAOs.
  pub(crate) fn reflect_buffer(&mut self, target: BufferTarget, id: u32) {
    match target {
      BufferTarget::ElementArray => self.element_array_buffer = id,
      BufferTarget::Array => self.cached_array_buffer = id,
      _ => (),
    }
  }

  pub(crate) fn set_cached_array_buffer(&mut self, id: u32) {
    self.cached_array_buffer = id;
  }

  /// Forget every attribute; buffer bindings are kept.
  pub(crate) fn clear_attribs(&mut self) {
    self.attribs.clear();
  }
}

pub(crate) fn issue_pointer(driver: &mut dyn Driver, index: u32, attrib: &VertexAttrib) {
  match attrib.pointer {
    PointerType::Float => driver.vertex_attrib_pointer(
      index,
      attrib.size,
      attrib.ty,
      attrib.normalized,
      attrib.stride,
      attrib.offset,
    ),

    PointerType::Integer => driver.vertex_attrib_i_pointer(
      index,
      attrib.size,
      attrib.ty,
      attrib.stride,
      attrib.offset,
    ),
  }
}

/// Which divisors [`replay_layout`] sends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Divisors {
  /// Instancing unsupported.
  Skip,
  /// Only non-zero divisors; the attribute slots are fresh.
  NonZero,
  /// All of them; the slots may hold someone else's divisors.
  All,
}

impl Divisors {
  pub(crate) fn new(instanced: bool, fresh: bool) -> Self {
    match (instanced, fresh) {
      (false, _) => Divisors::Skip,
      (true, true) => Divisors::NonZero,
      (true, false) => Divisors::All,
    }
  }
}

/// Send every enabled attribute of `layout` plus its element array buffer to the driver.
///
/// `array_buffer` is the array buffer bound when called; it's bound again before returning.
pub(crate) fn replay_layout(
  driver: &mut dyn Driver,
  layout: &Layout,
  array_buffer: u32,
  divisors: Divisors,
) {
  let mut bound = array_buffer;

  for (index, attrib) in layout.attribs().filter(|(_, attrib)| attrib.enabled) {
    driver.enable_vertex_attrib_array(index);

    if attrib.array_buffer != bound {
      driver.bind_buffer(BufferTarget::Array, attrib.array_buffer);
      bound = attrib.array_buffer;
    }

    issue_pointer(driver, index, attrib);

    if divisors == Divisors::All || (divisors == Divisors::NonZero && attrib.divisor > 0) {
      driver.vertex_attrib_divisor(index, attrib.divisor);
    }
  }

  driver.bind_buffer(BufferTarget::ElementArray, layout.element_array_buffer);

  if bound != array_buffer {
    driver.bind_buffer(BufferTarget::Array, array_buffer);
  }
}

/// Per-flavour behaviour of a [`Vao`].
///
/// Hooks run with the context state and the VAO state borrowed: they must talk to the driver and
/// the binding tables directly, never through the VAO-routing entry points of [`State`].
pub(crate) trait VaoBackend: fmt::Debug {
  /// Make `vao` the driver's current vertex array, reassigning it first if it belongs to another
  /// context. Returns `false` if it could not be bound.
  fn bind_impl(&self, vao: &mut VaoState, state: &mut State) -> bool;

  fn unbind_impl(&self, vao: &mut VaoState, state: &mut State);

  fn vertex_attrib_pointer_impl(
    &self,
    vao: &mut VaoState,
    state: &mut State,
    index: u32,
    attrib: VertexAttrib,
  );

  /// Bind a buffer to a VAO-owned target while `vao` is bound.
  fn reflect_bind_buffer_impl(
    &self,
    vao: &mut VaoState,
    state: &mut State,
    target: BufferTarget,
    id: u32,
  );
}

impl VaoKind {
  pub(crate) fn backend(self) -> &'static dyn VaoBackend {
    match self {
      VaoKind::Core => &gl_core::CoreVao,
      VaoKind::Es => &gl_es::EsVao,
      VaoKind::Software => &software::SoftwareVao,
    }
  }

  /// Allocate a native object; 0 on failure and for software VAOs.
  pub(crate) fn gen(self, driver: &mut dyn Driver) -> u32 {
    match self {
      VaoKind::Core => driver.gen_vertex_array(),
      VaoKind::Es => driver.gen_vertex_array_oes(),
      VaoKind::Software => 0,
    }
  }

  pub(crate) fn delete(self, driver: &mut dyn Driver, id: u32) {
    match self {
      VaoKind::Core => driver.delete_vertex_array(id),
      VaoKind::Es => driver.delete_vertex_array_oes(id),
      VaoKind::Software => (),
    }
  }

  pub(crate) fn bind_native(self, driver: &mut dyn Driver, id: u32) {
    match self {
      VaoKind::Core => driver.bind_vertex_array(id),
      VaoKind::Es => driver.bind_vertex_array_oes(id),
      VaoKind::Software => (),
    }
  }
}

#[derive(Debug)]
pub(crate) struct VaoState {
  pub(crate) id: u32,
  pub(crate) owner: ContextId,
  pub(crate) layout: Layout,
  /// Layout saved by a replacement bind.
  pub(crate) replaced: Option<Layout>,
  pub(crate) label: String,
}

/// Vertex array object.
pub struct Vao {
  kind: VaoKind,
  pub(crate) backend: &'static dyn VaoBackend,
  pub(crate) state: RefCell<VaoState>,
  context: RefCell<StateRef>,
  registration: RefCell<Registration>,
}

/// Shared handle on a [`Vao`].
pub type VaoRef = Rc<Vao>;

impl Vao {
  /// Create a VAO of the flavour the context uses.
  pub fn new(ctx: &Context) -> Result<VaoRef, VaoError> {
    let context = ctx.state().clone();
    let mut st = context.borrow_mut();
    let kind = st.vao_kind;
    let id = kind.gen(&mut *st.driver);

    if id == 0 && kind != VaoKind::Software {
      return Err(VaoError::Creation);
    }

    let registration = Registration::new(&mut st, LiveObject::new(ObjectKind::VertexArray, id));
    let owner = st.id;
    drop(st);

    debug!("created {} vertex array {} in context {}", kind, id, owner);

    Ok(Rc::new(Vao {
      kind,
      backend: kind.backend(),
      state: RefCell::new(VaoState {
        id,
        owner,
        layout: Layout::default(),
        replaced: None,
        label: String::new(),
      }),
      context: RefCell::new(context),
      registration: RefCell::new(registration),
    }))
  }

  /// Native name; 0 for software VAOs.
  pub fn id(&self) -> u32 {
    self.state.borrow().id
  }

  pub fn kind(&self) -> VaoKind {
    self.kind
  }

  /// Context the VAO currently belongs to.
  pub fn owner(&self) -> ContextId {
    self.state.borrow().owner
  }

  /// Snapshot of the recorded layout.
  pub fn layout(&self) -> Layout {
    self.state.borrow().layout.clone()
  }

  pub fn label(&self) -> String {
    self.state.borrow().label.clone()
  }

  pub fn set_label(&self, label: impl Into<String>) {
    self.state.borrow_mut().label = label.into();
  }

  pub fn bind(self: &Rc<Self>, ctx: &Context) {
    ctx.bind_vao(Some(self));
  }

  /// Unbind whatever VAO is bound in `ctx`.
  pub fn unbind(&self, ctx: &Context) {
    ctx.bind_vao(None);
  }

  /// Bind the VAO with an empty attribute layout, so that it can be set up from scratch for a
  /// different attribute set. Buffer bindings are kept.
  ///
  /// Must be paired with [`Vao::replacement_bind_end`].
  pub fn replacement_bind_begin(self: &Rc<Self>, ctx: &Context) {
    {
      let mut state = self.state.borrow_mut();
      let previous = state.layout.clone();
      state.layout.clear_attribs();
      state.replaced = Some(previous);
    }

    ctx.bind_vao(Some(self));
  }

  /// Disable every attribute enabled before [`Vao::replacement_bind_begin`] that wasn't enabled
  /// again since.
  pub fn replacement_bind_end(self: &Rc<Self>, ctx: &Context) {
    let previous = match self.state.borrow_mut().replaced.take() {
      Some(previous) => previous,
      None => {
        warn!("replacement bind ended without having begun");
        return;
      }
    };

    let mut st = ctx.state().borrow_mut();
    let bound = st.current_vao().map_or(false, |vao| Rc::ptr_eq(&vao, self));

    if !bound {
      st.push_vao(Some(self));
    }

    let stale: Vec<u32> = {
      let state = self.state.borrow();
      previous
        .enabled()
        .filter(|&index| !state.layout.is_enabled(index))
        .collect()
    };

    for index in stale {
      trace!("disabling stale attribute {}", index);
      st.driver.disable_vertex_attrib_array(index);
    }

    if !bound {
      st.pop_vao();
    }
  }
}

impl fmt::Debug for Vao {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let state = self.state.borrow();

    f.debug_struct("Vao")
      .field("kind", &self.kind)
      .field("id", &state.id)
      .field("owner", &state.owner)
      .field("label", &state.label)
      .finish()
  }
}

impl Drop for Vao {
  fn drop(&mut self) {
    let this: *const Vao = &*self;
    let context = self.context.get_mut().clone();

    let mut st = match context.try_borrow_mut() {
      Ok(st) => st,
      Err(_) => {
        warn!("vertex array dropped while its context is busy; leaking it");
        return;
      }
    };

    let state = self.state.get_mut();

    if st.is_bound_vao(this) {
      if st.context_active {
        self.backend.unbind_impl(state, &mut st);
      } else {
        st.buffers.invalidate(BufferTarget::ElementArray);
      }

      st.vao_deleted(this);
    }

    if st.context_active && state.owner == st.id {
      trace!("deleting vertex array {}", state.id);
      self.kind.delete(&mut *st.driver, state.id);
    }
  }
}

/// Non-owning entry of a VAO stack. Two links are equal if they point to the same VAO.
#[derive(Clone, Debug)]
pub(crate) struct VaoLink(Weak<Vao>);

impl VaoLink {
  pub(crate) fn new(vao: &VaoRef) -> Self {
    VaoLink(Rc::downgrade(vao))
  }

  pub(crate) fn upgrade(&self) -> Option<VaoRef> {
    self.0.upgrade()
  }

  fn points_to(&self, vao: *const Vao) -> bool {
    self.0.as_ptr() == vao
  }
}

impl PartialEq for VaoLink {
  fn eq(&self, rhs: &Self) -> bool {
    Weak::ptr_eq(&self.0, &rhs.0)
  }
}

impl State {
  /// VAO on top of the VAO stack, if any and still alive.
  pub(crate) fn current_vao(&self) -> Option<VaoRef> {
    self
      .vaos
      .top()
      .and_then(Option::as_ref)
      .and_then(VaoLink::upgrade)
  }

  fn is_bound_vao(&self, vao: *const Vao) -> bool {
    matches!(self.vaos.top(), Some(Some(link)) if link.points_to(vao))
  }

  pub(crate) fn bind_vao(&mut self, vao: Option<&VaoRef>) {
    let prev = self.current_vao();

    if self.vaos.set(vao.map(VaoLink::new)) {
      self.switch_vao(prev, vao.cloned());
    }
  }

  pub(crate) fn push_vao(&mut self, vao: Option<&VaoRef>) {
    let prev = self.current_vao();

    if self.vaos.push(vao.map(VaoLink::new)) {
      self.switch_vao(prev, vao.cloned());
    }
  }

  pub(crate) fn push_vao_current(&mut self) {
    if self.vaos.is_empty() {
      self.vaos.push(None);
    } else {
      self.vaos.push_top();
    }
  }

  pub(crate) fn pop_vao(&mut self) {
    let prev = self.current_vao();

    match self.vaos.pop() {
      Popped::Restore(next) => {
        let next = next.as_ref().and_then(VaoLink::upgrade);
        self.switch_vao(prev, next);
      }

      Popped::Exhausted => {
        if let Some(prev) = prev {
          self.switch_vao(Some(prev), None);
        }
      }

      Popped::Underflow => {
        error!("vertex array stack underflow");
      }

      Popped::Unchanged => (),
    }
  }

  fn switch_vao(&mut self, prev: Option<VaoRef>, next: Option<VaoRef>) {
    self.delete_orphaned_vaos();

    let unbound = match prev {
      Some(prev) => {
        prev.backend.unbind_impl(&mut prev.state.borrow_mut(), self);
        true
      }

      None => false,
    };

    match next {
      Some(next) => self.activate_vao(&next),
      // nothing known to be bound
      None if !unbound => self.vao_kind.bind_native(&mut *self.driver, 0),
      None => (),
    }
  }

  fn activate_vao(&mut self, vao: &VaoRef) {
    let (owner, id) = {
      let state = vao.state.borrow();
      (state.owner, state.id)
    };

    let foreign = owner != self.id;

    if foreign {
      warn!(
        "vertex array {} of context {} bound in context {}; reassigning it",
        id, owner, self.id
      );
    }

    if !vao.backend.bind_impl(&mut vao.state.borrow_mut(), self) {
      error!(
        "cannot bind vertex array {} in context {}; no vertex array is bound",
        id, self.id
      );

      self.vaos.set(None);
      vao.kind.bind_native(&mut *self.driver, 0);
      self.buffers.invalidate(BufferTarget::ElementArray);
      return;
    }

    if foreign {
      self.adopt_vao(vao, id);
    }
  }

  /// Move a reassigned VAO's bookkeeping to this context. Its old native object, `old_id`, is
  /// handed to the old context for deletion.
  fn adopt_vao(&mut self, vao: &VaoRef, old_id: u32) {
    let id = vao.state.borrow().id;
    vao
      .registration
      .borrow_mut()
      .rehome(self, LiveObject::new(ObjectKind::VertexArray, id));

    let context = match self.weak_self.upgrade() {
      Some(context) => context,
      None => return,
    };

    let previous = vao.context.replace(context);

    if old_id != 0 {
      match previous.try_borrow_mut() {
        Ok(mut previous) => previous.orphaned_vaos.push((vao.kind, old_id)),
        Err(_) => warn!("context of vertex array {} is busy; leaking it", old_id),
      }
    }
  }

  /// Delete the native objects of VAOs reassigned away from this context.
  ///
  /// Only runs when this context issues VAO calls, so that the deletions reach its native context.
  fn delete_orphaned_vaos(&mut self) {
    let orphaned = std::mem::take(&mut self.orphaned_vaos);

    if !self.context_active {
      return;
    }

    for (kind, id) in orphaned {
      trace!("deleting reassigned vertex array {}", id);
      kind.delete(&mut *self.driver, id);
    }
  }

  /// Re-bind the current VAO after raw code changed the driver's VAO binding.
  pub(crate) fn restore_invalidated_vao(&mut self) {
    self.delete_orphaned_vaos();

    match self.current_vao() {
      Some(vao) => self.activate_vao(&vao),
      None => self.vao_kind.bind_native(&mut *self.driver, 0),
    }
  }

  pub(crate) fn vao_deleted(&mut self, vao: *const Vao) {
    if self.is_bound_vao(vao) {
      self.vaos.set(None);
    }
  }

  pub(crate) fn enable_vertex_attrib_array(&mut self, index: u32) {
    let vao = match self.current_vao() {
      Some(vao) => vao,
      None => {
        warn!("no vertex array bound; cannot enable attribute {}", index);
        return;
      }
    };

    let changed = vao.state.borrow_mut().layout.enable(index);

    if changed {
      self.driver.enable_vertex_attrib_array(index);
    }
  }

  pub(crate) fn disable_vertex_attrib_array(&mut self, index: u32) {
    let vao = match self.current_vao() {
      Some(vao) => vao,
      None => {
        warn!("no vertex array bound; cannot disable attribute {}", index);
        return;
      }
    };

    let changed = vao.state.borrow_mut().layout.disable(index);

    if changed {
      self.driver.disable_vertex_attrib_array(index);
    }
  }

  pub(crate) fn vertex_attrib_pointer(&mut self, index: u32, attrib: VertexAttrib) {
    let vao = match self.current_vao() {
      Some(vao) => vao,
      None => {
        warn!("no vertex array bound; cannot set pointer of attribute {}", index);
        return;
      }
    };

    let attrib = VertexAttrib {
      array_buffer: self.buffer_binding(BufferTarget::Array),
      ..attrib
    };

    vao
      .backend
      .vertex_attrib_pointer_impl(&mut vao.state.borrow_mut(), self, index, attrib);
  }

  pub(crate) fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
    if !self.caps.instanced_arrays {
      warn!("instanced arrays are not supported; ignoring divisor of attribute {}", index);
      return;
    }

    let vao = match self.current_vao() {
      Some(vao) => vao,
      None => {
        warn!("no vertex array bound; cannot set divisor of attribute {}", index);
        return;
      }
    };

    vao.state.borrow_mut().layout.set_divisor(index, divisor);
    self.driver.vertex_attrib_divisor(index, divisor);
  }
}
