//! Simulated driver shared by the integration tests.
//!
//! [`SimDriver`] holds the binding state a real driver would (per-VAO attributes and element
//! binding, global array binding, per-unit textures…) and logs every call it gets, so tests can
//! check both what the cache believes and how many native calls it took to get there.

#![allow(dead_code)]

use std::{
  cell::RefCell,
  collections::BTreeMap,
  ptr::NonNull,
  rc::Rc,
};

use glstack::{
  driver::{
    AttribQuery, AttribType, BlendFunc, BufferTarget, BufferUsage, Capabilities, Capability,
    Comparison, Driver, Face, FramebufferTarget, FrontFace, IncompleteReason, MapAccess,
    PolygonMode, Rect, TextureTarget, VaoKind,
  },
  Context, ContextOptions,
};

pub const DEFAULT_VIEWPORT: Rect = Rect {
  x: 0,
  y: 0,
  width: 640,
  height: 480,
};

/// Native call, as logged by the simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Call {
  Enable(Capability),
  Disable(Capability),
  GenBuffer,
  DeleteBuffer,
  BindBuffer(BufferTarget),
  BindBufferBase(BufferTarget),
  BindBufferRange(BufferTarget),
  BufferData,
  BufferSubData,
  MapBuffer,
  UnmapBuffer,
  GenVertexArray,
  DeleteVertexArray,
  BindVertexArray,
  EnableAttrib,
  DisableAttrib,
  AttribPointer,
  AttribIPointer,
  AttribDivisor,
  GenTexture,
  DeleteTexture,
  BindTexture(TextureTarget),
  ActiveTexture,
  BindSampler,
  GenFramebuffer,
  DeleteFramebuffer,
  BindFramebuffer(FramebufferTarget),
  GenRenderbuffer,
  DeleteRenderbuffer,
  BindRenderbuffer,
  CreateProgram,
  DeleteProgram,
  UseProgram,
  Viewport,
  Scissor,
  BlendFunc,
  LineWidth,
  PolygonMode,
  DepthMask,
  DepthFunc,
  CullFace,
  FrontFace,
  /// Any state query.
  Query,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimAttrib {
  pub enabled: bool,
  pub size: i32,
  pub ty: AttribType,
  pub normalized: bool,
  pub integer: bool,
  pub stride: i32,
  pub offset: usize,
  pub buffer: u32,
  pub divisor: u32,
}

impl Default for SimAttrib {
  fn default() -> Self {
    SimAttrib {
      enabled: false,
      size: 4,
      ty: AttribType::Float,
      normalized: false,
      integer: false,
      stride: 0,
      offset: 0,
      buffer: 0,
      divisor: 0,
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct SimVao {
  pub attribs: BTreeMap<u32, SimAttrib>,
  pub element: u32,
}

/// Whole simulated driver state.
#[derive(Debug)]
pub struct Sim {
  pub version: Option<String>,
  pub caps: Capabilities,
  /// Make every generation call return 0.
  pub fail_gen: bool,
  pub fail_map: bool,
  /// Make unmapping report corruption.
  pub corrupt_unmap: bool,
  pub framebuffer_status: Result<(), IncompleteReason>,

  next_id: u32,
  log: Vec<Call>,

  pub enabled: BTreeMap<Capability, bool>,
  pub buffers: BTreeMap<BufferTarget, u32>,
  pub storage: BTreeMap<u32, Vec<u8>>,
  pub vaos: BTreeMap<u32, SimVao>,
  pub vao: u32,
  pub textures: BTreeMap<(u32, TextureTarget), u32>,
  pub active_unit: u32,
  pub samplers: BTreeMap<u32, u32>,
  pub read_framebuffer: u32,
  pub draw_framebuffer: u32,
  pub renderbuffer: u32,
  pub program: u32,
  pub viewport: Rect,
  pub scissor: Rect,
  pub blend: BlendFunc,
  pub line_width: f32,
  pub polygon_mode: PolygonMode,
  pub depth_mask: bool,
  pub depth_func: Comparison,
  pub cull_face: Face,
  pub front_face: FrontFace,
}

impl Sim {
  fn new(caps: Capabilities) -> Self {
    let mut vaos = BTreeMap::new();
    vaos.insert(0, SimVao::default());

    Sim {
      version: Some("4.6 simulated".to_owned()),
      caps,
      fail_gen: false,
      fail_map: false,
      corrupt_unmap: false,
      framebuffer_status: Ok(()),
      next_id: 1,
      log: Vec::new(),
      enabled: BTreeMap::new(),
      buffers: BTreeMap::new(),
      storage: BTreeMap::new(),
      vaos,
      vao: 0,
      textures: BTreeMap::new(),
      active_unit: 0,
      samplers: BTreeMap::new(),
      read_framebuffer: 0,
      draw_framebuffer: 0,
      renderbuffer: 0,
      program: 0,
      viewport: DEFAULT_VIEWPORT,
      scissor: DEFAULT_VIEWPORT,
      blend: BlendFunc::default(),
      line_width: 1.,
      polygon_mode: PolygonMode::Fill,
      depth_mask: true,
      depth_func: Comparison::Less,
      cull_face: Face::Back,
      front_face: FrontFace::Ccw,
    }
  }

  fn gen(&mut self, call: Call) -> u32 {
    self.log.push(call);

    if self.fail_gen {
      return 0;
    }

    let id = self.next_id;
    self.next_id += 1;
    id
  }

  fn current_vao(&mut self) -> &mut SimVao {
    self.vaos.entry(self.vao).or_default()
  }

  pub fn attrib(&self, index: u32) -> SimAttrib {
    self
      .vaos
      .get(&self.vao)
      .and_then(|vao| vao.attribs.get(&index))
      .copied()
      .unwrap_or_default()
  }

  pub fn enabled_attribs(&self) -> Vec<u32> {
    self
      .vaos
      .get(&self.vao)
      .map(|vao| {
        vao
          .attribs
          .iter()
          .filter(|(_, attrib)| attrib.enabled)
          .map(|(&index, _)| index)
          .collect()
      })
      .unwrap_or_default()
  }

  pub fn buffer(&self, target: BufferTarget) -> u32 {
    match target {
      BufferTarget::ElementArray => self.vaos.get(&self.vao).map_or(0, |vao| vao.element),
      _ => self.buffers.get(&target).copied().unwrap_or(0),
    }
  }

  pub fn texture(&self, unit: u32, target: TextureTarget) -> u32 {
    self.textures.get(&(unit, target)).copied().unwrap_or(0)
  }

  pub fn is_enabled(&self, cap: Capability) -> bool {
    self.enabled.get(&cap).copied().unwrap_or(false)
  }
}

/// Test-side handle on the simulation.
#[derive(Clone, Debug)]
pub struct SimHandle(Rc<RefCell<Sim>>);

impl SimHandle {
  pub fn with<R>(&self, f: impl FnOnce(&mut Sim) -> R) -> R {
    f(&mut self.0.borrow_mut())
  }

  /// Number of logged calls equal to `call`.
  pub fn count(&self, call: Call) -> usize {
    self.0.borrow().log.iter().filter(|&&c| c == call).count()
  }

  /// Number of logged calls, queries excluded.
  pub fn native_calls(&self) -> usize {
    self
      .0
      .borrow()
      .log
      .iter()
      .filter(|&&c| c != Call::Query)
      .count()
  }

  pub fn log(&self) -> Vec<Call> {
    self.0.borrow().log.clone()
  }

  pub fn clear_log(&self) {
    self.0.borrow_mut().log.clear();
  }

  pub fn vao(&self) -> u32 {
    self.0.borrow().vao
  }

  pub fn buffer(&self, target: BufferTarget) -> u32 {
    self.0.borrow().buffer(target)
  }

  pub fn attrib(&self, index: u32) -> SimAttrib {
    self.0.borrow().attrib(index)
  }

  pub fn enabled_attribs(&self) -> Vec<u32> {
    self.0.borrow().enabled_attribs()
  }

  pub fn texture(&self, unit: u32, target: TextureTarget) -> u32 {
    self.0.borrow().texture(unit, target)
  }

  pub fn is_enabled(&self, cap: Capability) -> bool {
    self.0.borrow().is_enabled(cap)
  }

  pub fn active_unit(&self) -> u32 {
    self.0.borrow().active_unit
  }

  /// Change driver state behind the cache's back.
  pub fn raw(&self) -> SimDriver {
    SimDriver(self.0.clone())
  }
}

#[derive(Debug)]
pub struct SimDriver(Rc<RefCell<Sim>>);

impl SimDriver {
  pub fn new(caps: Capabilities) -> (Self, SimHandle) {
    let sim = Rc::new(RefCell::new(Sim::new(caps)));
    (SimDriver(sim.clone()), SimHandle(sim))
  }

  fn call(&self, call: Call) -> std::cell::RefMut<Sim> {
    let mut sim = self.0.borrow_mut();
    sim.log.push(call);
    sim
  }

  fn query(&self) -> std::cell::RefMut<Sim> {
    self.call(Call::Query)
  }
}

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context() -> (Context, SimHandle) {
  context_with(Capabilities::default(), ContextOptions::default())
}

pub fn context_of_kind(kind: VaoKind) -> (Context, SimHandle) {
  let caps = Capabilities {
    vao: kind,
    ..Capabilities::default()
  };

  context_with(caps, ContextOptions::default())
}

pub fn context_with(caps: Capabilities, options: ContextOptions) -> (Context, SimHandle) {
  init_logger();

  let (driver, sim) = SimDriver::new(caps);
  let ctx = match Context::with_options(driver, options) {
    Ok(ctx) => ctx,
    Err(e) => panic!("cannot create context: {}", e),
  };

  (ctx, sim)
}

pub const ALL_KINDS: [VaoKind; 3] = [VaoKind::Core, VaoKind::Es, VaoKind::Software];

impl Driver for SimDriver {
  fn version(&self) -> Option<String> {
    self.0.borrow().version.clone()
  }

  fn capabilities(&self) -> Capabilities {
    self.0.borrow().caps
  }

  fn enable(&mut self, cap: Capability) {
    self.call(Call::Enable(cap)).enabled.insert(cap, true);
  }

  fn disable(&mut self, cap: Capability) {
    self.call(Call::Disable(cap)).enabled.insert(cap, false);
  }

  fn is_enabled(&self, cap: Capability) -> bool {
    self.query().is_enabled(cap)
  }

  fn gen_buffer(&mut self) -> u32 {
    let mut sim = self.0.borrow_mut();
    let id = sim.gen(Call::GenBuffer);

    if id != 0 {
      sim.storage.insert(id, Vec::new());
    }

    id
  }

  fn delete_buffer(&mut self, id: u32) {
    let mut sim = self.call(Call::DeleteBuffer);
    sim.storage.remove(&id);

    for bound in sim.buffers.values_mut() {
      if *bound == id {
        *bound = 0;
      }
    }

    let vao = sim.current_vao();
    if vao.element == id {
      vao.element = 0;
    }
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: u32) {
    let mut sim = self.call(Call::BindBuffer(target));

    match target {
      BufferTarget::ElementArray => sim.current_vao().element = id,
      _ => {
        sim.buffers.insert(target, id);
      }
    }
  }

  fn bind_buffer_base(&mut self, target: BufferTarget, _: u32, id: u32) {
    self
      .call(Call::BindBufferBase(target))
      .buffers
      .insert(target, id);
  }

  fn bind_buffer_range(&mut self, target: BufferTarget, _: u32, id: u32, _: usize, _: usize) {
    self
      .call(Call::BindBufferRange(target))
      .buffers
      .insert(target, id);
  }

  fn buffer_data(
    &mut self,
    target: BufferTarget,
    size: usize,
    data: Option<&[u8]>,
    _: BufferUsage,
  ) {
    let mut sim = self.call(Call::BufferData);
    let id = sim.buffer(target);
    let content = data.map_or_else(|| vec![0; size], <[u8]>::to_vec);
    sim.storage.insert(id, content);
  }

  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
    let mut sim = self.call(Call::BufferSubData);
    let id = sim.buffer(target);

    if let Some(storage) = sim.storage.get_mut(&id) {
      storage[offset..offset + data.len()].copy_from_slice(data);
    }
  }

  fn map_buffer_range(
    &mut self,
    target: BufferTarget,
    offset: usize,
    _: usize,
    _: MapAccess,
  ) -> Option<NonNull<u8>> {
    let mut sim = self.call(Call::MapBuffer);

    if sim.fail_map {
      return None;
    }

    let id = sim.buffer(target);
    let storage = sim.storage.get_mut(&id)?;
    NonNull::new(storage[offset..].as_mut_ptr())
  }

  fn unmap_buffer(&mut self, _: BufferTarget) -> bool {
    !self.call(Call::UnmapBuffer).corrupt_unmap
  }

  fn buffer_binding(&self, target: BufferTarget) -> u32 {
    self.query().buffer(target)
  }

  fn gen_vertex_array(&mut self) -> u32 {
    let mut sim = self.0.borrow_mut();
    let id = sim.gen(Call::GenVertexArray);

    if id != 0 {
      sim.vaos.insert(id, SimVao::default());
    }

    id
  }

  fn delete_vertex_array(&mut self, id: u32) {
    let mut sim = self.call(Call::DeleteVertexArray);
    sim.vaos.remove(&id);

    if sim.vao == id {
      sim.vao = 0;
    }
  }

  fn bind_vertex_array(&mut self, id: u32) {
    self.call(Call::BindVertexArray).vao = id;
  }

  fn vertex_array_binding(&self) -> u32 {
    self.query().vao
  }

  fn enable_vertex_attrib_array(&mut self, index: u32) {
    self
      .call(Call::EnableAttrib)
      .current_vao()
      .attribs
      .entry(index)
      .or_default()
      .enabled = true;
  }

  fn disable_vertex_attrib_array(&mut self, index: u32) {
    self
      .call(Call::DisableAttrib)
      .current_vao()
      .attribs
      .entry(index)
      .or_default()
      .enabled = false;
  }

  fn vertex_attrib_pointer(
    &mut self,
    index: u32,
    size: i32,
    ty: AttribType,
    normalized: bool,
    stride: i32,
    offset: usize,
  ) {
    let mut sim = self.call(Call::AttribPointer);
    let buffer = sim.buffer(BufferTarget::Array);
    let attrib = sim.current_vao().attribs.entry(index).or_default();

    *attrib = SimAttrib {
      size,
      ty,
      normalized,
      integer: false,
      stride,
      offset,
      buffer,
      ..*attrib
    };
  }

  fn vertex_attrib_i_pointer(
    &mut self,
    index: u32,
    size: i32,
    ty: AttribType,
    stride: i32,
    offset: usize,
  ) {
    let mut sim = self.call(Call::AttribIPointer);
    let buffer = sim.buffer(BufferTarget::Array);
    let attrib = sim.current_vao().attribs.entry(index).or_default();

    *attrib = SimAttrib {
      size,
      ty,
      normalized: false,
      integer: true,
      stride,
      offset,
      buffer,
      ..*attrib
    };
  }

  fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
    self
      .call(Call::AttribDivisor)
      .current_vao()
      .attribs
      .entry(index)
      .or_default()
      .divisor = divisor;
  }

  fn vertex_attrib(&self, index: u32) -> AttribQuery {
    let attrib = self.query().attrib(index);

    AttribQuery {
      enabled: attrib.enabled,
      size: attrib.size,
      ty: Some(attrib.ty),
      buffer: attrib.buffer,
    }
  }

  fn gen_texture(&mut self) -> u32 {
    self.0.borrow_mut().gen(Call::GenTexture)
  }

  fn delete_texture(&mut self, id: u32) {
    let mut sim = self.call(Call::DeleteTexture);

    for bound in sim.textures.values_mut() {
      if *bound == id {
        *bound = 0;
      }
    }
  }

  fn bind_texture(&mut self, target: TextureTarget, id: u32) {
    let mut sim = self.call(Call::BindTexture(target));
    let unit = sim.active_unit;
    sim.textures.insert((unit, target), id);
  }

  fn texture_binding(&self, target: TextureTarget) -> u32 {
    let sim = self.query();
    sim.texture(sim.active_unit, target)
  }

  fn active_texture(&mut self, unit: u32) {
    self.call(Call::ActiveTexture).active_unit = unit;
  }

  fn active_texture_unit(&self) -> u32 {
    self.query().active_unit
  }

  fn bind_sampler(&mut self, unit: u32, id: u32) {
    self.call(Call::BindSampler).samplers.insert(unit, id);
  }

  fn sampler_binding(&self) -> u32 {
    let sim = self.query();
    sim.samplers.get(&sim.active_unit).copied().unwrap_or(0)
  }

  fn gen_framebuffer(&mut self) -> u32 {
    self.0.borrow_mut().gen(Call::GenFramebuffer)
  }

  fn delete_framebuffer(&mut self, id: u32) {
    let mut sim = self.call(Call::DeleteFramebuffer);

    if sim.read_framebuffer == id {
      sim.read_framebuffer = 0;
    }

    if sim.draw_framebuffer == id {
      sim.draw_framebuffer = 0;
    }
  }

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: u32) {
    let mut sim = self.call(Call::BindFramebuffer(target));

    match target {
      FramebufferTarget::Framebuffer => {
        sim.read_framebuffer = id;
        sim.draw_framebuffer = id;
      }
      FramebufferTarget::Read => sim.read_framebuffer = id,
      FramebufferTarget::Draw => sim.draw_framebuffer = id,
    }
  }

  fn framebuffer_binding(&self, target: FramebufferTarget) -> u32 {
    let sim = self.query();

    match target {
      FramebufferTarget::Read => sim.read_framebuffer,
      _ => sim.draw_framebuffer,
    }
  }

  fn check_framebuffer_status(&self, _: FramebufferTarget) -> Result<(), IncompleteReason> {
    self.query().framebuffer_status
  }

  fn gen_renderbuffer(&mut self) -> u32 {
    self.0.borrow_mut().gen(Call::GenRenderbuffer)
  }

  fn delete_renderbuffer(&mut self, id: u32) {
    let mut sim = self.call(Call::DeleteRenderbuffer);

    if sim.renderbuffer == id {
      sim.renderbuffer = 0;
    }
  }

  fn bind_renderbuffer(&mut self, id: u32) {
    self.call(Call::BindRenderbuffer).renderbuffer = id;
  }

  fn renderbuffer_binding(&self) -> u32 {
    self.query().renderbuffer
  }

  fn create_program(&mut self) -> u32 {
    self.0.borrow_mut().gen(Call::CreateProgram)
  }

  fn delete_program(&mut self, _: u32) {
    self.call(Call::DeleteProgram);
  }

  fn use_program(&mut self, id: u32) {
    self.call(Call::UseProgram).program = id;
  }

  fn current_program(&self) -> u32 {
    self.query().program
  }

  fn viewport(&mut self, rect: Rect) {
    self.call(Call::Viewport).viewport = rect;
  }

  fn viewport_rect(&self) -> Rect {
    self.query().viewport
  }

  fn scissor(&mut self, rect: Rect) {
    self.call(Call::Scissor).scissor = rect;
  }

  fn scissor_rect(&self) -> Rect {
    self.query().scissor
  }

  fn blend_func_separate(&mut self, func: BlendFunc) {
    self.call(Call::BlendFunc).blend = func;
  }

  fn blend_func(&self) -> BlendFunc {
    self.query().blend
  }

  fn line_width(&mut self, width: f32) {
    self.call(Call::LineWidth).line_width = width;
  }

  fn line_width_value(&self) -> f32 {
    self.query().line_width
  }

  fn polygon_mode(&mut self, _: Face, mode: PolygonMode) {
    self.call(Call::PolygonMode).polygon_mode = mode;
  }

  fn depth_mask(&mut self, enabled: bool) {
    self.call(Call::DepthMask).depth_mask = enabled;
  }

  fn depth_mask_value(&self) -> bool {
    self.query().depth_mask
  }

  fn depth_func(&mut self, func: Comparison) {
    self.call(Call::DepthFunc).depth_func = func;
  }

  fn depth_func_value(&self) -> Comparison {
    self.query().depth_func
  }

  fn cull_face(&mut self, face: Face) {
    self.call(Call::CullFace).cull_face = face;
  }

  fn cull_face_value(&self) -> Face {
    self.query().cull_face
  }

  fn front_face(&mut self, winding: FrontFace) {
    self.call(Call::FrontFace).front_face = winding;
  }

  fn front_face_value(&self) -> FrontFace {
    self.query().front_face
  }
}
