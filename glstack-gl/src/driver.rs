//! OpenGL driver.

use std::{
  ffi::{c_void, CStr},
  os::raw::c_char,
  ptr::{self, NonNull},
};

use gl::types::*;
use glstack::driver::{
  AttribQuery, AttribType, BlendFactor, BlendFunc, BufferTarget, BufferUsage, Capabilities,
  Capability, Comparison, Driver, Face, FramebufferTarget, FrontFace, IncompleteReason, MapAccess,
  PolygonMode, Rect, TextureTarget, VaoKind,
};

use crate::convert;

// entry points retried with the OES suffix when the loader doesn't know them
const OES_FALLBACKS: [&str; 3] = [
  "glGenVertexArrays",
  "glDeleteVertexArrays",
  "glBindVertexArray",
];

/// Version of an OpenGL or OpenGL ES context.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlVersion {
  pub es: bool,
  pub major: u32,
  pub minor: u32,
}

impl GlVersion {
  /// Parse a `GL_VERSION` string.
  ///
  /// Desktop strings start with the version number (`"4.6.0 NVIDIA 535.54"`); ES strings start with
  /// `"OpenGL ES"` (`"OpenGL ES 3.2 Mesa 23.0"`, `"OpenGL ES-CM 1.1"`).
  pub fn parse(version: &str) -> Option<Self> {
    let version = version.trim();
    let (es, rest) = match version.strip_prefix("OpenGL ES") {
      Some(rest) => {
        let rest = rest
          .strip_prefix("-CM")
          .or_else(|| rest.strip_prefix("-CL"))
          .unwrap_or(rest);
        (true, rest.trim_start())
      }

      None => (cfg!(feature = "gles"), version),
    };

    let number = rest.split_whitespace().next()?;
    let mut parts = number.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
      .next()
      .map(|minor| {
        minor
          .chars()
          .take_while(char::is_ascii_digit)
          .collect::<String>()
      })
      .and_then(|minor| minor.parse().ok())
      .unwrap_or(0);

    Some(GlVersion { es, major, minor })
  }

  pub fn at_least(&self, major: u32, minor: u32) -> bool {
    (self.major, self.minor) >= (major, minor)
  }

  /// What a context of this version supports without extensions.
  pub fn capabilities(&self) -> Capabilities {
    if self.es {
      let es3 = self.at_least(3, 0);

      Capabilities {
        vao: if es3 { VaoKind::Core } else { VaoKind::Es },
        separate_read_draw_framebuffers: es3,
        instanced_arrays: es3,
        integer_attributes: es3,
        samplers: es3,
        polygon_mode: false,
      }
    } else {
      let gl3 = self.at_least(3, 0);
      let gl33 = self.at_least(3, 3);

      Capabilities {
        vao: if gl3 { VaoKind::Core } else { VaoKind::Software },
        separate_read_draw_framebuffers: gl3,
        instanced_arrays: gl33,
        integer_attributes: gl3,
        samplers: gl33,
        polygon_mode: true,
      }
    }
  }
}

/// [`Driver`] calling into OpenGL through the [gl](https://crates.io/crates/gl) crate.
///
/// The OpenGL function pointers are global: a context must be current on the calling thread
/// whenever the driver is used.
#[derive(Debug)]
pub struct GlDriver {
  version: Option<String>,
  caps: Capabilities,
}

impl GlDriver {
  /// Load the OpenGL function pointers with `loader` and create a driver for the current context.
  pub fn load_with<F>(mut loader: F) -> Self
  where
    F: FnMut(&str) -> *const c_void,
  {
    gl::load_with(|symbol| {
      let ptr = loader(symbol);

      if ptr.is_null() && OES_FALLBACKS.contains(&symbol) {
        loader(&format!("{}OES", symbol))
      } else {
        ptr
      }
    });

    Self::new()
  }

  /// Create a driver for the current context. The function pointers must be loaded already.
  pub fn new() -> Self {
    let version = get_string(gl::VERSION);
    let caps = version
      .as_deref()
      .and_then(GlVersion::parse)
      .map(|version| version.capabilities())
      .map(adjust_to_loaded)
      .unwrap_or_default();

    debug!("OpenGL {:?}: {:?}", version, caps);

    GlDriver { version, caps }
  }
}

impl Default for GlDriver {
  fn default() -> Self {
    Self::new()
  }
}

/// Downgrade capabilities whose entry points couldn't be loaded, and upgrade the ones extensions
/// made available.
fn adjust_to_loaded(mut caps: Capabilities) -> Capabilities {
  let vao_loaded = gl::GenVertexArrays::is_loaded() && gl::BindVertexArray::is_loaded();

  match caps.vao {
    VaoKind::Software if vao_loaded => caps.vao = VaoKind::Core,
    VaoKind::Core | VaoKind::Es if !vao_loaded => caps.vao = VaoKind::Software,
    _ => (),
  }

  caps.instanced_arrays = caps.instanced_arrays && gl::VertexAttribDivisor::is_loaded();
  caps.integer_attributes = caps.integer_attributes && gl::VertexAttribIPointer::is_loaded();
  caps.samplers = caps.samplers && gl::BindSampler::is_loaded();
  caps.polygon_mode = caps.polygon_mode && gl::PolygonMode::is_loaded();

  caps
}

fn get_string(name: GLenum) -> Option<String> {
  if !gl::GetString::is_loaded() {
    return None;
  }

  unsafe {
    let ptr = gl::GetString(name);

    if ptr.is_null() {
      None
    } else {
      CStr::from_ptr(ptr as *const c_char)
        .to_str()
        .ok()
        .map(str::to_owned)
    }
  }
}

fn get_integer(name: GLenum) -> GLint {
  let mut value: GLint = 0;
  unsafe { gl::GetIntegerv(name, &mut value) };
  value
}

fn get_id(name: GLenum) -> u32 {
  get_integer(name) as u32
}

fn get_rect(name: GLenum) -> Rect {
  let mut rect: [GLint; 4] = [0; 4];
  unsafe { gl::GetIntegerv(name, rect.as_mut_ptr()) };
  Rect::new(rect[0], rect[1], rect[2], rect[3])
}

fn gl_bool(b: bool) -> GLboolean {
  if b {
    gl::TRUE
  } else {
    gl::FALSE
  }
}

fn gen_with(gen: unsafe fn(GLsizei, *mut GLuint)) -> u32 {
  let mut id: GLuint = 0;
  unsafe { gen(1, &mut id) };
  id
}

fn delete_with(delete: unsafe fn(GLsizei, *const GLuint), id: u32) {
  unsafe { delete(1, &id) };
}

fn blend_factor_query(name: GLenum, default: BlendFactor) -> BlendFactor {
  let factor = get_integer(name) as GLenum;

  convert::from_blend_factor(factor).unwrap_or_else(|| {
    warn!("unknown blend factor 0x{:x}", factor);
    default
  })
}

impl Driver for GlDriver {
  fn version(&self) -> Option<String> {
    self.version.clone()
  }

  fn capabilities(&self) -> Capabilities {
    self.caps
  }

  fn enable(&mut self, cap: Capability) {
    unsafe { gl::Enable(convert::capability(cap)) };
  }

  fn disable(&mut self, cap: Capability) {
    unsafe { gl::Disable(convert::capability(cap)) };
  }

  fn is_enabled(&self, cap: Capability) -> bool {
    unsafe { gl::IsEnabled(convert::capability(cap)) == gl::TRUE }
  }

  fn gen_buffer(&mut self) -> u32 {
    gen_with(gl::GenBuffers)
  }

  fn delete_buffer(&mut self, id: u32) {
    delete_with(gl::DeleteBuffers, id);
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: u32) {
    unsafe { gl::BindBuffer(convert::buffer_target(target), id) };
  }

  fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: u32) {
    unsafe { gl::BindBufferBase(convert::buffer_target(target), index, id) };
  }

  fn bind_buffer_range(
    &mut self,
    target: BufferTarget,
    index: u32,
    id: u32,
    offset: usize,
    size: usize,
  ) {
    unsafe {
      gl::BindBufferRange(
        convert::buffer_target(target),
        index,
        id,
        offset as GLintptr,
        size as GLsizeiptr,
      )
    };
  }

  fn buffer_data(
    &mut self,
    target: BufferTarget,
    size: usize,
    data: Option<&[u8]>,
    usage: BufferUsage,
  ) {
    let ptr = data.map_or(ptr::null(), |data| data.as_ptr() as *const c_void);

    unsafe {
      gl::BufferData(
        convert::buffer_target(target),
        size as GLsizeiptr,
        ptr,
        convert::buffer_usage(usage),
      )
    };
  }

  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
    unsafe {
      gl::BufferSubData(
        convert::buffer_target(target),
        offset as GLintptr,
        data.len() as GLsizeiptr,
        data.as_ptr() as *const c_void,
      )
    };
  }

  fn map_buffer_range(
    &mut self,
    target: BufferTarget,
    offset: usize,
    len: usize,
    access: MapAccess,
  ) -> Option<NonNull<u8>> {
    let ptr = unsafe {
      gl::MapBufferRange(
        convert::buffer_target(target),
        offset as GLintptr,
        len as GLsizeiptr,
        convert::map_access(access),
      )
    };

    NonNull::new(ptr as *mut u8)
  }

  fn unmap_buffer(&mut self, target: BufferTarget) -> bool {
    unsafe { gl::UnmapBuffer(convert::buffer_target(target)) == gl::TRUE }
  }

  fn buffer_binding(&self, target: BufferTarget) -> u32 {
    get_id(convert::buffer_binding(target))
  }

  fn gen_vertex_array(&mut self) -> u32 {
    gen_with(gl::GenVertexArrays)
  }

  fn delete_vertex_array(&mut self, id: u32) {
    delete_with(gl::DeleteVertexArrays, id);
  }

  fn bind_vertex_array(&mut self, id: u32) {
    unsafe { gl::BindVertexArray(id) };
  }

  fn vertex_array_binding(&self) -> u32 {
    if self.caps.vao == VaoKind::Software {
      0
    } else {
      get_id(gl::VERTEX_ARRAY_BINDING)
    }
  }

  fn enable_vertex_attrib_array(&mut self, index: u32) {
    unsafe { gl::EnableVertexAttribArray(index) };
  }

  fn disable_vertex_attrib_array(&mut self, index: u32) {
    unsafe { gl::DisableVertexAttribArray(index) };
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
    unsafe {
      gl::VertexAttribPointer(
        index,
        size,
        convert::attrib_type(ty),
        gl_bool(normalized),
        stride,
        offset as *const c_void,
      )
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
    unsafe {
      gl::VertexAttribIPointer(
        index,
        size,
        convert::attrib_type(ty),
        stride,
        offset as *const c_void,
      )
    };
  }

  fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
    unsafe { gl::VertexAttribDivisor(index, divisor) };
  }

  fn vertex_attrib(&self, index: u32) -> AttribQuery {
    let query = |name| {
      let mut value: GLint = 0;
      unsafe { gl::GetVertexAttribiv(index, name, &mut value) };
      value
    };

    AttribQuery {
      enabled: query(gl::VERTEX_ATTRIB_ARRAY_ENABLED) != 0,
      size: query(gl::VERTEX_ATTRIB_ARRAY_SIZE),
      ty: convert::from_attrib_type(query(gl::VERTEX_ATTRIB_ARRAY_TYPE) as GLenum),
      buffer: query(gl::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING) as u32,
    }
  }

  fn gen_texture(&mut self) -> u32 {
    gen_with(gl::GenTextures)
  }

  fn delete_texture(&mut self, id: u32) {
    delete_with(gl::DeleteTextures, id);
  }

  fn bind_texture(&mut self, target: TextureTarget, id: u32) {
    unsafe { gl::BindTexture(convert::texture_target(target), id) };
  }

  fn texture_binding(&self, target: TextureTarget) -> u32 {
    get_id(convert::texture_binding(target))
  }

  fn active_texture(&mut self, unit: u32) {
    unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
  }

  fn active_texture_unit(&self) -> u32 {
    get_id(gl::ACTIVE_TEXTURE).saturating_sub(gl::TEXTURE0)
  }

  fn bind_sampler(&mut self, unit: u32, id: u32) {
    unsafe { gl::BindSampler(unit, id) };
  }

  fn sampler_binding(&self) -> u32 {
    get_id(gl::SAMPLER_BINDING)
  }

  fn gen_framebuffer(&mut self) -> u32 {
    gen_with(gl::GenFramebuffers)
  }

  fn delete_framebuffer(&mut self, id: u32) {
    delete_with(gl::DeleteFramebuffers, id);
  }

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: u32) {
    unsafe { gl::BindFramebuffer(convert::framebuffer_target(target), id) };
  }

  fn framebuffer_binding(&self, target: FramebufferTarget) -> u32 {
    get_id(convert::framebuffer_binding(target))
  }

  fn check_framebuffer_status(&self, target: FramebufferTarget) -> Result<(), IncompleteReason> {
    let status = unsafe { gl::CheckFramebufferStatus(convert::framebuffer_target(target)) };
    convert::framebuffer_status(status)
  }

  fn gen_renderbuffer(&mut self) -> u32 {
    gen_with(gl::GenRenderbuffers)
  }

  fn delete_renderbuffer(&mut self, id: u32) {
    delete_with(gl::DeleteRenderbuffers, id);
  }

  fn bind_renderbuffer(&mut self, id: u32) {
    unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, id) };
  }

  fn renderbuffer_binding(&self) -> u32 {
    get_id(gl::RENDERBUFFER_BINDING)
  }

  fn create_program(&mut self) -> u32 {
    unsafe { gl::CreateProgram() }
  }

  fn delete_program(&mut self, id: u32) {
    unsafe { gl::DeleteProgram(id) };
  }

  fn use_program(&mut self, id: u32) {
    unsafe { gl::UseProgram(id) };
  }

  fn current_program(&self) -> u32 {
    get_id(gl::CURRENT_PROGRAM)
  }

  fn viewport(&mut self, rect: Rect) {
    unsafe { gl::Viewport(rect.x, rect.y, rect.width, rect.height) };
  }

  fn viewport_rect(&self) -> Rect {
    get_rect(gl::VIEWPORT)
  }

  fn scissor(&mut self, rect: Rect) {
    unsafe { gl::Scissor(rect.x, rect.y, rect.width, rect.height) };
  }

  fn scissor_rect(&self) -> Rect {
    get_rect(gl::SCISSOR_BOX)
  }

  fn blend_func_separate(&mut self, func: BlendFunc) {
    unsafe {
      gl::BlendFuncSeparate(
        convert::blend_factor(func.src_rgb),
        convert::blend_factor(func.dst_rgb),
        convert::blend_factor(func.src_alpha),
        convert::blend_factor(func.dst_alpha),
      )
    };
  }

  fn blend_func(&self) -> BlendFunc {
    BlendFunc::separate(
      blend_factor_query(gl::BLEND_SRC_RGB, BlendFactor::One),
      blend_factor_query(gl::BLEND_DST_RGB, BlendFactor::Zero),
      blend_factor_query(gl::BLEND_SRC_ALPHA, BlendFactor::One),
      blend_factor_query(gl::BLEND_DST_ALPHA, BlendFactor::Zero),
    )
  }

  fn line_width(&mut self, width: f32) {
    unsafe { gl::LineWidth(width) };
  }

  fn line_width_value(&self) -> f32 {
    let mut width: GLfloat = 1.;
    unsafe { gl::GetFloatv(gl::LINE_WIDTH, &mut width) };
    width
  }

  fn polygon_mode(&mut self, face: Face, mode: PolygonMode) {
    unsafe { gl::PolygonMode(convert::face(face), convert::polygon_mode(mode)) };
  }

  fn depth_mask(&mut self, enabled: bool) {
    unsafe { gl::DepthMask(gl_bool(enabled)) };
  }

  fn depth_mask_value(&self) -> bool {
    let mut mask: GLboolean = gl::TRUE;
    unsafe { gl::GetBooleanv(gl::DEPTH_WRITEMASK, &mut mask) };
    mask == gl::TRUE
  }

  fn depth_func(&mut self, func: Comparison) {
    unsafe { gl::DepthFunc(convert::comparison(func)) };
  }

  fn depth_func_value(&self) -> Comparison {
    let func = get_integer(gl::DEPTH_FUNC) as GLenum;

    convert::from_comparison(func).unwrap_or_else(|| {
      warn!("unknown depth function 0x{:x}", func);
      Comparison::Less
    })
  }

  fn cull_face(&mut self, face: Face) {
    unsafe { gl::CullFace(convert::face(face)) };
  }

  fn cull_face_value(&self) -> Face {
    let face = get_integer(gl::CULL_FACE_MODE) as GLenum;

    convert::from_face(face).unwrap_or_else(|| {
      warn!("unknown cull face mode 0x{:x}", face);
      Face::Back
    })
  }

  fn front_face(&mut self, winding: FrontFace) {
    unsafe { gl::FrontFace(convert::front_face(winding)) };
  }

  fn front_face_value(&self) -> FrontFace {
    let winding = get_integer(gl::FRONT_FACE) as GLenum;

    convert::from_front_face(winding).unwrap_or_else(|| {
      warn!("unknown front face winding 0x{:x}", winding);
      FrontFace::Ccw
    })
  }
}
