//! Native call surface.
//!
//! The cache never talks to a graphics API directly: every native call goes through a [`Driver`].
//! Drivers are typed: targets, capabilities and factors are Rust enums instead of raw enumerants,
//! and the backend crate maps them to whatever its API expects.

use std::{error::Error, fmt, ptr::NonNull};

/// Buffer binding point.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BufferTarget {
  /// Vertex attribute source. Part of the bound VAO when one is bound.
  Array,
  /// Index source. Part of the bound VAO when one is bound.
  ElementArray,
  Uniform,
  PixelPack,
  PixelUnpack,
  CopyRead,
  CopyWrite,
  TransformFeedback,
  DrawIndirect,
  ShaderStorage,
}

impl BufferTarget {
  /// All the buffer binding points.
  pub const ALL: [BufferTarget; 10] = [
    BufferTarget::Array,
    BufferTarget::ElementArray,
    BufferTarget::Uniform,
    BufferTarget::PixelPack,
    BufferTarget::PixelUnpack,
    BufferTarget::CopyRead,
    BufferTarget::CopyWrite,
    BufferTarget::TransformFeedback,
    BufferTarget::DrawIndirect,
    BufferTarget::ShaderStorage,
  ];

  /// Whether the binding of this target is recorded inside the bound VAO.
  pub fn is_vao_owned(self) -> bool {
    matches!(self, BufferTarget::Array | BufferTarget::ElementArray)
  }
}

/// Texture binding point.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TextureTarget {
  Texture1D,
  Texture2D,
  Texture3D,
  Texture1DArray,
  Texture2DArray,
  CubeMap,
  CubeMapArray,
  Rectangle,
  Buffer,
  Texture2DMultisample,
}

/// Framebuffer binding point.
///
/// [`FramebufferTarget::Framebuffer`] addresses both the read and the draw bindings at once.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FramebufferTarget {
  Framebuffer,
  Read,
  Draw,
}

/// Boolean server-side capability, toggled with enable / disable.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Capability {
  Blend,
  CullFace,
  DepthTest,
  ScissorTest,
  StencilTest,
  PolygonOffsetFill,
  Multisample,
  SampleAlphaToCoverage,
  PrimitiveRestart,
  RasterizerDiscard,
  FramebufferSrgb,
  ProgramPointSize,
  DepthClamp,
  /// Raw enumerant, for capabilities this crate doesn't name.
  Custom(u32),
}

/// Blending factor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BlendFactor {
  Zero,
  One,
  SrcColor,
  OneMinusSrcColor,
  DstColor,
  OneMinusDstColor,
  SrcAlpha,
  OneMinusSrcAlpha,
  DstAlpha,
  OneMinusDstAlpha,
  ConstantColor,
  OneMinusConstantColor,
  ConstantAlpha,
  OneMinusConstantAlpha,
  SrcAlphaSaturate,
}

/// Separate blending function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BlendFunc {
  pub src_rgb: BlendFactor,
  pub dst_rgb: BlendFactor,
  pub src_alpha: BlendFactor,
  pub dst_alpha: BlendFactor,
}

impl BlendFunc {
  /// Same factors for the color and the alpha channels.
  pub fn new(src: BlendFactor, dst: BlendFactor) -> Self {
    Self::separate(src, dst, src, dst)
  }

  pub fn separate(
    src_rgb: BlendFactor,
    dst_rgb: BlendFactor,
    src_alpha: BlendFactor,
    dst_alpha: BlendFactor,
  ) -> Self {
    BlendFunc {
      src_rgb,
      dst_rgb,
      src_alpha,
      dst_alpha,
    }
  }
}

impl Default for BlendFunc {
  fn default() -> Self {
    BlendFunc::new(BlendFactor::One, BlendFactor::Zero)
  }
}

/// Comparison function, used by depth testing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Comparison {
  Never,
  Always,
  Equal,
  NotEqual,
  Less,
  LessOrEqual,
  Greater,
  GreaterOrEqual,
}

/// Polygon face.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Face {
  Front,
  Back,
  FrontAndBack,
}

/// Winding order of front faces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FrontFace {
  Cw,
  Ccw,
}

/// Polygon rasterization mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  Point,
  Line,
  Fill,
}

/// Component type of a vertex attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttribType {
  Byte,
  UnsignedByte,
  Short,
  UnsignedShort,
  Int,
  UnsignedInt,
  HalfFloat,
  Float,
  Double,
  Fixed,
}

/// Usage hint given when (re)allocating buffer storage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferUsage {
  StreamDraw,
  StreamRead,
  StreamCopy,
  StaticDraw,
  StaticRead,
  StaticCopy,
  DynamicDraw,
  DynamicRead,
  DynamicCopy,
}

/// Access requested when mapping a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MapAccess {
  ReadOnly,
  WriteOnly,
  ReadWrite,
}

/// Window-space rectangle (viewport, scissor box).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
}

impl Rect {
  pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
    Rect {
      x,
      y,
      width,
      height,
    }
  }
}

/// Live state of one vertex attribute slot, as reported by the driver.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AttribQuery {
  pub enabled: bool,
  pub size: i32,
  pub ty: Option<AttribType>,
  pub buffer: u32,
}

/// Flavour of vertex array object support.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VaoKind {
  /// Native vertex array objects.
  Core,
  /// Native vertex array objects exposed through the OES extension entry points.
  Es,
  /// No native support: attribute state is replayed on every bind.
  Software,
}

impl fmt::Display for VaoKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      VaoKind::Core => f.write_str("core"),
      VaoKind::Es => f.write_str("es"),
      VaoKind::Software => f.write_str("software"),
    }
  }
}

/// What the driver supports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Capabilities {
  pub vao: VaoKind,
  /// Read and draw framebuffers can be bound independently.
  pub separate_read_draw_framebuffers: bool,
  pub instanced_arrays: bool,
  pub integer_attributes: bool,
  pub samplers: bool,
  pub polygon_mode: bool,
}

impl Default for Capabilities {
  fn default() -> Self {
    Capabilities {
      vao: VaoKind::Core,
      separate_read_draw_framebuffers: true,
      instanced_arrays: true,
      integer_attributes: true,
      samplers: true,
      polygon_mode: true,
    }
  }
}

/// Reason a framebuffer is incomplete.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IncompleteReason {
  /// Incomplete framebuffer.
  Undefined,
  /// Incomplete attachment (color / depth).
  IncompleteAttachment,
  /// An attachment was missing.
  MissingAttachment,
  /// Incomplete draw buffer.
  IncompleteDrawBuffer,
  /// Incomplete read buffer.
  IncompleteReadBuffer,
  /// Unsupported framebuffer.
  Unsupported,
  /// Incomplete multisample configuration.
  IncompleteMultisample,
  /// Incomplete layer targets.
  IncompleteLayerTargets,
  /// Status the driver reported that isn't listed above.
  Unknown(u32),
}

impl fmt::Display for IncompleteReason {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      IncompleteReason::Undefined => write!(f, "incomplete reason"),
      IncompleteReason::IncompleteAttachment => write!(f, "incomplete attachment"),
      IncompleteReason::MissingAttachment => write!(f, "missing attachment"),
      IncompleteReason::IncompleteDrawBuffer => write!(f, "incomplete draw buffer"),
      IncompleteReason::IncompleteReadBuffer => write!(f, "incomplete read buffer"),
      IncompleteReason::Unsupported => write!(f, "unsupported"),
      IncompleteReason::IncompleteMultisample => write!(f, "incomplete multisample"),
      IncompleteReason::IncompleteLayerTargets => write!(f, "incomplete layer targets"),
      IncompleteReason::Unknown(status) => write!(f, "unknown status 0x{:x}", status),
    }
  }
}

impl Error for IncompleteReason {}

/// Native graphics API entry points used by the cache.
///
/// Generation functions return 0 on failure. Queries reflect the true driver state and are only
/// issued by the cache when it has no cached value (or when checking itself for consistency).
///
/// Texture and sampler queries apply to the currently active texture unit.
pub trait Driver: fmt::Debug {
  /// Driver version string; `None` if there is no native context to talk to.
  fn version(&self) -> Option<String>;

  fn capabilities(&self) -> Capabilities;

  fn enable(&mut self, cap: Capability);
  fn disable(&mut self, cap: Capability);
  fn is_enabled(&self, cap: Capability) -> bool;

  fn gen_buffer(&mut self) -> u32;
  fn delete_buffer(&mut self, id: u32);
  fn bind_buffer(&mut self, target: BufferTarget, id: u32);
  fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: u32);
  fn bind_buffer_range(
    &mut self,
    target: BufferTarget,
    index: u32,
    id: u32,
    offset: usize,
    size: usize,
  );
  fn buffer_data(
    &mut self,
    target: BufferTarget,
    size: usize,
    data: Option<&[u8]>,
    usage: BufferUsage,
  );
  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);
  fn map_buffer_range(
    &mut self,
    target: BufferTarget,
    offset: usize,
    len: usize,
    access: MapAccess,
  ) -> Option<NonNull<u8>>;
  /// Returns `false` if the buffer content got corrupted while mapped.
  fn unmap_buffer(&mut self, target: BufferTarget) -> bool;
  fn buffer_binding(&self, target: BufferTarget) -> u32;

  fn gen_vertex_array(&mut self) -> u32;
  fn delete_vertex_array(&mut self, id: u32);
  fn bind_vertex_array(&mut self, id: u32);

  fn gen_vertex_array_oes(&mut self) -> u32 {
    self.gen_vertex_array()
  }

  fn delete_vertex_array_oes(&mut self, id: u32) {
    self.delete_vertex_array(id)
  }

  fn bind_vertex_array_oes(&mut self, id: u32) {
    self.bind_vertex_array(id)
  }

  fn vertex_array_binding(&self) -> u32;

  fn enable_vertex_attrib_array(&mut self, index: u32);
  fn disable_vertex_attrib_array(&mut self, index: u32);
  fn vertex_attrib_pointer(
    &mut self,
    index: u32,
    size: i32,
    ty: AttribType,
    normalized: bool,
    stride: i32,
    offset: usize,
  );
  fn vertex_attrib_i_pointer(
    &mut self,
    index: u32,
    size: i32,
    ty: AttribType,
    stride: i32,
    offset: usize,
  );
  fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32);
  fn vertex_attrib(&self, index: u32) -> AttribQuery;

  fn gen_texture(&mut self) -> u32;
  fn delete_texture(&mut self, id: u32);
  fn bind_texture(&mut self, target: TextureTarget, id: u32);
  fn texture_binding(&self, target: TextureTarget) -> u32;
  /// Select the active texture unit (0-based).
  fn active_texture(&mut self, unit: u32);
  fn active_texture_unit(&self) -> u32;

  fn bind_sampler(&mut self, unit: u32, id: u32);
  fn sampler_binding(&self) -> u32;

  fn gen_framebuffer(&mut self) -> u32;
  fn delete_framebuffer(&mut self, id: u32);
  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: u32);
  fn framebuffer_binding(&self, target: FramebufferTarget) -> u32;
  fn check_framebuffer_status(&self, target: FramebufferTarget) -> Result<(), IncompleteReason>;

  fn gen_renderbuffer(&mut self) -> u32;
  fn delete_renderbuffer(&mut self, id: u32);
  fn bind_renderbuffer(&mut self, id: u32);
  fn renderbuffer_binding(&self) -> u32;

  fn create_program(&mut self) -> u32;
  fn delete_program(&mut self, id: u32);
  fn use_program(&mut self, id: u32);
  fn current_program(&self) -> u32;

  fn viewport(&mut self, rect: Rect);
  fn viewport_rect(&self) -> Rect;
  fn scissor(&mut self, rect: Rect);
  fn scissor_rect(&self) -> Rect;
  fn blend_func_separate(&mut self, func: BlendFunc);
  fn blend_func(&self) -> BlendFunc;
  fn line_width(&mut self, width: f32);
  fn line_width_value(&self) -> f32;
  /// Polygon mode has no query entry point; it's only ever set.
  fn polygon_mode(&mut self, face: Face, mode: PolygonMode);
  fn depth_mask(&mut self, enabled: bool);
  fn depth_mask_value(&self) -> bool;
  fn depth_func(&mut self, func: Comparison);
  fn depth_func_value(&self) -> Comparison;
  fn cull_face(&mut self, face: Face);
  fn cull_face_value(&self) -> Face;
  fn front_face(&mut self, winding: FrontFace);
  fn front_face_value(&self) -> FrontFace;
}
