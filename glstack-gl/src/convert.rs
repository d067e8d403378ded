//! Typed enums to `GLenum` and back.

use gl::types::*;
use glstack::driver::{
  AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, Comparison, Face,
  FramebufferTarget, FrontFace, IncompleteReason, MapAccess, PolygonMode, TextureTarget,
};

pub(crate) fn buffer_target(target: BufferTarget) -> GLenum {
  match target {
    BufferTarget::Array => gl::ARRAY_BUFFER,
    BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    BufferTarget::Uniform => gl::UNIFORM_BUFFER,
    BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
    BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
    BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
    BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
    BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
    BufferTarget::DrawIndirect => gl::DRAW_INDIRECT_BUFFER,
    BufferTarget::ShaderStorage => gl::SHADER_STORAGE_BUFFER,
  }
}

/// Query name of the binding of a buffer target.
pub(crate) fn buffer_binding(target: BufferTarget) -> GLenum {
  match target {
    BufferTarget::Array => gl::ARRAY_BUFFER_BINDING,
    BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER_BINDING,
    BufferTarget::Uniform => gl::UNIFORM_BUFFER_BINDING,
    BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER_BINDING,
    BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER_BINDING,
    BufferTarget::CopyRead => gl::COPY_READ_BUFFER_BINDING,
    BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER_BINDING,
    BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER_BINDING,
    BufferTarget::DrawIndirect => gl::DRAW_INDIRECT_BUFFER_BINDING,
    BufferTarget::ShaderStorage => gl::SHADER_STORAGE_BUFFER_BINDING,
  }
}

pub(crate) fn texture_target(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture1D => gl::TEXTURE_1D,
    TextureTarget::Texture2D => gl::TEXTURE_2D,
    TextureTarget::Texture3D => gl::TEXTURE_3D,
    TextureTarget::Texture1DArray => gl::TEXTURE_1D_ARRAY,
    TextureTarget::Texture2DArray => gl::TEXTURE_2D_ARRAY,
    TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
    TextureTarget::CubeMapArray => gl::TEXTURE_CUBE_MAP_ARRAY,
    TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
    TextureTarget::Buffer => gl::TEXTURE_BUFFER,
    TextureTarget::Texture2DMultisample => gl::TEXTURE_2D_MULTISAMPLE,
  }
}

pub(crate) fn texture_binding(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture1D => gl::TEXTURE_BINDING_1D,
    TextureTarget::Texture2D => gl::TEXTURE_BINDING_2D,
    TextureTarget::Texture3D => gl::TEXTURE_BINDING_3D,
    TextureTarget::Texture1DArray => gl::TEXTURE_BINDING_1D_ARRAY,
    TextureTarget::Texture2DArray => gl::TEXTURE_BINDING_2D_ARRAY,
    TextureTarget::CubeMap => gl::TEXTURE_BINDING_CUBE_MAP,
    TextureTarget::CubeMapArray => gl::TEXTURE_BINDING_CUBE_MAP_ARRAY,
    TextureTarget::Rectangle => gl::TEXTURE_BINDING_RECTANGLE,
    TextureTarget::Buffer => gl::TEXTURE_BINDING_BUFFER,
    TextureTarget::Texture2DMultisample => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
  }
}

pub(crate) fn framebuffer_target(target: FramebufferTarget) -> GLenum {
  match target {
    FramebufferTarget::Framebuffer => gl::FRAMEBUFFER,
    FramebufferTarget::Read => gl::READ_FRAMEBUFFER,
    FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
  }
}

// GL_FRAMEBUFFER_BINDING is an alias of the draw binding
pub(crate) fn framebuffer_binding(target: FramebufferTarget) -> GLenum {
  match target {
    FramebufferTarget::Framebuffer | FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER_BINDING,
    FramebufferTarget::Read => gl::READ_FRAMEBUFFER_BINDING,
  }
}

pub(crate) fn capability(cap: Capability) -> GLenum {
  match cap {
    Capability::Blend => gl::BLEND,
    Capability::CullFace => gl::CULL_FACE,
    Capability::DepthTest => gl::DEPTH_TEST,
    Capability::ScissorTest => gl::SCISSOR_TEST,
    Capability::StencilTest => gl::STENCIL_TEST,
    Capability::PolygonOffsetFill => gl::POLYGON_OFFSET_FILL,
    Capability::Multisample => gl::MULTISAMPLE,
    Capability::SampleAlphaToCoverage => gl::SAMPLE_ALPHA_TO_COVERAGE,
    Capability::PrimitiveRestart => gl::PRIMITIVE_RESTART,
    Capability::RasterizerDiscard => gl::RASTERIZER_DISCARD,
    Capability::FramebufferSrgb => gl::FRAMEBUFFER_SRGB,
    Capability::ProgramPointSize => gl::PROGRAM_POINT_SIZE,
    Capability::DepthClamp => gl::DEPTH_CLAMP,
    Capability::Custom(cap) => cap,
  }
}

pub(crate) fn blend_factor(factor: BlendFactor) -> GLenum {
  match factor {
    BlendFactor::Zero => gl::ZERO,
    BlendFactor::One => gl::ONE,
    BlendFactor::SrcColor => gl::SRC_COLOR,
    BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
    BlendFactor::DstColor => gl::DST_COLOR,
    BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
    BlendFactor::SrcAlpha => gl::SRC_ALPHA,
    BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
    BlendFactor::DstAlpha => gl::DST_ALPHA,
    BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
    BlendFactor::ConstantColor => gl::CONSTANT_COLOR,
    BlendFactor::OneMinusConstantColor => gl::ONE_MINUS_CONSTANT_COLOR,
    BlendFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
    BlendFactor::OneMinusConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
    BlendFactor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
  }
}

pub(crate) fn from_blend_factor(factor: GLenum) -> Option<BlendFactor> {
  match factor {
    gl::ZERO => Some(BlendFactor::Zero),
    gl::ONE => Some(BlendFactor::One),
    gl::SRC_COLOR => Some(BlendFactor::SrcColor),
    gl::ONE_MINUS_SRC_COLOR => Some(BlendFactor::OneMinusSrcColor),
    gl::DST_COLOR => Some(BlendFactor::DstColor),
    gl::ONE_MINUS_DST_COLOR => Some(BlendFactor::OneMinusDstColor),
    gl::SRC_ALPHA => Some(BlendFactor::SrcAlpha),
    gl::ONE_MINUS_SRC_ALPHA => Some(BlendFactor::OneMinusSrcAlpha),
    gl::DST_ALPHA => Some(BlendFactor::DstAlpha),
    gl::ONE_MINUS_DST_ALPHA => Some(BlendFactor::OneMinusDstAlpha),
    gl::CONSTANT_COLOR => Some(BlendFactor::ConstantColor),
    gl::ONE_MINUS_CONSTANT_COLOR => Some(BlendFactor::OneMinusConstantColor),
    gl::CONSTANT_ALPHA => Some(BlendFactor::ConstantAlpha),
    gl::ONE_MINUS_CONSTANT_ALPHA => Some(BlendFactor::OneMinusConstantAlpha),
    gl::SRC_ALPHA_SATURATE => Some(BlendFactor::SrcAlphaSaturate),
    _ => None,
  }
}

pub(crate) fn comparison(func: Comparison) -> GLenum {
  match func {
    Comparison::Never => gl::NEVER,
    Comparison::Always => gl::ALWAYS,
    Comparison::Equal => gl::EQUAL,
    Comparison::NotEqual => gl::NOTEQUAL,
    Comparison::Less => gl::LESS,
    Comparison::LessOrEqual => gl::LEQUAL,
    Comparison::Greater => gl::GREATER,
    Comparison::GreaterOrEqual => gl::GEQUAL,
  }
}

pub(crate) fn from_comparison(func: GLenum) -> Option<Comparison> {
  match func {
    gl::NEVER => Some(Comparison::Never),
    gl::ALWAYS => Some(Comparison::Always),
    gl::EQUAL => Some(Comparison::Equal),
    gl::NOTEQUAL => Some(Comparison::NotEqual),
    gl::LESS => Some(Comparison::Less),
    gl::LEQUAL => Some(Comparison::LessOrEqual),
    gl::GREATER => Some(Comparison::Greater),
    gl::GEQUAL => Some(Comparison::GreaterOrEqual),
    _ => None,
  }
}

pub(crate) fn face(face: Face) -> GLenum {
  match face {
    Face::Front => gl::FRONT,
    Face::Back => gl::BACK,
    Face::FrontAndBack => gl::FRONT_AND_BACK,
  }
}

pub(crate) fn from_face(face: GLenum) -> Option<Face> {
  match face {
    gl::FRONT => Some(Face::Front),
    gl::BACK => Some(Face::Back),
    gl::FRONT_AND_BACK => Some(Face::FrontAndBack),
    _ => None,
  }
}

pub(crate) fn front_face(winding: FrontFace) -> GLenum {
  match winding {
    FrontFace::Cw => gl::CW,
    FrontFace::Ccw => gl::CCW,
  }
}

pub(crate) fn from_front_face(winding: GLenum) -> Option<FrontFace> {
  match winding {
    gl::CW => Some(FrontFace::Cw),
    gl::CCW => Some(FrontFace::Ccw),
    _ => None,
  }
}

pub(crate) fn polygon_mode(mode: PolygonMode) -> GLenum {
  match mode {
    PolygonMode::Point => gl::POINT,
    PolygonMode::Line => gl::LINE,
    PolygonMode::Fill => gl::FILL,
  }
}

pub(crate) fn attrib_type(ty: AttribType) -> GLenum {
  match ty {
    AttribType::Byte => gl::BYTE,
    AttribType::UnsignedByte => gl::UNSIGNED_BYTE,
    AttribType::Short => gl::SHORT,
    AttribType::UnsignedShort => gl::UNSIGNED_SHORT,
    AttribType::Int => gl::INT,
    AttribType::UnsignedInt => gl::UNSIGNED_INT,
    AttribType::HalfFloat => gl::HALF_FLOAT,
    AttribType::Float => gl::FLOAT,
    AttribType::Double => gl::DOUBLE,
    AttribType::Fixed => gl::FIXED,
  }
}

pub(crate) fn from_attrib_type(ty: GLenum) -> Option<AttribType> {
  match ty {
    gl::BYTE => Some(AttribType::Byte),
    gl::UNSIGNED_BYTE => Some(AttribType::UnsignedByte),
    gl::SHORT => Some(AttribType::Short),
    gl::UNSIGNED_SHORT => Some(AttribType::UnsignedShort),
    gl::INT => Some(AttribType::Int),
    gl::UNSIGNED_INT => Some(AttribType::UnsignedInt),
    gl::HALF_FLOAT => Some(AttribType::HalfFloat),
    gl::FLOAT => Some(AttribType::Float),
    gl::DOUBLE => Some(AttribType::Double),
    gl::FIXED => Some(AttribType::Fixed),
    _ => None,
  }
}

pub(crate) fn buffer_usage(usage: BufferUsage) -> GLenum {
  match usage {
    BufferUsage::StreamDraw => gl::STREAM_DRAW,
    BufferUsage::StreamRead => gl::STREAM_READ,
    BufferUsage::StreamCopy => gl::STREAM_COPY,
    BufferUsage::StaticDraw => gl::STATIC_DRAW,
    BufferUsage::StaticRead => gl::STATIC_READ,
    BufferUsage::StaticCopy => gl::STATIC_COPY,
    BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
    BufferUsage::DynamicRead => gl::DYNAMIC_READ,
    BufferUsage::DynamicCopy => gl::DYNAMIC_COPY,
  }
}

pub(crate) fn map_access(access: MapAccess) -> GLbitfield {
  match access {
    MapAccess::ReadOnly => gl::MAP_READ_BIT,
    MapAccess::WriteOnly => gl::MAP_WRITE_BIT,
    MapAccess::ReadWrite => gl::MAP_READ_BIT | gl::MAP_WRITE_BIT,
  }
}

/// `Ok` for a complete framebuffer.
pub(crate) fn framebuffer_status(status: GLenum) -> Result<(), IncompleteReason> {
  match status {
    gl::FRAMEBUFFER_COMPLETE => Ok(()),
    gl::FRAMEBUFFER_UNDEFINED => Err(IncompleteReason::Undefined),
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Err(IncompleteReason::IncompleteAttachment),
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Err(IncompleteReason::MissingAttachment),
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => Err(IncompleteReason::IncompleteDrawBuffer),
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => Err(IncompleteReason::IncompleteReadBuffer),
    gl::FRAMEBUFFER_UNSUPPORTED => Err(IncompleteReason::Unsupported),
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => Err(IncompleteReason::IncompleteMultisample),
    gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => Err(IncompleteReason::IncompleteLayerTargets),
    _ => Err(IncompleteReason::Unknown(status)),
  }
}
