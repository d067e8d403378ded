mod common;

use common::{context, context_of_kind, context_with, Call, DEFAULT_VIEWPORT};
use glstack::{
  driver::{
    BlendFactor, BlendFunc, BufferTarget, Capabilities, Capability, Comparison, Face,
    FramebufferTarget, FrontFace, PolygonMode, Rect, TextureTarget, VaoKind,
  },
  scoped::{
    ScopedActiveTexture, ScopedBlend, ScopedBuffer, ScopedCullFace, ScopedDepth, ScopedDepthFunc,
    ScopedDepthMask, ScopedFramebuffer, ScopedFrontFace, ScopedLineWidth, ScopedPolygonMode,
    ScopedProgram, ScopedRenderbuffer, ScopedSampler, ScopedScissor, ScopedState,
    ScopedTextureBind, ScopedVao, ScopedViewport,
  },
  ContextOptions, Vao, VaoRef,
};

#[test]
fn blend_is_restored() {
  let (ctx, sim) = context();
  let func = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
  let before = sim.with(|sim| sim.blend);

  {
    let _blend = ScopedBlend::with_func(&ctx, func);
    assert!(sim.is_enabled(Capability::Blend));
    assert_eq!(sim.with(|sim| sim.blend), func);
  }

  assert!(!sim.is_enabled(Capability::Blend));
  assert_eq!(sim.with(|sim| sim.blend), before);
  assert_eq!(ctx.blend_func(), before);
}

#[test]
fn blend_without_func_leaves_factors_alone() {
  let (ctx, sim) = context();

  {
    let _blend = ScopedBlend::new(&ctx, true);
  }

  assert_eq!(sim.count(Call::BlendFunc), 0);
  assert_eq!(sim.count(Call::Enable(Capability::Blend)), 1);
  assert_eq!(sim.count(Call::Disable(Capability::Blend)), 1);
}

#[test]
fn viewport_and_scissor() {
  let (ctx, sim) = context();

  {
    let _viewport = ScopedViewport::with_size(&ctx, 256, 128);
    let _scissor = ScopedScissor::new(&ctx, Rect::new(8, 8, 16, 16));

    assert_eq!(sim.with(|sim| sim.viewport), Rect::new(0, 0, 256, 128));
    assert_eq!(sim.with(|sim| sim.scissor), Rect::new(8, 8, 16, 16));
    assert!(sim.is_enabled(Capability::ScissorTest));
  }

  assert_eq!(sim.with(|sim| sim.viewport), DEFAULT_VIEWPORT);
  assert_eq!(sim.with(|sim| sim.scissor), DEFAULT_VIEWPORT);
  assert!(!sim.is_enabled(Capability::ScissorTest));
}

#[test]
fn nested_guards_unwind_in_order() {
  let (ctx, sim) = context();

  {
    let _outer = ScopedState::new(&ctx, Capability::CullFace, true);

    {
      let _inner = ScopedState::new(&ctx, Capability::CullFace, false);
      assert!(!sim.is_enabled(Capability::CullFace));
    }

    assert!(sim.is_enabled(Capability::CullFace));
  }

  assert!(!sim.is_enabled(Capability::CullFace));
}

#[test]
fn state_is_restored_on_early_return() {
  let (ctx, sim) = context();

  let draw = |fail: bool| -> Result<(), ()> {
    let _program = ScopedProgram::new(&ctx, 12);
    let _depth = ScopedDepth::with_func(&ctx, true, Comparison::LessOrEqual);

    if fail {
      return Err(());
    }

    Ok(())
  };

  assert_eq!(draw(true), Err(()));
  assert_eq!(sim.with(|sim| sim.program), 0);
  assert!(!sim.is_enabled(Capability::DepthTest));
  assert_eq!(sim.with(|sim| sim.depth_func), Comparison::Less);
  assert!(sim.with(|sim| sim.depth_mask));

  assert_eq!(draw(false), Ok(()));
  assert_eq!(ctx.program(), 0);
}

#[test]
fn depth_guard_writes_only_when_testing() {
  let (ctx, sim) = context();

  {
    let _depth = ScopedDepth::new(&ctx, false);
    assert!(!sim.with(|sim| sim.depth_mask));
    assert_eq!(sim.count(Call::DepthFunc), 0);
  }

  assert!(sim.with(|sim| sim.depth_mask));
}

#[test]
fn buffer_texture_and_framebuffer_bindings() {
  let (ctx, sim) = context();

  {
    let _buffer = ScopedBuffer::new(&ctx, BufferTarget::Uniform, 3);
    let _texture = ScopedTextureBind::on_unit(&ctx, TextureTarget::Texture2D, 4, 2);
    let _framebuffer = ScopedFramebuffer::new(&ctx, FramebufferTarget::Draw, 5);
    let _renderbuffer = ScopedRenderbuffer::new(&ctx, 6);
    let _sampler = ScopedSampler::new(&ctx, 7, 2);

    assert_eq!(sim.buffer(BufferTarget::Uniform), 3);
    assert_eq!(sim.texture(2, TextureTarget::Texture2D), 4);
    assert_eq!(sim.with(|sim| sim.draw_framebuffer), 5);
    assert_eq!(sim.with(|sim| sim.renderbuffer), 6);
    assert_eq!(sim.with(|sim| sim.samplers.get(&2).copied()), Some(7));
  }

  assert_eq!(sim.buffer(BufferTarget::Uniform), 0);
  assert_eq!(sim.texture(2, TextureTarget::Texture2D), 0);
  assert_eq!(sim.with(|sim| sim.draw_framebuffer), 0);
  assert_eq!(sim.with(|sim| sim.renderbuffer), 0);
  assert_eq!(sim.with(|sim| sim.samplers.get(&2).copied()), Some(0));
  assert_eq!(sim.active_unit(), 0);
}

#[test]
fn texture_bind_uses_the_active_unit() {
  let (ctx, sim) = context();

  {
    let _unit = ScopedActiveTexture::new(&ctx, 3);
    let _texture = ScopedTextureBind::new(&ctx, TextureTarget::CubeMap, 9);

    assert_eq!(sim.active_unit(), 3);
    assert_eq!(sim.texture(3, TextureTarget::CubeMap), 9);
  }

  assert_eq!(sim.active_unit(), 0);
  assert_eq!(sim.texture(3, TextureTarget::CubeMap), 0);
}

#[test]
fn fixed_function_guards() {
  let (ctx, sim) = context();

  {
    let _line = ScopedLineWidth::new(&ctx, 3.);
    let _mask = ScopedDepthMask::new(&ctx, false);
    let _func = ScopedDepthFunc::new(&ctx, Comparison::Always);
    let _cull = ScopedCullFace::with_face(&ctx, true, Face::Front);
    let _winding = ScopedFrontFace::new(&ctx, FrontFace::Cw);
    let _polygon = ScopedPolygonMode::new(&ctx, PolygonMode::Line);

    sim.with(|sim| {
      assert_eq!(sim.line_width, 3.);
      assert!(!sim.depth_mask);
      assert_eq!(sim.depth_func, Comparison::Always);
      assert_eq!(sim.cull_face, Face::Front);
      assert_eq!(sim.front_face, FrontFace::Cw);
      assert_eq!(sim.polygon_mode, PolygonMode::Line);
    });
    assert!(sim.is_enabled(Capability::CullFace));
  }

  sim.with(|sim| {
    assert_eq!(sim.line_width, 1.);
    assert!(sim.depth_mask);
    assert_eq!(sim.depth_func, Comparison::Less);
    assert_eq!(sim.cull_face, Face::Back);
    assert_eq!(sim.front_face, FrontFace::Ccw);
    assert_eq!(sim.polygon_mode, PolygonMode::Fill);
  });
  assert!(!sim.is_enabled(Capability::CullFace));
}

#[test]
fn polygon_mode_guard_without_support() {
  let caps = Capabilities {
    polygon_mode: false,
    ..Capabilities::default()
  };
  let (ctx, sim) = context_with(caps, ContextOptions::default());

  {
    let _polygon = ScopedPolygonMode::new(&ctx, PolygonMode::Line);
  }

  assert_eq!(sim.count(Call::PolygonMode), 0);
  assert_eq!(ctx.polygon_mode(), PolygonMode::Fill);
}

#[test]
fn vao_guard() {
  let (ctx, sim) = context_of_kind(VaoKind::Core);
  let outer = Vao::new(&ctx).expect("vertex array");
  let inner = Vao::new(&ctx).expect("vertex array");
  outer.bind(&ctx);

  {
    let _vao = ScopedVao::new(&ctx, Some(&inner));
    assert_eq!(sim.vao(), inner.id());
    assert!(ctx.vao().map_or(false, |vao| VaoRef::ptr_eq(&vao, &inner)));
  }

  assert_eq!(sim.vao(), outer.id());
  assert!(ctx.vao().map_or(false, |vao| VaoRef::ptr_eq(&vao, &outer)));
}
