//! Scoped state changes.
//!
//! A [`Scoped`] guard pushes a piece of state when created and pops it when dropped, so the state
//! that was there before comes back on every exit path of the enclosing block.
//!
//! ```ignore
//! {
//!   let _blend = ScopedBlend::with_func(&ctx, BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha));
//!   let _viewport = ScopedViewport::new(&ctx, Rect::new(0, 0, 256, 256));
//!   // draw
//! } // blending and viewport restored here
//! ```

use crate::{
  context::Context,
  driver::{
    BlendFunc, BufferTarget, Capability, Comparison, Face, FramebufferTarget, FrontFace,
    PolygonMode, Rect, TextureTarget,
  },
  vao::VaoRef,
};

/// A piece of state that can be saved and restored.
pub trait ScopedSlot {
  /// Save the state and apply the new value.
  fn enter(&self, ctx: &Context);

  /// Restore what [`ScopedSlot::enter`] saved.
  fn leave(&self, ctx: &Context);
}

/// Guard restoring a piece of state when dropped.
#[must_use = "the state is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct Scoped<'a, S>
where
  S: ScopedSlot,
{
  ctx: &'a Context,
  slot: S,
}

impl<'a, S> Scoped<'a, S>
where
  S: ScopedSlot,
{
  /// Enter `slot` on `ctx`.
  pub fn enter(ctx: &'a Context, slot: S) -> Self {
    slot.enter(ctx);
    Scoped { ctx, slot }
  }

  pub fn slot(&self) -> &S {
    &self.slot
  }
}

impl<'a, S> Drop for Scoped<'a, S>
where
  S: ScopedSlot,
{
  fn drop(&mut self) {
    self.slot.leave(self.ctx);
  }
}

#[derive(Debug)]
pub struct VaoSlot(Option<VaoRef>);

impl ScopedSlot for VaoSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_vao(self.0.as_ref());
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_vao();
  }
}

pub type ScopedVao<'a> = Scoped<'a, VaoSlot>;

impl<'a> Scoped<'a, VaoSlot> {
  /// Bind `vao` (or no VAO at all) for the scope.
  pub fn new(ctx: &'a Context, vao: Option<&VaoRef>) -> Self {
    Self::enter(ctx, VaoSlot(vao.cloned()))
  }
}

#[derive(Debug)]
pub struct BufferSlot {
  target: BufferTarget,
  id: u32,
}

impl ScopedSlot for BufferSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_buffer_binding(self.target, self.id);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_buffer_binding(self.target);
  }
}

pub type ScopedBuffer<'a> = Scoped<'a, BufferSlot>;

impl<'a> Scoped<'a, BufferSlot> {
  pub fn new(ctx: &'a Context, target: BufferTarget, id: u32) -> Self {
    Self::enter(ctx, BufferSlot { target, id })
  }
}

#[derive(Debug)]
pub struct StateSlot {
  cap: Capability,
  enabled: bool,
}

impl ScopedSlot for StateSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_bool_state(self.cap, self.enabled);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_bool_state(self.cap);
  }
}

pub type ScopedState<'a> = Scoped<'a, StateSlot>;

impl<'a> Scoped<'a, StateSlot> {
  pub fn new(ctx: &'a Context, cap: Capability, enabled: bool) -> Self {
    Self::enter(ctx, StateSlot { cap, enabled })
  }
}

/// Blending toggle, with optional factors.
#[derive(Debug)]
pub struct BlendSlot {
  enabled: bool,
  func: Option<BlendFunc>,
}

impl ScopedSlot for BlendSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_bool_state(Capability::Blend, self.enabled);

    if let Some(func) = self.func {
      ctx.push_blend_func_separate(func);
    }
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_bool_state(Capability::Blend);

    if self.func.is_some() {
      ctx.pop_blend_func();
    }
  }
}

pub type ScopedBlend<'a> = Scoped<'a, BlendSlot>;

impl<'a> Scoped<'a, BlendSlot> {
  /// Enable or disable blending, leaving the factors alone.
  pub fn new(ctx: &'a Context, enabled: bool) -> Self {
    Self::enter(ctx, BlendSlot { enabled, func: None })
  }

  /// Enable blending with `func`.
  pub fn with_func(ctx: &'a Context, func: BlendFunc) -> Self {
    Self::enter(
      ctx,
      BlendSlot {
        enabled: true,
        func: Some(func),
      },
    )
  }
}

#[derive(Debug)]
pub struct ViewportSlot(Rect);

impl ScopedSlot for ViewportSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_viewport(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_viewport();
  }
}

pub type ScopedViewport<'a> = Scoped<'a, ViewportSlot>;

impl<'a> Scoped<'a, ViewportSlot> {
  pub fn new(ctx: &'a Context, rect: Rect) -> Self {
    Self::enter(ctx, ViewportSlot(rect))
  }

  /// Viewport anchored at the origin.
  pub fn with_size(ctx: &'a Context, width: i32, height: i32) -> Self {
    Self::new(ctx, Rect::new(0, 0, width, height))
  }
}

/// Scissor box; the scissor test is enabled for the scope.
#[derive(Debug)]
pub struct ScissorSlot(Rect);

impl ScopedSlot for ScissorSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_bool_state(Capability::ScissorTest, true);
    ctx.push_scissor(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_bool_state(Capability::ScissorTest);
    ctx.pop_scissor();
  }
}

pub type ScopedScissor<'a> = Scoped<'a, ScissorSlot>;

impl<'a> Scoped<'a, ScissorSlot> {
  pub fn new(ctx: &'a Context, rect: Rect) -> Self {
    Self::enter(ctx, ScissorSlot(rect))
  }
}

#[derive(Debug)]
pub struct ActiveTextureSlot(u32);

impl ScopedSlot for ActiveTextureSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_active_texture(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_active_texture();
  }
}

pub type ScopedActiveTexture<'a> = Scoped<'a, ActiveTextureSlot>;

impl<'a> Scoped<'a, ActiveTextureSlot> {
  pub fn new(ctx: &'a Context, unit: u32) -> Self {
    Self::enter(ctx, ActiveTextureSlot(unit))
  }
}

#[derive(Debug)]
pub struct TextureSlot {
  target: TextureTarget,
  id: u32,
  unit: u32,
}

impl ScopedSlot for TextureSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_texture_binding(self.target, self.id, self.unit);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_texture_binding(self.target, self.unit);
  }
}

pub type ScopedTextureBind<'a> = Scoped<'a, TextureSlot>;

impl<'a> Scoped<'a, TextureSlot> {
  /// Bind on the unit active when the guard is created.
  pub fn new(ctx: &'a Context, target: TextureTarget, id: u32) -> Self {
    let unit = ctx.active_texture();
    Self::on_unit(ctx, target, id, unit)
  }

  pub fn on_unit(ctx: &'a Context, target: TextureTarget, id: u32, unit: u32) -> Self {
    Self::enter(ctx, TextureSlot { target, id, unit })
  }
}

#[derive(Debug)]
pub struct SamplerSlot {
  unit: u32,
  id: u32,
}

impl ScopedSlot for SamplerSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_sampler_binding(self.unit, self.id);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_sampler_binding(self.unit);
  }
}

pub type ScopedSampler<'a> = Scoped<'a, SamplerSlot>;

impl<'a> Scoped<'a, SamplerSlot> {
  pub fn new(ctx: &'a Context, id: u32, unit: u32) -> Self {
    Self::enter(ctx, SamplerSlot { unit, id })
  }
}

#[derive(Debug)]
pub struct FramebufferSlot {
  target: FramebufferTarget,
  id: u32,
}

impl ScopedSlot for FramebufferSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_framebuffer(self.target, self.id);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_framebuffer(self.target);
  }
}

pub type ScopedFramebuffer<'a> = Scoped<'a, FramebufferSlot>;

impl<'a> Scoped<'a, FramebufferSlot> {
  pub fn new(ctx: &'a Context, target: FramebufferTarget, id: u32) -> Self {
    Self::enter(ctx, FramebufferSlot { target, id })
  }
}

#[derive(Debug)]
pub struct ProgramSlot(u32);

impl ScopedSlot for ProgramSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_program(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_program();
  }
}

pub type ScopedProgram<'a> = Scoped<'a, ProgramSlot>;

impl<'a> Scoped<'a, ProgramSlot> {
  pub fn new(ctx: &'a Context, program: u32) -> Self {
    Self::enter(ctx, ProgramSlot(program))
  }
}

#[derive(Debug)]
pub struct RenderbufferSlot(u32);

impl ScopedSlot for RenderbufferSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_renderbuffer(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_renderbuffer();
  }
}

pub type ScopedRenderbuffer<'a> = Scoped<'a, RenderbufferSlot>;

impl<'a> Scoped<'a, RenderbufferSlot> {
  pub fn new(ctx: &'a Context, id: u32) -> Self {
    Self::enter(ctx, RenderbufferSlot(id))
  }
}

#[derive(Debug)]
pub struct LineWidthSlot(f32);

impl ScopedSlot for LineWidthSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_line_width(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_line_width();
  }
}

pub type ScopedLineWidth<'a> = Scoped<'a, LineWidthSlot>;

impl<'a> Scoped<'a, LineWidthSlot> {
  pub fn new(ctx: &'a Context, width: f32) -> Self {
    Self::enter(ctx, LineWidthSlot(width))
  }
}

#[derive(Debug)]
pub struct DepthMaskSlot(bool);

impl ScopedSlot for DepthMaskSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_depth_mask(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_depth_mask();
  }
}

pub type ScopedDepthMask<'a> = Scoped<'a, DepthMaskSlot>;

impl<'a> Scoped<'a, DepthMaskSlot> {
  pub fn new(ctx: &'a Context, write: bool) -> Self {
    Self::enter(ctx, DepthMaskSlot(write))
  }
}

#[derive(Debug)]
pub struct DepthFuncSlot(Comparison);

impl ScopedSlot for DepthFuncSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_depth_func(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_depth_func();
  }
}

pub type ScopedDepthFunc<'a> = Scoped<'a, DepthFuncSlot>;

impl<'a> Scoped<'a, DepthFuncSlot> {
  pub fn new(ctx: &'a Context, func: Comparison) -> Self {
    Self::enter(ctx, DepthFuncSlot(func))
  }
}

/// Depth test and depth writes toggled together.
#[derive(Debug)]
pub struct DepthSlot {
  enabled: bool,
  func: Option<Comparison>,
}

impl ScopedSlot for DepthSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_bool_state(Capability::DepthTest, self.enabled);
    ctx.push_depth_mask(self.enabled);

    if let Some(func) = self.func {
      ctx.push_depth_func(func);
    }
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_bool_state(Capability::DepthTest);
    ctx.pop_depth_mask();

    if self.func.is_some() {
      ctx.pop_depth_func();
    }
  }
}

pub type ScopedDepth<'a> = Scoped<'a, DepthSlot>;

impl<'a> Scoped<'a, DepthSlot> {
  pub fn new(ctx: &'a Context, enabled: bool) -> Self {
    Self::enter(ctx, DepthSlot { enabled, func: None })
  }

  pub fn with_func(ctx: &'a Context, enabled: bool, func: Comparison) -> Self {
    Self::enter(
      ctx,
      DepthSlot {
        enabled,
        func: Some(func),
      },
    )
  }
}

/// Face culling toggle, with an optional culled face.
#[derive(Debug)]
pub struct CullFaceSlot {
  enabled: bool,
  face: Option<Face>,
}

impl ScopedSlot for CullFaceSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_bool_state(Capability::CullFace, self.enabled);

    if let Some(face) = self.face {
      ctx.push_cull_face(face);
    }
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_bool_state(Capability::CullFace);

    if self.face.is_some() {
      ctx.pop_cull_face();
    }
  }
}

pub type ScopedCullFace<'a> = Scoped<'a, CullFaceSlot>;

impl<'a> Scoped<'a, CullFaceSlot> {
  pub fn new(ctx: &'a Context, enabled: bool) -> Self {
    Self::enter(ctx, CullFaceSlot { enabled, face: None })
  }

  pub fn with_face(ctx: &'a Context, enabled: bool, face: Face) -> Self {
    Self::enter(
      ctx,
      CullFaceSlot {
        enabled,
        face: Some(face),
      },
    )
  }
}

#[derive(Debug)]
pub struct FrontFaceSlot(FrontFace);

impl ScopedSlot for FrontFaceSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_front_face(self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_front_face();
  }
}

pub type ScopedFrontFace<'a> = Scoped<'a, FrontFaceSlot>;

impl<'a> Scoped<'a, FrontFaceSlot> {
  pub fn new(ctx: &'a Context, winding: FrontFace) -> Self {
    Self::enter(ctx, FrontFaceSlot(winding))
  }
}

#[derive(Debug)]
pub struct PolygonModeSlot(PolygonMode);

impl ScopedSlot for PolygonModeSlot {
  fn enter(&self, ctx: &Context) {
    ctx.push_polygon_mode(Face::FrontAndBack, self.0);
  }

  fn leave(&self, ctx: &Context) {
    ctx.pop_polygon_mode();
  }
}

pub type ScopedPolygonMode<'a> = Scoped<'a, PolygonModeSlot>;

impl<'a> Scoped<'a, PolygonModeSlot> {
  pub fn new(ctx: &'a Context, mode: PolygonMode) -> Self {
    Self::enter(ctx, PolygonModeSlot(mode))
  }
}
