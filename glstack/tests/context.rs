mod common;

use common::{
  context, context_of_kind, context_with, Call, SimDriver, ALL_KINDS, DEFAULT_VIEWPORT,
};
use glstack::{
  driver::{
    BlendFactor, BlendFunc, BufferTarget, BufferUsage, Capabilities, Comparison, Face, PolygonMode,
    Rect,
  },
  BufferObj, Context, ContextOptions, Program, StateError, Vao,
};

#[test]
fn no_native_context() {
  let (driver, sim) = SimDriver::new(Capabilities::default());
  sim.with(|sim| sim.version = None);

  let err = Context::new(driver).err();
  assert_eq!(err, Some(StateError::Unavailable));
}

#[test]
fn contexts_have_distinct_ids() {
  let (a, _) = context();
  let (b, _) = context();

  assert_ne!(a.id(), b.id());
  assert_eq!(a.clone().id(), a.id());
}

#[test]
fn clones_share_the_cache() {
  let (ctx, sim) = context();
  let other = ctx.clone();

  ctx.bind_program(4);
  other.bind_program(4);

  assert_eq!(sim.count(Call::UseProgram), 1);
  assert_eq!(other.program(), 4);
}

#[test]
fn viewport_is_queried_once() {
  let (ctx, sim) = context();

  assert_eq!(ctx.viewport(), DEFAULT_VIEWPORT);
  assert_eq!(ctx.viewport(), DEFAULT_VIEWPORT);
  assert_eq!(sim.count(Call::Query), 1);

  ctx.push_viewport(Rect::new(0, 0, 32, 32));
  ctx.push_viewport(Rect::new(0, 0, 32, 32));
  assert_eq!(sim.count(Call::Viewport), 1);

  ctx.pop_viewport();
  ctx.pop_viewport();
  assert_eq!(sim.count(Call::Viewport), 2);
  assert_eq!(sim.with(|sim| sim.viewport), DEFAULT_VIEWPORT);
}

#[test]
fn set_viewport_overwrites_the_top() {
  let (ctx, sim) = context();

  ctx.push_viewport(Rect::new(0, 0, 10, 10));
  ctx.set_viewport(Rect::new(0, 0, 20, 20));
  ctx.pop_viewport();

  assert_eq!(sim.with(|sim| sim.viewport), DEFAULT_VIEWPORT);
  assert_eq!(ctx.viewport(), DEFAULT_VIEWPORT);
}

#[test]
fn blend_func_push_pop() {
  let (ctx, sim) = context();
  let before = ctx.blend_func();

  ctx.push_blend_func(BlendFactor::One, BlendFactor::One);
  assert_eq!(
    sim.with(|sim| sim.blend),
    BlendFunc::new(BlendFactor::One, BlendFactor::One)
  );

  ctx.push_blend_func_current();
  ctx.pop_blend_func();
  assert_eq!(sim.count(Call::BlendFunc), 1);

  ctx.pop_blend_func();
  assert_eq!(sim.with(|sim| sim.blend), before);

  ctx.set_blend_func_separate(BlendFunc::separate(
    BlendFactor::SrcAlpha,
    BlendFactor::OneMinusSrcAlpha,
    BlendFactor::One,
    BlendFactor::Zero,
  ));
  assert_eq!(ctx.blend_func().src_alpha, BlendFactor::One);
}

#[test]
fn depth_and_culling_state() {
  let (ctx, sim) = context();

  ctx.push_depth_func(Comparison::Greater);
  ctx.push_cull_face(Face::Front);
  ctx.set_depth_mask(false);
  ctx.set_depth_mask(false);

  sim.with(|sim| {
    assert_eq!(sim.depth_func, Comparison::Greater);
    assert_eq!(sim.cull_face, Face::Front);
    assert!(!sim.depth_mask);
  });
  assert_eq!(sim.count(Call::DepthMask), 1);

  ctx.pop_cull_face();
  ctx.pop_depth_func();
  assert_eq!(ctx.depth_func(), Comparison::Less);
  assert_eq!(ctx.cull_face(), Face::Back);
}

#[test]
fn line_width() {
  let (ctx, sim) = context();

  ctx.set_line_width(2.5);
  ctx.set_line_width(2.5);
  assert_eq!(sim.count(Call::LineWidth), 1);
  assert_eq!(ctx.line_width(), 2.5);
}

#[test]
fn polygon_mode() {
  let (ctx, sim) = context();
  assert_eq!(ctx.polygon_mode(), PolygonMode::Fill);

  ctx.push_polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  assert_eq!(sim.with(|sim| sim.polygon_mode), PolygonMode::Line);

  ctx.pop_polygon_mode();
  assert_eq!(sim.with(|sim| sim.polygon_mode), PolygonMode::Fill);

  // single faces can't be set; both are
  ctx.set_polygon_mode(Face::Front, PolygonMode::Point);
  assert_eq!(ctx.polygon_mode(), PolygonMode::Point);
  assert_eq!(sim.count(Call::PolygonMode), 3);
}

#[test]
fn polygon_mode_without_support() {
  let caps = Capabilities {
    polygon_mode: false,
    ..Capabilities::default()
  };
  let (ctx, sim) = context_with(caps, ContextOptions::default());

  ctx.set_polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  ctx.push_polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  ctx.pop_polygon_mode();

  assert_eq!(sim.native_calls(), 0);
  assert_eq!(ctx.polygon_mode(), PolygonMode::Fill);
}

#[test]
fn unseeded_polygon_mode_assumes_fill() {
  let (ctx, sim) = context_with(
    Capabilities::default(),
    ContextOptions::default().set_seed_defaults(false),
  );

  assert_eq!(ctx.polygon_mode(), PolygonMode::Fill);
  assert_eq!(sim.count(Call::Query), 0);
}

#[test]
fn scalar_underflow_heals_by_querying() {
  let (ctx, sim) = context();
  sim.with(|sim| sim.viewport = Rect::new(1, 2, 3, 4));

  ctx.pop_viewport();

  assert_eq!(sim.native_calls(), 0);
  assert_eq!(ctx.viewport(), Rect::new(1, 2, 3, 4));
  assert_eq!(sim.count(Call::Query), 1);
}

#[test]
fn deleting_the_program_in_use_keeps_it_bound() {
  let (ctx, sim) = context();
  let program = Program::new(&ctx).expect("program");
  let id = program.id();

  program.bind();
  drop(program);

  assert_eq!(sim.count(Call::DeleteProgram), 1);
  assert_eq!(ctx.program(), id);
  assert!(ctx.sanity_check().is_clean());
}

#[test]
fn current_context() {
  Context::clear_current();
  assert!(Context::current().is_none());

  let (ctx, _) = context();
  ctx.make_current();
  assert_eq!(Context::current().map(|current| current.id()), Some(ctx.id()));

  Context::clear_current();
  assert!(Context::current().is_none());

  // the slot doesn't keep contexts alive
  ctx.make_current();
  drop(ctx);
  assert!(Context::current().is_none());
}

#[test]
fn deactivated_contexts_skip_native_deletion() {
  let (ctx, sim) = context();
  let buffer =
    BufferObj::new(&ctx, BufferTarget::Array, BufferUsage::StaticDraw).expect("buffer");
  let vao = Vao::new(&ctx).expect("vertex array");
  buffer.bind();

  ctx.deactivate();
  assert!(!ctx.is_active());

  drop(buffer);
  drop(vao);

  assert_eq!(sim.count(Call::DeleteBuffer), 0);
  assert_eq!(sim.count(Call::DeleteVertexArray), 0);
  assert_eq!(ctx.buffer_binding(BufferTarget::Array), 0);
}

#[test]
fn dropping_a_bound_vao_after_deactivation_stays_off_the_driver() {
  for kind in ALL_KINDS {
    let (ctx, sim) = context_of_kind(kind);
    let vao = Vao::new(&ctx).expect("vertex array");
    vao.bind(&ctx);
    ctx.enable_vertex_attrib_array(0);

    ctx.deactivate();
    sim.clear_log();
    drop(vao);

    assert!(sim.log().is_empty(), "{}: {:?}", kind, sim.log());
    assert!(ctx.vao().is_none());
  }
}

#[test]
fn resources_outliving_their_context() {
  let (ctx, sim) = context();
  let buffer =
    BufferObj::new(&ctx, BufferTarget::Array, BufferUsage::StaticDraw).expect("buffer");

  drop(ctx);
  drop(buffer);

  assert_eq!(sim.count(Call::DeleteBuffer), 1);
}

#[test]
fn print_state() {
  let (ctx, _) = context();
  ctx.bind_buffer(BufferTarget::Array, 5);

  assert_eq!(
    ctx.print_state(),
    "{ARRAY_BUFFER:5, ELEMENT_ARRAY_BUFFER:0, VERTEX_ARRAY_BINDING:0}"
  );
}

#[test]
fn capabilities_come_from_the_driver() {
  let caps = Capabilities {
    samplers: false,
    ..Capabilities::default()
  };
  let (ctx, _) = context_with(caps, ContextOptions::default());

  assert_eq!(ctx.capabilities(), caps);
  assert_eq!(ctx.vao_kind(), caps.vao);
}
