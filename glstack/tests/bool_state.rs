mod common;

use common::{context, context_with, Call};
use glstack::{
  driver::{Capabilities, Capability},
  ContextOptions,
};

#[test]
fn depth_test_push_pop() {
  let (ctx, sim) = context();

  // seeded: depth test starts disabled
  assert!(!ctx.bool_state(Capability::DepthTest));
  assert_eq!(sim.count(Call::Query), 0);

  ctx.push_bool_state(Capability::DepthTest, true);
  assert!(sim.is_enabled(Capability::DepthTest));
  assert_eq!(sim.count(Call::Enable(Capability::DepthTest)), 1);

  ctx.push_bool_state(Capability::DepthTest, true);
  assert_eq!(sim.count(Call::Enable(Capability::DepthTest)), 1);

  ctx.pop_bool_state(Capability::DepthTest);
  assert_eq!(sim.native_calls(), 1);

  ctx.pop_bool_state(Capability::DepthTest);
  assert!(!sim.is_enabled(Capability::DepthTest));
  assert_eq!(sim.count(Call::Disable(Capability::DepthTest)), 1);
  assert!(!ctx.bool_state(Capability::DepthTest));
}

#[test]
fn unknown_state_is_queried_once() {
  let (ctx, sim) = context();
  sim.with(|sim| {
    sim.enabled.insert(Capability::Blend, true);
  });

  assert!(ctx.bool_state(Capability::Blend));
  assert!(ctx.bool_state(Capability::Blend));
  assert_eq!(sim.count(Call::Query), 1);

  // the queried value sits below the pushed one
  ctx.push_bool_state(Capability::Blend, false);
  ctx.pop_bool_state(Capability::Blend);
  assert!(sim.is_enabled(Capability::Blend));
  assert!(ctx.bool_state(Capability::Blend));
}

#[test]
fn push_on_unknown_state_restores_the_driver_value() {
  let (ctx, sim) = context();

  ctx.push_bool_state(Capability::StencilTest, true);
  assert_eq!(sim.count(Call::Query), 1);
  assert!(sim.is_enabled(Capability::StencilTest));

  ctx.pop_bool_state(Capability::StencilTest);
  assert!(!sim.is_enabled(Capability::StencilTest));
  assert!(!ctx.bool_state(Capability::StencilTest));
}

#[test]
fn redundant_sets_are_elided() {
  let (ctx, sim) = context();

  ctx.enable(Capability::CullFace);
  ctx.enable(Capability::CullFace);
  ctx.set_bool_state(Capability::CullFace, true);
  assert_eq!(sim.count(Call::Enable(Capability::CullFace)), 1);

  ctx.disable(Capability::CullFace);
  ctx.disable(Capability::CullFace);
  assert_eq!(sim.count(Call::Disable(Capability::CullFace)), 1);
}

#[test]
fn push_current_then_pop_changes_nothing() {
  let (ctx, sim) = context();
  ctx.enable(Capability::ScissorTest);
  sim.clear_log();

  ctx.push_bool_state_current(Capability::ScissorTest);
  ctx.pop_bool_state(Capability::ScissorTest);

  assert_eq!(sim.native_calls(), 0);
  assert!(ctx.bool_state(Capability::ScissorTest));
}

#[test]
fn custom_setter() {
  let (ctx, sim) = context();
  let mut calls = 0;

  ctx.set_bool_state_with(Capability::Custom(0x8861), true, |driver, enabled| {
    calls += 1;
    assert!(enabled);
    driver.enable(Capability::Custom(0x8861));
  });
  ctx.set_bool_state_with(Capability::Custom(0x8861), true, |_, _| calls += 1);

  assert_eq!(calls, 1);
  assert!(sim.is_enabled(Capability::Custom(0x8861)));
}

#[test]
fn underflow_heals_by_querying() {
  let (ctx, sim) = context_with(
    Capabilities::default(),
    ContextOptions::default().set_seed_defaults(false),
  );
  sim.with(|sim| {
    sim.enabled.insert(Capability::DepthTest, true);
  });

  ctx.pop_bool_state(Capability::DepthTest);
  assert!(ctx.bool_state(Capability::DepthTest));
  assert_eq!(sim.native_calls(), 0);
}
