//! Single-valued state: one stack per piece of state, no key.
//!
//! Every slot is described by a marker type implementing [`ScalarSlot`], which tells where its stack
//! lives and how to set and query it natively. The set / push / pop logic is shared.

use std::fmt;

use crate::{
  driver::{BlendFunc, Comparison, Driver, Face, FrontFace, PolygonMode, Rect},
  stack::{BindingStack, Popped},
  state::State,
};

pub(crate) trait ScalarSlot {
  type Value: Clone + PartialEq + fmt::Debug;

  const NAME: &'static str;

  fn parts(state: &mut State) -> (&mut BindingStack<Self::Value>, &mut dyn Driver);

  fn apply(driver: &mut dyn Driver, value: &Self::Value);

  fn query(driver: &dyn Driver) -> Self::Value;
}

macro_rules! scalar_slot {
  ($(#[$attr:meta])* $slot:ident, $value:ty, $field:ident, $name:literal,
   apply: |$d:ident, $v:ident| $apply:expr, query: |$q:ident| $query:expr) => {
    $(#[$attr])*
    #[derive(Debug)]
    pub(crate) struct $slot;

    impl ScalarSlot for $slot {
      type Value = $value;

      const NAME: &'static str = $name;

      fn parts(state: &mut State) -> (&mut BindingStack<Self::Value>, &mut dyn Driver) {
        (&mut state.$field, &mut *state.driver)
      }

      fn apply($d: &mut dyn Driver, $v: &Self::Value) {
        $apply
      }

      fn query($q: &dyn Driver) -> Self::Value {
        $query
      }
    }
  };
}

scalar_slot!(
  /// Active texture unit.
  ActiveTexture, u32, active_texture, "active texture",
  apply: |driver, unit| driver.active_texture(*unit),
  query: |driver| driver.active_texture_unit()
);

scalar_slot!(
  /// Program in use.
  Program, u32, program, "program",
  apply: |driver, id| driver.use_program(*id),
  query: |driver| driver.current_program()
);

scalar_slot!(
  Viewport, Rect, viewport, "viewport",
  apply: |driver, rect| driver.viewport(*rect),
  query: |driver| driver.viewport_rect()
);

scalar_slot!(
  Scissor, Rect, scissor, "scissor",
  apply: |driver, rect| driver.scissor(*rect),
  query: |driver| driver.scissor_rect()
);

scalar_slot!(
  Blend, BlendFunc, blend_func, "blend function",
  apply: |driver, func| driver.blend_func_separate(*func),
  query: |driver| driver.blend_func()
);

scalar_slot!(
  LineWidth, f32, line_width, "line width",
  apply: |driver, width| driver.line_width(*width),
  query: |driver| driver.line_width_value()
);

scalar_slot!(
  /// Polygon mode of both faces; the driver can't report it.
  Polygon, PolygonMode, polygon_mode, "polygon mode",
  apply: |driver, mode| driver.polygon_mode(Face::FrontAndBack, *mode),
  query: |_driver| {
    warn!("polygon mode cannot be queried; assuming fill");
    PolygonMode::Fill
  }
);

scalar_slot!(
  DepthMask, bool, depth_mask, "depth mask",
  apply: |driver, enabled| driver.depth_mask(*enabled),
  query: |driver| driver.depth_mask_value()
);

scalar_slot!(
  DepthFunc, Comparison, depth_func, "depth function",
  apply: |driver, func| driver.depth_func(*func),
  query: |driver| driver.depth_func_value()
);

scalar_slot!(
  CullFace, Face, cull_face, "cull face",
  apply: |driver, face| driver.cull_face(*face),
  query: |driver| driver.cull_face_value()
);

scalar_slot!(
  Winding, FrontFace, front_face, "front face",
  apply: |driver, winding| driver.front_face(*winding),
  query: |driver| driver.front_face_value()
);

scalar_slot!(
  /// Renderbuffer bound to the renderbuffer target.
  Renderbuffer, u32, renderbuffer, "renderbuffer",
  apply: |driver, id| driver.bind_renderbuffer(*id),
  query: |driver| driver.renderbuffer_binding()
);

impl State {
  pub(crate) fn scalar<S: ScalarSlot>(&mut self) -> S::Value {
    let (stack, driver) = S::parts(self);
    stack.get_or_query(|| S::query(driver))
  }

  pub(crate) fn set_scalar<S: ScalarSlot>(&mut self, value: S::Value) {
    let (stack, driver) = S::parts(self);

    if stack.set(value.clone()) {
      trace!("setting {} to {:?}", S::NAME, value);
      S::apply(driver, &value);
    }
  }

  pub(crate) fn push_scalar<S: ScalarSlot>(&mut self, value: S::Value) {
    self.scalar::<S>();
    let (stack, driver) = S::parts(self);

    if stack.push(value.clone()) {
      trace!("pushing {} = {:?}", S::NAME, value);
      S::apply(driver, &value);
    }
  }

  pub(crate) fn push_scalar_current<S: ScalarSlot>(&mut self) {
    self.scalar::<S>();
    S::parts(self).0.push_top();
  }

  pub(crate) fn pop_scalar<S: ScalarSlot>(&mut self) {
    let (stack, driver) = S::parts(self);

    match stack.pop() {
      Popped::Restore(value) => {
        trace!("restoring {} to {:?}", S::NAME, value);
        S::apply(driver, &value);
      }

      Popped::Underflow => {
        error!("{} stack underflow", S::NAME);
        self.scalar::<S>();
      }

      _ => (),
    }
  }
}
