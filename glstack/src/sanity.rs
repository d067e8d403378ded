//! Consistency check of the cache against the driver.

use std::fmt;

use crate::{
  driver::{AttribQuery, BufferTarget},
  state::State,
  vao::VertexAttrib,
};

/// Number of attribute slots checked.
const CHECKED_ATTRIBS: u32 = 8;

/// One disagreement between the cache and the driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
  pub what: String,
  pub cached: String,
  pub actual: String,
}

impl fmt::Display for Mismatch {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{}: cached {}, driver has {}",
      self.what, self.cached, self.actual
    )
  }
}

/// Result of [`Context::sanity_check`](crate::context::Context::sanity_check).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SanityReport {
  pub mismatches: Vec<Mismatch>,
}

impl SanityReport {
  pub fn is_clean(&self) -> bool {
    self.mismatches.is_empty()
  }

  fn check<T>(&mut self, what: impl Into<String>, cached: T, actual: T)
  where
    T: fmt::Debug + PartialEq,
  {
    if cached != actual {
      let mismatch = Mismatch {
        what: what.into(),
        cached: format!("{:?}", cached),
        actual: format!("{:?}", actual),
      };

      warn!("cache out of sync: {}", mismatch);
      self.mismatches.push(mismatch);
    }
  }
}

impl fmt::Display for SanityReport {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.is_clean() {
      return f.write_str("cache in sync");
    }

    for mismatch in &self.mismatches {
      writeln!(f, "{}", mismatch)?;
    }

    Ok(())
  }
}

impl State {
  /// Only known values are compared; nothing gets queried into the cache.
  pub(crate) fn sanity_check(&self) -> SanityReport {
    let mut report = SanityReport::default();
    let vao = self.current_vao();

    let expected_vao = vao.as_ref().map_or(0, |vao| vao.state.borrow().id);
    report.check(
      "vertex array binding",
      expected_vao,
      self.driver.vertex_array_binding(),
    );

    for target in [BufferTarget::Array, BufferTarget::ElementArray] {
      if let Some(cached) = self.buffers.cached(target) {
        report.check(
          format!("{:?} buffer binding", target),
          cached,
          self.driver.buffer_binding(target),
        );
      }
    }

    if let Some(vao) = vao {
      let state = vao.state.borrow();

      if let Some(cached) = self.buffers.cached(BufferTarget::Array) {
        report.check(
          "array buffer recorded by the vertex array",
          state.layout.cached_array_buffer(),
          cached,
        );
      }

      if let Some(cached) = self.buffers.cached(BufferTarget::ElementArray) {
        report.check(
          "element array buffer recorded by the vertex array",
          state.layout.element_array_buffer(),
          cached,
        );
      }

      for index in 0..CHECKED_ATTRIBS {
        let attrib = state.layout.attrib(index).copied().unwrap_or_default();
        let actual = self.driver.vertex_attrib(index);

        report.check(
          format!("attribute {} enabled", index),
          attrib.enabled,
          actual.enabled,
        );

        if attrib.enabled {
          check_attrib(&mut report, index, &attrib, actual);
        }
      }
    }

    if let Some(&program) = self.program.top() {
      report.check("program", program, self.driver.current_program());
    }

    report
  }
}

fn check_attrib(
  report: &mut SanityReport,
  index: u32,
  attrib: &VertexAttrib,
  actual: AttribQuery,
) {
  report.check(
    format!("attribute {} buffer", index),
    attrib.array_buffer,
    actual.buffer,
  );
  report.check(format!("attribute {} size", index), attrib.size, actual.size);
  report.check(format!("attribute {} type", index), Some(attrib.ty), actual.ty);
}
