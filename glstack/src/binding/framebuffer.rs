//! Framebuffer bindings.
//!
//! Drivers with separate read and draw framebuffers get two stacks; binding to
//! [`FramebufferTarget::Framebuffer`] updates both and issues a single combined call. Older drivers
//! have a single binding, and read / draw targets are folded onto it.

use crate::{
  driver::FramebufferTarget,
  stack::{BindingStack, Popped},
  state::State,
};

#[derive(Debug)]
pub enum FramebufferBindingTable {
  Separate {
    read: BindingStack<u32>,
    draw: BindingStack<u32>,
  },
  Combined(BindingStack<u32>),
}

/// Native binds needed after a table operation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FramebufferUpdate {
  pub read: Option<u32>,
  pub draw: Option<u32>,
}

impl FramebufferUpdate {
  fn both(id: u32) -> Self {
    FramebufferUpdate {
      read: Some(id),
      draw: Some(id),
    }
  }

  /// Native calls to issue; read and draw binds of the same framebuffer collapse into one.
  pub fn calls(self) -> Vec<(FramebufferTarget, u32)> {
    match (self.read, self.draw) {
      (Some(read), Some(draw)) if read == draw => vec![(FramebufferTarget::Framebuffer, read)],
      (read, draw) => read
        .map(|id| (FramebufferTarget::Read, id))
        .into_iter()
        .chain(draw.map(|id| (FramebufferTarget::Draw, id)))
        .collect(),
    }
  }
}

/// Which stacks an operation on a target touches.
#[derive(Clone, Copy, Debug)]
struct Touch {
  read: bool,
  draw: bool,
}

impl Touch {
  fn of(target: FramebufferTarget) -> Self {
    match target {
      FramebufferTarget::Framebuffer => Touch {
        read: true,
        draw: true,
      },
      FramebufferTarget::Read => Touch {
        read: true,
        draw: false,
      },
      FramebufferTarget::Draw => Touch {
        read: false,
        draw: true,
      },
    }
  }
}

fn popped(popped: Popped<u32>, underflow: &mut bool) -> Option<u32> {
  match popped {
    Popped::Restore(id) => Some(id),
    Popped::Underflow => {
      *underflow = true;
      None
    }
    _ => None,
  }
}

impl FramebufferBindingTable {
  pub fn new(separate: bool) -> Self {
    if separate {
      FramebufferBindingTable::Separate {
        read: BindingStack::new(),
        draw: BindingStack::new(),
      }
    } else {
      FramebufferBindingTable::Combined(BindingStack::new())
    }
  }

  pub fn is_separate(&self) -> bool {
    matches!(self, FramebufferBindingTable::Separate { .. })
  }

  /// Known binding of `target`. [`FramebufferTarget::Framebuffer`] reads the draw binding.
  pub fn cached(&self, target: FramebufferTarget) -> Option<u32> {
    match self {
      FramebufferBindingTable::Separate { read, .. } if target == FramebufferTarget::Read => {
        read.top().copied()
      }
      FramebufferBindingTable::Separate { draw, .. } => draw.top().copied(),
      FramebufferBindingTable::Combined(stack) => stack.top().copied(),
    }
  }

  /// Stack holding `target`.
  fn stack(&mut self, target: FramebufferTarget) -> &mut BindingStack<u32> {
    match self {
      FramebufferBindingTable::Separate { read, .. } if target == FramebufferTarget::Read => read,
      FramebufferBindingTable::Separate { draw, .. } => draw,
      FramebufferBindingTable::Combined(stack) => stack,
    }
  }

  /// Binding of `target`, querying the driver if unknown. The query is always given the real
  /// binding point to ask about.
  pub fn get(
    &mut self,
    target: FramebufferTarget,
    query: impl FnOnce(FramebufferTarget) -> u32,
  ) -> u32 {
    let asked = match (self.is_separate(), target) {
      (true, FramebufferTarget::Read) => FramebufferTarget::Read,
      (true, _) => FramebufferTarget::Draw,
      (false, _) => FramebufferTarget::Framebuffer,
    };

    self.stack(target).get_or_query(|| query(asked))
  }

  pub fn set(&mut self, target: FramebufferTarget, id: u32) -> FramebufferUpdate {
    self.apply(target, id, BindingStack::set)
  }

  pub fn push(&mut self, target: FramebufferTarget, id: u32) -> FramebufferUpdate {
    self.apply(target, id, BindingStack::push)
  }

  fn apply(
    &mut self,
    target: FramebufferTarget,
    id: u32,
    op: impl Fn(&mut BindingStack<u32>, u32) -> bool,
  ) -> FramebufferUpdate {
    match self {
      FramebufferBindingTable::Separate { read, draw } => {
        let touch = Touch::of(target);
        let read_changed = touch.read && op(read, id);
        let draw_changed = touch.draw && op(draw, id);

        if target == FramebufferTarget::Framebuffer && (read_changed || draw_changed) {
          FramebufferUpdate::both(id)
        } else {
          FramebufferUpdate {
            read: Some(id).filter(|_| read_changed),
            draw: Some(id).filter(|_| draw_changed),
          }
        }
      }

      FramebufferBindingTable::Combined(stack) => {
        if op(stack, id) {
          FramebufferUpdate::both(id)
        } else {
          FramebufferUpdate::default()
        }
      }
    }
  }

  pub fn push_current(&mut self, target: FramebufferTarget) {
    match self {
      FramebufferBindingTable::Separate { read, draw } => {
        let touch = Touch::of(target);

        if touch.read {
          read.push_top();
        }

        if touch.draw {
          draw.push_top();
        }
      }

      FramebufferBindingTable::Combined(stack) => stack.push_top(),
    }
  }

  /// Pop `target`. The boolean is `true` if a stack underflowed.
  pub fn pop(&mut self, target: FramebufferTarget) -> (FramebufferUpdate, bool) {
    let mut underflow = false;

    let update = match self {
      FramebufferBindingTable::Separate { read, draw } => {
        let touch = Touch::of(target);
        let mut update = FramebufferUpdate::default();

        if touch.read {
          update.read = popped(read.pop(), &mut underflow);
        }

        if touch.draw {
          update.draw = popped(draw.pop(), &mut underflow);
        }

        update
      }

      FramebufferBindingTable::Combined(stack) => popped(stack.pop(), &mut underflow)
        .map(FramebufferUpdate::both)
        .unwrap_or_default(),
    };

    (update, underflow)
  }

  /// Zero every binding to `id`.
  pub fn deleted(&mut self, id: u32) {
    let stacks: Vec<&mut BindingStack<u32>> = match self {
      FramebufferBindingTable::Separate { read, draw } => vec![read, draw],
      FramebufferBindingTable::Combined(stack) => vec![stack],
    };

    for stack in stacks {
      if stack.top() == Some(&id) {
        stack.set(0);
      }
    }
  }
}

impl State {
  pub(crate) fn framebuffer_binding(&mut self, target: FramebufferTarget) -> u32 {
    let driver = &self.driver;
    self
      .framebuffers
      .get(target, |asked| driver.framebuffer_binding(asked))
  }

  fn fold_framebuffer_target(&self, target: FramebufferTarget) {
    if !self.framebuffers.is_separate() && target != FramebufferTarget::Framebuffer {
      debug!(
        "no separate read / draw framebuffers; {:?} binds both",
        target
      );
    }
  }

  pub(crate) fn bind_framebuffer(&mut self, target: FramebufferTarget, id: u32) {
    self.fold_framebuffer_target(target);
    self.prime_framebuffer(target);
    let update = self.framebuffers.set(target, id);
    self.issue_framebuffer_update(update);
  }

  pub(crate) fn push_framebuffer(&mut self, target: FramebufferTarget, id: u32) {
    self.fold_framebuffer_target(target);
    self.prime_framebuffer(target);
    let update = self.framebuffers.push(target, id);
    self.issue_framebuffer_update(update);
  }

  pub(crate) fn push_framebuffer_current(&mut self, target: FramebufferTarget) {
    self.prime_framebuffer(target);
    self.framebuffers.push_current(target);
  }

  pub(crate) fn pop_framebuffer(&mut self, target: FramebufferTarget) {
    let (update, underflow) = self.framebuffers.pop(target);

    if underflow {
      error!("framebuffer binding stack underflow for {:?}", target);
      self.prime_framebuffer(target);
    }

    self.issue_framebuffer_update(update);
  }

  /// Make sure every stack touched by `target` holds a known value.
  fn prime_framebuffer(&mut self, target: FramebufferTarget) {
    match target {
      FramebufferTarget::Framebuffer if self.framebuffers.is_separate() => {
        self.framebuffer_binding(FramebufferTarget::Read);
        self.framebuffer_binding(FramebufferTarget::Draw);
      }

      _ => {
        self.framebuffer_binding(target);
      }
    }
  }

  fn issue_framebuffer_update(&mut self, update: FramebufferUpdate) {
    for (target, id) in update.calls() {
      trace!("binding framebuffer {} to {:?}", id, target);
      self.driver.bind_framebuffer(target, id);
    }
  }

  pub(crate) fn framebuffer_deleted(&mut self, id: u32) {
    self.framebuffers.deleted(id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn primed(separate: bool) -> FramebufferBindingTable {
    let mut table = FramebufferBindingTable::new(separate);
    table.get(FramebufferTarget::Read, |_| 0);
    table.get(FramebufferTarget::Draw, |_| 0);
    table
  }

  #[test]
  fn combined_bind_when_either_changes() {
    let mut table = primed(true);

    assert_eq!(
      table.set(FramebufferTarget::Read, 2).calls(),
      vec![(FramebufferTarget::Read, 2)]
    );

    // only draw differs, still a single combined call
    assert_eq!(
      table.set(FramebufferTarget::Framebuffer, 2).calls(),
      vec![(FramebufferTarget::Framebuffer, 2)]
    );

    assert!(table.set(FramebufferTarget::Framebuffer, 2).calls().is_empty());
  }

  #[test]
  fn pop_restores_each_side() {
    let mut table = primed(true);
    table.push(FramebufferTarget::Read, 3);
    table.push(FramebufferTarget::Framebuffer, 5);

    let (update, underflow) = table.pop(FramebufferTarget::Framebuffer);
    assert!(!underflow);
    assert_eq!(
      update.calls(),
      vec![(FramebufferTarget::Read, 3), (FramebufferTarget::Draw, 0)]
    );
  }

  #[test]
  fn single_binding_folds_targets() {
    let mut table = primed(false);

    assert_eq!(
      table.set(FramebufferTarget::Read, 4).calls(),
      vec![(FramebufferTarget::Framebuffer, 4)]
    );
    assert_eq!(table.cached(FramebufferTarget::Draw), Some(4));
  }

  #[test]
  fn pop_of_empty_reports_underflow() {
    let mut table = FramebufferBindingTable::new(true);
    let (update, underflow) = table.pop(FramebufferTarget::Draw);

    assert!(underflow);
    assert!(update.calls().is_empty());
  }
}
