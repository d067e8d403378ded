//! Live-object registry.
//!
//! When object tracking is enabled, every resource created through a context registers itself and
//! gets a [`TrackingToken`] back; dropping the resource hands the token back. Whatever is left in the
//! registry at any point is what is still alive, which is handy to hunt leaks.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Weak};

use crate::state::State;

/// Kind of tracked object.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ObjectKind {
  Buffer,
  Texture,
  VertexArray,
  Program,
  Framebuffer,
  Renderbuffer,
}

impl fmt::Display for ObjectKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ObjectKind::Buffer => f.write_str("buffer"),
      ObjectKind::Texture => f.write_str("texture"),
      ObjectKind::VertexArray => f.write_str("vertex array"),
      ObjectKind::Program => f.write_str("program"),
      ObjectKind::Framebuffer => f.write_str("framebuffer"),
      ObjectKind::Renderbuffer => f.write_str("renderbuffer"),
    }
  }
}

/// Entry of the registry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LiveObject {
  pub kind: ObjectKind,
  /// Native name of the object; 0 for objects without one (software VAOs).
  pub id: u32,
}

impl LiveObject {
  pub fn new(kind: ObjectKind, id: u32) -> Self {
    LiveObject { kind, id }
  }
}

/// Proof of registration, consumed by [`Registry::deregister`].
#[derive(Debug, Eq, PartialEq)]
pub struct TrackingToken {
  key: u64,
}

#[derive(Debug, Default)]
pub struct Registry {
  enabled: bool,
  next_key: u64,
  live: BTreeMap<u64, LiveObject>,
}

impl Registry {
  pub fn new(enabled: bool) -> Self {
    Registry {
      enabled,
      ..Registry::default()
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Track `object`. Returns `None` when tracking is disabled.
  pub fn register(&mut self, object: LiveObject) -> Option<TrackingToken> {
    if !self.enabled {
      return None;
    }

    let key = self.next_key;
    self.next_key += 1;
    self.live.insert(key, object);

    Some(TrackingToken { key })
  }

  pub fn deregister(&mut self, token: TrackingToken) -> Option<LiveObject> {
    self.live.remove(&token.key)
  }

  /// Live objects, in registration order.
  pub fn live(&self) -> impl Iterator<Item = &LiveObject> + '_ {
    self.live.values()
  }

  pub fn live_of(&self, kind: ObjectKind) -> impl Iterator<Item = &LiveObject> + '_ {
    self.live().filter(move |object| object.kind == kind)
  }

  pub fn len(&self) -> usize {
    self.live.len()
  }

  pub fn is_empty(&self) -> bool {
    self.live.is_empty()
  }
}

/// Registration of a resource in the registry of the context it lives in. Deregisters on drop.
#[derive(Debug)]
pub(crate) struct Registration {
  state: Weak<RefCell<State>>,
  token: Option<TrackingToken>,
}

impl Registration {
  pub(crate) fn new(state: &mut State, object: LiveObject) -> Self {
    Registration {
      state: state.weak_self.clone(),
      token: state.registry.register(object),
    }
  }

  /// Move the registration to another context's registry.
  pub(crate) fn rehome(&mut self, state: &mut State, object: LiveObject) {
    self.release();
    *self = Registration::new(state, object);
  }

  fn release(&mut self) {
    let token = match self.token.take() {
      Some(token) => token,
      None => return,
    };

    if let Some(state) = self.state.upgrade() {
      match state.try_borrow_mut() {
        Ok(mut state) => {
          state.registry.deregister(token);
        }

        Err(_) => {
          warn!("cannot deregister a live object: its context is busy");
        }
      }
    }
  }
}

impl Drop for Registration {
  fn drop(&mut self) {
    self.release();
  }
}
