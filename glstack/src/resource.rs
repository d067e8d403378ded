//! Textures, programs, framebuffers and renderbuffers.
//!
//! These are thin owners of native objects. Dropping one deletes the native object (if the context
//! is still active) and tells the cache about it.

use std::{error::Error, fmt};

use crate::{
  binding::scalar::{Program as ProgramSlot, Renderbuffer as RenderbufferSlot},
  context::Context,
  driver::{Driver, FramebufferTarget, IncompleteReason, TextureTarget},
  registry::{LiveObject, ObjectKind, Registration},
  state::{State, StateRef},
};

/// Error that can occur with textures, programs, framebuffers and renderbuffers.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResourceError {
  /// The driver returned no object.
  Creation { kind: ObjectKind },
  /// The framebuffer cannot be rendered to.
  IncompleteFramebuffer(IncompleteReason),
}

impl fmt::Display for ResourceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ResourceError::Creation { kind } => write!(f, "cannot create {}", kind),
      ResourceError::IncompleteFramebuffer(ref reason) => {
        write!(f, "incomplete framebuffer: {}", reason)
      }
    }
  }
}

impl Error for ResourceError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      ResourceError::IncompleteFramebuffer(reason) => Some(reason),
      _ => None,
    }
  }
}

/// Native object shared plumbing.
struct Native {
  id: u32,
  kind: ObjectKind,
  state: StateRef,
  _registration: Registration,
}

impl Native {
  fn create(
    ctx: &Context,
    kind: ObjectKind,
    gen: impl FnOnce(&mut dyn Driver) -> u32,
  ) -> Result<Self, ResourceError> {
    let state = ctx.state().clone();
    let mut st = state.borrow_mut();
    let id = gen(&mut *st.driver);

    if id == 0 {
      return Err(ResourceError::Creation { kind });
    }

    let registration = Registration::new(&mut st, LiveObject::new(kind, id));
    drop(st);

    Ok(Native {
      id,
      kind,
      state,
      _registration: registration,
    })
  }

  fn release(&self, delete: impl FnOnce(&mut dyn Driver, u32), forget: impl FnOnce(&mut State, u32)) {
    match self.state.try_borrow_mut() {
      Ok(mut st) => {
        if st.context_active {
          delete(&mut *st.driver, self.id);
        }

        forget(&mut st, self.id);
      }

      Err(_) => warn!(
        "{} {} dropped while its context is busy; leaking it",
        self.kind, self.id
      ),
    }
  }
}

impl fmt::Debug for Native {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} {}", self.kind, self.id)
  }
}

/// Native texture.
#[derive(Debug)]
pub struct Texture {
  native: Native,
  target: TextureTarget,
}

impl Texture {
  pub fn new(ctx: &Context, target: TextureTarget) -> Result<Self, ResourceError> {
    let native = Native::create(ctx, ObjectKind::Texture, |driver| driver.gen_texture())?;
    Ok(Texture { native, target })
  }

  pub fn id(&self) -> u32 {
    self.native.id
  }

  pub fn target(&self) -> TextureTarget {
    self.target
  }

  /// Bind the texture on `unit`.
  pub fn bind(&self, unit: u32) {
    self
      .native
      .state
      .borrow_mut()
      .bind_texture(self.target, self.native.id, unit);
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    let target = self.target;
    self.native.release(
      |driver, id| driver.delete_texture(id),
      |st, id| st.texture_deleted(target, id),
    );
  }
}

/// Native shader program.
///
/// Deleting a program in use doesn't unbind it: the driver keeps it alive until another program is
/// used, so the cache keeps it too.
#[derive(Debug)]
pub struct Program {
  native: Native,
}

impl Program {
  pub fn new(ctx: &Context) -> Result<Self, ResourceError> {
    let native = Native::create(ctx, ObjectKind::Program, |driver| driver.create_program())?;
    Ok(Program { native })
  }

  pub fn id(&self) -> u32 {
    self.native.id
  }

  /// Use the program.
  pub fn bind(&self) {
    self
      .native
      .state
      .borrow_mut()
      .set_scalar::<ProgramSlot>(self.native.id);
  }
}

impl Drop for Program {
  fn drop(&mut self) {
    self
      .native
      .release(|driver, id| driver.delete_program(id), |_, _| ());
  }
}

/// Native framebuffer.
#[derive(Debug)]
pub struct Framebuffer {
  native: Native,
}

impl Framebuffer {
  pub fn new(ctx: &Context) -> Result<Self, ResourceError> {
    let native = Native::create(ctx, ObjectKind::Framebuffer, |driver| {
      driver.gen_framebuffer()
    })?;
    Ok(Framebuffer { native })
  }

  pub fn id(&self) -> u32 {
    self.native.id
  }

  pub fn bind(&self, target: FramebufferTarget) {
    self
      .native
      .state
      .borrow_mut()
      .bind_framebuffer(target, self.native.id);
  }

  /// Check whether the framebuffer can be rendered to. The bindings are left untouched.
  pub fn check_status(&self) -> Result<(), ResourceError> {
    let mut st = self.native.state.borrow_mut();
    st.push_framebuffer(FramebufferTarget::Framebuffer, self.native.id);
    let status = st
      .driver
      .check_framebuffer_status(FramebufferTarget::Framebuffer);
    st.pop_framebuffer(FramebufferTarget::Framebuffer);

    status.map_err(ResourceError::IncompleteFramebuffer)
  }
}

impl Drop for Framebuffer {
  fn drop(&mut self) {
    self.native.release(
      |driver, id| driver.delete_framebuffer(id),
      |st, id| st.framebuffer_deleted(id),
    );
  }
}

/// Native renderbuffer.
#[derive(Debug)]
pub struct Renderbuffer {
  native: Native,
}

impl Renderbuffer {
  pub fn new(ctx: &Context) -> Result<Self, ResourceError> {
    let native = Native::create(ctx, ObjectKind::Renderbuffer, |driver| {
      driver.gen_renderbuffer()
    })?;
    Ok(Renderbuffer { native })
  }

  pub fn id(&self) -> u32 {
    self.native.id
  }

  pub fn bind(&self) {
    self
      .native
      .state
      .borrow_mut()
      .set_scalar::<RenderbufferSlot>(self.native.id);
  }
}

impl Drop for Renderbuffer {
  fn drop(&mut self) {
    self.native.release(
      |driver, id| driver.delete_renderbuffer(id),
      |st, id| st.renderbuffer_deleted(id),
    );
  }
}

impl State {
  /// The driver falls back to renderbuffer 0 when the bound one is deleted.
  pub(crate) fn renderbuffer_deleted(&mut self, id: u32) {
    if id != 0 && self.renderbuffer.top() == Some(&id) {
      self.renderbuffer.set(0);
    }
  }
}
