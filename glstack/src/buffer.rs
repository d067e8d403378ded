//! Buffer objects.
//!
//! A [`BufferObj`] owns a native buffer. Every operation needing the buffer bound pushes its binding
//! and pops it afterwards, so using a buffer never disturbs what the caller had bound.

use std::{
  cell::{Cell, RefCell},
  error::Error,
  fmt,
  ptr::NonNull,
};

use crate::{
  context::Context,
  driver::{BufferTarget, BufferUsage, Driver, MapAccess},
  registry::{LiveObject, ObjectKind, Registration},
  state::StateRef,
};

/// Buffer error.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BufferError {
  /// The driver could not allocate a buffer.
  Creation,
  /// Mapping failed, or the buffer was already mapped.
  MapFailed { id: u32 },
  /// The content of the buffer got corrupted while it was mapped.
  UnmapFailed { id: u32 },
  /// A range lies (partly) outside of the buffer.
  OutOfBounds {
    id: u32,
    offset: usize,
    len: usize,
    size: usize,
  },
}

impl fmt::Display for BufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      BufferError::Creation => f.write_str("cannot create buffer"),
      BufferError::MapFailed { id } => write!(f, "cannot map buffer {}", id),
      BufferError::UnmapFailed { id } => {
        write!(f, "buffer {} got corrupted while mapped", id)
      }
      BufferError::OutOfBounds {
        id,
        offset,
        len,
        size,
      } => write!(
        f,
        "range {}..{} out of bounds of buffer {} ({} bytes)",
        offset,
        offset + len,
        id,
        size
      ),
    }
  }
}

impl Error for BufferError {}

/// Native buffer.
pub struct BufferObj {
  id: u32,
  target: BufferTarget,
  usage: Cell<BufferUsage>,
  size: Cell<usize>,
  mapped: Cell<bool>,
  label: RefCell<String>,
  state: StateRef,
  _registration: Registration,
}

impl BufferObj {
  /// Create a buffer without storage.
  pub fn new(ctx: &Context, target: BufferTarget, usage: BufferUsage) -> Result<Self, BufferError> {
    let state = ctx.state().clone();
    let mut st = state.borrow_mut();
    let id = st.driver.gen_buffer();

    if id == 0 {
      return Err(BufferError::Creation);
    }

    let registration = Registration::new(&mut st, LiveObject::new(ObjectKind::Buffer, id));
    drop(st);

    Ok(BufferObj {
      id,
      target,
      usage: Cell::new(usage),
      size: Cell::new(0),
      mapped: Cell::new(false),
      label: RefCell::new(String::new()),
      state,
      _registration: registration,
    })
  }

  /// Create a buffer with `size` bytes of uninitialized storage.
  pub fn with_size(
    ctx: &Context,
    target: BufferTarget,
    size: usize,
    usage: BufferUsage,
  ) -> Result<Self, BufferError> {
    let buffer = Self::new(ctx, target, usage)?;
    buffer.allocate(size, usage);
    Ok(buffer)
  }

  /// Create a buffer holding a copy of `data`.
  pub fn with_data(
    ctx: &Context,
    target: BufferTarget,
    data: &[u8],
    usage: BufferUsage,
  ) -> Result<Self, BufferError> {
    let buffer = Self::new(ctx, target, usage)?;
    buffer.buffer_data(data, usage);
    Ok(buffer)
  }

  pub fn id(&self) -> u32 {
    self.id
  }

  pub fn target(&self) -> BufferTarget {
    self.target
  }

  /// Size of the storage, in bytes.
  pub fn size(&self) -> usize {
    self.size.get()
  }

  pub fn usage(&self) -> BufferUsage {
    self.usage.get()
  }

  pub fn is_mapped(&self) -> bool {
    self.mapped.get()
  }

  pub fn label(&self) -> String {
    self.label.borrow().clone()
  }

  pub fn set_label(&self, label: impl Into<String>) {
    *self.label.borrow_mut() = label.into();
  }

  /// Bind the buffer to its target.
  pub fn bind(&self) {
    self.state.borrow_mut().bind_buffer(self.target, self.id);
  }

  /// Bind the buffer to another target.
  pub fn bind_to(&self, target: BufferTarget) {
    self.state.borrow_mut().bind_buffer(target, self.id);
  }

  fn with_bound<R>(&self, f: impl FnOnce(&mut dyn Driver, BufferTarget) -> R) -> R {
    let mut st = self.state.borrow_mut();
    st.push_buffer_binding(self.target, self.id);
    let r = f(&mut *st.driver, self.target);
    st.pop_buffer_binding(self.target);
    r
  }

  /// Replace the storage with a copy of `data`.
  pub fn buffer_data(&self, data: &[u8], usage: BufferUsage) {
    trace!("uploading {} bytes to buffer {}", data.len(), self.id);
    self.with_bound(|driver, target| driver.buffer_data(target, data.len(), Some(data), usage));
    self.size.set(data.len());
    self.usage.set(usage);
  }

  /// Replace the storage with `size` uninitialized bytes.
  pub fn allocate(&self, size: usize, usage: BufferUsage) {
    self.with_bound(|driver, target| driver.buffer_data(target, size, None, usage));
    self.size.set(size);
    self.usage.set(usage);
  }

  /// Overwrite part of the storage.
  pub fn buffer_sub_data(&self, offset: usize, data: &[u8]) -> Result<(), BufferError> {
    self.check_range(offset, data.len())?;
    self.with_bound(|driver, target| driver.buffer_sub_data(target, offset, data));
    Ok(())
  }

  /// Grow the storage to at least `size` bytes. The content is lost when the storage grows.
  pub fn ensure_minimum_size(&self, size: usize) {
    if self.size.get() < size {
      self.allocate(size, self.usage.get());
    }
  }

  fn check_range(&self, offset: usize, len: usize) -> Result<(), BufferError> {
    let size = self.size.get();

    match offset.checked_add(len) {
      Some(end) if end <= size => Ok(()),
      _ => Err(BufferError::OutOfBounds {
        id: self.id,
        offset,
        len,
        size,
      }),
    }
  }

  /// Map the whole storage.
  pub fn map(&self, access: MapAccess) -> Result<NonNull<u8>, BufferError> {
    self.map_range(0, self.size.get(), access)
  }

  /// Map `len` bytes starting at `offset`.
  ///
  /// The pointer is valid until [`BufferObj::unmap`] is called.
  pub fn map_range(
    &self,
    offset: usize,
    len: usize,
    access: MapAccess,
  ) -> Result<NonNull<u8>, BufferError> {
    if self.mapped.get() {
      warn!("buffer {} is already mapped", self.id);
      return Err(BufferError::MapFailed { id: self.id });
    }

    self.check_range(offset, len)?;

    let ptr = self
      .with_bound(|driver, target| driver.map_buffer_range(target, offset, len, access))
      .ok_or(BufferError::MapFailed { id: self.id })?;

    self.mapped.set(true);
    Ok(ptr)
  }

  /// Unmap the storage. Unmapping a buffer that isn't mapped is a no-op.
  pub fn unmap(&self) -> Result<(), BufferError> {
    if !self.mapped.get() {
      warn!("buffer {} is not mapped; ignoring unmap", self.id);
      return Ok(());
    }

    self.mapped.set(false);

    if self.with_bound(|driver, target| driver.unmap_buffer(target)) {
      Ok(())
    } else {
      Err(BufferError::UnmapFailed { id: self.id })
    }
  }
}

impl fmt::Debug for BufferObj {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("BufferObj")
      .field("id", &self.id)
      .field("target", &self.target)
      .field("size", &self.size.get())
      .field("label", &*self.label.borrow())
      .finish()
  }
}

impl Drop for BufferObj {
  fn drop(&mut self) {
    match self.state.try_borrow_mut() {
      Ok(mut st) => {
        if st.context_active {
          st.driver.delete_buffer(self.id);
        }

        st.buffer_deleted(self.target, self.id);
      }

      Err(_) => {
        warn!("buffer {} dropped while its context is busy; leaking it", self.id);
      }
    }
  }
}
