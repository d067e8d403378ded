//! # glstack
//!
//! Client-side cache of the binding state of a graphics context.
//!
//! Graphics drivers offer no cheap way to ask what is currently bound, and every redundant bind
//! costs a driver call. This crate shadows the mutable binding state of a context (buffers,
//! textures, framebuffers, program, vertex arrays, boolean toggles, viewport, scissor, blending,
//! etc.) in stacks mirroring what the driver holds:
//!
//! - binding what's already bound doesn't reach the driver;
//! - nested code saves and restores state with push / pop pairs, or with [`scoped`] guards;
//! - state never set is queried from the driver once, then cached.
//!
//! The crate doesn't talk to a graphics API itself: it goes through the [`Driver`](driver::Driver)
//! trait. The `glstack-gl` crate implements it on top of OpenGL.
//!
//! # Vertex arrays
//!
//! [`Vao`](vao::Vao) hides three flavours of vertex array objects behind the same interface: core
//! (hardware), ES (extension entry points) and software (layouts replayed attribute by attribute).
//! A vertex array bound into a context other than the one that created it is rebuilt in the new
//! context from its recorded layout.
//!
//! # Feature flags
//!
//! - `log`: log what happens with the [log](https://crates.io/crates/log) crate (enabled by
//!   default).

#![deny(missing_debug_implementations)]

#[macro_use]
mod log;

pub mod binding;
pub mod buffer;
pub mod context;
pub mod driver;
pub mod registry;
pub mod resource;
pub mod sanity;
pub mod scoped;
pub mod stack;
pub mod state;
pub mod vao;

pub use crate::buffer::{BufferError, BufferObj};
pub use crate::context::Context;
pub use crate::driver::Driver;
pub use crate::resource::{Framebuffer, Program, Renderbuffer, ResourceError, Texture};
pub use crate::state::{ContextId, ContextOptions, StateError};
pub use crate::vao::{Vao, VaoError, VaoRef};
