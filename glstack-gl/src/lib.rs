//! OpenGL driver for [glstack](https://crates.io/crates/glstack).
//!
//! ```ignore
//! let driver = glstack_gl::GlDriver::load_with(|s| window.get_proc_address(s) as *const _);
//! let ctx = glstack::Context::new(driver)?;
//! ```
//!
//! # Feature flags
//!
//! - `log`: log what happens with the [log](https://crates.io/crates/log) crate (enabled by
//!   default).
//! - `gles`: interpret version strings as OpenGL ES ones, even when they don't say so.

#[macro_use]
mod log;

mod convert;
mod driver;

pub use crate::driver::{GlDriver, GlVersion};

pub use gl;
