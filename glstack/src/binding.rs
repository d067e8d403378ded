//! Binding tables.
//!
//! Each table maps a binding point (buffer target, texture unit and target, framebuffer target,
//! capability) to its own [`BindingStack`](crate::stack::BindingStack). The tables only do the
//! bookkeeping; the native calls are issued by the context state driving them.

pub mod bool_state;
pub mod buffer;
pub mod framebuffer;
pub mod scalar;
pub mod texture;

pub use bool_state::BoolStateTable;
pub use buffer::BufferBindingTable;
pub use framebuffer::{FramebufferBindingTable, FramebufferUpdate};
pub use texture::TextureBindingTable;
