//! Core geometry types, arc tessellation and pad expansion.

pub mod arc;
pub mod pad;
pub mod types;

pub use arc::*;
pub use pad::*;
pub use types::*;
