//! Domain layer containing verification entities.

pub mod entities;

pub use entities::*;
