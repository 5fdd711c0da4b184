//! Shared building blocks: errors, colors and transform helpers.

pub mod color;
pub mod error;
pub mod math;
