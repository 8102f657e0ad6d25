//! Domain types: colours and the palette-indexed cell values.

pub mod color;
pub mod palette;

pub use color::Rgb;
pub use palette::{ColorId, Palette, EMPTY};
