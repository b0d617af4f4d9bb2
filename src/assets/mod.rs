//! Media and font resources: color parsing, image decode, async loading and text shaping.

pub mod color;
pub mod decode;
pub mod loader;
pub mod text;
