//! The two kinds of procedural geometry

pub mod grass;
pub mod pyramid;

pub use grass::{Grass, GrassDrawTriangle, GrassDrawVertex, GrassSourceVertex};
pub use pyramid::{pulsed_height, Pyramid, PyramidDrawTriangle, PyramidDrawVertex, PyramidSourceVertex};
