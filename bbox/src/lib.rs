//! Bounding box types and functions for pixel-space annotations.

mod common;

pub use xyxy::*;
pub mod xyxy;

pub use cxcywh::*;
pub mod cxcywh;

pub use hw::*;
pub mod hw;

pub use rect::*;
pub mod rect;

pub use transform::*;
mod transform;

pub mod prelude {
    pub use crate::rect::{Rect, RectExt};
}
