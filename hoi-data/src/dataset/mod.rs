//! The V-COCO dataset adapter.

mod build;
mod dataset_;
mod vcoco;

pub use build::*;
pub use dataset_::*;
pub use vcoco::*;

#[cfg(test)]
pub(crate) mod fixtures;
