//! V-COCO human-object interaction dataset for DETR-style detectors.

mod common;

pub mod annotation;
pub mod assets;
pub mod config;
pub mod dataset;
pub mod encode;
pub mod processor;
pub mod target;
pub mod vocab;

pub use config::{DatasetConfig, ImageSet};
pub use dataset::{build, HoiDataset, HoiDatasetInit, RandomAccessDataset};
pub use target::{EvalTarget, HoiExample, Target, TrainTarget};
