//! On-disk dataset fixtures for tests.

use crate::{annotation::ImageAnnotation, common::*};
use tempfile::TempDir;

/// Per-label embeddings of dimension 4 where row `i` holds `4i..4i+4`.
pub fn embedding_table() -> Tensor {
    Tensor::arange(81 * 4, FLOAT_CPU).view([81, 4])
}

pub fn file_name(split: &str, id: usize) -> String {
    format!("COCO_{}_{:012}.jpg", split, id)
}

pub fn write_image(path: &Path, [height, width]: [i64; 2]) -> Result<()> {
    let image = Tensor::full(&[3, height, width], 128i64, (Kind::Uint8, Device::Cpu));
    vision::image::save(&image, path)?;
    Ok(())
}

/// A temporary image directory with one image per annotation record.
pub struct Fixture {
    pub dir: TempDir,
    pub annotations: Vec<ImageAnnotation>,
}

impl Fixture {
    pub fn new(records: Vec<([i64; 2], ImageAnnotation)>) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let image_dir = dir.path().join("images");
        std::fs::create_dir_all(&image_dir)?;

        let annotations = records
            .into_iter()
            .map(|(size, anno)| -> Result<_> {
                write_image(&image_dir.join(&anno.file_name), size)?;
                Ok(anno)
            })
            .try_collect()?;

        Ok(Self { dir, annotations })
    }

    pub fn image_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }
}
