//! The image stitching algorithm used for sample replacement.

use super::resize::resize_exact;
use crate::{
    annotation::{HoiAnnotation, ImageAnnotation, ObjectAnnotation},
    common::*,
    vocab::NO_OBJECT_ID,
};

/// Builds one training sample out of several annotated images.
pub trait ImageCompositor
where
    Self: Debug + Send + Sync,
{
    /// The number of images expected by [ImageCompositor::composite],
    /// including the primary sample.
    fn num_images(&self) -> usize;

    /// Merge the images and their annotations. The first entry is the primary
    /// sample.
    fn composite(
        &self,
        samples: Vec<(ImageAnnotation, Tensor)>,
    ) -> Result<(ImageAnnotation, Tensor)>;
}

/// Stitch four images into a 2x2 grid of the primary image size.
///
/// Images are placed top-left, top-right, bottom-left, bottom-right in input
/// order, each resized to fill its quadrant.
#[derive(Debug, Clone, Default)]
pub struct StitchCompositor;

impl StitchCompositor {
    fn quadrants(height: i64, width: i64) -> [[i64; 4]; 4] {
        let pivot_h = height / 2;
        let pivot_w = width / 2;
        [
            [0, 0, pivot_h, pivot_w],
            [0, pivot_w, pivot_h, width - pivot_w],
            [pivot_h, 0, height - pivot_h, pivot_w],
            [pivot_h, pivot_w, height - pivot_h, width - pivot_w],
        ]
    }
}

impl ImageCompositor for StitchCompositor {
    fn num_images(&self) -> usize {
        4
    }

    fn composite(
        &self,
        samples: Vec<(ImageAnnotation, Tensor)>,
    ) -> Result<(ImageAnnotation, Tensor)> {
        ensure!(samples.len() == 4, "expect exactly 4 images");

        tch::no_grad(|| -> Result<_> {
            let (height, width) = {
                let (_channels, height, width) = samples[0]
                    .1
                    .size3()
                    .with_context(|| "image must have shape [channels, height, width]")?;
                (height, width)
            };
            ensure!(
                height >= 2 && width >= 2,
                "primary image of size {}x{} is too small to stitch",
                height,
                width
            );

            let mut file_name = None;
            let mut objects: Vec<ObjectAnnotation> = vec![];
            let mut hois: Vec<HoiAnnotation> = vec![];
            let mut tiles = vec![];

            for ((anno, image), [top, left, tile_h, tile_w]) in samples
                .into_iter()
                .zip_eq(Self::quadrants(height, width))
            {
                let (_channels, orig_h, orig_w) = image
                    .size3()
                    .with_context(|| "image must have shape [channels, height, width]")?;
                let tile = resize_exact(&image, tile_h, tile_w)?;

                // map boxes into the quadrant
                let transform = {
                    let scale = BoxTransform::from_sizes_exact(
                        &HW::from_hw([orig_h, orig_w]).to_f32(),
                        &HW::from_hw([tile_h, tile_w]).to_f32(),
                    );
                    let shift = BoxTransform::translation(left as f32, top as f32);
                    &shift * &scale
                };

                let ImageAnnotation {
                    file_name: tile_file_name,
                    annotations,
                    hoi_annotation,
                } = anno;
                file_name.get_or_insert(tile_file_name);

                let offset = objects.len() as i64;
                hois.extend(hoi_annotation.into_iter().map(|hoi| HoiAnnotation {
                    subject_id: hoi.subject_id + offset,
                    object_id: if hoi.has_object() {
                        hoi.object_id + offset
                    } else {
                        NO_OBJECT_ID
                    },
                    category_id: hoi.category_id,
                }));
                objects.extend(annotations.into_iter().map(|obj| ObjectAnnotation {
                    bbox: XYXY::from_raw(obj.bbox).transform(&transform).into_raw(),
                    category_id: obj.category_id,
                }));
                tiles.push(tile);
            }

            let bottom = Tensor::cat(&tiles.split_off(2), 2);
            let top = Tensor::cat(&tiles, 2);
            let image = Tensor::cat(&[top, bottom], 1);

            let anno = ImageAnnotation {
                file_name: file_name.ok_or_else(|| format_err!("no image to stitch"))?,
                annotations: objects,
                hoi_annotation: hois,
            };
            Ok((anno, image))
        })
    }
}

/// Pick `count` similar samples for `current` from its candidate list.
///
/// Candidates that are HOI-free or equal to `current` are skipped. Returns
/// `None` if too few candidates remain.
pub fn select_similar<R>(
    rng: &mut R,
    current: usize,
    candidates: &[usize],
    excluded: &HashSet<usize>,
    count: usize,
) -> Option<Vec<usize>>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&index| index != current && !excluded.contains(&index))
        .unique()
        .collect();

    (eligible.len() >= count).then(|| eligible.choose_multiple(rng, count).copied().collect())
}
