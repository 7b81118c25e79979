use super::{ImageTransform, TransformTarget};
use crate::common::*;

/// Crop a random region whose sides lie in `[min_size, max_size]`.
///
/// Sides are also bounded by the image, so images smaller than `min_size`
/// are kept whole along that side.
#[derive(Debug, Clone)]
pub struct RandomSizeCrop {
    min_size: i64,
    max_size: i64,
}

impl RandomSizeCrop {
    pub fn new(min_size: i64, max_size: i64) -> Result<Self> {
        ensure!(min_size > 0, "min_size must be positive");
        ensure!(min_size <= max_size, "min_size must not exceed max_size");
        Ok(Self { min_size, max_size })
    }
}

impl ImageTransform for RandomSizeCrop {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        let (_channels, height, width) = image.size3()?;

        let mut sample_side = |side: i64| {
            let upper = side.min(self.max_size);
            let lower = self.min_size.min(upper);
            rng.gen_range(lower..=upper)
        };
        let crop_w = sample_side(width);
        let crop_h = sample_side(height);

        let top = rng.gen_range(0..=(height - crop_h));
        let left = rng.gen_range(0..=(width - crop_w));
        crop(&image, target, [left, top, crop_w, crop_h])
    }
}

/// Crop the region `[left, top, w, h]` and drop boxes that fall outside it.
pub fn crop(
    image: &Tensor,
    target: Option<TransformTarget>,
    region: [i64; 4],
) -> Result<(Tensor, Option<TransformTarget>)> {
    tch::no_grad(|| -> Result<_> {
        let [left, top, crop_w, crop_h] = region;
        let (_channels, height, width) = image.size3()?;
        ensure!(
            left >= 0 && top >= 0 && crop_w > 0 && crop_h > 0,
            "invalid crop region {:?}",
            region
        );
        ensure!(
            left + crop_w <= width && top + crop_h <= height,
            "crop region {:?} exceeds image size {}x{}",
            region,
            height,
            width
        );

        let cropped = image.i((.., top..(top + crop_h), left..(left + crop_w)));

        let target = target
            .map(|target| -> Result<_> {
                target.ensure_pixel_boxes("RandomSizeCrop")?;
                let TransformTarget {
                    labels, normalized, ..
                } = target;

                let size = HW::from_hw([crop_h, crop_w]);
                let bound = size.to_f32();
                let shift = BoxTransform::translation(-left as f32, -top as f32);
                let labels: Vec<_> = labels
                    .iter()
                    .map(|label| &shift * label)
                    .map(|label| {
                        let rect = label.rect.clamp(&bound);
                        ObjectLabel { rect, ..label }
                    })
                    .filter(|label| label.rect.is_positive())
                    .collect();

                Ok(TransformTarget {
                    labels,
                    size,
                    normalized,
                })
            })
            .transpose()?;

        Ok((cropped, target))
    })
}
