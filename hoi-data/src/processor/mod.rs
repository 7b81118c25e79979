//! Data augmentation building blocks.

pub mod color_jitter;
pub mod crop;
pub mod flip;
pub mod loader;
pub mod normalize;
pub mod resize;
pub mod stitch;
pub mod transform;

pub use color_jitter::*;
pub use crop::*;
pub use flip::*;
pub use loader::*;
pub use normalize::*;
pub use resize::*;
pub use stitch::*;
pub use transform::*;

use crate::{common::*, config::ImageSet};

/// Shorter-side sizes used for multi-scale training.
pub const TRAIN_SCALES: [i64; 11] = [480, 512, 544, 576, 608, 640, 672, 704, 736, 768, 800];

/// Longer-side limit after resizing.
pub const MAX_SIZE: i64 = 1333;

/// Build the default augmentation pipeline of an image set.
pub fn make_transforms(image_set: ImageSet) -> Result<Box<dyn ImageTransform>> {
    let transform: Box<dyn ImageTransform> = match image_set {
        ImageSet::Train => {
            let scales = TRAIN_SCALES.to_vec();
            let color_jitter = ColorJitterInit {
                brightness: Some(r64(0.4)),
                contrast: Some(r64(0.4)),
                saturation: Some(r64(0.4)),
            }
            .build()?;

            Box::new(Compose::new(vec![
                Box::new(RandomHorizontalFlip::default()),
                Box::new(color_jitter),
                Box::new(RandomSelect::new(
                    Box::new(RandomResize::new(scales.clone(), Some(MAX_SIZE))?),
                    Box::new(Compose::new(vec![
                        Box::new(RandomResize::new(vec![400, 500, 600], None)?),
                        Box::new(RandomSizeCrop::new(384, 600)?),
                        Box::new(RandomResize::new(scales, Some(MAX_SIZE))?),
                    ])),
                )),
                Box::new(Normalize::default()),
            ]))
        }
        ImageSet::Val => Box::new(Compose::new(vec![
            Box::new(RandomResize::new(vec![800], Some(MAX_SIZE))?),
            Box::new(Normalize::default()),
        ])),
    };
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::transform::tests::label;

    #[test]
    fn train_pipeline_output_contract() -> Result<()> {
        let transforms = make_transforms(ImageSet::Train)?;
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..4 {
            let image = Tensor::zeros(&[3, 120, 160], (Kind::Uint8, Device::Cpu));
            let target = TransformTarget::new(
                vec![
                    label([10.0, 10.0, 150.0, 110.0], 0, 0),
                    label([40.0, 30.0, 80.0, 90.0], 5, 1),
                    label([120.0, 5.0, 158.0, 40.0], 9, 2),
                ],
                HW::from_hw([120, 160]),
            );
            let (image, target) = transforms.forward(&mut rng, image, Some(target))?;
            let target = target.unwrap();

            let (channels, height, width) = image.size3()?;
            assert_eq!(channels, 3);
            assert_eq!(image.kind(), Kind::Float);
            assert_eq!(target.size, HW::from_hw([height, width]));
            assert!(target.normalized);
            assert!(height.min(width) <= 800 && height.max(width) <= MAX_SIZE);

            let sources = target.sources();
            assert!(sources.windows(2).all(|pair| pair[0] < pair[1]));
            for (label, source) in izip!(&target.labels, &sources) {
                let expect_class = [0, 5, 9][*source];
                assert_eq!(label.class, expect_class);
            }
            for [cx, cy, w, h] in target.output_boxes() {
                assert!((0.0..=1.0).contains(&cx) && (0.0..=1.0).contains(&cy));
                assert!(w > 0.0 && w <= 1.0 && h > 0.0 && h <= 1.0);
            }
        }
        Ok(())
    }

    #[test]
    fn val_pipeline_resizes_image_only() -> Result<()> {
        let transforms = make_transforms(ImageSet::Val)?;
        let mut rng = StdRng::seed_from_u64(0);
        let image = Tensor::zeros(&[3, 100, 200], (Kind::Uint8, Device::Cpu));

        let (image, target) = transforms.forward(&mut rng, image, None)?;
        assert!(target.is_none());
        assert_eq!(image.size(), vec![3, 666, 1332]);
        Ok(())
    }
}
