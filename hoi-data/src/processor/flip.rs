use super::{ImageTransform, TransformTarget};
use crate::common::*;

/// Flip the image and boxes horizontally with a given probability.
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    prob: f64,
}

impl RandomHorizontalFlip {
    pub fn new(prob: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&prob),
            "prob must be between 0.0 and 1.0"
        );
        Ok(Self { prob })
    }
}

impl Default for RandomHorizontalFlip {
    fn default() -> Self {
        Self { prob: 0.5 }
    }
}

impl ImageTransform for RandomHorizontalFlip {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        if rng.gen::<f64>() >= self.prob {
            return Ok((image, target));
        }

        tch::no_grad(|| -> Result<_> {
            let (_channels, _height, width) = image.size3()?;
            let flipped = image.flip(&[2]);

            let target = target
                .map(|mut target| -> Result<_> {
                    target.ensure_pixel_boxes("RandomHorizontalFlip")?;
                    let width = width as f32;
                    target
                        .labels
                        .iter_mut()
                        .for_each(|label| label.rect = label.rect.hflip(width));
                    Ok(target)
                })
                .transpose()?;

            Ok((flipped, target))
        })
    }
}
