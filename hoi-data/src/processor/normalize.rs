use super::{ImageTransform, TransformTarget};
use crate::common::*;

pub const IMAGENET_MEAN: [f64; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f64; 3] = [0.229, 0.224, 0.225];

/// Convert pixels to floats, standardize channels and switch boxes to
/// normalized center format.
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: [f64; 3],
    std: [f64; 3],
}

impl Normalize {
    pub fn new(mean: [f64; 3], std: [f64; 3]) -> Result<Self> {
        ensure!(std.iter().all(|&value| value > 0.0), "std must be positive");
        Ok(Self { mean, std })
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl ImageTransform for Normalize {
    fn forward(
        &self,
        _rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        let image = tch::no_grad(|| -> Result<_> {
            let (channels, _height, _width) = image.size3()?;
            ensure!(
                channels == 3,
                "channel size must be 3, but get {}",
                channels
            );

            let image = match image.kind() {
                Kind::Uint8 => image.to_kind(Kind::Float) / 255.0,
                Kind::Float => image,
                kind => bail!("unsupported image kind {:?}", kind),
            };
            let mean = Tensor::of_slice(&self.mean.map(|value| value as f32)).view([3, 1, 1]);
            let std = Tensor::of_slice(&self.std.map(|value| value as f32)).view([3, 1, 1]);
            Ok((image - mean) / std)
        })?;

        let target = target.map(|mut target| {
            target.normalized = true;
            target
        });

        Ok((image, target))
    }
}
