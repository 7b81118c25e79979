//! The random photometric distortion algorithm.

use super::{ImageTransform, TransformTarget};
use crate::common::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorJitterInit {
    pub brightness: Option<R64>,
    pub contrast: Option<R64>,
    pub saturation: Option<R64>,
}

impl ColorJitterInit {
    pub fn build(self) -> Result<ColorJitter> {
        let Self {
            brightness,
            contrast,
            saturation,
        } = self;

        let factor_range = |name: &str, value: Option<R64>| -> Result<_> {
            value
                .map(|value| {
                    ensure!(value >= 0.0, "{} must be non-negative", name);
                    let value = value.raw();
                    Ok(((1.0 - value).max(0.0), 1.0 + value))
                })
                .transpose()
        };

        Ok(ColorJitter {
            brightness: factor_range("brightness", brightness)?,
            contrast: factor_range("contrast", contrast)?,
            saturation: factor_range("saturation", saturation)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Adjustment {
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
}

/// Randomly change brightness, contrast and saturation in a random order.
#[derive(Debug, Clone)]
pub struct ColorJitter {
    brightness: Option<(f64, f64)>,
    contrast: Option<(f64, f64)>,
    saturation: Option<(f64, f64)>,
}

impl ColorJitter {
    fn sample_adjustments(&self, rng: &mut StdRng) -> Vec<Adjustment> {
        let mut sample = |range: Option<(f64, f64)>| {
            range.map(|(lo, up)| if lo < up { rng.gen_range(lo..=up) } else { lo })
        };

        let mut adjustments: Vec<_> = [
            sample(self.brightness).map(Adjustment::Brightness),
            sample(self.contrast).map(Adjustment::Contrast),
            sample(self.saturation).map(Adjustment::Saturation),
        ]
        .into_iter()
        .flatten()
        .collect();
        adjustments.shuffle(rng);
        adjustments
    }

    fn adjust(rgb: &Tensor, adjustments: &[Adjustment]) -> Result<Tensor> {
        let (channels, _height, _width) = rgb.size3()?;
        ensure!(
            channels == 3,
            "channel size must be 3, but get {}",
            channels
        );

        let kind = rgb.kind();
        let rgb = match kind {
            Kind::Uint8 => rgb.to_kind(Kind::Float) / 255.0,
            Kind::Float => rgb.shallow_clone(),
            _ => bail!("unsupported image kind {:?}", kind),
        };

        let output = adjustments
            .iter()
            .fold(rgb, |rgb, adjustment| match *adjustment {
                Adjustment::Brightness(factor) => (&rgb * factor).clamp(0.0, 1.0),
                Adjustment::Contrast(factor) => {
                    let mean = grayscale(&rgb).mean(Kind::Float);
                    blend(&rgb, &mean, factor)
                }
                Adjustment::Saturation(factor) => {
                    let gray = grayscale(&rgb).unsqueeze(0);
                    blend(&rgb, &gray, factor)
                }
            });

        let output = match kind {
            Kind::Uint8 => (output * 255.0).round().to_kind(Kind::Uint8),
            _ => output,
        };
        Ok(output)
    }
}

impl ImageTransform for ColorJitter {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        let adjustments = self.sample_adjustments(rng);
        let image = tch::no_grad(|| Self::adjust(&image, &adjustments))?;
        Ok((image, target))
    }
}

/// ITU-R 601-2 luma of a `[3, h, w]` float image.
fn grayscale(rgb: &Tensor) -> Tensor {
    rgb.get(0) * 0.299 + rgb.get(1) * 0.587 + rgb.get(2) * 0.114
}

fn blend(image: &Tensor, other: &Tensor, factor: f64) -> Tensor {
    (image * factor + other * (1.0 - factor)).clamp(0.0, 1.0)
}
