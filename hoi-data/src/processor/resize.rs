use super::{ImageTransform, TransformTarget};
use crate::common::*;

/// Resize so that the shorter side matches a size picked at random.
///
/// If `max_size` is set, the picked size shrinks so that the longer side does
/// not exceed it.
#[derive(Debug, Clone)]
pub struct RandomResize {
    sizes: Vec<i64>,
    max_size: Option<i64>,
}

impl RandomResize {
    pub fn new(sizes: Vec<i64>, max_size: Option<i64>) -> Result<Self> {
        ensure!(!sizes.is_empty(), "sizes must not be empty");
        ensure!(sizes.iter().all(|&size| size > 0), "sizes must be positive");
        if let Some(max_size) = max_size {
            ensure!(max_size > 0, "max_size must be positive");
        }
        Ok(Self { sizes, max_size })
    }
}

impl ImageTransform for RandomResize {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        let size = *self
            .sizes
            .choose(rng)
            .ok_or_else(|| format_err!("sizes must not be empty"))?;
        resize(&image, target, size, self.max_size)
    }
}

/// Compute the `[h, w]` output size that keeps the aspect ratio.
pub fn size_with_aspect_ratio(orig: HW<i64>, size: i64, max_size: Option<i64>) -> HW<i64> {
    let [h, w] = orig.hw();
    let (min_orig, max_orig) = orig.min_max();
    let (min_orig, max_orig) = (min_orig as f64, max_orig as f64);

    let size = match max_size {
        Some(max_size) if max_orig / min_orig * size as f64 > max_size as f64 => {
            round_half_even(max_size as f64 * min_orig / max_orig) as i64
        }
        _ => size,
    };

    if (w <= h && w == size) || (h <= w && h == size) {
        return orig;
    }

    let (new_h, new_w) = if w < h {
        (size * h / w, size)
    } else {
        (size, size * w / h)
    };
    HW::from_hw([new_h, new_w])
}

fn round_half_even(value: f64) -> f64 {
    if (value - value.trunc()).abs() == 0.5 {
        (value / 2.0).round() * 2.0
    } else {
        value.round()
    }
}

pub fn resize(
    image: &Tensor,
    target: Option<TransformTarget>,
    size: i64,
    max_size: Option<i64>,
) -> Result<(Tensor, Option<TransformTarget>)> {
    tch::no_grad(|| -> Result<_> {
        let (_channels, height, width) = image.size3()?;
        let orig = HW::from_hw([height, width]);
        ensure!(
            !orig.is_empty(),
            "cannot resize an empty image of size {}x{}",
            height,
            width
        );
        let new_size = size_with_aspect_ratio(orig, size, max_size);
        let [new_h, new_w] = new_size.hw();

        let resized = if new_size == orig {
            image.shallow_clone()
        } else {
            resize_exact(image, new_h, new_w)?
        };

        let target = target
            .map(|mut target| -> Result<_> {
                target.ensure_pixel_boxes("RandomResize")?;
                let transform =
                    BoxTransform::from_sizes_exact(&orig.to_f32(), &new_size.to_f32());
                target
                    .labels
                    .iter_mut()
                    .for_each(|label| *label = &transform * &*label);
                target.size = new_size;
                Ok(target)
            })
            .transpose()?;

        Ok((resized, target))
    })
}

/// Resize a `[channels, h, w]` image, keeping its element kind.
pub fn resize_exact(image: &Tensor, new_h: i64, new_w: i64) -> Result<Tensor> {
    let resized = match image.kind() {
        Kind::Uint8 => vision::image::resize(image, new_w, new_h)?,
        Kind::Float => {
            let pixels = (image * 255.0)
                .round()
                .clamp(0.0, 255.0)
                .to_kind(Kind::Uint8);
            vision::image::resize(&pixels, new_w, new_h)?.to_kind(Kind::Float) / 255.0
        }
        kind => bail!("unsupported image kind {:?}", kind),
    };
    Ok(resized)
}
