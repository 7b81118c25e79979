//! Image file loading.

use crate::common::*;

/// Load an RGB image as a `[3, height, width]` `Uint8` tensor on CPU.
pub fn load_image(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let image = tch::no_grad(|| vision::image::load(path))
        .with_context(|| format!("failed to load image file '{}'", path.display()))?;

    let (channels, height, width) = image.size3()?;
    ensure!(
        channels == 3,
        "expect an RGB image, but '{}' has {} channels",
        path.display(),
        channels
    );
    ensure!(
        height > 0 && width > 0,
        "image '{}' is empty",
        path.display()
    );

    Ok(image.set_requires_grad(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_saved_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("image.png");
        let image = Tensor::full(&[3, 6, 9], 128i64, (Kind::Uint8, Device::Cpu));
        vision::image::save(&image, &path)?;

        let loaded = load_image(&path)?;
        assert_eq!(loaded.size(), vec![3, 6, 9]);
        assert_eq!(loaded.kind(), Kind::Uint8);
        assert_eq!(i64::from(loaded.i((1, 3, 4))), 128);
        Ok(())
    }

    #[test]
    fn missing_image_is_an_error() {
        assert!(load_image("/nonexistent/image.jpg").is_err());
    }
}
