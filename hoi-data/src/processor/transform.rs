//! The transform interface and combinators.

use crate::common::*;

/// Boxes and bookkeeping that travel through the transform pipeline.
///
/// Boxes stay in pixel corner format. Every transform that removes a box
/// removes its whole [ObjectLabel], so `source` keeps pointing at the
/// annotation each box came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformTarget {
    pub labels: Vec<ObjectLabel>,
    /// Current image size.
    pub size: HW<i64>,
    /// Set by [Normalize](super::Normalize). Boxes are then emitted in
    /// normalized center format.
    pub normalized: bool,
}

impl TransformTarget {
    pub fn new(labels: Vec<ObjectLabel>, size: HW<i64>) -> Self {
        Self {
            labels,
            size,
            normalized: false,
        }
    }

    /// Annotation positions of the surviving boxes.
    pub fn sources(&self) -> Vec<usize> {
        self.labels.iter().map(|label| label.source).collect()
    }

    pub fn classes(&self) -> Vec<i64> {
        self.labels.iter().map(|label| label.class).collect()
    }

    /// Box areas in pixels.
    pub fn areas(&self) -> Vec<f32> {
        self.labels.iter().map(|label| label.rect.area()).collect()
    }

    /// Boxes in the output format, pixel corners or normalized centers.
    pub fn output_boxes(&self) -> Vec<[f32; 4]> {
        let size = self.size.to_f32();
        self.labels
            .iter()
            .map(|label| {
                if self.normalized {
                    label.rect.to_cxcywh().normalize(&size).into_raw()
                } else {
                    label.rect.into_raw()
                }
            })
            .collect()
    }

    pub(crate) fn ensure_pixel_boxes(&self, name: &str) -> Result<()> {
        ensure!(
            !self.normalized,
            "{} must be applied before Normalize",
            name
        );
        Ok(())
    }
}

/// An augmentation step on an image and its optional boxes.
///
/// Images are `[channels, height, width]` tensors. Geometric steps expect
/// `Uint8` pixels and [Normalize](super::Normalize) turns them into floats.
pub trait ImageTransform
where
    Self: Debug + Send + Sync,
{
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)>;
}

/// Apply transforms in sequence.
#[derive(Debug)]
pub struct Compose {
    transforms: Vec<Box<dyn ImageTransform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn ImageTransform>>) -> Self {
        Self { transforms }
    }
}

impl ImageTransform for Compose {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        self.transforms
            .iter()
            .try_fold((image, target), |(image, target), transform| {
                transform.forward(rng, image, target)
            })
    }
}

/// Apply the first transform with probability `prob`, otherwise the second.
#[derive(Debug)]
pub struct RandomSelect {
    first: Box<dyn ImageTransform>,
    second: Box<dyn ImageTransform>,
    prob: f64,
}

impl RandomSelect {
    pub fn new(first: Box<dyn ImageTransform>, second: Box<dyn ImageTransform>) -> Self {
        Self {
            first,
            second,
            prob: 0.5,
        }
    }

    pub fn with_prob(mut self, prob: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&prob),
            "prob must be between 0.0 and 1.0"
        );
        self.prob = prob;
        Ok(self)
    }
}

impl ImageTransform for RandomSelect {
    fn forward(
        &self,
        rng: &mut StdRng,
        image: Tensor,
        target: Option<TransformTarget>,
    ) -> Result<(Tensor, Option<TransformTarget>)> {
        if rng.gen::<f64>() < self.prob {
            self.first.forward(rng, image, target)
        } else {
            self.second.forward(rng, image, target)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn label(xyxy: [f32; 4], class: i64, source: usize) -> ObjectLabel {
        ObjectLabel {
            rect: XYXY::from_raw(xyxy),
            class,
            source,
        }
    }

    #[derive(Debug)]
    struct DropFirst;

    impl ImageTransform for DropFirst {
        fn forward(
            &self,
            _rng: &mut StdRng,
            image: Tensor,
            target: Option<TransformTarget>,
        ) -> Result<(Tensor, Option<TransformTarget>)> {
            let target = target.map(|mut target| {
                target.labels.remove(0);
                target
            });
            Ok((image, target))
        }
    }

    #[test]
    fn compose_keeps_sources_aligned() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let target = TransformTarget::new(
            vec![
                label([0.0, 0.0, 1.0, 1.0], 4, 0),
                label([0.0, 0.0, 2.0, 2.0], 5, 1),
                label([0.0, 0.0, 3.0, 3.0], 6, 2),
            ],
            HW::from_hw([10, 10]),
        );
        let compose = Compose::new(vec![Box::new(DropFirst), Box::new(DropFirst)]);
        let image = Tensor::zeros(&[3, 10, 10], (Kind::Uint8, Device::Cpu));
        let (_, target) = compose.forward(&mut rng, image, Some(target))?;
        let target = target.unwrap();

        assert_eq!(target.sources(), vec![2]);
        assert_eq!(target.classes(), vec![6]);
        assert_eq!(target.areas(), vec![9.0]);
        Ok(())
    }

    #[test]
    fn output_boxes_follow_normalization() {
        let mut target = TransformTarget::new(
            vec![label([10.0, 20.0, 30.0, 60.0], 0, 0)],
            HW::from_hw([80, 40]),
        );
        assert_eq!(target.output_boxes(), vec![[10.0, 20.0, 30.0, 60.0]]);

        target.normalized = true;
        assert_eq!(target.output_boxes(), vec![[0.5, 0.5, 0.5, 0.5]]);
        assert!(target.ensure_pixel_boxes("Flip").is_err());
    }

    #[test]
    fn random_select_prob_bounds() {
        let select = RandomSelect::new(Box::new(DropFirst), Box::new(DropFirst));
        assert!(select.with_prob(1.5).is_err());
    }
}
