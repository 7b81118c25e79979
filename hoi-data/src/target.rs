//! Supervision records emitted by the dataset.

use crate::common::*;

/// The target of a training example.
#[derive(Debug, TensorLike)]
pub struct TrainTarget {
    /// `[h, w]` of the loaded image.
    pub orig_size: Tensor,
    /// `[h, w]` after augmentation.
    pub size: Tensor,
    /// Object boxes with shape `[num_objects, 4]`.
    pub boxes: Tensor,
    /// Dense object labels with shape `[num_objects]`.
    pub labels: Tensor,
    pub iscrowd: Tensor,
    pub area: Tensor,
    /// Target object labels of interactions with shape `[num_pairs]`.
    pub obj_labels: Tensor,
    /// Multi-hot verbs with shape `[num_pairs, NUM_VERBS]`.
    pub verb_labels: Tensor,
    pub sub_boxes: Tensor,
    pub obj_boxes: Tensor,
    /// Object embedding and pair geometry with shape `[num_pairs, dim + 12]`.
    pub gt_items: Tensor,
}

/// The target of an evaluation example.
#[derive(Debug, TensorLike)]
pub struct EvalTarget {
    pub orig_size: Tensor,
    pub size: Tensor,
    /// Unfiltered object boxes in pixel corner format.
    pub boxes: Tensor,
    pub labels: Tensor,
    /// The dataset index of the example.
    #[tensor_like(copy)]
    pub id: usize,
    /// The image id parsed from the file name.
    #[tensor_like(copy)]
    pub img_id: i64,
    /// `(subject, object, verb)` triples with shape `[num_hois, 3]`.
    pub hois: Tensor,
}

#[derive(Debug, TensorLike)]
pub enum Target {
    Train(TrainTarget),
    Eval(EvalTarget),
}

impl Target {
    pub fn as_train(&self) -> Option<&TrainTarget> {
        match self {
            Self::Train(target) => Some(target),
            Self::Eval(_) => None,
        }
    }

    pub fn as_eval(&self) -> Option<&EvalTarget> {
        match self {
            Self::Train(_) => None,
            Self::Eval(target) => Some(target),
        }
    }
}

impl From<TrainTarget> for Target {
    fn from(from: TrainTarget) -> Self {
        Self::Train(from)
    }
}

impl From<EvalTarget> for Target {
    fn from(from: EvalTarget) -> Self {
        Self::Eval(from)
    }
}

/// A `[3, h, w]` float image with its target.
#[derive(Debug, TensorLike)]
pub struct HoiExample {
    pub image: Tensor,
    pub target: Target,
}
