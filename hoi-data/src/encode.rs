//! Interaction encoding after augmentation.

use crate::{
    annotation::HoiAnnotation,
    assets::EmbeddingTable,
    common::*,
    vocab::{verb_label, NO_OBJECT_LABEL, NUM_VERBS},
};

/// Number of geometric features appended to the object embedding.
pub const NUM_GEOMETRY_FEATURES: i64 = 12;

/// A subject-object pair with all its verbs.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub obj_label: i64,
    pub verbs: [f32; NUM_VERBS],
    pub sub_box: [f32; 4],
    /// Zeros if the interaction has no target object.
    pub obj_box: [f32; 4],
}

impl Interaction {
    /// Both boxes, the offset between their first two coordinates and the
    /// products of their last two coordinates.
    pub fn geometry(&self) -> [f32; NUM_GEOMETRY_FEATURES as usize] {
        let [s0, s1, s2, s3] = self.sub_box;
        let [o0, o1, o2, o3] = self.obj_box;
        [
            s0,
            s1,
            s2,
            s3,
            o0,
            o1,
            o2,
            o3,
            s0 - o0,
            s1 - o1,
            s2 * s3,
            o2 * o3,
        ]
    }
}

/// Objects that survived augmentation, aligned by position.
#[derive(Debug, Clone, Copy)]
pub struct KeptObjects<'a> {
    /// Position of each box in the annotation object list.
    pub sources: &'a [usize],
    pub boxes: &'a [[f32; 4]],
    pub labels: &'a [i64],
}

/// Merge interactions by `(subject, object)` pair.
///
/// Entries whose subject or object box was dropped are skipped. Pairs are
/// emitted in order of first appearance.
pub fn encode_interactions(
    hois: &[HoiAnnotation],
    kept: KeptObjects<'_>,
) -> Result<Vec<Interaction>> {
    let KeptObjects {
        sources,
        boxes,
        labels,
    } = kept;
    ensure!(
        sources.len() == boxes.len() && sources.len() == labels.len(),
        "kept objects have mismatched lengths: {} sources, {} boxes, {} labels",
        sources.len(),
        boxes.len(),
        labels.len()
    );

    let positions: HashMap<i64, usize> = sources
        .iter()
        .enumerate()
        .map(|(position, &source)| (source as i64, position))
        .collect();

    let mut pairs: IndexMap<(i64, i64), Interaction> = IndexMap::new();

    for hoi in hois {
        let sub_pos = match positions.get(&hoi.subject_id) {
            Some(&pos) => pos,
            None => continue,
        };
        let obj_pos = if hoi.has_object() {
            match positions.get(&hoi.object_id) {
                Some(&pos) => Some(pos),
                None => continue,
            }
        } else {
            None
        };
        let verb = verb_label(hoi.category_id)?;

        let interaction = pairs
            .entry((hoi.subject_id, hoi.object_id))
            .or_insert_with(|| {
                let (obj_label, obj_box) = match obj_pos {
                    Some(pos) => (labels[pos], boxes[pos]),
                    None => (NO_OBJECT_LABEL, [0.0; 4]),
                };
                Interaction {
                    obj_label,
                    verbs: [0.0; NUM_VERBS],
                    sub_box: boxes[sub_pos],
                    obj_box,
                }
            });
        interaction.verbs[verb] = 1.0;
    }

    Ok(pairs.into_values().collect())
}

/// Interaction tensors of a training target.
#[derive(Debug, TensorLike)]
pub struct InteractionTensors {
    pub obj_labels: Tensor,
    pub verb_labels: Tensor,
    pub sub_boxes: Tensor,
    pub obj_boxes: Tensor,
    pub gt_items: Tensor,
}

impl InteractionTensors {
    pub fn new(interactions: &[Interaction], embeddings: &EmbeddingTable) -> Result<Self> {
        let num_pairs = interactions.len() as i64;

        let obj_labels: Vec<i64> = interactions.iter().map(|item| item.obj_label).collect();
        let verbs: Vec<f32> = interactions.iter().flat_map(|item| item.verbs).collect();
        let sub_boxes: Vec<[f32; 4]> = interactions.iter().map(|item| item.sub_box).collect();
        let obj_boxes: Vec<[f32; 4]> = interactions.iter().map(|item| item.obj_box).collect();
        let geometry: Vec<_> = interactions.iter().map(|item| item.geometry()).collect();

        let embedded = embeddings.lookup(&obj_labels)?;
        let geometry =
            Tensor::of_slice(geometry.flat()).view([num_pairs, NUM_GEOMETRY_FEATURES]);
        let gt_items = Tensor::cat(&[embedded, geometry], 1);

        Ok(Self {
            obj_labels: Tensor::of_slice(&obj_labels),
            verb_labels: Tensor::of_slice(&verbs).view([num_pairs, NUM_VERBS as i64]),
            sub_boxes: Tensor::of_slice(sub_boxes.flat()).view([num_pairs, 4]),
            obj_boxes: Tensor::of_slice(obj_boxes.flat()).view([num_pairs, 4]),
            gt_items,
        })
    }
}

/// Encode raw `(subject, object, verb)` triples as a `[num_hois, 3]` tensor.
pub fn encode_triples(hois: &[HoiAnnotation]) -> Result<Tensor> {
    let triples: Vec<[i64; 3]> = hois
        .iter()
        .map(|hoi| -> Result<_> {
            let verb = verb_label(hoi.category_id)? as i64;
            Ok([hoi.subject_id, hoi.object_id, verb])
        })
        .try_collect()?;
    Ok(Tensor::of_slice(triples.flat()).view([triples.len() as i64, 3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hoi(subject_id: i64, object_id: i64, category_id: i64) -> HoiAnnotation {
        HoiAnnotation {
            subject_id,
            object_id,
            category_id,
        }
    }

    const BOXES: [[f32; 4]; 3] = [
        [0.5, 0.5, 0.2, 0.4],
        [0.25, 0.75, 0.1, 0.1],
        [0.9, 0.1, 0.2, 0.2],
    ];

    #[test]
    fn repeated_pair_merges_verbs() -> Result<()> {
        let hois = [hoi(0, 1, 3), hoi(0, 1, 7), hoi(0, 2, 3)];
        let kept = KeptObjects {
            sources: &[0, 1, 2],
            boxes: &BOXES,
            labels: &[0, 41, 60],
        };
        let items = encode_interactions(&hois, kept)?;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].obj_label, 41);
        assert_eq!(items[0].verbs[3], 1.0);
        assert_eq!(items[0].verbs[7], 1.0);
        assert_eq!(items[0].verbs.iter().sum::<f32>(), 2.0);
        assert_eq!(items[0].sub_box, BOXES[0]);
        assert_eq!(items[0].obj_box, BOXES[1]);
        assert_eq!(items[1].obj_label, 60);
        assert_eq!(items[1].verbs.iter().sum::<f32>(), 1.0);
        Ok(())
    }

    #[test]
    fn sentinel_object_has_no_box() -> Result<()> {
        let hois = [hoi(0, -1, 5), hoi(0, -1, 6)];
        let kept = KeptObjects {
            sources: &[0],
            boxes: &BOXES[..1],
            labels: &[0],
        };
        let items = encode_interactions(&hois, kept)?;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].obj_label, NO_OBJECT_LABEL);
        assert_eq!(items[0].obj_box, [0.0; 4]);
        assert_eq!(items[0].verbs[5], 1.0);
        assert_eq!(items[0].verbs[6], 1.0);
        Ok(())
    }

    #[test]
    fn dropped_boxes_remove_references() -> Result<()> {
        // box 1 was removed by augmentation
        let hois = [hoi(0, 1, 2), hoi(1, 2, 2), hoi(0, 2, 4), hoi(1, -1, 8)];
        let kept = KeptObjects {
            sources: &[0, 2],
            boxes: &[BOXES[0], BOXES[2]],
            labels: &[0, 60],
        };
        let items = encode_interactions(&hois, kept)?;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].obj_label, 60);
        assert_eq!(items[0].obj_box, BOXES[2]);
        assert_eq!(items[0].verbs[4], 1.0);
        Ok(())
    }

    #[test]
    fn invalid_verb_of_kept_pair_fails() {
        let kept = KeptObjects {
            sources: &[0, 1],
            boxes: &BOXES[..2],
            labels: &[0, 1],
        };
        assert!(encode_interactions(&[hoi(0, 1, 29)], kept).is_err());
        // skipped entries are not validated
        assert!(encode_interactions(&[hoi(0, 5, 29)], kept).is_ok());
    }

    #[test]
    fn geometry_features() {
        let item = Interaction {
            obj_label: 1,
            verbs: [0.0; NUM_VERBS],
            sub_box: [0.5, 0.5, 0.2, 0.4],
            obj_box: [0.25, 0.75, 0.5, 0.5],
        };
        let expect = [
            0.5, 0.5, 0.2, 0.4, 0.25, 0.75, 0.5, 0.5, 0.25, -0.25, 0.08, 0.25,
        ];
        for (lhs, rhs) in item.geometry().iter().zip_eq(expect) {
            assert_abs_diff_eq!(*lhs, rhs, epsilon = 1e-6);
        }
    }

    #[test]
    fn interaction_tensors_layout() -> Result<()> {
        let embeddings = EmbeddingTable::new(
            Tensor::arange(81 * 4, FLOAT_CPU).view([81, 4]),
        )?;
        let hois = [hoi(0, 1, 3), hoi(0, -1, 1)];
        let kept = KeptObjects {
            sources: &[0, 1],
            boxes: &BOXES[..2],
            labels: &[0, 2],
        };
        let items = encode_interactions(&hois, kept)?;
        let tensors = InteractionTensors::new(&items, &embeddings)?;

        assert_eq!(tensors.obj_labels.size(), vec![2]);
        assert_eq!(Vec::<i64>::from(&tensors.obj_labels), vec![2, 80]);
        assert_eq!(tensors.verb_labels.size(), vec![2, 29]);
        assert_eq!(tensors.verb_labels.kind(), Kind::Float);
        assert_eq!(tensors.sub_boxes.size(), vec![2, 4]);
        assert_eq!(tensors.gt_items.size(), vec![2, 16]);

        // embedding of label 2 followed by the geometry
        let first = Vec::<f32>::from(&tensors.gt_items.i(0));
        assert_eq!(&first[..4], &[8.0, 9.0, 10.0, 11.0]);
        assert_eq!(&first[4..8], &BOXES[0]);
        assert_eq!(&first[8..12], &BOXES[1]);
        // sentinel row uses the last embedding and a zero object box
        let second = Vec::<f32>::from(&tensors.gt_items.i(1));
        assert_eq!(&second[..4], &[320.0, 321.0, 322.0, 323.0]);
        assert_eq!(&second[8..12], &[0.0; 4]);
        Ok(())
    }

    #[test]
    fn empty_interactions_have_zero_rows() -> Result<()> {
        let embeddings = EmbeddingTable::new(Tensor::zeros(&[81, 512], FLOAT_CPU))?;
        let tensors = InteractionTensors::new(&[], &embeddings)?;

        assert_eq!(tensors.obj_labels.size(), vec![0]);
        assert_eq!(tensors.verb_labels.size(), vec![0, 29]);
        assert_eq!(tensors.sub_boxes.size(), vec![0, 4]);
        assert_eq!(tensors.obj_boxes.size(), vec![0, 4]);
        assert_eq!(tensors.gt_items.size(), vec![0, 524]);
        Ok(())
    }

    #[test]
    fn triples_are_kept_verbatim() -> Result<()> {
        let hois = [hoi(0, 1, 3), hoi(0, 1, 3), hoi(2, -1, 28)];
        let triples = encode_triples(&hois)?;

        assert_eq!(triples.size(), vec![3, 3]);
        assert_eq!(triples.kind(), Kind::Int64);
        assert_eq!(
            Vec::<i64>::from(&triples.view([-1])),
            vec![0, 1, 3, 0, 1, 3, 2, -1, 28]
        );
        assert_eq!(encode_triples(&[])?.size(), vec![0, 3]);
        Ok(())
    }
}
