use super::RandomAccessDataset;
use crate::{
    annotation::{parse_image_id, ImageAnnotation},
    assets::{self, EmbeddingTable, SimIndex},
    common::*,
    config::{ImageSet, ReplacementConfig},
    encode::{encode_interactions, encode_triples, InteractionTensors, KeptObjects},
    processor::{
        load_image, select_similar, ImageCompositor, ImageTransform, StitchCompositor,
        TransformTarget,
    },
    target::{EvalTarget, HoiExample, TrainTarget},
    vocab::object_label,
};

/// Initializer of [HoiDataset].
#[derive(Debug)]
pub struct HoiDatasetInit {
    pub image_set: ImageSet,
    pub image_dir: PathBuf,
    pub annotations: Vec<ImageAnnotation>,
    pub embeddings: EmbeddingTable,
    pub transforms: Option<Box<dyn ImageTransform>>,
    /// The maximum number of objects kept per training image.
    pub num_queries: usize,
    pub replacement: ReplacementConfig,
    pub seed: Option<u64>,
}

impl HoiDatasetInit {
    pub fn build(self) -> Result<HoiDataset> {
        let Self {
            image_set,
            image_dir,
            annotations,
            embeddings,
            transforms,
            num_queries,
            replacement: ReplacementConfig { prob, num_similar },
            seed,
        } = self;

        ensure!(num_queries > 0, "num_queries must be positive");
        ensure!(
            (0.0..=1.0).contains(&prob.raw()),
            "replacement probability must be in range [0, 1], but get {}",
            prob
        );

        let compositor: Box<dyn ImageCompositor> = Box::new(StitchCompositor);
        ensure!(
            num_similar + 1 == compositor.num_images(),
            "the stitching compositor takes {} similar images, but num_similar is {}",
            compositor.num_images() - 1,
            num_similar
        );

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(HoiDataset {
            image_set,
            image_dir,
            annotations,
            embeddings,
            transforms,
            compositor,
            num_queries,
            replace_prob: prob,
            num_similar,
            nohoi_index: HashSet::new(),
            sim_index: SimIndex::default(),
            correct_mat: None,
            rng: Mutex::new(rng),
        })
    }
}

/// The V-COCO human-object interaction dataset.
#[derive(Debug)]
pub struct HoiDataset {
    image_set: ImageSet,
    image_dir: PathBuf,
    annotations: Vec<ImageAnnotation>,
    embeddings: EmbeddingTable,
    transforms: Option<Box<dyn ImageTransform>>,
    compositor: Box<dyn ImageCompositor>,
    num_queries: usize,
    replace_prob: R64,
    num_similar: usize,
    nohoi_index: HashSet<usize>,
    sim_index: SimIndex,
    correct_mat: Option<Tensor>,
    rng: Mutex<StdRng>,
}

impl HoiDataset {
    pub fn image_set(&self) -> ImageSet {
        self.image_set
    }

    pub fn annotations(&self) -> &[ImageAnnotation] {
        &self.annotations
    }

    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    /// Indices of records without any interaction with a target object.
    pub fn nohoi_index(&self) -> &HashSet<usize> {
        &self.nohoi_index
    }

    pub fn sim_index(&self) -> &SimIndex {
        &self.sim_index
    }

    /// The verb-object co-occurrence matrix, if loaded.
    pub fn correct_mat(&self) -> Option<&Tensor> {
        self.correct_mat.as_ref()
    }

    /// Replace the compositor used for similar-image replacement.
    pub fn with_compositor(mut self, compositor: Box<dyn ImageCompositor>) -> Result<Self> {
        ensure!(
            self.num_similar + 1 == compositor.num_images(),
            "compositor takes {} images, but num_similar is {}",
            compositor.num_images(),
            self.num_similar
        );
        self.compositor = compositor;
        Ok(self)
    }

    pub fn load_correct_mat(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.correct_mat = Some(assets::load_correct_mat(path)?);
        Ok(())
    }

    pub fn compute_nohoi_index(&mut self) {
        self.nohoi_index = self
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, anno)| anno.is_hoi_free())
            .map(|(index, _)| index)
            .collect();
    }

    pub fn load_sim_index(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.sim_index = SimIndex::load(path)?;
        Ok(())
    }

    pub fn set_sim_index(&mut self, sim_index: SimIndex) {
        self.sim_index = sim_index;
    }

    /// Get the nth example using the given RNG for all random choices.
    pub fn nth_with_rng(&self, index: usize, rng: &mut StdRng) -> Result<HoiExample> {
        ensure!(
            index < self.annotations.len(),
            "index {} is out of range, the dataset has {} records",
            index,
            self.annotations.len()
        );

        let example = match self.image_set {
            ImageSet::Train => self.train_example(index, rng),
            ImageSet::Val => self.eval_example(index, rng),
        };
        example.with_context(|| format!("failed to load record {}", index))
    }

    fn load_record(&self, index: usize) -> Result<(ImageAnnotation, Tensor)> {
        let anno = self
            .annotations
            .get(index)
            .ok_or_else(|| {
                format_err!(
                    "similar record {} is out of range, the dataset has {} records",
                    index,
                    self.annotations.len()
                )
            })?
            .clone();
        let image = load_image(self.image_dir.join(&anno.file_name))?;
        Ok((anno, image))
    }

    /// Pick the records to stitch in place of `index`, with `index` first.
    fn replacement_indices(&self, index: usize, rng: &mut StdRng) -> Option<Vec<usize>> {
        let draw: f64 = rng.gen();
        if draw >= self.replace_prob.raw() || self.nohoi_index.contains(&index) {
            return None;
        }

        let candidates = match self.sim_index.get(index) {
            Some(candidates) => candidates,
            None => {
                debug!("record {} has no similar records", index);
                return None;
            }
        };

        match select_similar(
            rng,
            index,
            candidates,
            &self.nohoi_index,
            self.num_similar,
        ) {
            Some(similar) => Some(iter::once(index).chain(similar).collect()),
            None => {
                warn!(
                    "skip replacement of record {}, too few similar records in {:?}",
                    index, candidates
                );
                None
            }
        }
    }

    fn train_example(&self, index: usize, rng: &mut StdRng) -> Result<HoiExample> {
        let (mut anno, image) = match self.replacement_indices(index, rng) {
            Some(indices) => {
                debug!("replace record {} by stitching {:?}", index, indices);
                let samples: Vec<_> = indices
                    .into_iter()
                    .map(|index| self.load_record(index))
                    .try_collect()?;
                self.compositor.composite(samples)?
            }
            None => self.load_record(index)?,
        };

        let (_channels, height, width) = image.size3()?;
        let size = HW::from_hw([height, width]);
        anno.annotations.truncate(self.num_queries);

        // clamp boxes and drop the empty ones
        let bound = size.to_f32();
        let labels: Vec<ObjectLabel> = anno
            .annotations
            .iter()
            .enumerate()
            .map(|(source, obj)| -> Result<_> {
                Ok(ObjectLabel {
                    rect: XYXY::from_raw(obj.bbox).clamp(&bound),
                    class: object_label(obj.category_id)?,
                    source,
                })
            })
            .filter_ok(|label| label.rect.is_positive())
            .try_collect()?;
        let target = TransformTarget::new(labels, size);

        let (image, target) = match &self.transforms {
            Some(transforms) => {
                let (image, target) = transforms.forward(rng, image, Some(target))?;
                let target =
                    target.ok_or_else(|| format_err!("transforms must keep the target"))?;
                (image, target)
            }
            None => (image, target),
        };

        let sources = target.sources();
        let boxes = target.output_boxes();
        let classes = target.classes();
        let num_objects = boxes.len() as i64;

        let interactions = encode_interactions(
            &anno.hoi_annotation,
            KeptObjects {
                sources: &sources,
                boxes: &boxes,
                labels: &classes,
            },
        )?;
        let InteractionTensors {
            obj_labels,
            verb_labels,
            sub_boxes,
            obj_boxes,
            gt_items,
        } = InteractionTensors::new(&interactions, &self.embeddings)?;

        let target = TrainTarget {
            orig_size: Tensor::of_slice(&[height, width]),
            size: Tensor::of_slice(&target.size.hw()),
            boxes: Tensor::of_slice(boxes.flat()).view([num_objects, 4]),
            labels: Tensor::of_slice(&classes),
            iscrowd: Tensor::zeros(&[num_objects], INT64_CPU),
            area: Tensor::of_slice(&target.areas()),
            obj_labels,
            verb_labels,
            sub_boxes,
            obj_boxes,
            gt_items,
        };

        Ok(HoiExample {
            image: to_float_image(image)?,
            target: target.into(),
        })
    }

    fn eval_example(&self, index: usize, rng: &mut StdRng) -> Result<HoiExample> {
        let (anno, image) = self.load_record(index)?;
        let (_channels, height, width) = image.size3()?;

        let boxes: Vec<[f32; 4]> = anno.annotations.iter().map(|obj| obj.bbox).collect();
        let labels: Vec<i64> = anno
            .annotations
            .iter()
            .map(|obj| object_label(obj.category_id))
            .try_collect()?;
        let img_id = parse_image_id(&anno.file_name)?;
        let hois = encode_triples(&anno.hoi_annotation)?;

        let image = match &self.transforms {
            Some(transforms) => transforms.forward(rng, image, None)?.0,
            None => image,
        };

        let target = EvalTarget {
            orig_size: Tensor::of_slice(&[height, width]),
            size: Tensor::of_slice(&[height, width]),
            boxes: Tensor::of_slice(boxes.flat()).view([boxes.len() as i64, 4]),
            labels: Tensor::of_slice(&labels),
            id: index,
            img_id,
            hois,
        };

        Ok(HoiExample {
            image: to_float_image(image)?,
            target: target.into(),
        })
    }
}

impl RandomAccessDataset for HoiDataset {
    fn num_records(&self) -> usize {
        self.annotations.len()
    }

    /// Get the nth example, drawing a fresh RNG from the dataset RNG.
    fn nth(&self, index: usize) -> Result<HoiExample> {
        let mut rng = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| format_err!("the dataset RNG is poisoned"))?;
            StdRng::seed_from_u64(rng.gen())
        };
        self.nth_with_rng(index, &mut rng)
    }
}

fn to_float_image(image: Tensor) -> Result<Tensor> {
    let image = match image.kind() {
        Kind::Uint8 => image.to_kind(Kind::Float) / 255.0,
        Kind::Float => image,
        kind => bail!("unsupported image kind {:?}", kind),
    };
    Ok(image)
}
