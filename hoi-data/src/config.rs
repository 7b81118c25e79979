//! Dataset configuration format.

use crate::common::*;

/// The dataset split to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSet {
    Train,
    Val,
}

impl ImageSet {
    pub fn is_train(&self) -> bool {
        matches!(self, Self::Train)
    }
}

impl FromStr for ImageSet {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let image_set = match text {
            "train" => Self::Train,
            "val" => Self::Val,
            _ => bail!("unknown image set '{}'", text),
        };
        Ok(image_set)
    }
}

/// The main dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The dataset root with `images/` and `annotations/` directories.
    pub hoi_path: PathBuf,
    pub image_set: ImageSet,
    /// The maximum number of objects kept per training image.
    #[serde(default = "default_num_queries")]
    pub num_queries: usize,
    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,
    #[serde(default)]
    pub replacement: ReplacementConfig,
    /// Seed of the sampling RNG. Drawn from entropy if unset.
    pub seed: Option<u64>,
    #[serde(default)]
    pub paths: AssetPaths,
}

/// Options of the similar-image replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementConfig {
    /// The chance to replace a training sample by a stitched image.
    #[serde(default = "default_replace_prob")]
    pub prob: R64,
    /// The number of similar images stitched with the sample.
    #[serde(default = "default_num_similar")]
    pub num_similar: usize,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            prob: default_replace_prob(),
            num_similar: default_num_similar(),
        }
    }
}

/// Asset path overrides. Relative paths are resolved against `hoi_path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPaths {
    pub image_dir: Option<PathBuf>,
    pub annotation_file: Option<PathBuf>,
    pub embedding_file: Option<PathBuf>,
    pub sim_index_file: Option<PathBuf>,
    pub correct_mat_file: Option<PathBuf>,
}

/// Asset paths after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub image_dir: PathBuf,
    pub annotation_file: PathBuf,
    pub embedding_file: PathBuf,
    pub sim_index_file: PathBuf,
    pub correct_mat_file: PathBuf,
}

impl DatasetConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    /// Resolve asset locations with the standard V-COCO layout as fallback.
    pub fn resolve_paths(&self) -> ResolvedPaths {
        let root = &self.hoi_path;
        let resolve = |custom: &Option<PathBuf>, default: PathBuf| match custom {
            Some(path) => root.join(path),
            None => root.join(default),
        };
        let (image_dir, annotation_file) = match self.image_set {
            ImageSet::Train => (
                Path::new("images").join("train2014"),
                Path::new("annotations").join("trainval_vcoco.json"),
            ),
            ImageSet::Val => (
                Path::new("images").join("val2014"),
                Path::new("annotations").join("test_vcoco.json"),
            ),
        };
        let AssetPaths {
            image_dir: custom_image_dir,
            annotation_file: custom_annotation_file,
            embedding_file,
            sim_index_file,
            correct_mat_file,
        } = &self.paths;

        ResolvedPaths {
            image_dir: resolve(custom_image_dir, image_dir),
            annotation_file: resolve(custom_annotation_file, annotation_file),
            embedding_file: resolve(
                embedding_file,
                Path::new("annotations").join("vcoco_clip.npy"),
            ),
            sim_index_file: resolve(
                sim_index_file,
                Path::new("annotations").join("sim_index_vcoco.pickle"),
            ),
            correct_mat_file: resolve(
                correct_mat_file,
                Path::new("annotations").join("corre_vcoco.npy"),
            ),
        }
    }
}

fn default_num_queries() -> usize {
    100
}

fn default_dataset_file() -> String {
    "vcoco".into()
}

fn default_replace_prob() -> R64 {
    r64(0.15)
}

fn default_num_similar() -> usize {
    3
}
