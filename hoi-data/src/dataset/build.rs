use super::{HoiDataset, HoiDatasetInit, RandomAccessDataset};
use crate::{
    annotation::load_annotations,
    assets::EmbeddingTable,
    common::*,
    config::{DatasetConfig, ImageSet},
    processor::make_transforms,
};

/// Build the dataset of the configured image set from a V-COCO root.
pub fn build(config: &DatasetConfig) -> Result<HoiDataset> {
    let DatasetConfig {
        ref hoi_path,
        image_set,
        num_queries,
        ref dataset_file,
        ref replacement,
        seed,
        ..
    } = *config;

    ensure!(
        dataset_file == "vcoco",
        "unsupported dataset file '{}', expect 'vcoco'",
        dataset_file
    );
    ensure!(
        hoi_path.exists(),
        "provided HOI path '{}' does not exist",
        hoi_path.display()
    );

    let paths = config.resolve_paths();
    let annotations = load_annotations(&paths.annotation_file)?;
    let embeddings = EmbeddingTable::load(&paths.embedding_file)?;

    let mut dataset = HoiDatasetInit {
        image_set,
        image_dir: paths.image_dir,
        annotations,
        embeddings,
        transforms: Some(make_transforms(image_set)?),
        num_queries,
        replacement: replacement.clone(),
        seed,
    }
    .build()?;

    match image_set {
        ImageSet::Train => {
            dataset.compute_nohoi_index();
            dataset.load_sim_index(&paths.sim_index_file)?;
        }
        ImageSet::Val => {
            dataset.load_correct_mat(&paths.correct_mat_file)?;
        }
    }

    info!(
        "loaded {:?} set with {} records, {} without interactions",
        image_set,
        dataset.num_records(),
        dataset.nohoi_index().len()
    );

    Ok(dataset)
}
