use anyhow::{Context, Result};
use clap::Parser;
use hoi_data::{DatasetConfig, HoiDataset, RandomAccessDataset, Target};
use prettytable::{cell, row, Table};
use std::{
    env,
    path::{Path, PathBuf},
};
use tch::Tensor;

#[derive(Debug, Clone, Parser)]
/// Inspect a V-COCO dataset
enum Opts {
    /// Print record and annotation counts
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    /// Load one example and print its tensor shapes
    Inspect {
        /// configuration file
        config_file: PathBuf,
        /// record index
        index: usize,
    },
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file } => {
            info(config_file)?;
        }
        Opts::Inspect { config_file, index } => {
            inspect(config_file, index)?;
        }
    }

    Ok(())
}

fn load_dataset(config_file: impl AsRef<Path>) -> Result<HoiDataset> {
    let config_file = config_file.as_ref();
    let config = DatasetConfig::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    hoi_data::build(&config)
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let dataset = load_dataset(config_file)?;
    let annotations = dataset.annotations();

    let num_objects: usize = annotations.iter().map(|anno| anno.annotations.len()).sum();
    let num_hois: usize = annotations
        .iter()
        .map(|anno| anno.hoi_annotation.len())
        .sum();
    let num_hoi_free = annotations.iter().filter(|anno| anno.is_hoi_free()).count();

    let mut table = Table::new();
    table.add_row(row!["image set", format!("{:?}", dataset.image_set())]);
    table.add_row(row!["records", dataset.num_records()]);
    table.add_row(row!["objects", num_objects]);
    table.add_row(row!["interactions", num_hois]);
    table.add_row(row!["records without interactions", num_hoi_free]);
    table.add_row(row!["embedding dim", dataset.embeddings().dim()]);
    table.add_row(row!["similarity entries", dataset.sim_index().len()]);
    table.printstd();

    Ok(())
}

fn inspect(config_file: impl AsRef<Path>, index: usize) -> Result<()> {
    let dataset = load_dataset(config_file)?;
    let example = dataset.nth(index)?;

    let mut table = Table::new();
    table.add_row(row!["field", "shape", "kind"]);
    let mut add = |name: &str, tensor: &Tensor| {
        table.add_row(row![
            name,
            format!("{:?}", tensor.size()),
            format!("{:?}", tensor.kind())
        ]);
    };

    add("image", &example.image);
    match &example.target {
        Target::Train(target) => {
            add("orig_size", &target.orig_size);
            add("size", &target.size);
            add("boxes", &target.boxes);
            add("labels", &target.labels);
            add("iscrowd", &target.iscrowd);
            add("area", &target.area);
            add("obj_labels", &target.obj_labels);
            add("verb_labels", &target.verb_labels);
            add("sub_boxes", &target.sub_boxes);
            add("obj_boxes", &target.obj_boxes);
            add("gt_items", &target.gt_items);
        }
        Target::Eval(target) => {
            add("orig_size", &target.orig_size);
            add("size", &target.size);
            add("boxes", &target.boxes);
            add("labels", &target.labels);
            add("hois", &target.hois);
            println!("id = {}, img_id = {}", target.id, target.img_id);
        }
    }
    table.printstd();

    Ok(())
}
