//! Precomputed lookup tables loaded once before iteration.

use crate::{common::*, vocab::NO_OBJECT_LABEL};

/// Per-label object embeddings, a `[num_labels, dim]` float matrix.
#[derive(Debug, TensorLike)]
pub struct EmbeddingTable {
    table: Tensor,
}

impl EmbeddingTable {
    /// Load the table from a `.npy` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Tensor::read_npy(path)
            .with_context(|| format!("failed to load embedding file '{}'", path.display()))?;
        Self::new(table)
    }

    pub fn new(table: Tensor) -> Result<Self> {
        let (num_rows, _dim) = table
            .size2()
            .with_context(|| "embedding table must be two dimensional")?;
        ensure!(
            num_rows > NO_OBJECT_LABEL,
            "embedding table has {} rows, but the no-object label {} needs a row",
            num_rows,
            NO_OBJECT_LABEL
        );

        let table = table
            .to_kind(Kind::Float)
            .to_device(Device::Cpu)
            .set_requires_grad(false);
        Ok(Self { table })
    }

    pub fn dim(&self) -> i64 {
        self.table.size()[1]
    }

    pub fn num_rows(&self) -> i64 {
        self.table.size()[0]
    }

    /// Gather the rows of the given labels into a `[labels.len(), dim]` tensor.
    pub fn lookup(&self, labels: &[i64]) -> Result<Tensor> {
        let num_rows = self.num_rows();
        if let Some(&label) = labels
            .iter()
            .find(|&&label| !(0..num_rows).contains(&label))
        {
            bail!("object label {} is out of embedding table range", label);
        }

        let index = Tensor::of_slice(labels);
        Ok(self.table.index_select(0, &index))
    }
}

/// For each sample, the indices of visually similar samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimIndex {
    table: HashMap<usize, Vec<usize>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SimIndexRepr {
    List(Vec<Vec<usize>>),
    Map(HashMap<usize, Vec<usize>>),
}

impl SimIndex {
    /// Load the table from a pickle file (`.pickle` or `.pkl`) or a JSON file.
    ///
    /// The file holds either a list of index lists, one per sample, or a map
    /// from sample index to index list.
    ///
    /// Indices must be plain integers. Pickles of numpy arrays or numpy integer
    /// scalars reference numpy classes and fail to parse, so convert them with
    /// `tolist()` before dumping.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read similarity file '{}'", path.display()))?;

        let is_pickle = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("pickle" | "pkl")
        );
        let repr: SimIndexRepr = if is_pickle {
            serde_pickle::from_slice(&bytes, serde_pickle::DeOptions::new())
                .with_context(|| format!("failed to parse pickle file '{}'", path.display()))?
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse JSON file '{}'", path.display()))?
        };

        Ok(Self {
            table: repr.into_table(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&[usize]> {
        self.table
            .get(&index)
            .map(|list| list.as_slice())
            .filter(|list| !list.is_empty())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl SimIndexRepr {
    fn into_table(self) -> HashMap<usize, Vec<usize>> {
        match self {
            Self::List(list) => list.into_iter().enumerate().collect(),
            Self::Map(map) => map,
        }
    }
}

impl FromIterator<(usize, Vec<usize>)> for SimIndex {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<usize>)>,
    {
        Self {
            table: iter.into_iter().collect(),
        }
    }
}

/// Load the verb-object co-occurrence matrix from a `.npy` file.
pub fn load_correct_mat(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let mat = Tensor::read_npy(path)
        .with_context(|| format!("failed to load correctness matrix '{}'", path.display()))?;
    ensure!(
        mat.dim() == 2,
        "correctness matrix must be two dimensional, but get shape {:?}",
        mat.size()
    );
    Ok(mat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_lookup() -> Result<()> {
        let table = Tensor::arange(81 * 4, FLOAT_CPU).view([81, 4]);
        let table = EmbeddingTable::new(table)?;
        assert_eq!(table.dim(), 4);

        let rows = table.lookup(&[2, 80])?;
        assert_eq!(rows.size(), vec![2, 4]);
        let values: Vec<f32> = rows.view([-1]).into();
        assert_eq!(values, vec![8.0, 9.0, 10.0, 11.0, 320.0, 321.0, 322.0, 323.0]);

        assert!(table.lookup(&[81]).is_err());
        assert_eq!(table.lookup(&[])?.size(), vec![0, 4]);
        Ok(())
    }

    #[test]
    fn embedding_table_needs_no_object_row() {
        let table = Tensor::zeros(&[80, 4], FLOAT_CPU);
        assert!(EmbeddingTable::new(table).is_err());
    }

    #[test]
    fn embedding_table_from_npy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("embed.npy");
        Tensor::ones(&[81, 8], (Kind::Double, Device::Cpu)).write_npy(&path)?;

        let table = EmbeddingTable::load(&path)?;
        assert_eq!(table.num_rows(), 81);
        assert_eq!(table.dim(), 8);
        assert_eq!(table.lookup(&[0])?.kind(), Kind::Float);
        Ok(())
    }

    #[test]
    fn sim_index_from_json_list_and_map() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let list_path = dir.path().join("sim_list.json");
        std::fs::write(&list_path, "[[1, 2], [], [0]]")?;
        let sim = SimIndex::load(&list_path)?;
        assert_eq!(sim.len(), 3);
        assert_eq!(sim.get(0), Some(&[1, 2][..]));
        assert_eq!(sim.get(1), None);
        assert_eq!(sim.get(3), None);

        let map_path = dir.path().join("sim_map.json");
        std::fs::write(&map_path, r#"{"4": [5, 6]}"#)?;
        let sim = SimIndex::load(&map_path)?;
        assert_eq!(sim.get(4), Some(&[5, 6][..]));
        Ok(())
    }

    #[test]
    fn sim_index_from_pickle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sim.pickle");
        let table: Vec<Vec<usize>> = vec![vec![3, 4, 5], vec![0]];
        let bytes = serde_pickle::to_vec(&table, serde_pickle::SerOptions::new())?;
        std::fs::write(&path, bytes)?;

        let sim = SimIndex::load(&path)?;
        assert_eq!(sim.get(0), Some(&[3, 4, 5][..]));
        assert_eq!(sim.get(1), Some(&[0][..]));
        Ok(())
    }

    #[test]
    fn sim_index_rejects_non_integer_pickle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sim.pkl");
        let table = vec![vec!["3", "4"]];
        let bytes = serde_pickle::to_vec(&table, serde_pickle::SerOptions::new())?;
        std::fs::write(&path, bytes)?;

        let err = SimIndex::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse pickle file"));
        Ok(())
    }

    #[test]
    fn correct_mat_from_npy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("corre.npy");
        Tensor::ones(&[29, 81], FLOAT_CPU).write_npy(&path)?;
        assert_eq!(load_correct_mat(&path)?.size(), vec![29, 81]);
        Ok(())
    }
}
