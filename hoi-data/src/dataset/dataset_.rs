use crate::{common::*, target::HoiExample};

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: Debug + Sync + Send,
{
    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth example in the dataset.
    fn nth(&self, index: usize) -> Result<HoiExample>;
}
