use crate::error::Result;
use ndarray::{Array1, Array4};
use ndarray_npy::{write_npy, NpzWriter};
use std::fs::{self, File};
use std::path::Path;

/// One materialized split: image tensors paired index-for-index with labels.
#[derive(Debug)]
pub struct DatasetSplit {
    pub images: Array4<u8>,
    pub labels: Array1<f32>,
}

impl DatasetSplit {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Persists the materialized dataset as six parallel `.npy` arrays, with an
/// optional compressed `.npz` archive of the full pre-split corpus.
pub struct DatasetWriter;

impl DatasetWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_splits(
        &self,
        train: &DatasetSplit,
        validation: &DatasetSplit,
        test: &DatasetSplit,
        output_dir: &Path,
    ) -> Result<()> {
        fs::create_dir_all(output_dir)?;

        write_npy(output_dir.join("x_train.npy"), &train.images)?;
        write_npy(output_dir.join("y_train.npy"), &train.labels)?;
        write_npy(output_dir.join("x_val.npy"), &validation.images)?;
        write_npy(output_dir.join("y_val.npy"), &validation.labels)?;
        write_npy(output_dir.join("x_test.npy"), &test.images)?;
        write_npy(output_dir.join("y_test.npy"), &test.labels)?;

        Ok(())
    }

    /// Write the full corpus (before splitting) as one compressed archive.
    pub fn write_archive(
        &self,
        images: &Array4<u8>,
        labels: &Array1<f32>,
        path: &Path,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut npz = NpzWriter::new_compressed(File::create(path)?);
        npz.add_array("images", images)?;
        npz.add_array("labels", labels)?;
        npz.finish()?;

        Ok(())
    }
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array1};
    use tempfile::TempDir;

    fn split(n: usize) -> DatasetSplit {
        DatasetSplit {
            images: Array::zeros((n, 4, 4, 3)),
            labels: Array1::from_elem(n, 1.5f32),
        }
    }

    #[test]
    fn test_write_splits_creates_six_arrays() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("prepared_data");

        DatasetWriter::new().write_splits(&split(4), &split(1), &split(1), &out)?;

        for name in [
            "x_train.npy",
            "y_train.npy",
            "x_val.npy",
            "y_val.npy",
            "x_test.npy",
            "y_test.npy",
        ] {
            assert!(out.join(name).exists(), "{} missing", name);
        }

        Ok(())
    }

    #[test]
    fn test_write_archive() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("dataset.npz");

        let corpus = split(3);
        DatasetWriter::new().write_archive(&corpus.images, &corpus.labels, &path)?;

        assert!(path.exists());
        assert!(path.metadata()?.len() > 0);

        Ok(())
    }
}
