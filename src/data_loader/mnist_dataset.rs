// src/data_loader/mnist_dataset.rs
//
// Pairs flat image records with labels and serves normalized samples.

use async_trait::async_trait;
use std::sync::Arc;

use crate::constants::NUM_CLASSES;
use crate::data_loader::{Dataset, DatasetError};
use crate::error::{MnistError, Result};
use crate::normalize::normalize_all;
use crate::parser::IdxArchive;

/// One (image, label) pair ready for a classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Normalized pixels in row-major order
    pub input: Vec<f32>,
    pub label: u8,
}

impl Sample {
    /// `NUM_CLASSES`-wide target with a 1 at `label`. Labels outside the
    /// class range give an all-zero vector.
    pub fn one_hot(&self) -> Vec<f32> {
        let mut out = vec![0.0; NUM_CLASSES];
        if let Some(slot) = out.get_mut(self.label as usize) {
            *slot = 1.0;
        }
        out
    }
}

/// Map-style dataset over one split's images and labels.
#[derive(Debug, Clone)]
pub struct MnistDataset {
    images: Arc<Vec<u8>>,
    labels: Arc<Vec<u8>>,
    record_len: usize,
}

impl MnistDataset {
    /// Build from flat records. `record_len` is the number of image
    /// records per sample (784 for MNIST).
    pub fn new(images: Vec<u8>, labels: Vec<u8>, record_len: usize) -> Result<Self> {
        let record_len = record_len.max(1);
        let image_count = images.len() / record_len;
        if images.len() % record_len != 0 || image_count != labels.len() {
            return Err(MnistError::SampleCountMismatch {
                images: image_count,
                labels: labels.len(),
            });
        }
        Ok(Self {
            images: Arc::new(images),
            labels: Arc::new(labels),
            record_len,
        })
    }

    /// Build from parsed archives, taking the image size from the header.
    pub fn from_archives(images: &IdxArchive, labels: &IdxArchive) -> Result<Self> {
        Self::new(
            images.records.clone(),
            labels.records.clone(),
            images.header.record_len(),
        )
    }

    /// `self` followed by `other`, as the original training run pooled
    /// train and test samples.
    pub fn concat(&self, other: &MnistDataset) -> Result<Self> {
        if self.record_len != other.record_len {
            return Err(MnistError::RecordLenMismatch {
                expected: self.record_len,
                found: other.record_len,
            });
        }
        let mut images = Vec::with_capacity(self.images.len() + other.images.len());
        images.extend_from_slice(&self.images);
        images.extend_from_slice(&other.images);
        let mut labels = Vec::with_capacity(self.labels.len() + other.labels.len());
        labels.extend_from_slice(&self.labels);
        labels.extend_from_slice(&other.labels);
        Self::new(images, labels, self.record_len)
    }

    pub fn sample_count(&self) -> usize {
        self.labels.len()
    }

    pub fn record_len(&self) -> usize {
        self.record_len
    }

    /// Raw pixels and label at `index`.
    pub fn raw(&self, index: usize) -> Option<(&[u8], u8)> {
        let label = *self.labels.get(index)?;
        let start = index * self.record_len;
        let pixels = self.images.get(start..start + self.record_len)?;
        Some((pixels, label))
    }

    /// Normalized sample at `index`.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.raw(index).map(|(pixels, label)| Sample {
            input: normalize_all(pixels),
            label,
        })
    }
}

#[async_trait]
impl Dataset for MnistDataset {
    type Item = Sample;

    fn len(&self) -> usize {
        self.sample_count()
    }

    async fn get(&self, index: usize) -> std::result::Result<Self::Item, DatasetError> {
        self.sample(index).ok_or(DatasetError::IndexOutOfRange(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> MnistDataset {
        // three 2x2 images
        let images = vec![0, 255, 10, 0, 1, 2, 3, 4, 255, 255, 255, 255];
        MnistDataset::new(images, vec![7, 2, 9], 4).unwrap()
    }

    #[test]
    fn slices_fixed_windows() {
        let ds = tiny();
        assert_eq!(ds.sample_count(), 3);
        assert_eq!(ds.raw(1), Some((&[1u8, 2, 3, 4][..], 2)));
        assert!(ds.raw(3).is_none());
    }

    #[test]
    fn samples_are_normalized() {
        let s = tiny().sample(0).unwrap();
        assert_eq!(s.label, 7);
        assert_eq!(s.input[0], 0.0);
        assert_eq!(s.input[1], 1.0);
        assert!((s.input[2] - 0.0392).abs() < 1e-4);
    }

    #[test]
    fn one_hot_target() {
        let s = Sample { input: vec![], label: 3 };
        let t = s.one_hot();
        assert_eq!(t.len(), NUM_CLASSES);
        assert_eq!(t.iter().sum::<f32>(), 1.0);
        assert_eq!(t[3], 1.0);
        assert_eq!(Sample { input: vec![], label: 42 }.one_hot().iter().sum::<f32>(), 0.0);
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let err = MnistDataset::new(vec![0; 8], vec![1, 2, 3], 4).unwrap_err();
        assert!(matches!(err, MnistError::SampleCountMismatch { images: 2, labels: 3 }));
        assert!(MnistDataset::new(vec![0; 9], vec![1, 2], 4).is_err());
    }

    #[test]
    fn concat_appends() {
        let a = tiny();
        let b = MnistDataset::new(vec![9; 4], vec![5], 4).unwrap();
        let c = a.concat(&b).unwrap();
        assert_eq!(c.sample_count(), 4);
        assert_eq!(c.raw(3).unwrap().1, 5);
    }

    #[test]
    fn concat_rejects_different_image_sizes() {
        let wide = MnistDataset::new(vec![0; 9], vec![1], 9).unwrap();
        let err = tiny().concat(&wide).unwrap_err();
        assert!(matches!(err, MnistError::RecordLenMismatch { expected: 4, found: 9 }), "got {err:?}");
    }

    #[tokio::test]
    async fn get_out_of_range() {
        let ds = tiny();
        assert!(matches!(ds.get(10).await, Err(DatasetError::IndexOutOfRange(10))));
        assert_eq!(ds.get(2).await.unwrap().label, 9);
    }
}
