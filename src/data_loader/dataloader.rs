//! Batching `DataLoader`.
//!
//! * Yields `Result<Vec<Item>, DatasetError>` where each `Vec` is a batch.
//! * Samples are visited in order, or shuffled through a `ShuffleSampler`.

use crate::data_loader::dataset::{Dataset, DatasetError};
use crate::data_loader::options::LoaderOptions;
use crate::data_loader::sampler::{Sampler, SequentialSampler, ShuffleSampler};

use async_stream::try_stream;
use futures_core::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// High‑level iterator that produces batched samples from a dataset.
pub struct DataLoader<D>
where
    D: Dataset,
{
    dataset: Arc<D>,
    opts: LoaderOptions,
}

impl<D> DataLoader<D>
where
    D: Dataset,
{
    /// Create a new loader.
    pub fn new(dataset: D, opts: LoaderOptions) -> Self {
        Self {
            dataset: Arc::new(dataset),
            opts,
        }
    }

    /// Return an **async stream** over the dataset that yields batches.
    ///
    /// ```ignore
    /// # use mnistdl::{DataLoader, LoaderOptions};
    /// # async fn demo<D: mnistdl::Dataset>(ds: D) -> anyhow::Result<()> {
    /// let loader = DataLoader::new(ds, LoaderOptions::default().shuffle(true, 7));
    /// let mut batches = loader.stream();
    /// while let Some(batch) = batches.next().await {
    ///     let data = batch?; // Vec<D::Item>
    ///     // training step ...
    /// }
    /// # Ok(()) }
    /// ```
    pub fn stream(
        self,
    ) -> Pin<
        Box<dyn Stream<Item = Result<Vec<D::Item>, DatasetError>> + Send + 'static>,
    > {
        let ds = self.dataset.clone();
        let opts = self.opts.clone();

        Box::pin(try_stream! {
            let bs = opts.batch_size.max(1);

            let total = ds.len();
            let mut sampler: Box<dyn Sampler + Send> = if opts.shuffle {
                Box::new(ShuffleSampler::new(total, opts.seed))
            } else {
                Box::new(SequentialSampler::new(total))
            };

            let mut batch = Vec::with_capacity(bs);
            while let Some(index) = sampler.next_index() {
                batch.push(ds.get(index).await?);
                if batch.len() == bs {
                    yield std::mem::take(&mut batch);
                }
            }
            if !batch.is_empty() && !opts.drop_last {
                yield batch;
            }
        })
    }
}

impl<D> std::fmt::Debug for DataLoader<D>
where
    D: Dataset,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("batch_size", &self.opts.batch_size)
            .field("shuffle", &self.opts.shuffle)
            .finish()
    }
}
