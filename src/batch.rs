use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Deserialize;

use crate::data::{Dataset, Record};
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// LoaderConfig
// ---------------------------------------------------------------------------

/// Batching configuration for a [`DataLoader`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Records per batch.
    pub batch_size: usize,
    /// Draw a fresh permutation at the start of every epoch.
    pub shuffle: bool,
    /// Skip the final batch when it is smaller than `batch_size`.
    pub drop_last: bool,
    /// Threads fetching records in parallel (0 = fetch on the caller's thread).
    pub worker_count: usize,
    /// Seed for the shuffle RNG.
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle: true,
            drop_last: false,
            worker_count: 0,
            seed: None,
        }
    }
}

impl LoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// A group of records emitted together, features stacked row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Dataset positions of the records, in batch order.
    pub indices: Vec<usize>,
    /// `len() * width` feature values.
    pub features: Vec<f64>,
    pub labels: Vec<i64>,
    width: usize,
}

impl Batch {
    fn stack(indices: Vec<usize>, records: Vec<Record>, width: usize) -> Self {
        let mut features = Vec::with_capacity(records.len() * width);
        let mut labels = Vec::with_capacity(records.len());
        for r in records {
            features.extend_from_slice(&r.features);
            labels.push(r.label);
        }
        Batch {
            indices,
            features,
            labels,
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature vector length.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.len() {
            return None;
        }
        Some(&self.features[i * self.width..(i + 1) * self.width])
    }
}

// ---------------------------------------------------------------------------
// DataLoader
// ---------------------------------------------------------------------------

/// Restartable batched iteration over a dataset.
///
/// Every call to [`DataLoader::iter`] starts a new epoch. With shuffling on,
/// each epoch draws its own permutation from the loader's RNG, so a seeded
/// loader reproduces the same sequence of epochs.
pub struct DataLoader<D: Dataset> {
    dataset: Arc<D>,
    config: LoaderConfig,
    rng: StdRng,
    pool: Option<rayon::ThreadPool>,
}

impl<D: Dataset> DataLoader<D> {
    pub fn new(dataset: Arc<D>, config: LoaderConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(DatasetError::Config("batch_size must be positive".into()));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pool = if config.worker_count > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.worker_count)
                    .thread_name(|i| format!("loader-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            dataset,
            config,
            rng,
            pool,
        })
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Start an epoch.
    pub fn iter(&mut self) -> Batches<'_, D> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            order.shuffle(&mut self.rng);
        }
        log::debug!(
            "epoch over {} records, {} batches (shuffle={})",
            order.len(),
            self.num_batches(),
            self.config.shuffle
        );
        Batches {
            loader: self,
            order,
            cursor: 0,
        }
    }

    fn fetch(&self, indices: &[usize]) -> Result<Vec<Record>> {
        match &self.pool {
            Some(pool) if indices.len() > 1 => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&i| self.dataset.get(i))
                    .collect::<Result<Vec<_>>>()
            }),
            _ => indices.iter().map(|&i| self.dataset.get(i)).collect(),
        }
    }
}

/// Batches of one epoch, yielded lazily.
pub struct Batches<'l, D: Dataset> {
    loader: &'l DataLoader<D>,
    order: Vec<usize>,
    cursor: usize,
}

impl<D: Dataset> Iterator for Batches<'_, D> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let bs = self.loader.config.batch_size;
        let n = self.order.len();
        let start = self.cursor;

        if start >= n {
            return None;
        }
        if self.loader.config.drop_last && start + bs > n {
            self.cursor = n;
            return None;
        }

        let end = (start + bs).min(n);
        self.cursor = end;

        let indices = self.order[start..end].to_vec();
        let width = self.loader.dataset.feature_width();
        Some(
            self.loader
                .fetch(&indices)
                .map(|records| Batch::stack(indices, records, width)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let bs = self.loader.config.batch_size;
        let remaining = self.order.len().saturating_sub(self.cursor);
        let n = if self.loader.config.drop_last {
            remaining / bs
        } else {
            remaining.div_ceil(bs)
        };
        (n, Some(n))
    }
}
