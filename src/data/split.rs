use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use super::model::{Dataset, Record};
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Subset – a view over selected indices of a shared dataset
// ---------------------------------------------------------------------------

/// Exposes only the records of `inner` at `indices`, in that order.
#[derive(Debug)]
pub struct Subset<D: Dataset> {
    inner: Arc<D>,
    indices: Vec<usize>,
}

impl<D: Dataset> Subset<D> {
    pub fn new(inner: Arc<D>, indices: Vec<usize>) -> Self {
        Subset { inner, indices }
    }

    /// Positions in the underlying dataset, in subset order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: Dataset> Clone for Subset<D> {
    fn clone(&self) -> Self {
        Subset {
            inner: Arc::clone(&self.inner),
            indices: self.indices.clone(),
        }
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        let inner_index = *self.indices.get(index).ok_or(DatasetError::Index {
            index,
            size: self.indices.len(),
        })?;
        self.inner.get(inner_index)
    }

    fn feature_width(&self) -> usize {
        self.inner.feature_width()
    }
}

// ---------------------------------------------------------------------------
// Train / test split
// ---------------------------------------------------------------------------

/// Split `dataset` into `(train, test)` views of sizes `floor(ratio * N)`
/// and `N - floor(ratio * N)`.
///
/// Indices are shuffled first; pass a `seed` for a reproducible split. Both
/// views share the underlying tables.
pub fn train_test_split<D: Dataset>(
    dataset: Arc<D>,
    ratio: f64,
    seed: Option<u64>,
) -> Result<(Subset<D>, Subset<D>)> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(DatasetError::InvalidRatio(ratio));
    }

    let n = dataset.len();
    let mut indices: Vec<usize> = (0..n).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut thread_rng()),
    }

    let n_train = ((ratio * n as f64).floor() as usize).min(n);
    let test = indices.split_off(n_train);
    log::info!(
        "split {n} records into {} train / {} test (ratio {ratio})",
        indices.len(),
        test.len()
    );

    Ok((
        Subset::new(Arc::clone(&dataset), indices),
        Subset::new(dataset, test),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    /// Record `i` has feature `[i]` and label `i % 3`.
    #[derive(Debug)]
    struct Counting {
        n: usize,
    }

    impl Dataset for Counting {
        fn len(&self) -> usize {
            self.n
        }

        fn get(&self, index: usize) -> Result<Record> {
            if index >= self.n {
                return Err(DatasetError::Index {
                    index,
                    size: self.n,
                });
            }
            Ok(Record {
                features: vec![index as f64],
                label: (index % 3) as i64,
            })
        }

        fn feature_width(&self) -> usize {
            1
        }
    }

    #[test]
    fn subset_maps_positions() {
        let sub = Subset::new(Arc::new(Counting { n: 10 }), vec![2, 5, 7]);
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.get(0).unwrap().features, vec![2.0]);
        assert_eq!(sub.get(2).unwrap().features, vec![7.0]);
        assert!(matches!(
            sub.get(3),
            Err(DatasetError::Index { index: 3, size: 3 })
        ));
    }

    #[test]
    fn split_sizes_are_disjoint_and_exhaustive() {
        let (train, test) = train_test_split(Arc::new(Counting { n: 150 }), 0.8, Some(7)).unwrap();
        assert_eq!(train.len(), 120);
        assert_eq!(test.len(), 30);

        let train_set: BTreeSet<usize> = train.indices().iter().copied().collect();
        let test_set: BTreeSet<usize> = test.indices().iter().copied().collect();
        assert_eq!(train_set.len(), 120);
        assert!(train_set.is_disjoint(&test_set));
        let all: BTreeSet<usize> = train_set.union(&test_set).copied().collect();
        assert_eq!(all, (0..150).collect::<BTreeSet<usize>>());
    }

    #[test]
    fn split_sizes_floor_the_ratio() {
        let (train, test) = train_test_split(Arc::new(Counting { n: 7 }), 0.5, None).unwrap();
        assert_eq!((train.len(), test.len()), (3, 4));

        let (train, test) = train_test_split(Arc::new(Counting { n: 5 }), 1.0, None).unwrap();
        assert_eq!((train.len(), test.len()), (5, 0));
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let (a, _) = train_test_split(Arc::new(Counting { n: 50 }), 0.8, Some(123)).unwrap();
        let (b, _) = train_test_split(Arc::new(Counting { n: 50 }), 0.8, Some(123)).unwrap();
        assert_eq!(a.indices(), b.indices());
    }

    #[test]
    fn ratio_out_of_range_rejected() {
        for ratio in [-0.1, 1.5, f64::NAN] {
            let err = train_test_split(Arc::new(Counting { n: 4 }), ratio, None).unwrap_err();
            assert!(matches!(err, DatasetError::InvalidRatio(_)));
        }
    }
}
