use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Label encoding: class name → contiguous integer code
// ---------------------------------------------------------------------------

/// Maps class names to 0-based codes in sorted class order.
///
/// Encoding is a preprocessing step: datasets only ever hold the codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: BTreeMap<String, i64>,
}

impl LabelEncoder {
    /// Learn the sorted set of unique classes.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let classes: Vec<String> = unique.into_iter().collect();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as i64))
            .collect();
        LabelEncoder { classes, codes }
    }

    /// Encode labels; any class not seen by `fit` is an error.
    pub fn transform<I, S>(&self, labels: I) -> Result<Vec<i64>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|s| {
                let s = s.as_ref();
                self.codes
                    .get(s)
                    .copied()
                    .ok_or_else(|| DatasetError::UnknownLabel(s.to_string()))
            })
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> (Self, Vec<i64>) {
        let encoder = Self::fit(labels);
        let codes = labels
            .iter()
            .map(|s| encoder.codes[s.as_ref()])
            .collect();
        (encoder, codes)
    }

    /// Class name for a code.
    pub fn inverse(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
