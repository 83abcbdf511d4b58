//! Group-level summaries of withheld columns.
//!
//! Clustering never sees the demographic and categorical columns that were
//! held out of the feature matrix. Once an assignment exists, those columns
//! are joined back by observation index and summarized per cluster: means
//! for numeric columns, level proportions for categorical ones.
//!
//! The summary itself is pluggable through [`Summarizer`], so callers can
//! supply medians, quantiles or anything else via [`from_fn`].

use crate::assignment::ClusterAssignment;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Trait for summarization strategies.
///
/// Implementors define how the values of one cluster are condensed into a
/// summary.
pub trait Summarizer<T, S = T> {
    /// Summarize the values of one group.
    fn summarize(&self, items: &[&T]) -> S;
}

/// Descriptive statistics of a numeric column within one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (0 for a single value).
    pub sd: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Mean, spread and range of numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSummarizer;

impl Summarizer<f64, NumericSummary> for MeanSummarizer {
    fn summarize(&self, items: &[&f64]) -> NumericSummary {
        let count = items.len();
        if count == 0 {
            return NumericSummary {
                count,
                mean: f64::NAN,
                sd: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }
        let n = count as f64;
        let mean = items.iter().copied().sum::<f64>() / n;
        let sd = if count > 1 {
            (items.iter().map(|&&x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        NumericSummary {
            count,
            mean,
            sd,
            min: items.iter().copied().copied().fold(f64::INFINITY, f64::min),
            max: items.iter().copied().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Share of each level of a categorical column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionSummarizer;

impl<T: Ord + Clone> Summarizer<T, BTreeMap<T, f64>> for ProportionSummarizer {
    fn summarize(&self, items: &[&T]) -> BTreeMap<T, f64> {
        let mut counts: BTreeMap<T, usize> = BTreeMap::new();
        for &item in items {
            *counts.entry(item.clone()).or_insert(0) += 1;
        }
        let n = items.len() as f64;
        counts
            .into_iter()
            .map(|(level, c)| (level, c as f64 / n))
            .collect()
    }
}

/// A function-based summarizer.
#[derive(Clone)]
pub struct FnSummarizer<F> {
    f: F,
}

impl<F> FnSummarizer<F> {
    /// Create a summarizer from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, S, F> Summarizer<T, S> for FnSummarizer<F>
where
    F: Fn(&[&T]) -> S,
{
    fn summarize(&self, items: &[&T]) -> S {
        (self.f)(items)
    }
}

/// Create a summarizer from a closure.
pub fn from_fn<T, S, F>(f: F) -> FnSummarizer<F>
where
    F: Fn(&[&T]) -> S,
{
    FnSummarizer::new(f)
}

/// Summarize `column` once per cluster of `assignment`, in label order.
///
/// `column[i]` must describe observation `i`.
pub fn summarize_by_cluster<T, S>(
    assignment: &ClusterAssignment,
    column: &[T],
    summarizer: &impl Summarizer<T, S>,
) -> Result<Vec<S>> {
    if column.len() != assignment.n_obs() {
        return Err(Error::DimensionMismatch {
            expected: assignment.n_obs(),
            found: column.len(),
        });
    }
    let mut groups: Vec<Vec<&T>> = vec![Vec::new(); assignment.k()];
    for (value, &label) in column.iter().zip(assignment.labels()) {
        groups[label].push(value);
    }
    Ok(groups.iter().map(|g| summarizer.summarize(g)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn two_groups() -> ClusterAssignment {
        ClusterAssignment::new(vec![0, 0, 1, 1, 1], 2).unwrap()
    }

    #[test]
    fn numeric_means_per_cluster() {
        let enrollment = [100.0, 300.0, 50.0, 60.0, 70.0];
        let s = summarize_by_cluster(&two_groups(), &enrollment, &MeanSummarizer).unwrap();
        assert_eq!(s[0].count, 2);
        assert_eq!(s[0].mean, 200.0);
        assert!((s[0].sd - 141.421_356_237_309_5).abs() < 1e-9);
        assert_eq!((s[1].min, s[1].max, s[1].mean), (50.0, 70.0, 60.0));
    }

    #[test]
    fn categorical_proportions_per_cluster() {
        let locale = ["city", "rural", "rural", "rural", "town"];
        let s = summarize_by_cluster(&two_groups(), &locale, &ProportionSummarizer).unwrap();
        assert_eq!(s[0][&"city"], 0.5);
        assert_eq!(s[0][&"rural"], 0.5);
        assert!((s[1][&"rural"] - 2.0 / 3.0).abs() < 1e-12);
        assert!(!s[1].contains_key(&"city"));
    }

    #[test]
    fn test_fn_summarizer() {
        let count_over = from_fn(|items: &[&i32]| items.iter().filter(|&&&v| v > 2).count());
        let s = summarize_by_cluster(&two_groups(), &[1, 5, 2, 3, 4], &count_over).unwrap();
        assert_eq!(s, vec![1, 2]);
    }

    #[test]
    fn column_length_must_match() {
        let err = summarize_by_cluster(&two_groups(), &[1.0, 2.0], &MeanSummarizer).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 5,
                found: 2
            }
        );
    }
}
