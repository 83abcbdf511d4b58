//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS).
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids (k distinct observations, or k-means++)
//! 2. **Assign**: each point → nearest centroid
//! 3. **Update**: each centroid → mean of its assigned points
//! 4. Repeat until no assignment changes, or `max_iter` is reached
//!
//! WCSS is non-increasing across iterations: reassignment can only lower each
//! point's cost against fixed centroids, and moving a centroid to its
//! members' mean can only lower the cost of those members. Hitting
//! `max_iter` is reported through [`KmeansFit::converged`], not as an error.
//!
//! # Restarts
//!
//! Lloyd only finds a local optimum, so the engine runs `restarts`
//! independent starts and keeps the one with the lowest WCSS (the first one
//! found on ties). Every restart gets a seed drawn up front from the master
//! seed and only ever touches its own RNG, so the outcome does not depend on
//! the order restarts execute in. With the `parallel` feature they run on
//! rayon and produce the same result bit for bit.
//!
//! # Empty Clusters
//!
//! A run that leaves a cluster without members is degenerate. The restart is
//! retried with fresh draws from its own RNG up to `max_retries` times and
//! then dropped from the comparison. Only when every restart is dropped does
//! `fit` fail with [`Error::EmptyCluster`].

use super::traits::Clustering;
use crate::assignment::ClusterAssignment;
use crate::error::{Error, Result};
use crate::matrix::{squared_distance, FeatureMatrix};
use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Init {
    /// k distinct observations chosen uniformly at random.
    #[default]
    RandomRows,
    /// k-means++: each next centroid is drawn with probability proportional
    /// to D(x)², the squared distance to the nearest centroid chosen so far.
    PlusPlus,
}

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Independent starts.
    restarts: usize,
    /// Maximum Lloyd iterations per start.
    max_iter: usize,
    /// Retries of a start that ends with an empty cluster.
    max_retries: usize,
    /// Initialization strategy.
    init: Init,
    /// Master seed.
    seed: Option<u64>,
}

/// Outcome of [`Kmeans::fit`]: the best restart.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansFit {
    /// Cluster of every observation.
    pub assignment: ClusterAssignment,
    /// k × p centroid matrix; row c is the mean of cluster c.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares per cluster.
    pub within_ss: Vec<f64>,
    /// Sum of `within_ss`.
    pub total_within_ss: f64,
    /// Lloyd iterations performed by the winning run.
    pub iterations: usize,
    /// Whether the winning run stopped because no assignment changed.
    pub converged: bool,
    /// WCSS after the initial assignment and after every reassignment.
    pub trace: Vec<f64>,
    /// Index of the winning restart.
    pub restart: usize,
    /// Restarts excluded because every attempt left a cluster empty.
    pub dropped: Vec<usize>,
    /// Degenerate attempts that were retried, summed over restarts.
    pub retries: usize,
    /// Master seed; refitting with it reproduces this result.
    pub seed: u64,
}

/// One completed Lloyd run.
#[derive(Debug, Clone)]
struct Run {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    within_ss: Vec<f64>,
    iterations: usize,
    converged: bool,
    trace: Vec<f64>,
}

impl Run {
    fn total(&self) -> f64 {
        self.within_ss.iter().sum()
    }
}

/// How one restart ended.
#[derive(Debug, Clone)]
enum Outcome {
    /// A run finished after `retries` degenerate attempts.
    Finished { run: Run, retries: usize },
    /// Every attempt left a cluster empty; `non_empty` is from the last one.
    Dropped { non_empty: usize },
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            restarts: 10,
            max_iter: 1000,
            max_retries: 5,
            init: Init::RandomRows,
            seed: None,
        }
    }

    /// Set the number of independent starts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set maximum iterations per start.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set how often a degenerate start is retried before it is dropped.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initialization strategy.
    pub fn with_init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run every restart and return the one with the lowest WCSS.
    pub fn fit(&self, data: &FeatureMatrix) -> Result<KmeansFit> {
        self.fit_with(data, cfg!(feature = "parallel"))
    }

    fn fit_with(&self, data: &FeatureMatrix, parallel: bool) -> Result<KmeansFit> {
        let n = data.n_obs();
        if self.k == 0 || self.k >= n {
            return Err(Error::InvalidK {
                k: self.k,
                min: 1,
                max: n - 1,
            });
        }
        if self.restarts == 0 {
            return Err(Error::InvalidParameter {
                name: "restarts",
                message: "at least one start is required",
            });
        }

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<u64> = (0..self.restarts).map(|_| master.random()).collect();
        let x = data.view();
        let outcomes = if parallel {
            self.run_parallel(x, &seeds)?
        } else {
            self.run_sequential(x, &seeds)?
        };

        let mut best: Option<(usize, Run)> = None;
        let mut dropped = Vec::new();
        let mut retries = 0;
        let mut last_non_empty = 0;
        for (r, outcome) in outcomes.into_iter().enumerate() {
            let run = match outcome {
                Outcome::Finished { run, retries: used } => {
                    retries += used;
                    run
                }
                Outcome::Dropped { non_empty } => {
                    retries += self.max_retries;
                    last_non_empty = non_empty;
                    dropped.push(r);
                    continue;
                }
            };
            let better = match &best {
                None => true,
                Some((_, b)) => run.total() < b.total(),
            };
            if better {
                best = Some((r, run));
            }
        }
        let Some((restart, run)) = best else {
            return Err(Error::EmptyCluster {
                k: self.k,
                non_empty: last_non_empty,
            });
        };

        let total_within_ss = run.total();
        log::debug!(
            "k-means k={} seed={seed}: restart {restart} wins with WCSS {total_within_ss:.6} after {} iterations (converged: {}, dropped: {})",
            self.k,
            run.iterations,
            run.converged,
            dropped.len()
        );
        Ok(KmeansFit {
            assignment: ClusterAssignment::new(run.labels, self.k)?,
            centroids: run.centroids,
            within_ss: run.within_ss,
            total_within_ss,
            iterations: run.iterations,
            converged: run.converged,
            trace: run.trace,
            restart,
            dropped,
            retries,
            seed,
        })
    }

    fn run_sequential(&self, x: ArrayView2<'_, f64>, seeds: &[u64]) -> Result<Vec<Outcome>> {
        seeds
            .iter()
            .enumerate()
            .map(|(r, &s)| self.restart(x, r, s))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, x: ArrayView2<'_, f64>, seeds: &[u64]) -> Result<Vec<Outcome>> {
        seeds
            .par_iter()
            .enumerate()
            .map(|(r, &s)| self.restart(x, r, s))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel(&self, x: ArrayView2<'_, f64>, seeds: &[u64]) -> Result<Vec<Outcome>> {
        self.run_sequential(x, seeds)
    }

    /// One restart with its retry budget.
    fn restart(&self, x: ArrayView2<'_, f64>, r: usize, seed: u64) -> Result<Outcome> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut last_non_empty = 0;
        for attempt in 0..=self.max_retries {
            match self.lloyd(x, &mut rng) {
                Ok(run) => {
                    return Ok(Outcome::Finished {
                        run,
                        retries: attempt,
                    })
                }
                Err(Error::EmptyCluster { k, non_empty }) => {
                    log::warn!(
                        "k-means restart {r} attempt {attempt}: {non_empty} of {k} clusters non-empty"
                    );
                    last_non_empty = non_empty;
                }
                Err(e) => return Err(e),
            }
        }
        log::warn!("k-means restart {r} dropped after {} attempts", self.max_retries + 1);
        Ok(Outcome::Dropped {
            non_empty: last_non_empty,
        })
    }

    /// A single Lloyd run from a fresh initialization.
    fn lloyd(&self, x: ArrayView2<'_, f64>, rng: &mut StdRng) -> Result<Run> {
        let seeds = match self.init {
            Init::RandomRows => self.init_random_rows(x, rng),
            Init::PlusPlus => self.init_plus_plus(x, rng),
        };
        let mut labels = self.nearest(x, &seeds, None);
        let mut centroids = self.centroids(x, &labels)?;
        let mut within_ss = self.within_ss(x, &labels, &centroids);
        let mut trace = vec![within_ss.iter().sum()];

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iter {
            iterations += 1;
            let next = self.nearest(x, &centroids, Some(&labels));
            if next == labels {
                converged = true;
                break;
            }
            labels = next;
            centroids = self.centroids(x, &labels)?;
            within_ss = self.within_ss(x, &labels, &centroids);
            trace.push(within_ss.iter().sum());
        }

        Ok(Run {
            labels,
            centroids,
            within_ss,
            iterations,
            converged,
            trace,
        })
    }

    /// k distinct observations.
    fn init_random_rows(&self, x: ArrayView2<'_, f64>, rng: &mut StdRng) -> Array2<f64> {
        let picks = rand::seq::index::sample(rng, x.nrows(), self.k);
        let mut centroids = Array2::zeros((self.k, x.ncols()));
        for (c, i) in picks.iter().enumerate() {
            centroids.row_mut(c).assign(&x.row(i));
        }
        centroids
    }

    /// Initialize centroids using k-means++ algorithm.
    fn init_plus_plus(&self, x: ArrayView2<'_, f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = x.nrows();
        let mut centroids = Array2::zeros((self.k, x.ncols()));

        // First centroid: random point
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&x.row(first));

        // Remaining centroids: k-means++ selection
        for i in 1..self.k {
            let distances: Vec<f64> = (0..n)
                .map(|j| {
                    (0..i)
                        .map(|c| squared_distance(x.row(j), centroids.row(c)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            // Sample proportional to squared distance
            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&x.row(idx));
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (j, &d) in distances.iter().enumerate() {
                cumsum += d;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }
            centroids.row_mut(i).assign(&x.row(selected));
        }

        centroids
    }

    /// Nearest centroid of every observation. On ties the current label is
    /// kept; without one the lowest centroid index wins.
    fn nearest(
        &self,
        x: ArrayView2<'_, f64>,
        centroids: &Array2<f64>,
        current: Option<&[usize]>,
    ) -> Vec<usize> {
        (0..x.nrows())
            .map(|i| {
                let point = x.row(i);
                let mut best = current.map_or(0, |c| c[i]);
                let mut best_dist = squared_distance(point, centroids.row(best));
                for c in 0..self.k {
                    let d = squared_distance(point, centroids.row(c));
                    if d < best_dist {
                        best_dist = d;
                        best = c;
                    }
                }
                best
            })
            .collect()
    }

    /// Member means; fails if a cluster has no members.
    fn centroids(&self, x: ArrayView2<'_, f64>, labels: &[usize]) -> Result<Array2<f64>> {
        let mut sums = Array2::<f64>::zeros((self.k, x.ncols()));
        let mut counts = vec![0usize; self.k];
        for (i, &c) in labels.iter().enumerate() {
            let mut row = sums.row_mut(c);
            row += &x.row(i);
            counts[c] += 1;
        }
        let non_empty = counts.iter().filter(|&&c| c > 0).count();
        if non_empty < self.k {
            return Err(Error::EmptyCluster {
                k: self.k,
                non_empty,
            });
        }
        for (c, mut row) in sums.rows_mut().into_iter().enumerate() {
            row /= counts[c] as f64;
        }
        Ok(sums)
    }

    fn within_ss(
        &self,
        x: ArrayView2<'_, f64>,
        labels: &[usize],
        centroids: &Array2<f64>,
    ) -> Vec<f64> {
        let mut wss = vec![0.0; self.k];
        for (i, &c) in labels.iter().enumerate() {
            wss[c] += squared_distance(x.row(i), centroids.row(c));
        }
        wss
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &FeatureMatrix) -> Result<ClusterAssignment> {
        Ok(self.fit(data)?.assignment)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
