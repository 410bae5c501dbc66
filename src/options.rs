//! Tunables for a single extraction run.

use std::ops::RangeInclusive;

use crate::cluster::MAX_CLUSTERS;
use crate::error::{PaletteError, Result};

/// Longest width the loader resizes to when none is given.
pub const DEFAULT_RESIZE_WIDTH: u32 = 250;
/// Pixels scored by the silhouette search when no sample size is given.
pub const DEFAULT_SILHOUETTE_SAMPLE: usize = 2000;

/// Inclusive range of candidate cluster counts for automatic selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KRange {
    pub min: usize,
    pub max: usize,
}

impl KRange {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Checks `2 <= min <= max <= MAX_CLUSTERS`; the fields are public, so
    /// a range built by hand is re-checked before use.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min, self.max);
        if min < 2 || min > max || max > MAX_CLUSTERS {
            return Err(PaletteError::invalid_input(format!(
                "cluster count range {min}..={max} must satisfy 2 <= min <= max <= {MAX_CLUSTERS}"
            )));
        }
        Ok(())
    }

    pub fn candidates(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl Default for KRange {
    fn default() -> Self {
        Self { min: 2, max: 9 }
    }
}

#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Fixed number of colors; `None` selects it with the silhouette search.
    pub clusters: Option<usize>,
    pub k_range: KRange,
    /// Iteration cap of a single k-means run.
    pub max_iter: usize,
    /// Convergence threshold on centroid movement.
    pub converge: f32,
    /// Independent k-means runs per clustering; the tightest one wins.
    pub runs: usize,
    pub seed: u64,
    /// Upper bound on the pixels scored per candidate k; `None` scores all.
    pub silhouette_sample: Option<usize>,
    /// Width the loader resizes to (aspect ratio kept); `None` keeps it.
    pub resize_width: Option<u32>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            clusters: None,
            k_range: KRange::default(),
            max_iter: 20,
            converge: 1e-4,
            runs: 3,
            seed: 0,
            silhouette_sample: Some(DEFAULT_SILHOUETTE_SAMPLE),
            resize_width: Some(DEFAULT_RESIZE_WIDTH),
        }
    }
}

impl ExtractOptions {
    pub fn with_clusters(mut self, clusters: Option<usize>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_k_range(mut self, k_range: KRange) -> Self {
        self.k_range = k_range;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_silhouette_sample(mut self, sample: Option<usize>) -> Self {
        self.silhouette_sample = sample;
        self
    }

    pub fn with_resize_width(mut self, width: Option<u32>) -> Self {
        self.resize_width = width;
        self
    }

    /// Reject option combinations no run could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(PaletteError::invalid_input("runs must be at least 1"));
        }
        if self.max_iter == 0 {
            return Err(PaletteError::invalid_input("max_iter must be at least 1"));
        }
        if self.silhouette_sample == Some(0) {
            return Err(PaletteError::invalid_input("silhouette sample must be at least 1"));
        }
        if self.resize_width == Some(0) {
            return Err(PaletteError::invalid_input("resize width must be at least 1"));
        }
        if let Some(k) = self.clusters {
            if k == 0 {
                return Err(PaletteError::invalid_input("cluster count must be at least 1"));
            }
        }
        self.k_range.validate()
    }
}
