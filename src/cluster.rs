//! Color clustering in LAB space.
//!
//! k-means with k-means++ seeding comes from `kmeans_colors`; on top of it
//! this module picks the number of clusters with a silhouette search and
//! ranks the resulting clusters by how many pixels they own.

use std::collections::{HashMap, HashSet};

use kmeans_colors::get_kmeans;
use palette::Lab;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::convert::lab_distance;
use crate::error::{PaletteError, Result};
use crate::options::ExtractOptions;

/// `kmeans_colors` stores cluster ids as `u8`.
pub const MAX_CLUSTERS: usize = u8::MAX as usize + 1;

/// Outcome of one clustering: a cluster id per pixel plus the centroids.
#[derive(Clone, Debug)]
pub struct Clustering {
    pub assignment: Vec<usize>,
    pub centroids: Vec<Lab>,
    /// Within-cluster sum of squared distances of the kept run.
    pub inertia: f32,
}

impl Clustering {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }
}

/// Pixel count and mean color of one cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterSummary {
    pub id: usize,
    pub count: usize,
    pub mean: Lab,
}

/// Partition `pixels` into `k` clusters.
///
/// Runs `opts.runs` seeded k-means++ passes (seed, seed + 1, ...) and keeps
/// the one with the lowest within-cluster sum of squares, so the result is
/// reproducible for a given seed.
pub fn cluster(pixels: &[Lab], k: usize, opts: &ExtractOptions) -> Result<Clustering> {
    cluster_distinct(pixels, k, distinct_colors(pixels), opts)
}

/// `cluster` with the number of distinct colors in `pixels` already known.
fn cluster_distinct(
    pixels: &[Lab],
    k: usize,
    distinct: usize,
    opts: &ExtractOptions,
) -> Result<Clustering> {
    if pixels.is_empty() {
        return Err(PaletteError::invalid_input("cannot cluster an empty pixel set"));
    }
    if k == 0 || k > MAX_CLUSTERS {
        return Err(PaletteError::invalid_input(format!(
            "cluster count {k} outside 1..={MAX_CLUSTERS}"
        )));
    }
    if k > distinct {
        return Err(PaletteError::invalid_input(format!(
            "cluster count {k} exceeds the {distinct} distinct colors available"
        )));
    }

    // `Kmeans::score` is the last centroid shift, not a fit measure.
    (0..opts.runs.max(1) as u64)
        .map(|run| {
            let seed = opts.seed.wrapping_add(run);
            let result = get_kmeans(k, opts.max_iter, opts.converge, false, pixels, seed);
            let assignment: Vec<usize> = result.indices.iter().map(|&i| i as usize).collect();
            let inertia = within_cluster_sum_of_squares(pixels, &assignment, &result.centroids);
            debug!(k, run, inertia, "k-means run finished");
            Clustering {
                assignment,
                centroids: result.centroids,
                inertia,
            }
        })
        .min_by(|a, b| a.inertia.total_cmp(&b.inertia))
        .ok_or_else(|| PaletteError::invalid_input("no k-means run was performed"))
}

/// Sum of squared LAB distances from each pixel to its cluster centroid.
pub fn within_cluster_sum_of_squares(
    pixels: &[Lab],
    assignment: &[usize],
    centroids: &[Lab],
) -> f32 {
    pixels
        .iter()
        .zip(assignment)
        .filter_map(|(p, &id)| centroids.get(id).map(|c| lab_distance(p, c) as f64))
        .map(|d| d * d)
        .sum::<f64>() as f32
}

/// Pick the cluster count in `opts.k_range` with the best silhouette score.
///
/// Every candidate is clustered and scored; ties go to the smallest k.
/// Candidates larger than the number of distinct colors are skipped.
pub fn select_k(pixels: &[Lab], opts: &ExtractOptions) -> Result<usize> {
    select_k_distinct(pixels, distinct_colors(pixels), opts)
}

fn select_k_distinct(pixels: &[Lab], distinct: usize, opts: &ExtractOptions) -> Result<usize> {
    opts.k_range.validate()?;
    let candidates: Vec<usize> = opts
        .k_range
        .candidates()
        .filter(|&k| k <= distinct)
        .collect();
    if candidates.is_empty() {
        return Err(PaletteError::invalid_input(format!(
            "{distinct} distinct colors are too few to choose between {} and {} colors",
            opts.k_range.min,
            opts.k_range.max
        )));
    }

    let sample = sample_indices(pixels.len(), opts.silhouette_sample);
    let sampled: Vec<Lab> = sample.iter().map(|&i| pixels[i]).collect();

    let score_candidate = |k: usize| -> Result<(usize, f32)> {
        let clustering = cluster_distinct(pixels, k, distinct, opts)?;
        let labels: Vec<usize> = sample.iter().map(|&i| clustering.assignment[i]).collect();
        let score = silhouette_score(&sampled, &labels, k);
        debug!(k, score, "silhouette score");
        Ok((k, score))
    };

    #[cfg(feature = "parallel")]
    let scored: Vec<(usize, f32)> = candidates
        .par_iter()
        .map(|&k| score_candidate(k))
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let scored: Vec<(usize, f32)> = candidates
        .iter()
        .map(|&k| score_candidate(k))
        .collect::<Result<_>>()?;

    let (mut best_k, mut best_score) = scored[0];
    for &(k, score) in &scored[1..] {
        if score > best_score {
            best_k = k;
            best_score = score;
        }
    }
    info!(k = best_k, score = best_score, "selected cluster count");
    Ok(best_k)
}

/// Mean silhouette coefficient of a labelled point set.
///
/// For each point, `a` is its mean distance to the other members of its
/// cluster (0 for a single-member cluster) and `b` the smallest mean
/// distance to another non-empty cluster. Returns 0 when fewer than two
/// clusters are populated.
pub fn silhouette_score(points: &[Lab], labels: &[usize], k: usize) -> f32 {
    if points.is_empty() || points.len() != labels.len() {
        return 0.0;
    }
    let k = k.max(labels.iter().copied().max().map_or(0, |m| m + 1));

    let mut counts = vec![0usize; k];
    for &label in labels {
        counts[label] += 1;
    }
    if counts.iter().filter(|&&c| c > 0).count() < 2 {
        return 0.0;
    }

    let mut singletons = 0usize;
    let mut total = 0.0f64;
    let mut sums = vec![0.0f64; k];
    for (i, p) in points.iter().enumerate() {
        sums.iter_mut().for_each(|s| *s = 0.0);
        for (j, q) in points.iter().enumerate() {
            if i != j {
                sums[labels[j]] += lab_distance(p, q) as f64;
            }
        }

        let own = labels[i];
        let a = if counts[own] > 1 {
            sums[own] / (counts[own] - 1) as f64
        } else {
            singletons += 1;
            0.0
        };
        let b = (0..k)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| sums[c] / counts[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }
    if singletons > 0 {
        debug!(singletons, "single-member clusters scored with zero cohesion");
    }
    (total / points.len() as f64) as f32
}

/// Count and average the pixels of every cluster, most populated first.
///
/// Clusters with equal counts stay in the order their ids first appear in
/// `assignment`.
pub fn summarize(pixels: &[Lab], assignment: &[usize]) -> Result<Vec<ClusterSummary>> {
    if pixels.len() != assignment.len() {
        return Err(PaletteError::invalid_input(format!(
            "{} pixels but {} cluster assignments",
            pixels.len(),
            assignment.len()
        )));
    }

    struct Acc {
        id: usize,
        count: usize,
        sum: [f64; 3],
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut accs: Vec<Acc> = Vec::new();
    for (pixel, &id) in pixels.iter().zip(assignment) {
        let slot = *slots.entry(id).or_insert_with(|| {
            accs.push(Acc { id, count: 0, sum: [0.0; 3] });
            accs.len() - 1
        });
        let acc = &mut accs[slot];
        acc.count += 1;
        acc.sum[0] += pixel.l as f64;
        acc.sum[1] += pixel.a as f64;
        acc.sum[2] += pixel.b as f64;
    }

    let mut summaries: Vec<ClusterSummary> = accs
        .into_iter()
        .map(|acc| {
            let n = acc.count as f64;
            ClusterSummary {
                id: acc.id,
                count: acc.count,
                mean: Lab::new(
                    (acc.sum[0] / n) as f32,
                    (acc.sum[1] / n) as f32,
                    (acc.sum[2] / n) as f32,
                ),
            }
        })
        .collect();
    // Stable: equal counts keep discovery order.
    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(summaries)
}

/// Cluster `pixels` with the requested or the selected number of clusters
/// and return the ranked summaries.
pub fn rank_clusters(pixels: &[Lab], opts: &ExtractOptions) -> Result<Vec<ClusterSummary>> {
    let distinct = distinct_colors(pixels);
    let k = match opts.clusters {
        Some(k) => {
            if k > distinct && distinct > 0 {
                warn!(requested = k, distinct, "fewer distinct colors than requested clusters");
                distinct
            } else {
                k
            }
        }
        None => select_k_distinct(pixels, distinct, opts)?,
    };
    let clustering = cluster_distinct(pixels, k, distinct, opts)?;
    let summaries = summarize(pixels, &clustering.assignment)?;
    if summaries.len() < k {
        warn!(
            requested = k,
            populated = summaries.len(),
            "some clusters ended up without pixels"
        );
    }
    Ok(summaries)
}

/// Number of bitwise-distinct colors; k-means++ seeding needs at least k.
fn distinct_colors(pixels: &[Lab]) -> usize {
    pixels
        .iter()
        .map(|p| [p.l.to_bits(), p.a.to_bits(), p.b.to_bits()])
        .collect::<HashSet<_>>()
        .len()
}

/// Evenly strided indices, at most `limit` of them.
fn sample_indices(len: usize, limit: Option<usize>) -> Vec<usize> {
    match limit {
        Some(limit) if limit < len => {
            let step = len as f64 / limit as f64;
            (0..limit).map(|i| (i as f64 * step) as usize).collect()
        }
        _ => (0..len).collect(),
    }
}
