//! Spatial image assignment
//!
//! IDML carries no link between a story and the graphics next to it, so each
//! record's anchor (the position of its text frame) is matched to an image
//! candidate by distance. For small, equally sized sets every permutation is
//! scored and the minimum total squared distance wins; otherwise anchors pick
//! their nearest free candidate greedily, in order.

use crate::geometry::Position;
use crate::idml::ImageCandidate;

/// Largest set size solved by exhaustive permutation search
pub const MAX_EXACT_ASSIGNMENT: usize = 8;

/// Extensions of raster sources that have web renditions
pub const RASTER_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "tif", "tiff", "bmp", "webp", "psd",
];

/// Assign candidates to anchors, returning the candidate index per anchor
///
/// The mapping is injective: no candidate is used twice. Anchors left over
/// when candidates run out map to `None`.
#[must_use]
pub fn assign(anchors: &[Position], candidates: &[Position]) -> Vec<Option<usize>> {
    if anchors.is_empty() {
        return Vec::new();
    }

    if anchors.len() == candidates.len() && anchors.len() <= MAX_EXACT_ASSIGNMENT {
        solve_exact(anchors, candidates).into_iter().map(Some).collect()
    } else {
        solve_greedy(anchors, candidates)
    }
}

/// Total squared distance of a full assignment
#[must_use]
pub fn total_cost(anchors: &[Position], candidates: &[Position], mapping: &[usize]) -> f64 {
    anchors
        .iter()
        .zip(mapping)
        .map(|(anchor, &index)| anchor.distance_sq(&candidates[index]))
        .sum()
}

/// Exhaustive search over permutations in lexicographic order
///
/// The first permutation reaching the minimum is kept. Partial assignments
/// that already cost as much as the best complete one are pruned, which
/// cannot change that choice.
///
/// # Panics
///
/// Panics if the sets differ in size or exceed [`MAX_EXACT_ASSIGNMENT`].
#[must_use]
pub fn solve_exact(anchors: &[Position], candidates: &[Position]) -> Vec<usize> {
    assert!(
        anchors.len() == candidates.len() && anchors.len() <= MAX_EXACT_ASSIGNMENT,
        "exact assignment needs equal sets of at most {MAX_EXACT_ASSIGNMENT} positions"
    );

    struct Search<'a> {
        anchors: &'a [Position],
        candidates: &'a [Position],
        used: Vec<bool>,
        current: Vec<usize>,
        best: Vec<usize>,
        best_cost: f64,
    }

    impl Search<'_> {
        fn visit(&mut self, cost: f64) {
            if cost >= self.best_cost {
                return;
            }
            let depth = self.current.len();
            if depth == self.anchors.len() {
                self.best_cost = cost;
                self.best.clone_from(&self.current);
                return;
            }
            for index in 0..self.candidates.len() {
                if self.used[index] {
                    continue;
                }
                self.used[index] = true;
                self.current.push(index);
                let step = self.anchors[depth].distance_sq(&self.candidates[index]);
                self.visit(cost + step);
                self.current.pop();
                self.used[index] = false;
            }
        }
    }

    let mut search = Search {
        anchors,
        candidates,
        used: vec![false; candidates.len()],
        current: Vec::with_capacity(anchors.len()),
        best: (0..anchors.len()).collect(),
        best_cost: f64::INFINITY,
    };
    search.visit(0.0);
    search.best
}

/// Nearest free candidate per anchor, in anchor order (lowest index on ties)
#[must_use]
pub fn solve_greedy(anchors: &[Position], candidates: &[Position]) -> Vec<Option<usize>> {
    let mut used = vec![false; candidates.len()];

    anchors
        .iter()
        .map(|anchor| {
            let mut nearest: Option<(usize, f64)> = None;
            for (index, candidate) in candidates.iter().enumerate() {
                if used[index] {
                    continue;
                }
                let distance = anchor.distance_sq(candidate);
                if nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((index, distance));
                }
            }
            let (index, _) = nearest?;
            used[index] = true;
            Some(index)
        })
        .collect()
}

/// Keep raster sources only and order them top-to-bottom, then left-to-right
#[must_use]
pub fn raster_reading_order(candidates: &[ImageCandidate]) -> Vec<ImageCandidate> {
    let mut raster: Vec<ImageCandidate> = candidates
        .iter()
        .filter(|candidate| {
            candidate
                .extension()
                .is_some_and(|ext| RASTER_EXTENSIONS.contains(&ext.as_str()))
        })
        .cloned()
        .collect();

    raster.sort_by(|a, b| {
        a.position
            .y
            .total_cmp(&b.position.y)
            .then_with(|| a.position.x.total_cmp(&b.position.x))
    });
    raster
}

/// Filename of the small rendition expected in the asset library
///
/// `Foto 1.psd` with suffix `_small` and extension `jpg` gives
/// `Foto 1_small.jpg`.
#[must_use]
pub fn rendition_name(basename: &str, suffix: &str, extension: &str) -> String {
    let stem = match basename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => basename,
    };
    format!("{stem}{suffix}.{extension}")
}
