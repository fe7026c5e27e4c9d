//! Descriptor matching engine.
//!
//! For every left descriptor the engine scans a candidate set from the right
//! set, keeping a streaming top-2 under the configured metric, then decides
//! acceptance with the fixed ratio test on true squared-L2. All three modes
//! share one scan routine parameterized by a [`ScanMetric`] and a candidate
//! provider; they differ only in the proxy distance and in whether the
//! candidate set is pruned by the prefix-hash index.
//!
//! Scans that rank by a proxy (dot product, Hamming prefix) re-rank the best
//! and second-best with true squared-L2 before the accept decision, so index
//! misses and proxy ties can only cost time, never correctness.

use rayon::prelude::*;
use tracing::debug;

use crate::bloom::BloomFilter;
use crate::container::{DescriptorStore, DESCRIPTOR_DIM};
use crate::math;
use crate::memory;
use crate::table::{self, DescriptorTable};
use crate::transpose::{self, TRANSPOSED_LEN};
use crate::MatchError;

/// Lowe-style disambiguation threshold. A match is accepted only when
/// `best_l2 < LOWE_RATIO * second_l2`, strictly.
pub const LOWE_RATIO: f32 = 0.8;

/// Comparison metric driving the candidate scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exhaustive scan ranking directly on squared Euclidean distance.
    L2Exhaustive,
    /// Exhaustive scan ranking on dot product, re-ranked with squared-L2.
    DotRerank,
    /// Hamming distance over the transposed bit-plane prefix, with candidate
    /// sets pruned by the prefix-hash index and squared-L2 re-ranking.
    HammingIndexed,
}

/// Matching configuration.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub mode: MatchMode,
    /// Bucket count for the hash index; derived from the right-set size when
    /// `None`.
    pub bucket_count: Option<usize>,
    /// Bytes of transposed prefix compared by the Hamming proxy. Tunable;
    /// the hash key itself is always the fixed leading-plane prefix.
    pub hamming_prefix_len: usize,
    /// Whether to build and consult the bloom pre-filter.
    pub use_bloom: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::HammingIndexed,
            bucket_count: None,
            hamming_prefix_len: transpose::PREFIX_LEN,
            use_bloom: true,
        }
    }
}

impl MatchConfig {
    pub fn with_mode(mode: MatchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Outcome for one left descriptor: best and second-best right descriptor
/// indices and the ratio-test verdict. Indices are only meaningful when the
/// right set held at least that many candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub best: usize,
    pub second: usize,
    pub accept: bool,
}

/// Accepted `(left descriptor, right descriptor)` index pairs.
pub fn accepted_pairs(results: &[MatchResult]) -> Vec<(usize, usize)> {
    results
        .iter()
        .enumerate()
        .filter(|(_, result)| result.accept)
        .map(|(left, result)| (left, result.best))
        .collect()
}

/// Accepted pairs lifted to owning feature indices through the reverse maps.
pub fn accepted_feature_pairs<L, R>(
    results: &[MatchResult],
    left: &L,
    right: &R,
) -> Vec<(u32, u32)>
where
    L: DescriptorStore,
    R: DescriptorStore,
{
    accepted_pairs(results)
        .into_iter()
        .map(|(l, r)| (left.feature_of(l), right.feature_of(r)))
        .collect()
}

/// Match every left descriptor against the right set.
///
/// Produces one [`MatchResult`] per left descriptor. With fewer than two
/// right descriptors no second-best exists, so every result is rejected.
pub fn match_descriptors<L, R>(
    left: &L,
    right: &R,
    config: &MatchConfig,
) -> Result<Vec<MatchResult>, MatchError>
where
    L: DescriptorStore + Sync,
    R: DescriptorStore + Sync,
{
    if config.hamming_prefix_len == 0 || config.hamming_prefix_len > TRANSPOSED_LEN {
        return Err(MatchError::InvalidConfig(
            "hamming prefix length must be between 1 and the transposed length",
        ));
    }
    if config.bucket_count == Some(0) {
        return Err(MatchError::InvalidConfig("bucket count must be positive"));
    }

    let left_count = left.descriptor_count();
    let right_count = right.descriptor_count();
    if left_count == 0 {
        return Ok(Vec::new());
    }
    if right_count < 2 {
        return Ok(vec![
            MatchResult {
                best: 0,
                second: 0,
                accept: false,
            };
            left_count
        ]);
    }

    let left_descs = left.descriptors();
    let right_descs = right.descriptors();
    let results = match config.mode {
        MatchMode::L2Exhaustive => scan_all(
            &L2Metric {
                left: left_descs,
                right: right_descs,
            },
            left_descs,
            right_descs,
            left_count,
            right_count,
        ),
        MatchMode::DotRerank => scan_all(
            &DotMetric {
                left: left_descs,
                right: right_descs,
            },
            left_descs,
            right_descs,
            left_count,
            right_count,
        ),
        MatchMode::HammingIndexed => {
            match_indexed(left_descs, right_descs, left_count, right_count, config)
        }
    };
    Ok(results)
}

/// Proxy metric used while scanning candidates.
trait ScanMetric: Sync {
    /// Whether best/second must be re-ranked with true squared-L2 before the
    /// accept decision.
    const NEEDS_RERANK: bool;

    fn distance(&self, query: usize, candidate: usize) -> f32;

    /// Strict "closer than" under this metric.
    fn better(a: f32, b: f32) -> bool;
}

struct L2Metric<'a> {
    left: &'a [f32],
    right: &'a [f32],
}

impl ScanMetric for L2Metric<'_> {
    const NEEDS_RERANK: bool = false;

    fn distance(&self, query: usize, candidate: usize) -> f32 {
        math::l2_distance_sqr(descriptor(self.left, query), descriptor(self.right, candidate))
    }

    fn better(a: f32, b: f32) -> bool {
        a < b
    }
}

struct DotMetric<'a> {
    left: &'a [f32],
    right: &'a [f32],
}

impl ScanMetric for DotMetric<'_> {
    const NEEDS_RERANK: bool = true;

    fn distance(&self, query: usize, candidate: usize) -> f32 {
        math::dot(descriptor(self.left, query), descriptor(self.right, candidate))
    }

    fn better(a: f32, b: f32) -> bool {
        a > b
    }
}

struct HammingMetric<'a> {
    left_t: &'a [u8],
    right_t: &'a [u8],
    prefix_len: usize,
}

impl ScanMetric for HammingMetric<'_> {
    const NEEDS_RERANK: bool = true;

    fn distance(&self, query: usize, candidate: usize) -> f32 {
        math::hamming_prefix(
            transposed(self.left_t, query),
            transposed(self.right_t, candidate),
            self.prefix_len,
        ) as f32
    }

    fn better(a: f32, b: f32) -> bool {
        a < b
    }
}

#[inline]
fn descriptor(flat: &[f32], index: usize) -> &[f32] {
    &flat[index * DESCRIPTOR_DIM..][..DESCRIPTOR_DIM]
}

#[inline]
fn transposed(flat: &[u8], index: usize) -> &[u8] {
    &flat[index * TRANSPOSED_LEN..][..TRANSPOSED_LEN]
}

/// Streaming best/second-best selection, O(1) per candidate. Ties keep the
/// earlier candidate, so results are deterministic for a fixed scan order.
#[derive(Debug, Clone, Copy)]
struct Top2 {
    best: f32,
    best_idx: usize,
    second: f32,
    second_idx: usize,
    seen: usize,
}

impl Top2 {
    fn new() -> Self {
        Self {
            best: 0.0,
            best_idx: 0,
            second: 0.0,
            second_idx: 0,
            seen: 0,
        }
    }

    fn push<M: ScanMetric>(&mut self, value: f32, index: usize) {
        if self.seen == 0 {
            self.best = value;
            self.best_idx = index;
        } else if M::better(value, self.best) {
            self.second = self.best;
            self.second_idx = self.best_idx;
            self.best = value;
            self.best_idx = index;
        } else if self.seen == 1 || M::better(value, self.second) {
            self.second = value;
            self.second_idx = index;
        }
        self.seen += 1;
    }
}

fn scan_candidates<M, I>(metric: &M, query: usize, candidates: I) -> Top2
where
    M: ScanMetric,
    I: IntoIterator<Item = usize>,
{
    let mut top = Top2::new();
    for candidate in candidates {
        top.push::<M>(metric.distance(query, candidate), candidate);
    }
    top
}

/// Turn a finished top-2 into a result: re-rank with true squared-L2 where
/// the scan used a proxy, then apply the strict ratio test.
fn resolve<M: ScanMetric>(
    _metric: &M,
    left: &[f32],
    right: &[f32],
    query: usize,
    top: Top2,
) -> MatchResult {
    if top.seen < 2 {
        return MatchResult {
            best: top.best_idx,
            second: 0,
            accept: false,
        };
    }

    let mut best_idx = top.best_idx;
    let mut second_idx = top.second_idx;
    let (best_l2, second_l2) = if M::NEEDS_RERANK {
        let query_desc = descriptor(left, query);
        let best = math::l2_distance_sqr(query_desc, descriptor(right, best_idx));
        let second = math::l2_distance_sqr(query_desc, descriptor(right, second_idx));
        if second < best {
            std::mem::swap(&mut best_idx, &mut second_idx);
            (second, best)
        } else {
            (best, second)
        }
    } else {
        (top.best, top.second)
    };

    MatchResult {
        best: best_idx,
        second: second_idx,
        accept: best_l2 < LOWE_RATIO * second_l2,
    }
}

fn scan_all<M: ScanMetric>(
    metric: &M,
    left: &[f32],
    right: &[f32],
    left_count: usize,
    right_count: usize,
) -> Vec<MatchResult> {
    (0..left_count)
        .into_par_iter()
        .map(|query| {
            let top = scan_candidates(metric, query, 0..right_count);
            resolve(metric, left, right, query, top)
        })
        .collect()
}

/// The index-accelerated path: transpose both sides, sort and index the
/// right side, then per query prune the candidate set through the bloom
/// filter and the table. The left transpose overlaps the right-side
/// sort-and-build; the per-query phase is sequenced after both.
fn match_indexed(
    left: &[f32],
    right: &[f32],
    left_count: usize,
    right_count: usize,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    let bucket_count = config
        .bucket_count
        .unwrap_or_else(|| DescriptorTable::derive_bucket_count(right_count));

    let (left_t, (right_t, order, bloom, index)) = rayon::join(
        || transpose_all(left, left_count),
        || {
            let right_t = transpose_all(right, right_count);
            let order = sort_permutation(&right_t, right_count);
            let bloom = config
                .use_bloom
                .then(|| BloomFilter::with_candidates(right_count));
            let index = DescriptorTable::build(&right_t, &order, bucket_count, bloom.as_ref());
            (right_t, order, bloom, index)
        },
    );
    debug!(
        left_count,
        right_count, bucket_count, "indexed matching: build phase complete"
    );

    let metric = HammingMetric {
        left_t: &left_t,
        right_t: &right_t,
        prefix_len: config.hamming_prefix_len,
    };
    (0..left_count)
        .into_par_iter()
        .map(|query| {
            let query_t = transposed(&left_t, query);
            let top = match candidate_range(&index, bloom.as_ref(), query_t) {
                // A usable range restricts the scan; anything smaller falls
                // back to the full right set so a second-best always exists.
                Some((begin, end)) if end - begin > 1 => scan_candidates(
                    &metric,
                    query,
                    order[begin as usize..end as usize]
                        .iter()
                        .map(|&pos| pos as usize),
                ),
                _ => scan_candidates(&metric, query, 0..right_count),
            };
            resolve(&metric, left, right, query, top)
        })
        .collect()
}

fn candidate_range(
    index: &DescriptorTable,
    bloom: Option<&BloomFilter>,
    query_t: &[u8],
) -> Option<(u32, u32)> {
    if let Some(filter) = bloom {
        let key = table::prefix_key(query_t);
        let (primary, secondary) = table::hash_pair(&key);
        // Definitely absent: skip the chain walk entirely.
        if !filter.contains(primary, secondary) {
            return None;
        }
    }
    index.lookup(query_t)
}

fn transpose_all(descriptors: &[f32], count: usize) -> Vec<u8> {
    let mut out: Vec<u8> = memory::alloc_worker_vec(count * TRANSPOSED_LEN);
    out.par_chunks_mut(TRANSPOSED_LEN)
        .zip(descriptors.par_chunks(DESCRIPTOR_DIM))
        .for_each(|(chunk, descriptor)| transpose::transpose_into(descriptor, chunk));
    out
}

/// Strict byte-wise lexicographic sort of transposed content, ties broken by
/// original index.
fn sort_permutation(transposed_set: &[u8], count: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..count as u32).collect();
    order.par_sort_unstable_by(|&a, &b| {
        transposed(transposed_set, a as usize)
            .cmp(transposed(transposed_set, b as usize))
            .then_with(|| a.cmp(&b))
    });
    order
}
