use rand::prelude::*;

use crate::bloom::BloomFilter;
use crate::container::{Descriptor, DescriptorStore, FeatureSet, WorkerSet, DESCRIPTOR_DIM};
use crate::matcher::{
    accepted_feature_pairs, match_descriptors, MatchConfig, MatchMode, MatchResult,
};
use crate::table::{self, DescriptorTable, PrefixKey};
use crate::transpose::{self, PREFIX_LEN, TRANSPOSED_LEN};
use crate::{math, MatchError};

fn random_descriptor(rng: &mut StdRng) -> Descriptor {
    let mut descriptor = [0.0f32; DESCRIPTOR_DIM];
    for value in descriptor.iter_mut() {
        *value = rng.gen::<f32>() * 2.0 - 1.0;
    }
    descriptor
}

fn feature_set_from(descriptors: &[Descriptor]) -> FeatureSet {
    let mut set = FeatureSet::with_capacity(descriptors.len(), descriptors.len());
    for (i, descriptor) in descriptors.iter().enumerate() {
        set.push_feature(i as f32, 0.0, 1.0, &[(0.0, *descriptor)])
            .expect("push feature");
    }
    set
}

fn transpose_set(descriptors: &[Descriptor]) -> Vec<u8> {
    let mut out = vec![0u8; descriptors.len() * TRANSPOSED_LEN];
    for (chunk, descriptor) in out.chunks_mut(TRANSPOSED_LEN).zip(descriptors) {
        transpose::transpose_into(descriptor, chunk);
    }
    out
}

/// Same ordering the matcher uses: full transposed content, ties by index.
fn sort_order(transposed: &[u8], count: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..count as u32).collect();
    order.sort_unstable_by(|&a, &b| {
        let da = &transposed[a as usize * TRANSPOSED_LEN..][..TRANSPOSED_LEN];
        let db = &transposed[b as usize * TRANSPOSED_LEN..][..TRANSPOSED_LEN];
        da.cmp(db).then_with(|| a.cmp(&b))
    });
    order
}

fn approx_eq(a: f32, b: f32, rel_tol: f32, abs_tol: f32) -> bool {
    let diff = (a - b).abs();
    if diff <= abs_tol {
        return true;
    }
    diff / a.abs().max(b.abs()) <= rel_tol
}

#[test]
fn lane_reduction_matches_sequential_l2() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..32 {
        let a = random_descriptor(&mut rng);
        let b = random_descriptor(&mut rng);
        let sequential: f32 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        let lanes = math::l2_distance_sqr_lanes(&a, &b);
        let dispatched = math::l2_distance_sqr(&a, &b);
        assert!(
            approx_eq(lanes, sequential, 1e-4, 1e-3),
            "lane reduction {lanes} vs sequential {sequential}"
        );
        assert!(
            approx_eq(dispatched, sequential, 1e-4, 1e-3),
            "dispatched {dispatched} vs sequential {sequential}"
        );
    }
}

#[test]
fn lane_reduction_matches_sequential_dot() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..32 {
        let a = random_descriptor(&mut rng);
        let b = random_descriptor(&mut rng);
        let sequential: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let lanes = math::dot_lanes(&a, &b);
        let dispatched = math::dot(&a, &b);
        assert!(
            approx_eq(lanes, sequential, 1e-4, 1e-3),
            "lane reduction {lanes} vs sequential {sequential}"
        );
        assert!(
            approx_eq(dispatched, sequential, 1e-4, 1e-3),
            "dispatched {dispatched} vs sequential {sequential}"
        );
    }
}

#[test]
fn hamming_prefix_counts_differing_bits() {
    let a = [0xFFu8; 32];
    let b = [0x0Fu8; 32];
    assert_eq!(math::hamming_prefix(&a, &b, 32), 4 * 32);
    assert_eq!(math::hamming_prefix(&a, &b, 16), 4 * 16);
    assert_eq!(math::hamming_prefix(&a, &a, 32), 0);
    // Odd prefix length exercises the tail path after the 8-byte chunks.
    assert_eq!(math::hamming_prefix(&a, &b, 13), 4 * 13);
}

#[test]
fn transpose_round_trips_bit_for_bit() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut descriptors: Vec<Descriptor> = (0..24).map(|_| random_descriptor(&mut rng)).collect();

    // Special bit patterns must survive untouched as well.
    let mut special = [1.0f32; DESCRIPTOR_DIM];
    special[0] = 0.0;
    special[1] = -0.0;
    special[2] = f32::INFINITY;
    special[3] = f32::NEG_INFINITY;
    special[4] = f32::NAN;
    special[5] = f32::MIN_POSITIVE;
    special[6] = f32::MAX;
    special[7] = -1.0;
    descriptors.push(special);

    for descriptor in &descriptors {
        let mut transposed = [0u8; TRANSPOSED_LEN];
        transpose::transpose_into(descriptor, &mut transposed);
        let mut recovered = [0.0f32; DESCRIPTOR_DIM];
        transpose::inverse_into(&transposed, &mut recovered);
        for (dim, (original, back)) in descriptor.iter().zip(recovered.iter()).enumerate() {
            assert_eq!(
                original.to_bits(),
                back.to_bits(),
                "bit mismatch at dimension {dim}"
            );
        }
    }
}

#[test]
fn transpose_prefix_collects_sign_bits() {
    let mut descriptor = [1.0f32; DESCRIPTOR_DIM];
    // group 0 lane 0, group 0 lane 9, group 1 lane 5, group 3 lane 31
    for dim in [0usize, 9, 37, 127] {
        descriptor[dim] = -1.0;
    }

    let mut transposed = [0u8; TRANSPOSED_LEN];
    transpose::transpose_into(&descriptor, &mut transposed);
    let prefix = transpose::prefix(&transposed);

    let mut expected = [0u8; PREFIX_LEN];
    for dim in [0usize, 9, 37, 127] {
        let group = dim / 32;
        let lane = dim % 32;
        expected[group * 4 + lane / 8] |= 1 << (lane % 8);
    }
    assert_eq!(
        prefix,
        &expected[..],
        "prefix must hold exactly the sign planes"
    );
}

#[test]
fn table_lookup_never_misses_an_indexed_descriptor() {
    let mut rng = StdRng::seed_from_u64(31);
    let descriptors: Vec<Descriptor> = (0..64).map(|_| random_descriptor(&mut rng)).collect();
    let transposed = transpose_set(&descriptors);
    let order = sort_order(&transposed, descriptors.len());

    let bucket_count = DescriptorTable::derive_bucket_count(descriptors.len());
    let index = DescriptorTable::build(&transposed, &order, bucket_count, None);

    for (i, _) in descriptors.iter().enumerate() {
        let query = &transposed[i * TRANSPOSED_LEN..][..TRANSPOSED_LEN];
        let (begin, end) = index
            .lookup(query)
            .unwrap_or_else(|| panic!("descriptor {i} missing from its own index"));
        let sorted_pos = order.iter().position(|&p| p as usize == i).unwrap() as u32;
        assert!(
            (begin..end).contains(&sorted_pos),
            "descriptor {i}: sorted position {sorted_pos} outside [{begin}, {end})"
        );
    }
}

#[test]
fn table_merges_duplicate_keys_into_one_range() {
    let mut rng = StdRng::seed_from_u64(32);
    let repeated = random_descriptor(&mut rng);
    let mut descriptors = Vec::new();
    // Interleave the copies with distinct descriptors; sorting makes the
    // copies adjacent regardless of push order.
    for _ in 0..4 {
        descriptors.push(repeated);
        descriptors.push(random_descriptor(&mut rng));
        descriptors.push(repeated);
    }

    let transposed = transpose_set(&descriptors);
    let order = sort_order(&transposed, descriptors.len());
    let index = DescriptorTable::build(&transposed, &order, 16, None);

    let mut query = [0u8; TRANSPOSED_LEN];
    transpose::transpose_into(&repeated, &mut query);
    let (begin, end) = index.lookup(&query).expect("repeated descriptor indexed");
    assert_eq!(end - begin, 8, "all copies merged into one widened range");
    for pos in begin..end {
        let original = order[pos as usize] as usize;
        assert_eq!(
            descriptors[original], repeated,
            "range position {pos} does not hold a copy"
        );
    }
}

#[test]
fn concurrent_inserts_into_one_bucket_lose_nothing() {
    let mut rng = StdRng::seed_from_u64(33);
    let descriptors: Vec<Descriptor> = (0..256).map(|_| random_descriptor(&mut rng)).collect();
    let transposed = transpose_set(&descriptors);
    let order = sort_order(&transposed, descriptors.len());

    // A single bucket forces every parallel insert through the same lock.
    let index = DescriptorTable::build(&transposed, &order, 1, None);

    assert_eq!(index.entries().len(), descriptors.len());
    let mut begins: Vec<u32> = index
        .entries()
        .iter()
        .map(|entry| {
            assert_eq!(entry.end, entry.begin + 1, "distinct keys stay singletons");
            entry.begin
        })
        .collect();
    begins.sort_unstable();
    let expected: Vec<u32> = (0..descriptors.len() as u32).collect();
    assert_eq!(begins, expected, "ranges are disjoint and cover every position");

    for (i, _) in descriptors.iter().enumerate() {
        let query = &transposed[i * TRANSPOSED_LEN..][..TRANSPOSED_LEN];
        assert!(index.lookup(query).is_some(), "descriptor {i} lost");
    }
}

#[test]
fn concurrent_inserts_merge_duplicates_without_overlap() {
    let mut rng = StdRng::seed_from_u64(34);
    let distinct: Vec<Descriptor> = (0..32).map(|_| random_descriptor(&mut rng)).collect();
    let mut descriptors = Vec::new();
    for _ in 0..4 {
        for base in &distinct {
            descriptors.push(*base);
        }
    }

    let transposed = transpose_set(&descriptors);
    let order = sort_order(&transposed, descriptors.len());
    let index = DescriptorTable::build(&transposed, &order, 1, None);

    assert_eq!(index.entries().len(), distinct.len());
    let mut ranges: Vec<(u32, u32)> = index
        .entries()
        .iter()
        .map(|entry| (entry.begin, entry.end))
        .collect();
    ranges.sort_unstable();
    let mut covered = 0u32;
    for (begin, end) in ranges {
        assert_eq!(begin, covered, "ranges must tile the sorted positions");
        assert_eq!(end - begin, 4, "each key widened over its four copies");
        covered = end;
    }
    assert_eq!(covered, descriptors.len() as u32);
}

#[test]
fn bloom_filter_has_no_false_negatives() {
    let mut rng = StdRng::seed_from_u64(41);
    let filter = BloomFilter::with_candidates(1000);
    let mut keys = Vec::new();
    for _ in 0..1000 {
        let mut key: PrefixKey = [0u8; PREFIX_LEN];
        rng.fill(&mut key[..]);
        keys.push(key);
    }
    for key in &keys {
        let (primary, secondary) = table::hash_pair(key);
        filter.insert(primary, secondary);
    }
    for key in &keys {
        let (primary, secondary) = table::hash_pair(key);
        assert!(filter.contains(primary, secondary), "inserted key missing");
    }
}

#[test]
fn bloom_false_positive_rate_is_bounded() {
    let mut rng = StdRng::seed_from_u64(42);
    let filter = BloomFilter::with_candidates(1000);
    for _ in 0..1000 {
        let mut key: PrefixKey = [0u8; PREFIX_LEN];
        rng.fill(&mut key[..]);
        let (primary, secondary) = table::hash_pair(&key);
        filter.insert(primary, secondary);
    }

    let trials = 10_000usize;
    let mut false_positives = 0usize;
    for _ in 0..trials {
        let mut key: PrefixKey = [0u8; PREFIX_LEN];
        rng.fill(&mut key[..]);
        let (primary, secondary) = table::hash_pair(&key);
        if filter.contains(primary, secondary) {
            false_positives += 1;
        }
    }
    // Two hash functions at 8 bits per key give roughly 5%.
    let rate = false_positives as f64 / trials as f64;
    assert!(rate < 0.08, "false-positive rate {rate} above expected bound");
}

#[test]
fn ratio_exactly_at_threshold_is_rejected() {
    let zero = [0.0f32; DESCRIPTOR_DIM];
    let mut best = [0.0f32; DESCRIPTOR_DIM];
    best[0] = 2.0; // squared distance 4
    let mut second = [0.0f32; DESCRIPTOR_DIM];
    second[0] = 2.0;
    second[1] = 1.0; // squared distance 5; 0.8 * 5 == 4 exactly in f32

    let left = feature_set_from(&[zero]);
    let right = feature_set_from(&[best, second]);
    let results = match_descriptors(
        &left,
        &right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("match");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].best, 0);
    assert!(!results[0].accept, "ratio of exactly 0.8 must be rejected");
}

#[test]
fn ratio_strictly_below_threshold_is_accepted() {
    let zero = [0.0f32; DESCRIPTOR_DIM];
    let mut best = [0.0f32; DESCRIPTOR_DIM];
    best[0] = 2.0; // squared distance 4
    let mut second = [0.0f32; DESCRIPTOR_DIM];
    second[0] = 2.5;
    second[1] = 0.5; // squared distance 6.5

    let left = feature_set_from(&[zero]);
    let right = feature_set_from(&[best, second]);
    let results = match_descriptors(
        &left,
        &right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("match");
    assert_eq!(
        results[0],
        MatchResult {
            best: 0,
            second: 1,
            accept: true
        }
    );
}

#[test]
fn end_to_end_small_sets() {
    let ones = [1.0f32; DESCRIPTOR_DIM];
    let minus_ones = [-1.0f32; DESCRIPTOR_DIM];
    let mut half = [1.0f32; DESCRIPTOR_DIM];
    for value in half.iter_mut().skip(DESCRIPTOR_DIM / 2) {
        *value = -1.0;
    }
    let mut spike = [0.0f32; DESCRIPTOR_DIM];
    spike[0] = 3.0;

    // left[0] sits on right[2]; left[1] is equidistant to right[0]/right[1].
    let mut near_ones = ones;
    near_ones[0] = 1.01;
    let mut midpoint = [0.0f32; DESCRIPTOR_DIM];
    for value in midpoint.iter_mut().skip(DESCRIPTOR_DIM / 2) {
        *value = -1.0;
    }

    let mut rng = StdRng::seed_from_u64(51);
    let left = feature_set_from(&[
        near_ones,
        midpoint,
        random_descriptor(&mut rng),
        random_descriptor(&mut rng),
    ]);
    let right = feature_set_from(&[minus_ones, half, ones, spike]);

    for mode in [MatchMode::L2Exhaustive, MatchMode::DotRerank] {
        let results =
            match_descriptors(&left, &right, &MatchConfig::with_mode(mode)).expect("match");
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].best, 2, "{mode:?}: left[0] belongs to right[2]");
        assert!(results[0].accept, "{mode:?}: decisive match accepted");
        assert!(
            !results[1].accept,
            "{mode:?}: near-equidistant candidates rejected"
        );
    }
}

#[test]
fn hamming_indexed_finds_exact_duplicates() {
    let mut rng = StdRng::seed_from_u64(52);
    let rights: Vec<Descriptor> = (0..16).map(|_| random_descriptor(&mut rng)).collect();
    let mut perturbed = rights[11];
    perturbed[64] += 0.001;
    let lefts = vec![rights[3], rights[7], perturbed, random_descriptor(&mut rng)];

    let left = feature_set_from(&lefts);
    let right = feature_set_from(&rights);
    let results = match_descriptors(&left, &right, &MatchConfig::default()).expect("match");

    assert_eq!(results[0].best, 3);
    assert!(results[0].accept);
    assert_eq!(results[1].best, 7);
    assert!(results[1].accept);
    assert_eq!(results[2].best, 11, "near-copy re-ranked to its source");
    assert!(results[2].accept);
}

#[test]
fn indexed_mode_with_forced_collisions_matches_exhaustive() {
    let mut rng = StdRng::seed_from_u64(53);
    let rights: Vec<Descriptor> = (0..16).map(|_| random_descriptor(&mut rng)).collect();
    let lefts: Vec<Descriptor> = (0..8).map(|i| rights[i * 2]).collect();

    let left = feature_set_from(&lefts);
    let right = feature_set_from(&rights);

    let exhaustive = match_descriptors(
        &left,
        &right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("exhaustive");
    let indexed = match_descriptors(
        &left,
        &right,
        &MatchConfig {
            bucket_count: Some(1),
            use_bloom: false,
            ..MatchConfig::default()
        },
    )
    .expect("indexed");

    for (i, (a, b)) in exhaustive.iter().zip(indexed.iter()).enumerate() {
        assert_eq!(a.best, b.best, "left {i}: best candidate differs");
        assert_eq!(a.accept, b.accept, "left {i}: verdict differs");
    }
}

#[test]
fn degenerate_right_sets_reject_everything() {
    let mut rng = StdRng::seed_from_u64(54);
    let lefts: Vec<Descriptor> = (0..3).map(|_| random_descriptor(&mut rng)).collect();
    let left = feature_set_from(&lefts);

    for mode in [
        MatchMode::L2Exhaustive,
        MatchMode::DotRerank,
        MatchMode::HammingIndexed,
    ] {
        let empty = FeatureSet::new();
        let results =
            match_descriptors(&left, &empty, &MatchConfig::with_mode(mode)).expect("empty right");
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.accept), "{mode:?}: empty right");

        let single = feature_set_from(&[random_descriptor(&mut rng)]);
        let results =
            match_descriptors(&left, &single, &MatchConfig::with_mode(mode)).expect("single right");
        assert!(results.iter().all(|r| !r.accept), "{mode:?}: single right");
    }

    let empty_left = FeatureSet::new();
    let right = feature_set_from(&lefts);
    let results =
        match_descriptors(&empty_left, &right, &MatchConfig::default()).expect("empty left");
    assert!(results.is_empty());
}

#[test]
fn invalid_configs_are_rejected() {
    let mut rng = StdRng::seed_from_u64(55);
    let set = feature_set_from(&[random_descriptor(&mut rng), random_descriptor(&mut rng)]);

    let bad_prefix = MatchConfig {
        hamming_prefix_len: 0,
        ..MatchConfig::default()
    };
    assert!(matches!(
        match_descriptors(&set, &set, &bad_prefix),
        Err(MatchError::InvalidConfig(_))
    ));

    let bad_buckets = MatchConfig {
        bucket_count: Some(0),
        ..MatchConfig::default()
    };
    assert!(matches!(
        match_descriptors(&set, &set, &bad_buckets),
        Err(MatchError::InvalidConfig(_))
    ));
}

#[test]
fn push_feature_validates_orientations() {
    let mut set = FeatureSet::new();
    assert!(matches!(
        set.push_feature(0.0, 0.0, 1.0, &[]),
        Err(MatchError::InvalidFeature(_))
    ));
    let descriptor = [0.5f32; DESCRIPTOR_DIM];
    let five = [(0.0f32, descriptor); 5];
    assert!(matches!(
        set.push_feature(0.0, 0.0, 1.0, &five),
        Err(MatchError::InvalidFeature(_))
    ));
    assert_eq!(set.feature_count(), 0);
}

#[test]
fn reverse_map_tracks_owning_features() {
    let d = [0.25f32; DESCRIPTOR_DIM];
    let mut set = FeatureSet::new();
    set.push_feature(1.0, 1.0, 2.0, &[(0.1, d), (0.2, d)])
        .expect("feature 0");
    set.push_feature(2.0, 2.0, 2.0, &[(0.3, d)]).expect("feature 1");
    set.push_feature(3.0, 3.0, 2.0, &[(0.4, d), (0.5, d), (0.6, d)])
        .expect("feature 2");

    assert_eq!(set.descriptor_count(), 6);
    let expected_owner = [0u32, 0, 1, 2, 2, 2];
    for (descriptor, owner) in expected_owner.iter().enumerate() {
        assert_eq!(set.feature_of(descriptor), *owner);
    }
    assert_eq!(set.features()[2].desc_offset, 3);
    assert_eq!(set.features()[2].num_descriptors, 3);
}

#[test]
fn accepted_pairs_lift_to_features() {
    let mut rng = StdRng::seed_from_u64(56);
    let a = random_descriptor(&mut rng);
    let b = random_descriptor(&mut rng);
    let c = random_descriptor(&mut rng);

    // One left feature owning two descriptors that copy right features 1 and 2.
    let mut left = FeatureSet::new();
    left.push_feature(0.0, 0.0, 1.0, &[(0.0, b), (0.5, c)])
        .expect("left feature");
    let right = feature_set_from(&[a, b, c]);

    let results = match_descriptors(
        &left,
        &right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("match");
    let pairs = accepted_feature_pairs(&results, &left, &right);
    assert_eq!(pairs, vec![(0, 1), (0, 2)]);
}

#[test]
fn feature_listing_round_trips() {
    let mut descriptor = [1.5f32; DESCRIPTOR_DIM];
    descriptor[10] = -2.25;
    let mut set = FeatureSet::new();
    set.push_feature(4.5, -1.25, 2.0, &[(0.75, descriptor)])
        .expect("feature");

    let mut exact = Vec::new();
    set.write_listing(&mut exact, false).expect("exact listing");
    let exact = String::from_utf8(exact).expect("utf8");
    let lines: Vec<&str> = exact.lines().collect();
    assert_eq!(lines.len(), 1);
    let tokens: Vec<&str> = lines[0].split_whitespace().collect();
    assert_eq!(tokens.len(), 4 + DESCRIPTOR_DIM);
    assert_eq!(tokens[0].parse::<f32>().unwrap(), 4.5);
    assert_eq!(tokens[3].parse::<f32>().unwrap(), 0.75);
    assert_eq!(tokens[4 + 10].parse::<f32>().unwrap(), -2.25);

    let mut rounded = Vec::new();
    set.write_listing(&mut rounded, true).expect("rounded listing");
    let rounded = String::from_utf8(rounded).expect("utf8");
    let tokens: Vec<&str> = rounded.lines().next().unwrap().split_whitespace().collect();
    assert_eq!(tokens[4].parse::<i64>().unwrap(), 2);
    assert_eq!(tokens[4 + 10].parse::<i64>().unwrap(), -2);
}

#[test]
fn pin_unpin_is_idempotent_pairable() {
    let mut rng = StdRng::seed_from_u64(57);
    let mut set = feature_set_from(&[random_descriptor(&mut rng)]);
    assert!(!set.is_pinned());
    set.pin();
    set.pin();
    set.unpin();
    set.unpin();
    assert!(!set.is_pinned());

    set.pin();
    set.reset();
    assert!(!set.is_pinned());
    assert_eq!(set.descriptor_count(), 0);
}

#[test]
fn worker_set_mirrors_host_set() {
    let mut rng = StdRng::seed_from_u64(58);
    let rights: Vec<Descriptor> = (0..8).map(|_| random_descriptor(&mut rng)).collect();
    let lefts: Vec<Descriptor> = (0..4).map(|i| rights[i]).collect();
    let host_left = feature_set_from(&lefts);
    let host_right = feature_set_from(&rights);

    let mut worker_left = WorkerSet::default();
    let mut worker_right = WorkerSet::default();
    worker_left.upload(&host_left);
    worker_right.upload(&host_right);
    assert_eq!(worker_left.descriptor_count(), host_left.descriptor_count());
    assert_eq!(worker_left.descriptors(), host_left.descriptors());

    let via_host = match_descriptors(
        &host_left,
        &host_right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("host match");
    let via_worker = match_descriptors(
        &worker_left,
        &worker_right,
        &MatchConfig::with_mode(MatchMode::L2Exhaustive),
    )
    .expect("worker match");
    assert_eq!(via_host, via_worker);

    let mut downloaded = FeatureSet::new();
    worker_right.download_into(&mut downloaded);
    assert_eq!(downloaded.features(), host_right.features());
    assert_eq!(downloaded.descriptors(), host_right.descriptors());
}
