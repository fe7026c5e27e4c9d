//! Distance reductions over descriptor vectors.
//!
//! The portable implementations mirror the cooperative shape used on wide
//! hardware: a fixed group of lanes each accumulates a strided partial sum,
//! and the partials are combined by a halving tree into one scalar. SIMD
//! fast paths (AVX2/SSE2/NEON, runtime-detected) compute the same value
//! within floating-point tolerance.

/// Number of lanes in the cooperative reduction group.
pub const REDUCE_LANES: usize = 32;

/// Compute the squared Euclidean distance between two vectors.
#[inline]
pub fn l2_distance_sqr(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: We just checked that AVX2 is available on this CPU.
            return unsafe { x86::l2_distance_sqr_avx2(a, b) };
        }
        if is_x86_feature_detected!("sse2") {
            // SAFETY: We just checked that SSE2 is available on this CPU.
            return unsafe { x86::l2_distance_sqr_sse2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    let result = unsafe { neon::l2_distance_sqr_neon(a, b) };

    #[cfg(not(target_arch = "aarch64"))]
    let result = l2_distance_sqr_lanes(a, b);

    result
}

/// Compute the dot product between two vectors.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: We just checked that AVX2 is available on this CPU.
            return unsafe { x86::dot_avx2(a, b) };
        }
        if is_x86_feature_detected!("sse2") {
            // SAFETY: We just checked that SSE2 is available on this CPU.
            return unsafe { x86::dot_sse2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    let result = unsafe { neon::dot_neon(a, b) };

    #[cfg(not(target_arch = "aarch64"))]
    let result = dot_lanes(a, b);

    result
}

/// Count differing bits over the first `len` bytes of two transposed
/// descriptors.
#[inline]
pub fn hamming_prefix(a: &[u8], b: &[u8], len: usize) -> u32 {
    let a = &a[..len];
    let b = &b[..len];

    let mut count = 0u32;
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        let wa = u64::from_le_bytes(ca.try_into().expect("chunk of length 8"));
        let wb = u64::from_le_bytes(cb.try_into().expect("chunk of length 8"));
        count += (wa ^ wb).count_ones();
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        count += (x ^ y).count_ones();
    }
    count
}

/// Combine per-lane partials into one scalar at lane 0 by halving strides.
#[inline]
fn lane_tree_combine(partials: &mut [f32; REDUCE_LANES]) -> f32 {
    let mut stride = REDUCE_LANES / 2;
    while stride > 0 {
        for lane in 0..stride {
            partials[lane] += partials[lane + stride];
        }
        stride /= 2;
    }
    partials[0]
}

/// Lane-group squared-L2: each lane sums a strided subset, then tree-combine.
#[inline]
pub fn l2_distance_sqr_lanes(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut partials = [0.0f32; REDUCE_LANES];
    for (lane, partial) in partials.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        let mut i = lane;
        while i < a.len() {
            let diff = a[i] - b[i];
            acc += diff * diff;
            i += REDUCE_LANES;
        }
        *partial = acc;
    }
    lane_tree_combine(&mut partials)
}

/// Lane-group dot product with the same reduction shape as squared-L2.
#[inline]
pub fn dot_lanes(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut partials = [0.0f32; REDUCE_LANES];
    for (lane, partial) in partials.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        let mut i = lane;
        while i < a.len() {
            acc += a[i] * b[i];
            i += REDUCE_LANES;
        }
        *partial = acc;
    }
    lane_tree_combine(&mut partials)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use std::arch::is_x86_feature_detected;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    #[inline]
    #[target_feature(enable = "avx2")]
    pub unsafe fn l2_distance_sqr_avx2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = _mm256_setzero_ps();
        let mut i = 0usize;
        let chunks = len / 8;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 8 {
            let va = _mm256_loadu_ps(a_ptr.add(i));
            let vb = _mm256_loadu_ps(b_ptr.add(i));
            let diff = _mm256_sub_ps(va, vb);
            acc = _mm256_add_ps(acc, _mm256_mul_ps(diff, diff));
            i += 8;
        }

        let mut sum = 0.0f32;
        if chunks > 0 {
            let mut buf = [0f32; 8];
            _mm256_storeu_ps(buf.as_mut_ptr(), acc);
            sum = buf.iter().copied().sum();
        }

        while i < len {
            let diff = *a_ptr.add(i) - *b_ptr.add(i);
            sum += diff * diff;
            i += 1;
        }
        sum
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    pub unsafe fn l2_distance_sqr_sse2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = _mm_setzero_ps();
        let mut i = 0usize;
        let chunks = len / 4;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 4 {
            let va = _mm_loadu_ps(a_ptr.add(i));
            let vb = _mm_loadu_ps(b_ptr.add(i));
            let diff = _mm_sub_ps(va, vb);
            acc = _mm_add_ps(acc, _mm_mul_ps(diff, diff));
            i += 4;
        }

        let mut sum = 0.0f32;
        if chunks > 0 {
            let mut buf = [0f32; 4];
            _mm_storeu_ps(buf.as_mut_ptr(), acc);
            sum = buf.iter().copied().sum();
        }

        while i < len {
            let diff = *a_ptr.add(i) - *b_ptr.add(i);
            sum += diff * diff;
            i += 1;
        }
        sum
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    pub unsafe fn dot_avx2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = _mm256_setzero_ps();
        let mut i = 0usize;
        let chunks = len / 8;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 8 {
            let va = _mm256_loadu_ps(a_ptr.add(i));
            let vb = _mm256_loadu_ps(b_ptr.add(i));
            acc = _mm256_add_ps(acc, _mm256_mul_ps(va, vb));
            i += 8;
        }

        let mut sum = 0.0f32;
        if chunks > 0 {
            let mut buf = [0f32; 8];
            _mm256_storeu_ps(buf.as_mut_ptr(), acc);
            sum = buf.iter().copied().sum();
        }

        while i < len {
            sum += *a_ptr.add(i) * *b_ptr.add(i);
            i += 1;
        }
        sum
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    pub unsafe fn dot_sse2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = _mm_setzero_ps();
        let mut i = 0usize;
        let chunks = len / 4;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 4 {
            let va = _mm_loadu_ps(a_ptr.add(i));
            let vb = _mm_loadu_ps(b_ptr.add(i));
            acc = _mm_add_ps(acc, _mm_mul_ps(va, vb));
            i += 4;
        }

        let mut sum = 0.0f32;
        if chunks > 0 {
            let mut buf = [0f32; 4];
            _mm_storeu_ps(buf.as_mut_ptr(), acc);
            sum = buf.iter().copied().sum();
        }

        while i < len {
            sum += *a_ptr.add(i) * *b_ptr.add(i);
            i += 1;
        }
        sum
    }
}

#[cfg(target_arch = "aarch64")]
mod neon {
    use core::arch::aarch64::*;

    #[inline]
    #[target_feature(enable = "neon")]
    pub unsafe fn l2_distance_sqr_neon(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = vdupq_n_f32(0.0);
        let mut i = 0usize;
        let chunks = len / 4;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 4 {
            let va = vld1q_f32(a_ptr.add(i));
            let vb = vld1q_f32(b_ptr.add(i));
            let diff = vsubq_f32(va, vb);
            acc = vaddq_f32(acc, vmulq_f32(diff, diff));
            i += 4;
        }

        let mut sum = if chunks > 0 { vaddvq_f32(acc) } else { 0.0f32 };
        while i < len {
            let diff = *a_ptr.add(i) - *b_ptr.add(i);
            sum += diff * diff;
            i += 1;
        }
        sum
    }

    #[inline]
    #[target_feature(enable = "neon")]
    pub unsafe fn dot_neon(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let mut acc = vdupq_n_f32(0.0);
        let mut i = 0usize;
        let chunks = len / 4;
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        while i < chunks * 4 {
            let va = vld1q_f32(a_ptr.add(i));
            let vb = vld1q_f32(b_ptr.add(i));
            acc = vaddq_f32(acc, vmulq_f32(va, vb));
            i += 4;
        }

        let mut sum = if chunks > 0 { vaddvq_f32(acc) } else { 0.0f32 };
        while i < len {
            sum += *a_ptr.add(i) * *b_ptr.add(i);
            i += 1;
        }
        sum
    }
}
