//! Bit-plane transpose of descriptor vectors.
//!
//! A 128-component descriptor is viewed as four groups of 32 32-bit lanes.
//! Each group is transposed as a 32x32 bit matrix and the resulting bytes
//! are scattered through a fixed permutation so that the output is ordered
//! by bit plane first: the leading 16 bytes carry the most-significant bit
//! of all 128 lanes. That short prefix is what the hash index (`table`) and
//! the Hamming proxy metric compare. The transform is pure bit movement and
//! round-trips exactly.

use crate::container::DESCRIPTOR_DIM;

/// Lanes per transpose group (one 32x32 bit matrix each).
pub const GROUP_LANES: usize = 32;
/// Number of 32-lane groups in a descriptor.
pub const GROUP_COUNT: usize = DESCRIPTOR_DIM / GROUP_LANES;
/// Byte length of a transposed descriptor.
pub const TRANSPOSED_LEN: usize = DESCRIPTOR_DIM * 4;
/// Byte length of the leading-bit-plane prefix used as a hash key.
pub const PREFIX_LEN: usize = GROUP_COUNT * 4;

/// Scatter table: transposed byte `(group, plane, byte)` -> plane-major
/// output position. Built once at compile time; the tables are the only
/// layout authority, both directions go through them.
static SCATTER: [usize; TRANSPOSED_LEN] = build_scatter();
static GATHER: [usize; TRANSPOSED_LEN] = build_gather();

const fn build_scatter() -> [usize; TRANSPOSED_LEN] {
    let mut table = [0usize; TRANSPOSED_LEN];
    let mut group = 0;
    while group < GROUP_COUNT {
        let mut plane = 0;
        while plane < GROUP_LANES {
            let mut byte = 0;
            while byte < 4 {
                let src = (group * GROUP_LANES + plane) * 4 + byte;
                let dst = (plane * GROUP_COUNT + group) * 4 + byte;
                table[src] = dst;
                byte += 1;
            }
            plane += 1;
        }
        group += 1;
    }
    table
}

const fn build_gather() -> [usize; TRANSPOSED_LEN] {
    let scatter = build_scatter();
    let mut table = [0usize; TRANSPOSED_LEN];
    let mut src = 0;
    while src < TRANSPOSED_LEN {
        table[scatter[src]] = src;
        src += 1;
    }
    table
}

/// Transpose one 32-lane group. Bit `lane` of output word `plane` is bit
/// `31 - plane` of input word `lane`, so plane 0 collects the MSBs.
fn transpose_group(lanes: &[u32; GROUP_LANES]) -> [u32; GROUP_LANES] {
    let mut planes = [0u32; GROUP_LANES];
    for (plane, row) in planes.iter_mut().enumerate() {
        let bit = 31 - plane;
        let mut bits = 0u32;
        for (lane, word) in lanes.iter().enumerate() {
            bits |= ((word >> bit) & 1) << lane;
        }
        *row = bits;
    }
    planes
}

/// Exact inverse of [`transpose_group`].
fn untranspose_group(planes: &[u32; GROUP_LANES]) -> [u32; GROUP_LANES] {
    let mut lanes = [0u32; GROUP_LANES];
    for (lane, word) in lanes.iter_mut().enumerate() {
        let mut bits = 0u32;
        for (plane, row) in planes.iter().enumerate() {
            bits |= ((row >> lane) & 1) << (31 - plane);
        }
        *word = bits;
    }
    lanes
}

/// Write the bit-plane transposed form of `descriptor` into `out`.
pub fn transpose_into(descriptor: &[f32], out: &mut [u8]) {
    assert_eq!(descriptor.len(), DESCRIPTOR_DIM);
    assert_eq!(out.len(), TRANSPOSED_LEN);

    for group in 0..GROUP_COUNT {
        let mut lanes = [0u32; GROUP_LANES];
        for (lane, value) in descriptor[group * GROUP_LANES..][..GROUP_LANES]
            .iter()
            .enumerate()
        {
            lanes[lane] = value.to_bits();
        }
        let planes = transpose_group(&lanes);
        for (plane, row) in planes.iter().enumerate() {
            let bytes = row.to_le_bytes();
            for (byte, value) in bytes.iter().enumerate() {
                let src = (group * GROUP_LANES + plane) * 4 + byte;
                out[SCATTER[src]] = *value;
            }
        }
    }
}

/// Recover the original descriptor from its transposed form, bit for bit.
pub fn inverse_into(transposed: &[u8], out: &mut [f32]) {
    assert_eq!(transposed.len(), TRANSPOSED_LEN);
    assert_eq!(out.len(), DESCRIPTOR_DIM);

    let mut group_major = [0u8; TRANSPOSED_LEN];
    for (dst, value) in transposed.iter().enumerate() {
        group_major[GATHER[dst]] = *value;
    }

    for group in 0..GROUP_COUNT {
        let mut planes = [0u32; GROUP_LANES];
        for (plane, row) in planes.iter_mut().enumerate() {
            let mut bytes = [0u8; 4];
            let base = (group * GROUP_LANES + plane) * 4;
            bytes.copy_from_slice(&group_major[base..base + 4]);
            *row = u32::from_le_bytes(bytes);
        }
        let lanes = untranspose_group(&planes);
        for (lane, word) in lanes.iter().enumerate() {
            out[group * GROUP_LANES + lane] = f32::from_bits(*word);
        }
    }
}

/// The leading-bit-plane prefix of a transposed descriptor.
#[inline]
pub fn prefix(transposed: &[u8]) -> &[u8] {
    &transposed[..PREFIX_LEN]
}
