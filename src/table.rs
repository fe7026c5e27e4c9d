//! Concurrent partitioned hash index over transposed descriptors.
//!
//! The table buckets right-hand descriptors by a content hash of their
//! leading-bit-plane prefix. Each bucket chains [`Entry`] records drawn from
//! a pre-allocated arena (flat array, integer links, no pointers); an entry
//! carries the prefix key and a half-open range into the sorted candidate
//! permutation. Because equal keys are adjacent in sorted order, a duplicate
//! insert widens the existing entry's range instead of adding a node, so no
//! cross-bucket merging is ever needed.
//!
//! Build is parallel with one lock per bucket: insertions into distinct
//! buckets never block each other. The lock array lives only for the
//! duration of [`DescriptorTable::build`]; the finished table is read-only.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use crate::bloom::BloomFilter;
use crate::transpose::{PREFIX_LEN, TRANSPOSED_LEN};

/// Comparison-only key: the leading bytes of a transposed descriptor.
pub type PrefixKey = [u8; PREFIX_LEN];

const NIL: u32 = u32::MAX;

/// One chained record: a prefix key and the half-open range of sorted
/// positions holding descriptors with that key.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub key: PrefixKey,
    pub begin: u32,
    pub end: u32,
    next: u32,
}

impl Entry {
    const fn vacant() -> Self {
        Self {
            key: [0u8; PREFIX_LEN],
            begin: 0,
            end: 0,
            next: NIL,
        }
    }
}

/// Pre-allocated entry arena with atomic bump allocation. No nodes are
/// created during build; capacity is fixed up front.
struct EntryPool {
    slots: Box<[UnsafeCell<Entry>]>,
    cursor: AtomicU32,
}

// SAFETY: a slot is mutated only (a) by its allocating thread before it is
// linked into a chain, or (b) while holding the lock of the single bucket
// whose chain reaches it. Both exclude concurrent access.
unsafe impl Sync for EntryPool {}

impl EntryPool {
    fn with_capacity(capacity: usize) -> Self {
        let slots: Vec<UnsafeCell<Entry>> =
            (0..capacity).map(|_| UnsafeCell::new(Entry::vacant())).collect();
        Self {
            slots: slots.into_boxed_slice(),
            cursor: AtomicU32::new(0),
        }
    }

    fn alloc(&self) -> u32 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        assert!(
            (index as usize) < self.slots.len(),
            "entry pool exhausted; capacity must cover all distinct keys"
        );
        index
    }

    /// # Safety
    /// The caller must have exclusive access to slot `index`: either it was
    /// just allocated and is not yet linked, or it is reachable only through
    /// a bucket whose lock the caller holds.
    #[allow(clippy::mut_from_ref)]
    unsafe fn slot_mut(&self, index: u32) -> &mut Entry {
        &mut *self.slots[index as usize].get()
    }

    fn freeze(self) -> Vec<Entry> {
        let used = self.cursor.load(Ordering::Relaxed) as usize;
        self.slots
            .into_vec()
            .into_iter()
            .take(used)
            .map(UnsafeCell::into_inner)
            .collect()
    }
}

/// Read-only prefix-hash index over one right-hand descriptor set.
#[derive(Debug)]
pub struct DescriptorTable {
    heads: Vec<u32>,
    entries: Vec<Entry>,
    bucket_count: usize,
}

impl DescriptorTable {
    /// Bucket count used when the caller does not fix one: next power of two
    /// of a quarter of the candidate count, floored at 64.
    pub fn derive_bucket_count(candidate_count: usize) -> usize {
        (candidate_count / 4).next_power_of_two().max(64)
    }

    /// Build the index against a right-hand set.
    ///
    /// `transposed` holds all right descriptors in bit-plane form; `order` is
    /// the lexicographic sort permutation over them. Sorted position `pos`
    /// is inserted under its prefix key: an equal key already in the bucket
    /// widens its range to the union, otherwise a fresh entry `[pos, pos+1)`
    /// is prepended. Newly keyed entries also populate `bloom` when given.
    pub fn build(
        transposed: &[u8],
        order: &[u32],
        bucket_count: usize,
        bloom: Option<&BloomFilter>,
    ) -> Self {
        assert!(bucket_count > 0, "bucket count must be positive");
        assert_eq!(transposed.len(), order.len() * TRANSPOSED_LEN);

        let pool = EntryPool::with_capacity(order.len().saturating_mul(2).max(1));
        let locks: Vec<Mutex<u32>> = (0..bucket_count).map(|_| Mutex::new(NIL)).collect();

        (0..order.len()).into_par_iter().for_each(|pos| {
            let descriptor =
                &transposed[order[pos] as usize * TRANSPOSED_LEN..][..TRANSPOSED_LEN];
            let key = prefix_key(descriptor);
            let (primary, secondary) = hash_pair(&key);
            let bucket = primary as usize % bucket_count;

            // Scoped guard: released on every path out, merge branch included.
            let mut head = locks[bucket].lock();
            let mut cursor = *head;
            while cursor != NIL {
                // SAFETY: the entry is reachable only through this bucket,
                // and we hold this bucket's lock.
                let entry = unsafe { pool.slot_mut(cursor) };
                if entry.key == key {
                    entry.begin = entry.begin.min(pos as u32);
                    entry.end = entry.end.max(pos as u32 + 1);
                    return;
                }
                cursor = entry.next;
            }

            let index = pool.alloc();
            // SAFETY: freshly allocated slot, not yet linked anywhere.
            let entry = unsafe { pool.slot_mut(index) };
            *entry = Entry {
                key,
                begin: pos as u32,
                end: pos as u32 + 1,
                next: *head,
            };
            *head = index;
            if let Some(filter) = bloom {
                filter.insert(primary, secondary);
            }
        });

        let heads: Vec<u32> = locks.into_iter().map(Mutex::into_inner).collect();
        let entries = pool.freeze();
        debug!(
            buckets = bucket_count,
            entries = entries.len(),
            candidates = order.len(),
            "descriptor table built"
        );
        Self {
            heads,
            entries,
            bucket_count,
        }
    }

    /// Look up the sorted-position range for a transposed query descriptor.
    ///
    /// Returns the matched entry's `[begin, end)` on an exact prefix-key hit,
    /// `None` on a miss. A miss is a designed fallback (the caller scans the
    /// full right set), never an error.
    pub fn lookup(&self, transposed_query: &[u8]) -> Option<(u32, u32)> {
        assert_eq!(transposed_query.len(), TRANSPOSED_LEN);
        let key = prefix_key(transposed_query);
        let (primary, _) = hash_pair(&key);
        let mut cursor = self.heads[primary as usize % self.bucket_count];
        while cursor != NIL {
            let entry = &self.entries[cursor as usize];
            if entry.key == key {
                return Some((entry.begin, entry.end));
            }
            cursor = entry.next;
        }
        None
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// All live entries, in arena order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Extract the comparison key from a transposed descriptor.
#[inline]
pub fn prefix_key(transposed: &[u8]) -> PrefixKey {
    let mut key = [0u8; PREFIX_LEN];
    key.copy_from_slice(&transposed[..PREFIX_LEN]);
    key
}

/// The two independent content hashes of a prefix key: CRC32 (primary, picks
/// the bucket) and FNV-1a 64 (secondary, bloom filter only).
#[inline]
pub fn hash_pair(key: &PrefixKey) -> (u32, u64) {
    (crc32fast::hash(key), fnv1a64(key))
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
