//! Feature and descriptor storage.
//!
//! Two mirrored containers hold the same Feature/Descriptor arrays: the
//! host-side [`FeatureSet`] that upstream detection fills in, and the
//! worker-side [`WorkerSet`] staged for the matching phase. Each owns its
//! backing storage exclusively and releases it on drop or `reset`. The host
//! copy can be registered for fast transfer (`pin`/`unpin`) independently of
//! its content. Matching itself only needs read access to descriptors, which
//! both containers expose through [`DescriptorStore`].

use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::memory;
use crate::MatchError;

/// Number of components in a descriptor vector.
pub const DESCRIPTOR_DIM: usize = 128;
/// Maximum dominant orientations (and thus descriptors) per feature.
pub const MAX_ORIENTATIONS: usize = 4;

/// One descriptor: a fixed 128-component vector.
pub type Descriptor = [f32; DESCRIPTOR_DIM];

/// A detected keypoint owning one descriptor per dominant orientation.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Feature {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub orientations: [f32; MAX_ORIENTATIONS],
    /// Number of valid orientations/descriptors, 1..=MAX_ORIENTATIONS.
    pub num_descriptors: usize,
    /// Index of the first owned descriptor in the flat descriptor array.
    pub desc_offset: usize,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}) scale {:.3} with {} orientation(s)",
            self.x, self.y, self.scale, self.num_descriptors
        )
    }
}

/// Read access to a flat, contiguous descriptor array and its reverse map.
pub trait DescriptorStore {
    /// Number of descriptors held.
    fn descriptor_count(&self) -> usize;

    /// All descriptors as one contiguous slice of `count * 128` components.
    fn descriptors(&self) -> &[f32];

    /// Owning feature index for a descriptor index.
    fn feature_of(&self, descriptor: usize) -> u32;

    /// One descriptor as a slice.
    fn descriptor(&self, index: usize) -> &[f32] {
        &self.descriptors()[index * DESCRIPTOR_DIM..][..DESCRIPTOR_DIM]
    }
}

/// Host-side container filled by upstream detection.
#[derive(Debug, Default)]
pub struct FeatureSet {
    features: Vec<Feature>,
    descriptors: Vec<f32>,
    desc_to_feature: Vec<u32>,
    pinned: bool,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the backing storage. Allocation failure is fatal (logged and
    /// the process aborts); there is no degraded path for a process that
    /// cannot hold its own data.
    pub fn with_capacity(feature_count: usize, descriptor_count: usize) -> Self {
        let mut set = Self::new();
        memory::reserve_host(&mut set.features, feature_count);
        memory::reserve_host(&mut set.descriptors, descriptor_count * DESCRIPTOR_DIM);
        memory::reserve_host(&mut set.desc_to_feature, descriptor_count);
        set
    }

    /// Append one feature with its oriented descriptors. Returns the new
    /// feature's index. The reverse map is kept in sync.
    pub fn push_feature(
        &mut self,
        x: f32,
        y: f32,
        scale: f32,
        oriented: &[(f32, Descriptor)],
    ) -> Result<usize, MatchError> {
        if oriented.is_empty() {
            return Err(MatchError::InvalidFeature(
                "a feature owns at least one descriptor",
            ));
        }
        if oriented.len() > MAX_ORIENTATIONS {
            return Err(MatchError::InvalidFeature(
                "too many orientations for one feature",
            ));
        }

        let feature_index = self.features.len();
        let desc_offset = self.desc_to_feature.len();

        let mut orientations = [0.0f32; MAX_ORIENTATIONS];
        for (slot, (angle, _)) in orientations.iter_mut().zip(oriented) {
            *slot = *angle;
        }

        memory::reserve_host(&mut self.features, 1);
        memory::reserve_host(&mut self.descriptors, oriented.len() * DESCRIPTOR_DIM);
        memory::reserve_host(&mut self.desc_to_feature, oriented.len());

        self.features.push(Feature {
            x,
            y,
            scale,
            orientations,
            num_descriptors: oriented.len(),
            desc_offset,
        });
        for (_, descriptor) in oriented {
            self.descriptors.extend_from_slice(descriptor);
            self.desc_to_feature.push(feature_index as u32);
        }
        Ok(feature_index)
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Register the descriptor storage for fast transfer. Idempotent; a
    /// registration failure is logged and ignored.
    pub fn pin(&mut self) {
        if self.pinned {
            return;
        }
        let bytes = self.descriptors.len() * std::mem::size_of::<f32>();
        // SAFETY: the region is the live backing storage of `descriptors`.
        let result =
            unsafe { memory::pin_region(self.descriptors.as_ptr() as *const u8, bytes) };
        match result {
            Ok(()) => self.pinned = true,
            Err(err) => warn!(bytes, cause = %err, "feature memory registration failed"),
        }
    }

    /// Undo [`FeatureSet::pin`]. Idempotent; failures are logged and ignored.
    pub fn unpin(&mut self) {
        if !self.pinned {
            return;
        }
        let bytes = self.descriptors.len() * std::mem::size_of::<f32>();
        // SAFETY: same region that pin() registered; storage has not been
        // reallocated while pinned.
        let result =
            unsafe { memory::unpin_region(self.descriptors.as_ptr() as *const u8, bytes) };
        if let Err(err) = result {
            warn!(bytes, cause = %err, "feature memory unregistration failed");
        }
        self.pinned = false;
    }

    /// Drop all content and release the backing storage.
    pub fn reset(&mut self) {
        self.unpin();
        self.features = Vec::new();
        self.descriptors = Vec::new();
        self.desc_to_feature = Vec::new();
    }

    /// Write a human-readable listing of all features: position, scale, one
    /// line per orientation with the 128 descriptor components, exact or
    /// rounded to integers.
    pub fn write_listing<W: Write>(&self, out: &mut W, rounded: bool) -> io::Result<()> {
        for feature in &self.features {
            for slot in 0..feature.num_descriptors {
                write!(
                    out,
                    "{} {} {} {}",
                    feature.x, feature.y, feature.scale, feature.orientations[slot]
                )?;
                let descriptor = self.descriptor(feature.desc_offset + slot);
                for value in descriptor {
                    if rounded {
                        write!(out, " {}", value.round() as i64)?;
                    } else {
                        write!(out, " {}", value)?;
                    }
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl Drop for FeatureSet {
    fn drop(&mut self) {
        self.unpin();
    }
}

impl DescriptorStore for FeatureSet {
    fn descriptor_count(&self) -> usize {
        self.desc_to_feature.len()
    }

    fn descriptors(&self) -> &[f32] {
        &self.descriptors
    }

    fn feature_of(&self, descriptor: usize) -> u32 {
        self.desc_to_feature[descriptor]
    }
}

/// Worker-side mirror of a [`FeatureSet`], staged for the matching phase.
///
/// Backed by huge-page-advised buffers; populated by [`WorkerSet::upload`],
/// read back with [`WorkerSet::download_into`].
#[derive(Debug, Default)]
pub struct WorkerSet {
    features: Vec<Feature>,
    descriptors: Vec<f32>,
    desc_to_feature: Vec<u32>,
}

impl WorkerSet {
    /// Allocate worker storage for the given counts. Fatal on failure.
    pub fn allocate(feature_count: usize, descriptor_count: usize) -> Self {
        Self {
            features: memory::alloc_worker_vec(feature_count),
            descriptors: memory::alloc_worker_vec(descriptor_count * DESCRIPTOR_DIM),
            desc_to_feature: memory::alloc_worker_vec(descriptor_count),
        }
    }

    /// Copy a host set into this mirror, resizing as needed.
    pub fn upload(&mut self, host: &FeatureSet) {
        if self.features.len() != host.features.len()
            || self.descriptors.len() != host.descriptors.len()
        {
            *self = Self::allocate(host.feature_count(), host.descriptor_count());
        }
        self.features.copy_from_slice(&host.features);
        self.descriptors.copy_from_slice(&host.descriptors);
        self.desc_to_feature.copy_from_slice(&host.desc_to_feature);
    }

    /// Copy this mirror back into a host set, replacing its content.
    pub fn download_into(&self, host: &mut FeatureSet) {
        host.reset();
        memory::reserve_host(&mut host.features, self.features.len());
        memory::reserve_host(&mut host.descriptors, self.descriptors.len());
        memory::reserve_host(&mut host.desc_to_feature, self.desc_to_feature.len());
        host.features.extend_from_slice(&self.features);
        host.descriptors.extend_from_slice(&self.descriptors);
        host.desc_to_feature.extend_from_slice(&self.desc_to_feature);
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Drop all content and release the backing storage.
    pub fn reset(&mut self) {
        self.features = Vec::new();
        self.descriptors = Vec::new();
        self.desc_to_feature = Vec::new();
    }
}

impl DescriptorStore for WorkerSet {
    fn descriptor_count(&self) -> usize {
        self.desc_to_feature.len()
    }

    fn descriptors(&self) -> &[f32] {
        &self.descriptors
    }

    fn feature_of(&self, descriptor: usize) -> u32 {
        self.desc_to_feature[descriptor]
    }
}
