pub mod bloom;
pub mod container;
pub mod matcher;
pub mod table;
pub mod transpose;

pub mod math;
pub mod memory;

pub use container::{
    Descriptor, DescriptorStore, Feature, FeatureSet, WorkerSet, DESCRIPTOR_DIM, MAX_ORIENTATIONS,
};
pub use matcher::{
    accepted_feature_pairs, accepted_pairs, match_descriptors, MatchConfig, MatchMode, MatchResult,
    LOWE_RATIO,
};
pub use table::DescriptorTable;

#[cfg(test)]
mod tests;

/// Errors that can occur while preparing or running a match invocation.
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    /// Returned when an invalid configuration is supplied.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Returned when a feature is pushed with no or too many descriptors.
    #[error("invalid feature: {0}")]
    InvalidFeature(&'static str),
}
