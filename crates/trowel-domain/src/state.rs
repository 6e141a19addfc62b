//! Accumulated extraction state

use crate::{Artifact, Feature, Site, Trench};
use serde::{Deserialize, Serialize};

/// The mutable working set threaded through the windowed accumulator.
///
/// Created once per document, mutated once per window (merge step), frozen
/// once the terminal window is reached. Entities are created when first
/// extracted, updated when re-described, never removed during accumulation.
/// Identifier rewriting happens only afterwards, immediately before
/// persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionState {
    /// The singleton site record
    pub site: Site,
    /// Accumulated trenches
    pub trenches: Vec<Trench>,
    /// Accumulated features
    pub features: Vec<Feature>,
    /// Accumulated artifacts
    pub artifacts: Vec<Artifact>,
}

impl ExtractionState {
    /// Start a fresh state around an already-minted site shell.
    pub fn new(site: Site) -> Self {
        Self { site, ..Self::default() }
    }
}
