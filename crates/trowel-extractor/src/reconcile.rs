//! Identifier reconciliation before persistence
//!
//! Model-proposed ids are suggestions, not guarantees: they can be missing,
//! repeat across runs, or collide with rows already persisted. Immediately
//! before the store transaction every entity id is checked against the
//! persisted id sets; missing or colliding ids are replaced with fresh
//! UUIDs, and artifact foreign keys that pointed at a rewritten trench or
//! feature id are rewritten along with it.

use std::collections::{HashMap, HashSet};
use trowel_domain::{new_entity_id, ExtractionState, Identified};

/// Ids already persisted, per entity kind.
#[derive(Debug, Clone, Default)]
pub struct ExistingIds {
    /// Persisted trench ids
    pub trenches: HashSet<String>,
    /// Persisted feature ids
    pub features: HashSet<String>,
    /// Persisted artifact ids
    pub artifacts: HashSet<String>,
}

impl ExistingIds {
    /// Load all three id sets from the store.
    pub fn from_store(store: &trowel_store::ExcavationStore) -> Result<Self, trowel_store::StoreError> {
        Ok(Self {
            trenches: store.existing_trench_ids()?,
            features: store.existing_feature_ids()?,
            artifacts: store.existing_artifact_ids()?,
        })
    }
}

/// Rewrite missing and colliding ids and propagate artifact foreign keys.
///
/// Trenches and features are reconciled first so their old-to-new maps are
/// complete when artifact references are rewritten; artifacts' own ids are
/// reconciled last.
pub fn reconcile(state: &mut ExtractionState, existing: &ExistingIds) {
    let trench_map = remap_kind(&mut state.trenches, &existing.trenches);
    let feature_map = remap_kind(&mut state.features, &existing.features);

    for artifact in &mut state.artifacts {
        if let Some(old) = artifact.feature_id.as_deref() {
            if let Some(new) = feature_map.get(old) {
                artifact.feature_id = Some(new.clone());
            }
        }
        if let Some(old) = artifact.trench_id.as_deref() {
            if let Some(new) = trench_map.get(old) {
                artifact.trench_id = Some(new.clone());
            }
        }
    }

    let rewritten = remap_kind(&mut state.artifacts, &existing.artifacts);
    if !trench_map.is_empty() || !feature_map.is_empty() || !rewritten.is_empty() {
        tracing::debug!(
            trenches = trench_map.len(),
            features = feature_map.len(),
            artifacts = rewritten.len(),
            "rewrote colliding or missing entity ids"
        );
    }
}

/// Give every entity a unique id not present in `persisted` and not reused
/// within the batch. Returns the old-to-new map for entities whose proposed
/// id was replaced.
fn remap_kind<T: Identified>(
    entities: &mut [T],
    persisted: &HashSet<String>,
) -> HashMap<String, String> {
    let mut seen: HashSet<String> = persisted.clone();
    let mut rewrites = HashMap::new();

    for entity in entities {
        match entity.id().map(String::from) {
            Some(id) if !seen.contains(&id) => {
                seen.insert(id);
            }
            Some(old) => {
                let fresh = new_entity_id();
                seen.insert(fresh.clone());
                entity.set_id(fresh.clone());
                rewrites.insert(old, fresh);
            }
            None => {
                let fresh = new_entity_id();
                seen.insert(fresh.clone());
                entity.set_id(fresh);
            }
        }
    }

    rewrites
}
