//! Trowel Storage Layer
//!
//! SQLite persistence sink for standardized report data. The sink exposes
//! exactly two surfaces to the extraction core: a read of all existing
//! identifiers per repeating-entity kind (input to identifier
//! reconciliation), and a transactional all-or-nothing bulk write of one
//! site plus its trenches, features and artifacts.
//!
//! List-valued fields are serialized as JSON-encoded text columns.
//!
//! # Examples
//!
//! ```no_run
//! use trowel_store::ExcavationStore;
//!
//! let store = ExcavationStore::new("excavation.db").unwrap();
//! let taken = store.existing_trench_ids().unwrap();
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, Transaction};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use trowel_domain::{Artifact, ExtractionState, Feature, Site, Trench};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An entity reached the sink without an identifier
    #[error("Missing identifier on {0} record")]
    MissingId(&'static str),

    /// List-field encoding error
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// SQLite-backed persistence sink.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe; each run owns its own store
/// instance, matching the single-thread-per-document execution model.
pub struct ExcavationStore {
    conn: Connection,
}

impl ExcavationStore {
    /// Open (and if necessary initialize) the database at `path`.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(store)
    }

    /// All trench identifiers already persisted.
    pub fn existing_trench_ids(&self) -> Result<HashSet<String>, StoreError> {
        self.select_ids("SELECT id FROM trenches")
    }

    /// All feature identifiers already persisted.
    pub fn existing_feature_ids(&self) -> Result<HashSet<String>, StoreError> {
        self.select_ids("SELECT id FROM features")
    }

    /// All artifact identifiers already persisted.
    pub fn existing_artifact_ids(&self) -> Result<HashSet<String>, StoreError> {
        self.select_ids("SELECT id FROM artifacts")
    }

    fn select_ids(&self, sql: &str) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for id in rows {
            ids.insert(id?);
        }
        Ok(ids)
    }

    /// Write one standardized report in a single transaction.
    ///
    /// Either every entity of every kind is written, or none are: any
    /// failure rolls the transaction back (the uncommitted transaction is
    /// rolled back when dropped).
    pub fn insert_report(&mut self, data: &ExtractionState) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        Self::insert_site(&tx, &data.site)?;
        for trench in &data.trenches {
            Self::insert_trench(&tx, trench)?;
        }
        for feature in &data.features {
            Self::insert_feature(&tx, feature)?;
        }
        for artifact in &data.artifacts {
            Self::insert_artifact(&tx, artifact)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn insert_site(tx: &Transaction<'_>, site: &Site) -> Result<(), StoreError> {
        let id = site.id.as_deref().ok_or(StoreError::MissingId("site"))?;
        tx.execute(
            "INSERT INTO sites (
                id, report_id, site_name, location_admin, start_date, end_date,
                investigator_organization, coordinate_lat, coordinate_lng, area_m2,
                terrain_description, grid_system_desc, excavation_depth_max, remarks, images
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                id,
                site.report_id.as_deref().unwrap_or(""),
                site.site_name.as_deref().unwrap_or("unknown"),
                site.location_admin,
                site.start_date,
                site.end_date,
                site.investigator_organization,
                site.coordinate_lat,
                site.coordinate_lng,
                site.area_m2,
                site.terrain_description,
                site.grid_system_desc,
                site.excavation_depth_max,
                site.remarks,
                serde_json::to_string(&site.images)?,
            ],
        )?;
        Ok(())
    }

    fn insert_trench(tx: &Transaction<'_>, trench: &Trench) -> Result<(), StoreError> {
        let id = trench.id.as_deref().ok_or(StoreError::MissingId("trench"))?;
        let name = trench
            .trench_name
            .as_deref()
            .or(trench.trench_number.as_deref())
            .unwrap_or("unknown");
        tx.execute(
            "INSERT INTO trenches (
                id, site_id, trench_number, trench_name, description,
                position_description, orientation, length_m, width_m, depth_max_m,
                slope_description, stratigraphy_count, key_findings,
                disturbance_or_condition, remarks, coordinate_lat, coordinate_lng,
                images, page_references
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19)",
            params![
                id,
                trench.site_id.as_deref().unwrap_or(""),
                trench.trench_number,
                name,
                trench.description,
                trench.position_description,
                trench.orientation,
                trench.length_m,
                trench.width_m,
                trench.depth_max_m,
                trench.slope_description,
                trench.stratigraphy_count,
                trench.key_findings,
                trench.disturbance_or_condition,
                trench.remarks,
                trench.coordinate_lat,
                trench.coordinate_lng,
                serde_json::to_string(&trench.images)?,
                serde_json::to_string(&trench.page_references)?,
            ],
        )?;
        Ok(())
    }

    fn insert_feature(tx: &Transaction<'_>, feature: &Feature) -> Result<(), StoreError> {
        let id = feature.id.as_deref().ok_or(StoreError::MissingId("feature"))?;
        tx.execute(
            "INSERT INTO features (
                id, site_id, feature_number, feature_name, description, feature_type,
                subtype_or_form, associated_period, construction_method, material,
                dimension_description, shape_plan, shape_section, plan_summary,
                posthole_count, posthole_detail, structure_description,
                location_context, stratigraphy_relation, interpretation,
                artifact_presence, disturbance_or_condition, coordinate_lat,
                coordinate_lng, images, remarks, page_references
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)",
            params![
                id,
                feature.site_id.as_deref().unwrap_or(""),
                feature.feature_number,
                feature.feature_name.as_deref().unwrap_or("unknown"),
                feature.description,
                feature.feature_type,
                feature.subtype_or_form,
                feature.associated_period,
                feature.construction_method,
                feature.material,
                feature.dimension_description,
                feature.shape_plan,
                feature.shape_section,
                feature.plan_summary,
                feature.posthole_count,
                feature.posthole_detail,
                feature.structure_description,
                feature.location_context,
                feature.stratigraphy_relation,
                feature.interpretation,
                feature.artifact_presence,
                feature.disturbance_or_condition,
                feature.coordinate_lat,
                feature.coordinate_lng,
                serde_json::to_string(&feature.images)?,
                feature.remarks,
                serde_json::to_string(&feature.page_references)?,
            ],
        )?;
        Ok(())
    }

    fn insert_artifact(tx: &Transaction<'_>, artifact: &Artifact) -> Result<(), StoreError> {
        let id = artifact.id.as_deref().ok_or(StoreError::MissingId("artifact"))?;
        tx.execute(
            "INSERT INTO artifacts (
                id, site_id, feature_id, trench_id, artifact_number, artifact_name,
                description, artifact_type, subtype_or_name, material,
                shape_or_morphology, dimension_description, weight_g,
                decoration_or_pattern, manufacture_technique, damage_or_condition,
                associated_period, coordinate_lat, coordinate_lng, images, remarks,
                page_references
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
            params![
                id,
                artifact.site_id.as_deref().unwrap_or(""),
                artifact.feature_id,
                artifact.trench_id,
                artifact.artifact_number,
                artifact.artifact_name.as_deref().unwrap_or("unknown"),
                artifact.description,
                artifact.artifact_type,
                artifact.subtype_or_name,
                artifact.material,
                artifact.shape_or_morphology,
                artifact.dimension_description,
                artifact.weight_g,
                artifact.decoration_or_pattern,
                artifact.manufacture_technique,
                artifact.damage_or_condition,
                artifact.associated_period,
                artifact.coordinate_lat,
                artifact.coordinate_lng,
                serde_json::to_string(&artifact.images)?,
                artifact.remarks,
                serde_json::to_string(&artifact.page_references)?,
            ],
        )?;
        Ok(())
    }
}
