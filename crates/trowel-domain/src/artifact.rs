//! The artifact entity

use crate::Identified;
use serde::{Deserialize, Serialize};

/// A recovered object, optionally tied to a feature and/or trench.
///
/// Both `feature_id` and `trench_id` may be absent ("provenance unknown"),
/// but the common case is exactly one of them populated. Repeating entity;
/// all fields optional while accumulation is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    /// Stable identifier (proposed by the extraction step)
    pub id: Option<String>,
    /// Back-reference to the owning site
    pub site_id: Option<String>,
    /// Feature this artifact was recovered from, if known
    pub feature_id: Option<String>,
    /// Trench this artifact was recovered from, if known
    pub trench_id: Option<String>,
    /// Artifact number as printed in the report
    pub artifact_number: Option<String>,
    /// Artifact name
    pub artifact_name: Option<String>,
    /// Collected descriptive text for the artifact
    pub description: Option<String>,
    /// Artifact type (pottery, stone tool, ...)
    pub artifact_type: Option<String>,
    /// Subtype or specific name
    pub subtype_or_name: Option<String>,
    /// Material
    pub material: Option<String>,
    /// Shape or morphology narrative
    pub shape_or_morphology: Option<String>,
    /// Dimension narrative
    pub dimension_description: Option<String>,
    /// Weight in grams
    pub weight_g: Option<f64>,
    /// Decoration or surface pattern
    pub decoration_or_pattern: Option<String>,
    /// Manufacturing technique
    pub manufacture_technique: Option<String>,
    /// Damage or preservation condition
    pub damage_or_condition: Option<String>,
    /// Associated archaeological period
    pub associated_period: Option<String>,
    /// Representative latitude
    pub coordinate_lat: Option<f64>,
    /// Representative longitude
    pub coordinate_lng: Option<f64>,
    /// Image references depicting this artifact
    pub images: Vec<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Report pages where this artifact is described
    pub page_references: Vec<i64>,
}

impl Identified for Artifact {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
