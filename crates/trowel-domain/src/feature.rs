//! The archaeological feature entity

use crate::Identified;
use serde::{Deserialize, Serialize};

/// An archaeological structure or deposit found during excavation.
///
/// Independent of trenches. Repeating entity; all fields optional while
/// accumulation is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    /// Stable identifier (proposed by the extraction step)
    pub id: Option<String>,
    /// Back-reference to the owning site
    pub site_id: Option<String>,
    /// Feature number as printed in the report
    pub feature_number: Option<String>,
    /// Feature name
    pub feature_name: Option<String>,
    /// Collected descriptive text for the feature
    pub description: Option<String>,
    /// Feature type (dwelling, kiln, pit, ...)
    pub feature_type: Option<String>,
    /// Subtype or form
    pub subtype_or_form: Option<String>,
    /// Associated archaeological period
    pub associated_period: Option<String>,
    /// Construction method
    pub construction_method: Option<String>,
    /// Construction material
    pub material: Option<String>,
    /// Dimension narrative
    pub dimension_description: Option<String>,
    /// Plan shape
    pub shape_plan: Option<String>,
    /// Section shape
    pub shape_section: Option<String>,
    /// Plan summary
    pub plan_summary: Option<String>,
    /// Number of postholes
    pub posthole_count: Option<i64>,
    /// Posthole detail narrative
    pub posthole_detail: Option<String>,
    /// Internal structure description
    pub structure_description: Option<String>,
    /// Location context within the site
    pub location_context: Option<String>,
    /// Stratigraphic relationships
    pub stratigraphy_relation: Option<String>,
    /// Excavator's interpretation
    pub interpretation: Option<String>,
    /// Whether artifacts were present
    pub artifact_presence: Option<String>,
    /// Disturbance or preservation condition
    pub disturbance_or_condition: Option<String>,
    /// Representative latitude
    pub coordinate_lat: Option<f64>,
    /// Representative longitude
    pub coordinate_lng: Option<f64>,
    /// Image references depicting this feature
    pub images: Vec<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Report pages where this feature is described
    pub page_references: Vec<i64>,
}

impl Identified for Feature {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
