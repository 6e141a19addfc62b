//! The trench entity

use crate::Identified;
use serde::{Deserialize, Serialize};

/// A dug exploration unit, independent of features.
///
/// Repeating entity; all fields optional while accumulation is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trench {
    /// Stable identifier (proposed by the extraction step)
    pub id: Option<String>,
    /// Back-reference to the owning site
    pub site_id: Option<String>,
    /// Trench number as printed in the report
    pub trench_number: Option<String>,
    /// Trench name
    pub trench_name: Option<String>,
    /// Collected descriptive text for the trench
    pub description: Option<String>,
    /// Position within the site
    pub position_description: Option<String>,
    /// Orientation (e.g. "NE-SW")
    pub orientation: Option<String>,
    /// Length in meters
    pub length_m: Option<f64>,
    /// Width in meters
    pub width_m: Option<f64>,
    /// Maximum depth in meters
    pub depth_max_m: Option<f64>,
    /// Slope narrative
    pub slope_description: Option<String>,
    /// Number of stratigraphic layers observed
    pub stratigraphy_count: Option<i64>,
    /// Key findings summary
    pub key_findings: Option<String>,
    /// Disturbance or preservation condition
    pub disturbance_or_condition: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Representative latitude
    pub coordinate_lat: Option<f64>,
    /// Representative longitude
    pub coordinate_lng: Option<f64>,
    /// Image references depicting this trench
    pub images: Vec<String>,
    /// Report pages where this trench is described
    pub page_references: Vec<i64>,
}

impl Identified for Trench {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
