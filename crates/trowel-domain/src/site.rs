//! The excavation site entity (singleton per document)

use serde::{Deserialize, Serialize};

/// Overview record for the excavation project as a whole.
///
/// Exactly one instance exists per processed document. It is created nearly
/// empty and incrementally filled across site-pass windows; every field the
/// model has not yet established stays `None`. The accumulated instance is
/// replaced wholesale each window — the extraction step receives the running
/// value and is instructed to carry established fields forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    /// Stable identifier, minted before the first window
    pub id: Option<String>,
    /// Identifier of the source report document
    pub report_id: Option<String>,
    /// Site name as given by the report
    pub site_name: Option<String>,
    /// Administrative location (province / district / parcel)
    pub location_admin: Option<String>,
    /// Excavation start date
    pub start_date: Option<String>,
    /// Excavation end date
    pub end_date: Option<String>,
    /// Organization that conducted the investigation
    pub investigator_organization: Option<String>,
    /// Representative latitude
    pub coordinate_lat: Option<f64>,
    /// Representative longitude
    pub coordinate_lng: Option<f64>,
    /// Investigated area in square meters
    pub area_m2: Option<f64>,
    /// Terrain and environment narrative
    pub terrain_description: Option<String>,
    /// Grid system used during excavation
    pub grid_system_desc: Option<String>,
    /// Maximum excavation depth in meters
    pub excavation_depth_max: Option<f64>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Image references associated with the site overview
    pub images: Vec<String>,
}

impl Site {
    /// A fresh site shell carrying only the minted id and the report id.
    pub fn new(id: String, report_id: String) -> Self {
        Self {
            id: Some(id),
            report_id: Some(report_id),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_site_is_otherwise_empty() {
        let site = Site::new("site-1".into(), "report-9".into());
        assert_eq!(site.id.as_deref(), Some("site-1"));
        assert_eq!(site.report_id.as_deref(), Some("report-9"));
        assert!(site.site_name.is_none());
        assert!(site.images.is_empty());
    }

    #[test]
    fn test_partial_json_deserializes_with_defaults() {
        let site: Site =
            serde_json::from_str(r#"{"id":"s","site_name":"Hilltop fort"}"#).unwrap();
        assert_eq!(site.site_name.as_deref(), Some("Hilltop fort"));
        assert!(site.area_m2.is_none());
        assert!(site.images.is_empty());
    }
}
