//! Figure captions and caption-to-image association results

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// A figure caption: label category, number and trailing description.
///
/// The number is fractional because compound figure numbers ("3-2") are
/// parsed as `3.2` to keep ordering within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Label category ("photo", "drawing", "table", ...)
    pub prefix: String,
    /// Number within the category
    pub number: f64,
    /// Trailing description text, possibly empty
    pub text: String,
}

impl Caption {
    /// Grouping key: images on a page sharing this key depict the same
    /// logical figure and must share one caption.
    pub fn group_key(&self) -> String {
        format!("{}-{}", self.prefix, self.number)
    }

    /// Short display form, `"prefix number"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.prefix, self.number)
    }

    /// Full display form, `"prefix number text"`.
    pub fn full_label(&self) -> String {
        format!("{} {} {}", self.prefix, self.number, self.text)
    }
}

/// An image together with its associated caption (if one was found).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionedImage {
    /// Opaque image reference
    pub src: String,
    /// 1-based page number
    pub page: u32,
    /// Position on the page
    pub bbox: BBox,
    /// Associated caption, `None` when no candidate qualified
    pub caption: Option<Caption>,
}

/// Caption enriched with the display strings the extraction passes use.
///
/// `label` drives in-window image selection (an image is "mentioned" in a
/// window when its label appears verbatim in the window text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionLabel {
    /// Label category
    pub prefix: String,
    /// Number within the category
    pub number: f64,
    /// Trailing description text
    pub text: String,
    /// `"prefix number"`
    pub label: String,
    /// `"prefix number text"`
    pub full_label: String,
}

impl From<&Caption> for CaptionLabel {
    fn from(caption: &Caption) -> Self {
        Self {
            prefix: caption.prefix.clone(),
            number: caption.number,
            text: caption.text.clone(),
            label: caption.label(),
            full_label: caption.full_label(),
        }
    }
}

/// The per-image record handed to the extraction prompts: the positional
/// data has served its purpose by now, only the reference and the caption
/// display strings remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledImage {
    /// Opaque image reference
    pub src: String,
    /// Caption with display strings, `None` for uncaptioned images
    pub caption: Option<CaptionLabel>,
}

impl From<&CaptionedImage> for LabeledImage {
    fn from(image: &CaptionedImage) -> Self {
        Self {
            src: image.src.clone(),
            caption: image.caption.as_ref().map(CaptionLabel::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption() -> Caption {
        Caption {
            prefix: "photo".into(),
            number: 3.0,
            text: "trench 2 from the south".into(),
        }
    }

    #[test]
    fn test_display_strings() {
        let c = caption();
        assert_eq!(c.label(), "photo 3");
        assert_eq!(c.full_label(), "photo 3 trench 2 from the south");
        assert_eq!(c.group_key(), "photo-3");
    }

    #[test]
    fn test_labeled_image_from_captioned() {
        let img = CaptionedImage {
            src: "p12-1.png".into(),
            page: 12,
            bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            caption: Some(caption()),
        };
        let labeled = LabeledImage::from(&img);
        assert_eq!(labeled.src, "p12-1.png");
        let label = labeled.caption.unwrap();
        assert_eq!(label.label, "photo 3");
        assert_eq!(label.full_label, "photo 3 trench 2 from the south");
    }

    #[test]
    fn test_uncaptioned_image_stays_uncaptioned() {
        let img = CaptionedImage {
            src: "p1-1.png".into(),
            page: 1,
            bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            caption: None,
        };
        assert!(LabeledImage::from(&img).caption.is_none());
    }
}
