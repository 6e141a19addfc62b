//! Positioned page content produced by the upstream PDF extractor

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// A positioned text fragment on a page.
///
/// Produced externally, immutable, ordered by page then document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Fragment text
    pub text: String,
    /// 1-based page number
    pub page: u32,
    /// Position on the page
    pub bbox: BBox,
}

/// A positioned image on a page. `src` is an opaque reference (path or URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    /// Opaque image reference
    pub src: String,
    /// 1-based page number
    pub page: u32,
    /// Position on the page
    pub bbox: BBox,
}

/// Everything the page/image extraction collaborator yields for a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// All text fragments, page-ordered
    pub texts: Vec<PageText>,
    /// All images, page-ordered
    pub images: Vec<PageImage>,
}

impl ExtractedDocument {
    /// Highest page number observed across texts and images.
    ///
    /// Serves as a conservative estimate of the document end for the
    /// windowed passes.
    pub fn last_page(&self) -> u32 {
        self.texts
            .iter()
            .map(|t| t.page)
            .chain(self.images.iter().map(|i| i.page))
            .max()
            .unwrap_or(0)
    }
}

/// One reflowed text record: all contiguous fragments of a page joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    /// 1-based page number
    pub page: u32,
    /// Newline-joined fragment text
    pub text: String,
}

/// Physical pages per scanned leaf.
///
/// Reports are scanned either one book page per PDF page or two (a full
/// spread). The language model reports boundaries in book-native pagination;
/// this divisor converts them to absolute document pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// One book page per PDF page
    Single,
    /// Two book pages per PDF page (spread scan)
    Double,
}

impl PageKind {
    /// The divisor used in boundary conversion.
    pub fn pages_per_leaf(self) -> u32 {
        match self {
            PageKind::Single => 1,
            PageKind::Double => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_covers_texts_and_images() {
        let doc = ExtractedDocument {
            texts: vec![PageText {
                text: "a".into(),
                page: 3,
                bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            }],
            images: vec![PageImage {
                src: "img.png".into(),
                page: 7,
                bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            }],
        };
        assert_eq!(doc.last_page(), 7);
    }

    #[test]
    fn test_last_page_empty_document() {
        assert_eq!(ExtractedDocument::default().last_page(), 0);
    }

    #[test]
    fn test_pages_per_leaf() {
        assert_eq!(PageKind::Single.pages_per_leaf(), 1);
        assert_eq!(PageKind::Double.pages_per_leaf(), 2);
    }
}
