//! Page-source adapters
//!
//! PDF layout analysis happens upstream and outside this codebase; what
//! arrives here is its JSON dump of positioned texts and images. The
//! adapter keeps the pipeline behind the `PageSource` seam so tests can
//! substitute documents directly.

use crate::error::ExtractError;
use trowel_domain::traits::PageSource;
use trowel_domain::ExtractedDocument;

/// Reads an [`ExtractedDocument`] from an upstream JSON dump on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageSource;

impl PageSource for JsonPageSource {
    type Error = ExtractError;

    fn extract(&self, path: &str) -> Result<ExtractedDocument, Self::Error> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| ExtractError::PageSource(e.to_string()))
    }
}

/// A fixed in-memory document, for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct StaticPageSource(pub ExtractedDocument);

impl PageSource for StaticPageSource {
    type Error = ExtractError;

    fn extract(&self, _path: &str) -> Result<ExtractedDocument, Self::Error> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use trowel_domain::{BBox, PageText};

    #[test]
    fn test_json_source_reads_dump() {
        let doc = ExtractedDocument {
            texts: vec![PageText {
                text: "hello".into(),
                page: 1,
                bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            }],
            images: vec![],
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&doc).unwrap().as_bytes()).unwrap();

        let loaded = JsonPageSource.extract(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.texts.len(), 1);
        assert_eq!(loaded.texts[0].text, "hello");
    }

    #[test]
    fn test_json_source_rejects_bad_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();

        let result = JsonPageSource.extract(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ExtractError::PageSource(_))));
    }

    #[test]
    fn test_json_source_missing_file_is_io() {
        let result = JsonPageSource.extract("/no/such/file.json");
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
