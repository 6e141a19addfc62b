//! Model-reply parsing
//!
//! Replies must be a single JSON object, though models often wrap it in a
//! Markdown code fence. Fences are stripped, then the payload is parsed
//! strictly into the expected typed shape. There is no partial salvage: a
//! reply that does not parse is a [`ExtractError::MalformedReply`], which
//! the retry policy treats as retryable.

use crate::error::ExtractError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trowel_domain::{Artifact, Feature, Site, Trench};

/// Reply shape of a site-pass window call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteReply {
    /// Whether the window's last page ends mid-sentence
    pub is_partial_last_page: bool,
    /// Book-native page where the body of the report starts, once known
    pub main_content_start_page: Option<u32>,
    /// Book-native page where the chapter after the body starts, once known
    pub next_chapter_start_page: Option<u32>,
    /// The full accumulated site record, established fields carried forward
    pub site: Site,
}

impl Default for SiteReply {
    fn default() -> Self {
        Self {
            is_partial_last_page: false,
            main_content_start_page: None,
            next_chapter_start_page: None,
            site: Site::default(),
        }
    }
}

/// Reply shape of an entity-pass window call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityReply {
    /// Whether the window's last page ends mid-sentence
    pub is_partial_last_page: bool,
    /// Trenches described in this window
    pub trenches: Vec<Trench>,
    /// Features described in this window
    pub features: Vec<Feature>,
    /// Artifacts described in this window
    pub artifacts: Vec<Artifact>,
}

/// One model-proposed caption-to-image pairing (LLM caption mode).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionPair {
    /// Image reference the caption belongs to
    pub src: String,
    /// Label category
    pub prefix: String,
    /// Number within the category
    pub number: f64,
    /// Trailing description text
    pub text: String,
}

/// Reply shape of an LLM caption-mode chunk call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionReply {
    /// Pairings found in the chunk
    pub pairs: Vec<CaptionPair>,
}

/// Strip a surrounding Markdown code fence, if present.
///
/// Handles ```json and bare ``` openers; anything after the closing fence
/// is ignored.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse one reply into the expected typed shape.
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let payload = strip_code_fences(raw);
    serde_json::from_str(payload).map_err(|e| ExtractError::MalformedReply(e.to_string()))
}

/// Parse one reply; on failure write the raw reply to `dump_dir/error.json`
/// for post-mortem inspection before surfacing the parse error.
pub fn parse_reply_or_dump<T: DeserializeOwned>(
    raw: &str,
    dump_dir: &Path,
) -> Result<T, ExtractError> {
    match parse_reply(raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(io_err) = dump_error_reply(dump_dir, raw) {
                tracing::warn!(error = %io_err, "failed to write error.json dump");
            }
            Err(err)
        }
    }
}

fn dump_error_reply(dump_dir: &Path, raw: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dump_dir)?;
    let path = dump_dir.join("error.json");
    std::fs::write(&path, raw)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fenced_json() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_passthrough() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence_still_yields_body() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_site_reply_parses_with_defaults() {
        let reply: SiteReply = parse_reply(
            r#"{"site": {"site_name": "Hilltop fort"}, "is_partial_last_page": true}"#,
        )
        .unwrap();
        assert!(reply.is_partial_last_page);
        assert!(reply.main_content_start_page.is_none());
        assert_eq!(reply.site.site_name.as_deref(), Some("Hilltop fort"));
    }

    #[test]
    fn test_entity_reply_defaults_to_empty_collections() {
        let reply: EntityReply = parse_reply("{}").unwrap();
        assert!(!reply.is_partial_last_page);
        assert!(reply.trenches.is_empty());
        assert!(reply.features.is_empty());
        assert!(reply.artifacts.is_empty());
    }

    #[test]
    fn test_malformed_reply_is_rejected() {
        let result: Result<EntityReply, _> = parse_reply("not json at all");
        assert!(matches!(result, Err(ExtractError::MalformedReply(_))));
    }

    #[test]
    fn test_prose_around_json_is_rejected() {
        // Strict parse: no salvage of embedded objects.
        let result: Result<EntityReply, _> = parse_reply("Here you go: {\"trenches\": []}");
        assert!(matches!(result, Err(ExtractError::MalformedReply(_))));
    }

    #[test]
    fn test_dump_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<EntityReply, _> = parse_reply_or_dump("garbage", dir.path());
        assert!(result.is_err());

        let dumped = std::fs::read_to_string(dir.path().join("error.json")).unwrap();
        assert_eq!(dumped, "garbage");
    }

    #[test]
    fn test_caption_reply_parses_pairs() {
        let reply: CaptionReply = parse_reply(
            r#"{"pairs": [{"src": "p3-1.png", "prefix": "photo", "number": 2, "text": "trench"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.pairs.len(), 1);
        assert_eq!(reply.pairs[0].number, 2.0);
    }
}
