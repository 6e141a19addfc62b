//! Configuration for the standardization pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How captions are associated with images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    /// Positional pattern heuristics, no model calls
    Rule,
    /// Model-produced caption pairing over fixed-size page chunks
    Llm,
}

impl Default for CaptionMode {
    fn default() -> Self {
        CaptionMode::Rule
    }
}

/// Configuration for the standardization pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Caption association mode
    pub caption_mode: CaptionMode,

    /// Pages per window in the coarse site pass
    pub site_window_pages: u32,

    /// Pages per window in the dense trench/feature/artifact pass
    pub entity_window_pages: u32,

    /// Pages per chunk in LLM caption mode
    pub caption_chunk_pages: u32,

    /// Maximum (discounted) caption-to-image center distance
    pub caption_distance_threshold: f64,

    /// Distance multiplier for caption text lying below the image
    pub below_image_discount: f64,

    /// Discard a window's image selection when more than this share of all
    /// document images matched (signals a false-positive broad match)
    pub broad_match_ratio: f64,

    /// Maximum attempts per model call
    pub max_attempts: u32,

    /// Fixed delay between retry attempts (seconds)
    pub retry_delay_secs: u64,

    /// Model name used for every extraction call
    pub model: String,

    /// Directory for per-report diagnostic dumps
    pub dump_dir: PathBuf,

    /// Optional path to a schema catalog overriding the built-in one
    pub schema_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            caption_mode: CaptionMode::Rule,
            site_window_pages: 20,
            entity_window_pages: 2,
            caption_chunk_pages: 10,
            caption_distance_threshold: 300.0,
            below_image_discount: 0.8,
            broad_match_ratio: 0.3,
            max_attempts: 5,
            retry_delay_secs: 10,
            model: "gpt-4o".to_string(),
            dump_dir: PathBuf::from("pdf-result"),
            schema_path: None,
        }
    }
}

impl PipelineConfig {
    /// The retry delay as a Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.site_window_pages == 0 {
            return Err("site_window_pages must be greater than 0".to_string());
        }
        if self.entity_window_pages == 0 {
            return Err("entity_window_pages must be greater than 0".to_string());
        }
        if self.caption_chunk_pages == 0 {
            return Err("caption_chunk_pages must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.broad_match_ratio) {
            return Err("broad_match_ratio must lie in [0.0, 1.0]".to_string());
        }
        if self.below_image_discount <= 0.0 || self.below_image_discount > 1.0 {
            return Err("below_image_discount must lie in (0.0, 1.0]".to_string());
        }
        if self.caption_distance_threshold <= 0.0 {
            return Err("caption_distance_threshold must be positive".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
