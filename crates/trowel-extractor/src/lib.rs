//! Trowel Extraction Core
//!
//! Turns an excavation report's positioned page dump into structured
//! site, trench, feature and artifact records via incremental windowed
//! language-model extraction.
//!
//! ## Pipeline
//!
//! 1. **Caption association**: each image gets at most one figure caption,
//!    by positional rules or by model judgment
//! 2. **Reflow**: positioned fragments collapse into one text block per
//!    contiguous page run
//! 3. **Site pass**: coarse windows over the document front accumulate the
//!    singleton site record and locate the body boundaries
//! 4. **Entity pass**: dense windows over the body accumulate trenches,
//!    features and artifacts, merged by id
//! 5. **Reconciliation and persistence**: colliding or missing ids are
//!    rewritten (artifact references following along) and everything is
//!    written in one store transaction
//!
//! Model replies are strict JSON; malformed replies and rate limits are
//! retried on a fixed budget, everything else fails the run.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod caption;
pub mod config;
pub mod error;
pub mod merge;
pub mod parser;
pub mod passes;
pub mod pipeline;
pub mod prompt;
pub mod reconcile;
pub mod reflow;
pub mod retry;
pub mod schema;
pub mod source;
pub mod window;

pub use caption::{LlmCaptionMapper, RuleCaptionMapper};
pub use config::{CaptionMode, PipelineConfig};
pub use error::ExtractError;
pub use pipeline::{ReportRequest, RunSummary, Standardizer};
pub use schema::SchemaCatalog;
pub use source::{JsonPageSource, StaticPageSource};
