//! Trowel Domain Layer
//!
//! Core data model for the excavation-report standardization pipeline.
//! Defines the positioned page content produced by the upstream PDF
//! extractor, the caption model, the four entity kinds that extraction
//! accumulates, and the trait seams that bound the core against its
//! external collaborators (language model, page source, glossary search).
//!
//! ## Key Concepts
//!
//! - **Positioned content**: text fragments and images with page number and
//!   bounding box, immutable once produced upstream
//! - **Caption**: a labeled fragment (prefix + number + description) tied to
//!   a figure; several image records may share one logical caption
//! - **Site / Trench / Feature / Artifact**: the entities a report is
//!   standardized into; all fields optional while accumulation is running
//! - **Extraction state**: the mutable working set threaded through the
//!   windowed accumulator, frozen once the terminal window is reached
//!
//! ## Architecture
//!
//! Infrastructure implementations (HTTP chat client, SQLite sink) live in
//! other crates; this crate only carries data shapes and trait definitions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod caption;
pub mod feature;
pub mod geometry;
pub mod page;
pub mod site;
pub mod state;
pub mod token;
pub mod traits;
pub mod trench;

// Re-exports for convenience
pub use artifact::Artifact;
pub use caption::{Caption, CaptionLabel, CaptionedImage, LabeledImage};
pub use feature::Feature;
pub use geometry::BBox;
pub use page::{ExtractedDocument, PageBlock, PageImage, PageKind, PageText};
pub use site::Site;
pub use state::ExtractionState;
pub use token::TokenUsage;
pub use trench::Trench;

/// Mint a fresh opaque entity identifier (UUIDv4, hyphenated).
pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Access to the stable identifier of a repeating entity.
///
/// Implemented by [`Trench`], [`Feature`] and [`Artifact`]; the merger and
/// the identifier reconciler are generic over it.
pub trait Identified {
    /// The entity's identifier, if the extraction step proposed one.
    fn id(&self) -> Option<&str>;

    /// Replace the entity's identifier.
    fn set_id(&mut self, id: String);
}
