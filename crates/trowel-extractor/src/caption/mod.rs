//! Caption-to-image association
//!
//! Two interchangeable modes produce the same output shape: a
//! [`CaptionedImage`](trowel_domain::CaptionedImage) per input image, in
//! input order, with at most one caption each. Rule mode works from layout
//! positions and costs nothing; LLM mode reads the page text and is used
//! for reports whose caption conventions the patterns miss.

pub mod llm;
pub mod rule;

pub use llm::LlmCaptionMapper;
pub use rule::RuleCaptionMapper;
