//! The two windowed extraction passes
//!
//! The site pass walks the document front in coarse windows until the
//! model locates the start of the chapter following the report body; the
//! entity pass walks the body itself in dense windows, folding each reply
//! into the accumulated state. Boundary pages arrive in the book's own
//! pagination and are converted to absolute document pages here.

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::merge::merge_entities;
use crate::parser::{parse_reply_or_dump, EntityReply, SiteReply};
use crate::prompt::{entity_request, site_request, EntityPromptInput, SitePromptInput};
use crate::retry::RetryPolicy;
use crate::schema::SchemaCatalog;
use crate::window::{WindowVerdict, WindowWalker};
use tracing::{debug, info};
use trowel_domain::traits::{ChatModel, ChatOptions, ChatRequest};
use trowel_domain::{
    CaptionedImage, ExtractionState, PageBlock, PageKind, Site, TokenUsage,
};
use trowel_llm::LlmError;

/// Convert a book-native page number reported by the model into an
/// absolute document page.
///
/// Double-leaf scans hold two book pages per document page, and the
/// numbered part of the book starts only after `first_numbered_leaf`
/// front-matter leaves.
pub fn to_absolute_page(reported: u32, kind: PageKind, first_numbered_leaf: u32) -> u32 {
    let per_leaf = kind.pages_per_leaf();
    reported / per_leaf + first_numbered_leaf * per_leaf
}

fn chat_options(config: &PipelineConfig) -> ChatOptions {
    ChatOptions { model: config.model.clone(), ..ChatOptions::default() }
}

fn complete_text<M>(model: &M, request: &ChatRequest, options: &ChatOptions) -> Result<(String, TokenUsage), ExtractError>
where
    M: ChatModel<Error = LlmError>,
{
    let response = model.complete(request, options)?;
    let usage = response.usage.unwrap_or_default();
    match response.content {
        Some(content) if !content.trim().is_empty() => Ok((content, usage)),
        _ => Err(ExtractError::Llm(LlmError::EmptyReply)),
    }
}

/// What the site pass learned about the document.
#[derive(Debug, Clone)]
pub struct SiteOutcome {
    /// The accumulated site record
    pub site: Site,
    /// Absolute page where the report body starts, if the model found it
    pub main_content_start: Option<u32>,
    /// Absolute page where the chapter after the body starts, if found
    pub next_chapter_start: Option<u32>,
    /// Token usage across all windows of the pass
    pub usage: TokenUsage,
    /// Windows visited
    pub windows: u32,
}

/// Coarse front-of-document pass accumulating the site overview.
pub struct SitePass<'a, M> {
    model: &'a M,
    config: &'a PipelineConfig,
    schema: &'a SchemaCatalog,
}

impl<'a, M> SitePass<'a, M>
where
    M: ChatModel<Error = LlmError>,
{
    /// Wire up a pass over the given collaborators.
    pub fn new(model: &'a M, config: &'a PipelineConfig, schema: &'a SchemaCatalog) -> Self {
        Self { model, config, schema }
    }

    /// Walk from page 1, replacing the site record wholesale each window,
    /// until the main-content boundary is localized inside a window or the
    /// document ends.
    pub fn run(
        &self,
        blocks: &[PageBlock],
        images: &[CaptionedImage],
        initial: Site,
        page_kind: PageKind,
        first_numbered_leaf: u32,
        last_page: u32,
    ) -> Result<SiteOutcome, ExtractError> {
        let walker = WindowWalker::new(self.config.site_window_pages, self.config.broad_match_ratio);
        let retry = RetryPolicy::new(self.config.max_attempts, self.config.retry_delay());
        let options = chat_options(self.config);

        // The minted identifiers are pinned; the model must not drift them.
        let site_id = initial.id.clone();
        let report_id = initial.report_id.clone();

        let mut site = initial;
        let mut main_content_start = None;
        let mut next_chapter_start = None;
        let mut usage = TokenUsage::default();

        let windows = walker.run(blocks, images, 1, last_page, |selection| {
            let request = site_request(
                &SitePromptInput {
                    window_text: &selection.text,
                    images: &selection.images,
                    current: &site,
                    start_page: selection.start_page,
                    end_page: selection.end_page,
                },
                self.schema,
            )?;

            let reply: SiteReply = retry.run("site window", || {
                let (content, call_usage) = complete_text(self.model, &request, &options)?;
                usage += call_usage;
                parse_reply_or_dump(&content, &self.config.dump_dir)
            })?;

            site = reply.site;
            site.id = site_id.clone();
            site.report_id = report_id.clone();

            if main_content_start.is_none() {
                main_content_start = reply
                    .main_content_start_page
                    .map(|p| to_absolute_page(p, page_kind, first_numbered_leaf));
            }
            if next_chapter_start.is_none() {
                next_chapter_start = reply
                    .next_chapter_start_page
                    .map(|p| to_absolute_page(p, page_kind, first_numbered_leaf));
            }

            debug!(
                start = selection.start_page,
                end = selection.end_page,
                truncated = reply.is_partial_last_page,
                "site window done"
            );

            Ok(WindowVerdict {
                truncated: reply.is_partial_last_page,
                // The coarse pass stops once it has localized the start of
                // the detailed content chapter inside the current window.
                boundary_reached: main_content_start
                    .is_some_and(|p| p >= selection.start_page && p <= selection.end_page),
            })
        })?;

        info!(windows, ?main_content_start, ?next_chapter_start, "site pass complete");
        Ok(SiteOutcome { site, main_content_start, next_chapter_start, usage, windows })
    }
}

/// What the entity pass did, beyond mutating the state in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityOutcome {
    /// Token usage across all windows of the pass
    pub usage: TokenUsage,
    /// Windows visited
    pub windows: u32,
}

/// Dense body pass accumulating trenches, features and artifacts.
pub struct EntityPass<'a, M> {
    model: &'a M,
    config: &'a PipelineConfig,
    schema: &'a SchemaCatalog,
}

impl<'a, M> EntityPass<'a, M>
where
    M: ChatModel<Error = LlmError>,
{
    /// Wire up a pass over the given collaborators.
    pub fn new(model: &'a M, config: &'a PipelineConfig, schema: &'a SchemaCatalog) -> Self {
        Self { model, config, schema }
    }

    /// Walk `[start, stop]`, merging each window's entities into `state`
    /// by id (first occurrence wins).
    pub fn run(
        &self,
        blocks: &[PageBlock],
        images: &[CaptionedImage],
        state: &mut ExtractionState,
        start: u32,
        stop: u32,
    ) -> Result<EntityOutcome, ExtractError> {
        let walker =
            WindowWalker::new(self.config.entity_window_pages, self.config.broad_match_ratio);
        let retry = RetryPolicy::new(self.config.max_attempts, self.config.retry_delay());
        let options = chat_options(self.config);

        let site_id = state.site.id.clone();
        let mut usage = TokenUsage::default();

        let windows = walker.run(blocks, images, start, stop, |selection| {
            let request = entity_request(
                &EntityPromptInput {
                    window_text: &selection.text,
                    images: &selection.images,
                    state,
                    start_page: selection.start_page,
                    end_page: selection.end_page,
                },
                self.schema,
            )?;

            let mut reply: EntityReply = retry.run("entity window", || {
                let (content, call_usage) = complete_text(self.model, &request, &options)?;
                usage += call_usage;
                parse_reply_or_dump(&content, &self.config.dump_dir)
            })?;

            for trench in &mut reply.trenches {
                trench.site_id = trench.site_id.take().or_else(|| site_id.clone());
            }
            for feature in &mut reply.features {
                feature.site_id = feature.site_id.take().or_else(|| site_id.clone());
            }
            for artifact in &mut reply.artifacts {
                artifact.site_id = artifact.site_id.take().or_else(|| site_id.clone());
            }

            debug!(
                start = selection.start_page,
                end = selection.end_page,
                trenches = reply.trenches.len(),
                features = reply.features.len(),
                artifacts = reply.artifacts.len(),
                "entity window done"
            );

            merge_entities(&mut state.trenches, reply.trenches);
            merge_entities(&mut state.features, reply.features);
            merge_entities(&mut state.artifacts, reply.artifacts);

            Ok(WindowVerdict {
                truncated: reply.is_partial_last_page,
                boundary_reached: false,
            })
        })?;

        info!(
            windows,
            trenches = state.trenches.len(),
            features = state.features.len(),
            artifacts = state.artifacts.len(),
            "entity pass complete"
        );
        Ok(EntityOutcome { usage, windows })
    }
}
