//! End-to-end report standardization
//!
//! One `Standardizer::run` call takes a report from upstream page dump to
//! persisted rows: caption association, reflow, the coarse site pass, the
//! dense entity pass, identifier reconciliation, and a single store
//! transaction. Intermediate results are dumped as JSON next to the run
//! for inspection and replay.

use crate::caption::{LlmCaptionMapper, RuleCaptionMapper};
use crate::config::{CaptionMode, PipelineConfig};
use crate::error::ExtractError;
use crate::passes::{EntityPass, SitePass};
use crate::reconcile::{reconcile, ExistingIds};
use crate::reflow::reflow_pages;
use crate::schema::SchemaCatalog;
use serde::Serialize;
use tracing::info;
use trowel_domain::traits::{ChatModel, PageSource};
use trowel_domain::{new_entity_id, CaptionedImage, ExtractionState, PageKind, Site, TokenUsage};
use trowel_llm::LlmError;
use trowel_store::ExcavationStore;

/// One report to standardize.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Identifier of the source report document
    pub report_id: String,
    /// Path handed to the page source
    pub document_path: String,
    /// Physical pages per scanned leaf
    pub page_kind: PageKind,
    /// Front-matter leaves before the book's numbered part starts
    pub first_numbered_leaf: u32,
}

/// What a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Identifier of the processed report
    pub report_id: String,
    /// Minted site identifier
    pub site_id: String,
    /// Physical pages per scanned leaf used for boundary conversion
    pub page_kind: PageKind,
    /// Front-matter leaves used for boundary conversion
    pub first_numbered_leaf: u32,
    /// Last document page observed
    pub pages: u32,
    /// Trenches persisted
    pub trenches: usize,
    /// Features persisted
    pub features: usize,
    /// Artifacts persisted
    pub artifacts: usize,
    /// Token usage across every model call of the run
    pub usage: TokenUsage,
    /// Wall-clock processing time in milliseconds
    pub elapsed_ms: u64,
    /// Completion time as Unix seconds
    pub completed_at_unix: u64,
}

/// The standardization pipeline over a chat model and a page source.
pub struct Standardizer<M, S> {
    model: M,
    source: S,
    config: PipelineConfig,
    schema: SchemaCatalog,
}

impl<M, S> Standardizer<M, S>
where
    M: ChatModel<Error = LlmError>,
    S: PageSource<Error = ExtractError>,
{
    /// Validate the configuration and load the schema catalog.
    pub fn new(model: M, source: S, config: PipelineConfig) -> Result<Self, ExtractError> {
        config.validate().map_err(ExtractError::Config)?;
        let schema = match &config.schema_path {
            Some(path) => SchemaCatalog::from_path(path)?,
            None => SchemaCatalog::builtin()?,
        };
        Ok(Self { model, source, config, schema })
    }

    /// Standardize one report and persist it in a single transaction.
    pub fn run(
        &self,
        store: &mut ExcavationStore,
        request: &ReportRequest,
    ) -> Result<RunSummary, ExtractError> {
        info!(report_id = %request.report_id, path = %request.document_path, "standardization started");
        let started = std::time::Instant::now();

        let doc = self.source.extract(&request.document_path)?;
        if doc.texts.is_empty() {
            return Err(ExtractError::NoText);
        }
        let last_page = doc.last_page();

        let mut usage = TokenUsage::default();
        let captioned: Vec<CaptionedImage> = match self.config.caption_mode {
            CaptionMode::Rule => RuleCaptionMapper::new(&self.config).associate(&doc),
            CaptionMode::Llm => {
                let (images, caption_usage) =
                    LlmCaptionMapper::new(&self.model, &self.config).associate(&doc)?;
                usage += caption_usage;
                images
            }
        };
        self.dump(&format!("{}.json", request.report_id), &captioned)?;

        let blocks = reflow_pages(&doc.texts);

        let site_pass = SitePass::new(&self.model, &self.config, &self.schema);
        let site_outcome = site_pass.run(
            &blocks,
            &captioned,
            Site::new(new_entity_id(), request.report_id.clone()),
            request.page_kind,
            request.first_numbered_leaf,
            last_page,
        )?;
        usage += site_outcome.usage;

        // Missing boundaries fall back to reading the whole document.
        let body_start = site_outcome.main_content_start.unwrap_or(1);
        let body_stop = site_outcome.next_chapter_start.unwrap_or(last_page);

        let mut state = ExtractionState::new(site_outcome.site);
        let entity_pass = EntityPass::new(&self.model, &self.config, &self.schema);
        let entity_outcome =
            entity_pass.run(&blocks, &captioned, &mut state, body_start, body_stop)?;
        usage += entity_outcome.usage;

        self.dump(&format!("{}-site.json", request.report_id), &state.site)?;
        self.dump(&format!("{}-trenches.json", request.report_id), &state.trenches)?;
        self.dump(&format!("{}-features.json", request.report_id), &state.features)?;
        self.dump(&format!("{}-artifacts.json", request.report_id), &state.artifacts)?;

        let existing = ExistingIds::from_store(store)?;
        reconcile(&mut state, &existing);
        store.insert_report(&state)?;

        let summary = RunSummary {
            report_id: request.report_id.clone(),
            site_id: state.site.id.clone().unwrap_or_default(),
            page_kind: request.page_kind,
            first_numbered_leaf: request.first_numbered_leaf,
            pages: last_page,
            trenches: state.trenches.len(),
            features: state.features.len(),
            artifacts: state.artifacts.len(),
            usage,
            elapsed_ms: started.elapsed().as_millis() as u64,
            completed_at_unix: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        };
        info!(
            report_id = %summary.report_id,
            trenches = summary.trenches,
            features = summary.features,
            artifacts = summary.artifacts,
            total_tokens = summary.usage.total_tokens,
            "standardization complete"
        );
        Ok(summary)
    }

    fn dump<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ExtractError> {
        std::fs::create_dir_all(&self.config.dump_dir)?;
        let path = self.config.dump_dir.join(name);
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}
