//! Model-backed caption association
//!
//! Walks the document in fixed-size page chunks, asking the model to pair
//! each image on the chunk's pages with its caption. Chunks without images
//! are skipped without a model call. The chunk payload keeps every text
//! fragment's bounding box, and the instructions state the same below-image
//! and nearest-distance preferences the rule mapper computes.

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::parser::{parse_reply_or_dump, CaptionReply};
use crate::prompt::caption_request;
use crate::retry::RetryPolicy;
use std::collections::HashMap;
use tracing::debug;
use trowel_domain::traits::{ChatModel, ChatOptions};
use trowel_domain::{Caption, CaptionedImage, ExtractedDocument, PageImage, PageText, TokenUsage};
use trowel_llm::LlmError;

/// Chat-model caption associator.
pub struct LlmCaptionMapper<'a, M> {
    model: &'a M,
    config: &'a PipelineConfig,
}

impl<'a, M> LlmCaptionMapper<'a, M>
where
    M: ChatModel<Error = LlmError>,
{
    /// Wire up a mapper over the given model and configuration.
    pub fn new(model: &'a M, config: &'a PipelineConfig) -> Self {
        Self { model, config }
    }

    /// Associate every image in the document with at most one caption.
    ///
    /// Output preserves the input image order. Also returns the token
    /// usage accumulated across chunk calls.
    pub fn associate(
        &self,
        doc: &ExtractedDocument,
    ) -> Result<(Vec<CaptionedImage>, TokenUsage), ExtractError> {
        let retry = RetryPolicy::new(self.config.max_attempts, self.config.retry_delay());
        let options = ChatOptions {
            model: self.config.model.clone(),
            ..ChatOptions::default()
        };

        let chunk = self.config.caption_chunk_pages;
        let last_page = doc.last_page();
        let mut captions_by_src: HashMap<String, Caption> = HashMap::new();
        let mut usage = TokenUsage::default();

        let mut start = 1;
        while start <= last_page {
            let end = (start + chunk - 1).min(last_page);
            let chunk_images: Vec<&PageImage> =
                doc.images.iter().filter(|i| i.page >= start && i.page <= end).collect();

            if chunk_images.is_empty() {
                start = end + 1;
                continue;
            }

            let chunk_texts: Vec<&PageText> =
                doc.texts.iter().filter(|t| t.page >= start && t.page <= end).collect();

            let request = caption_request(&chunk_texts, &chunk_images)?;
            let reply: CaptionReply = retry.run("caption chunk", || {
                let response = self.model.complete(&request, &options)?;
                usage += response.usage.unwrap_or_default();
                let content = response.content.ok_or(ExtractError::Llm(LlmError::EmptyReply))?;
                parse_reply_or_dump(&content, &self.config.dump_dir)
            })?;

            debug!(start, end, pairs = reply.pairs.len(), "caption chunk done");
            for pair in reply.pairs {
                captions_by_src.insert(
                    pair.src,
                    Caption { prefix: pair.prefix, number: pair.number, text: pair.text },
                );
            }

            start = end + 1;
        }

        let images = doc
            .images
            .iter()
            .map(|img| CaptionedImage {
                src: img.src.clone(),
                page: img.page,
                bbox: img.bbox,
                caption: captions_by_src.get(&img.src).cloned(),
            })
            .collect();
        Ok((images, usage))
    }
}
