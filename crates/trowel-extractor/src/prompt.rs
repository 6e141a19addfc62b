//! Prompt construction for the extraction calls
//!
//! Three request shapes exist: the coarse site pass, the dense entity pass
//! and the caption-pairing call used by LLM caption mode. Each builder
//! produces a [`ChatRequest`] with a fixed instruction block as the system
//! message and the serialized window payload as the user message.

use crate::error::ExtractError;
use crate::schema::SchemaCatalog;
use std::fmt::Write as _;
use trowel_domain::traits::ChatRequest;
use trowel_domain::{ExtractionState, LabeledImage, PageImage, PageText, Site};

const SITE_INSTRUCTIONS: &str = "\
You are reading an archaeological excavation report in page windows.
Maintain the single site overview record across windows.

Rules:
- You receive the accumulated site record so far. Carry every established
  field forward unchanged unless this window explicitly corrects it.
- Fill only fields this window supports with evidence; leave unknown fields
  null. Never invent values.
- Keep `id` and `report_id` exactly as given.
- Attach an image reference to `images` only when the window text mentions
  the image's caption label.
- Report `main_content_start_page` the first time you can tell on which
  book-native page the body of the report (trench and feature descriptions)
  starts, and `next_chapter_start_page` the first time you can tell where
  the chapter after the body starts. Use the page numbers printed in the
  text, not positions within this window.
- Set `is_partial_last_page` to true when the window's last page ends
  mid-sentence.

Reply with a single JSON object, no prose, no code fence:
{\"is_partial_last_page\": bool, \"main_content_start_page\": int|null, \"next_chapter_start_page\": int|null, \"site\": {...}}";

const ENTITY_INSTRUCTIONS: &str = "\
You are reading the body of an archaeological excavation report in page
windows, extracting trenches, features and artifacts.

Rules:
- You receive the full entity records accumulated so far. When this window
  re-describes a listed entity, emit it again under its existing id, carrying
  its established fields and filling the newly learned ones; new entities
  get a fresh UUID as id.
- Set `site_id` on every entity to the given site id.
- For artifacts, set `feature_id` or `trench_id` only to an id present in
  the accumulated lists (or emitted in this reply); otherwise leave null.
- Fill only fields the window supports with evidence; leave unknown fields
  null. Never invent values.
- Attach an image reference to `images` only when the window text mentions
  the image's caption label.
- Record the book-native pages where each entity is described in
  `page_references`.
- Set `is_partial_last_page` to true when the window's last page ends
  mid-sentence.

Reply with a single JSON object, no prose, no code fence:
{\"is_partial_last_page\": bool, \"trenches\": [...], \"features\": [...], \"artifacts\": [...]}";

const CAPTION_INSTRUCTIONS: &str = "\
You are given the images of a few report pages and the positioned text
fragments around them. Every record carries a bounding box
{x0, top, x1, bottom} in page coordinates; `top` grows downward. Match
each image to its figure caption, if one exists.

Rules:
- A caption is a short labeled fragment such as \"photo 3 trench 2 from
  the south\" or \"Fig. 1 site plan\".
- Captions usually sit below their figure: a fragment whose `top` exceeds
  the image's `bottom` lies below the image and is the preferred candidate.
- When several fragments on the image's page look like captions, pick the
  one whose box center is nearest to the image's box center.
- `prefix` is the lowercase label category (photo, drawing, table, figure,
  map, ...). Compound numbers like \"3-2\" become the fraction 3.2.
- Pair an image only when the page provides clear evidence; omit images
  with no discernible caption.

Reply with a single JSON object, no prose, no code fence:
{\"pairs\": [{\"src\": str, \"prefix\": str, \"number\": number, \"text\": str}]}";

/// Everything the site-pass builder needs for one window.
#[derive(Debug)]
pub struct SitePromptInput<'a> {
    /// Reflowed window text
    pub window_text: &'a str,
    /// Images whose caption labels appear in the window text
    pub images: &'a [LabeledImage],
    /// The accumulated site record
    pub current: &'a Site,
    /// First absolute page of the window
    pub start_page: u32,
    /// Last absolute page of the window
    pub end_page: u32,
}

/// Everything the entity-pass builder needs for one window.
#[derive(Debug)]
pub struct EntityPromptInput<'a> {
    /// Reflowed window text
    pub window_text: &'a str,
    /// Images whose caption labels appear in the window text
    pub images: &'a [LabeledImage],
    /// The accumulated extraction state
    pub state: &'a ExtractionState,
    /// First absolute page of the window
    pub start_page: u32,
    /// Last absolute page of the window
    pub end_page: u32,
}

/// Build the site-pass request for one window.
pub fn site_request(
    input: &SitePromptInput<'_>,
    schema: &SchemaCatalog,
) -> Result<ChatRequest, ExtractError> {
    let mut user = String::new();
    let _ = writeln!(user, "# Target columns\n\n{}", schema.prompt_block(&["sites"]));
    let _ = writeln!(
        user,
        "# Accumulated site record\n\n{}\n",
        serde_json::to_string(input.current)?
    );
    let _ = writeln!(user, "# Images in this window\n\n{}\n", serde_json::to_string(input.images)?);
    let _ = writeln!(
        user,
        "# Window text (absolute pages {}-{})\n\n{}",
        input.start_page, input.end_page, input.window_text
    );

    Ok(ChatRequest { system: SITE_INSTRUCTIONS.to_string(), user })
}

/// Build the entity-pass request for one window.
pub fn entity_request(
    input: &EntityPromptInput<'_>,
    schema: &SchemaCatalog,
) -> Result<ChatRequest, ExtractError> {
    let state = input.state;
    let site_id = state.site.id.as_deref().unwrap_or("");

    let mut user = String::new();
    let _ = writeln!(
        user,
        "# Target columns\n\n{}",
        schema.prompt_block(&["trenches", "features", "artifacts"])
    );
    let _ = writeln!(user, "# Site id\n\n{site_id}\n");
    // Full records, not id summaries: the model carries established fields
    // forward and fills gaps, so it has to see what is already known.
    let _ = writeln!(
        user,
        "# Accumulated entities\n\n{}\n",
        serde_json::to_string(&serde_json::json!({
            "trenches": &state.trenches,
            "features": &state.features,
            "artifacts": &state.artifacts,
        }))?
    );
    let _ = writeln!(user, "# Images in this window\n\n{}\n", serde_json::to_string(input.images)?);
    let _ = writeln!(
        user,
        "# Window text (absolute pages {}-{})\n\n{}",
        input.start_page, input.end_page, input.window_text
    );

    Ok(ChatRequest { system: ENTITY_INSTRUCTIONS.to_string(), user })
}

/// Build the caption-pairing request for one page chunk (LLM caption mode).
///
/// Both the images and the text fragments keep their bounding boxes so the
/// model can weigh position, not just wording.
pub fn caption_request(
    texts: &[&PageText],
    images: &[&PageImage],
) -> Result<ChatRequest, ExtractError> {
    let mut user = String::new();
    let _ = writeln!(user, "# Images\n\n{}\n", serde_json::to_string(images)?);
    let _ = writeln!(user, "# Positioned page text\n\n{}", serde_json::to_string(texts)?);

    Ok(ChatRequest { system: CAPTION_INSTRUCTIONS.to_string(), user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_domain::{BBox, CaptionLabel};

    fn schema() -> SchemaCatalog {
        SchemaCatalog::builtin().unwrap()
    }

    #[test]
    fn test_site_request_carries_accumulated_record() {
        let mut site = Site::new("site-1".into(), "report-9".into());
        site.site_name = Some("Hilltop fort".into());
        let input = SitePromptInput {
            window_text: "page text",
            images: &[],
            current: &site,
            start_page: 1,
            end_page: 20,
        };
        let request = site_request(&input, &schema()).unwrap();
        assert!(request.system.contains("main_content_start_page"));
        assert!(request.user.contains("Hilltop fort"));
        assert!(request.user.contains("pages 1-20"));
        assert!(request.user.contains("## sites"));
    }

    #[test]
    fn test_entity_request_lists_known_ids_and_site_id() {
        let mut state = ExtractionState::new(Site::new("site-1".into(), "r".into()));
        state.trenches.push(trowel_domain::Trench {
            id: Some("t-1".into()),
            trench_number: Some("Tr.3".into()),
            ..Default::default()
        });
        let input = EntityPromptInput {
            window_text: "body text",
            images: &[],
            state: &state,
            start_page: 5,
            end_page: 6,
        };
        let request = entity_request(&input, &schema()).unwrap();
        assert!(request.user.contains("site-1"));
        assert!(request.user.contains("t-1"));
        assert!(request.user.contains("Tr.3"));
        assert!(request.user.contains("## artifacts"));
    }

    #[test]
    fn test_entity_request_carries_full_accumulated_records() {
        let mut state = ExtractionState::new(Site::new("site-1".into(), "r".into()));
        state.trenches.push(trowel_domain::Trench {
            id: Some("t-1".into()),
            trench_number: Some("Tr.3".into()),
            description: Some("clay fill over bedrock".into()),
            orientation: Some("north-south".into()),
            ..Default::default()
        });
        state.features.push(trowel_domain::Feature {
            id: Some("f-1".into()),
            interpretation: Some("roasting pit".into()),
            ..Default::default()
        });
        let input = EntityPromptInput {
            window_text: "body text",
            images: &[],
            state: &state,
            start_page: 5,
            end_page: 6,
        };
        let request = entity_request(&input, &schema()).unwrap();
        assert!(request.user.contains("clay fill over bedrock"));
        assert!(request.user.contains("north-south"));
        assert!(request.user.contains("roasting pit"));
    }

    #[test]
    fn test_window_images_are_serialized_with_labels() {
        let images = vec![LabeledImage {
            src: "p3-1.png".into(),
            caption: Some(CaptionLabel {
                prefix: "photo".into(),
                number: 2.0,
                text: "trench".into(),
                label: "photo 2".into(),
                full_label: "photo 2 trench".into(),
            }),
        }];
        let site = Site::default();
        let input = SitePromptInput {
            window_text: "",
            images: &images,
            current: &site,
            start_page: 1,
            end_page: 1,
        };
        let request = site_request(&input, &schema()).unwrap();
        assert!(request.user.contains("photo 2 trench"));
    }

    #[test]
    fn test_caption_request_carries_positions() {
        let image = PageImage {
            src: "p3-1.png".into(),
            page: 3,
            bbox: BBox { x0: 100.0, top: 200.0, x1: 300.0, bottom: 440.0 },
        };
        let text = PageText {
            text: "photo 3 trench 2 from the south".into(),
            page: 3,
            bbox: BBox { x0: 100.0, top: 455.0, x1: 300.0, bottom: 470.0 },
        };
        let request = caption_request(&[&text], &[&image]).unwrap();
        assert!(request.system.contains("pairs"));
        assert!(request.system.contains("below"));
        assert!(request.system.contains("nearest"));
        assert!(request.user.contains("p3-1.png"));
        assert!(request.user.contains("440.0"));
        assert!(request.user.contains("455.0"));
        assert!(request.user.contains("photo 3 trench 2 from the south"));
    }
}
