//! Rule-based caption association
//!
//! Scans every text fragment against an ordered list of caption patterns
//! (first match wins), then links each image to the nearest qualifying
//! candidate on its page. Candidates below the image get a distance
//! discount since captions are expected under figures. A post-pass makes
//! images that share a `(prefix, number)` key on one page share the longest
//! caption text among them.

use crate::config::PipelineConfig;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use trowel_domain::{BBox, Caption, CaptionedImage, ExtractedDocument, PageText};

/// One caption matcher with named captures `prefix` / `num` / `text`.
struct CaptionPattern {
    regex: Regex,
    default_prefix: &'static str,
}

/// Ordered pattern list; the first pattern matching a fragment wins and no
/// further patterns are checked for that fragment.
static CAPTION_PATTERNS: LazyLock<Vec<CaptionPattern>> = LazyLock::new(|| {
    vec![
        // Labeled prefix: "photo 1 ...", "drawing 2-1 ...", "table 3 ..."
        CaptionPattern {
            regex: Regex::new(
                r"(?i)^(?P<prefix>photo|drawing|table|figure|map|plate|plan|illustration|chart)\s*(?P<num>\d+(?:[-.]\d+)?)\s*(?P<text>.+)?$",
            )
            .expect("labeled caption pattern"),
            default_prefix: "figure",
        },
        // Bare number or "Fig. 1" form: "1.", "Fig 2 ...", "Figure 3 ..."
        CaptionPattern {
            regex: Regex::new(r"(?i)^(?:fig\.?|figure)?\s*(?P<num>\d+)(?:\.|\)|\s)?\s*(?P<text>.+)?$")
                .expect("bare figure caption pattern"),
            default_prefix: "figure",
        },
        // Bracket/paren-wrapped: "[figure 1] ...", "(2) ..."
        CaptionPattern {
            regex: Regex::new(
                r"(?i)[\[(](?P<prefix>photo|drawing|table|figure|map|fig)?\s*(?P<num>\d+(?:[-.]\d+)?)[\])](?:\s+(?P<text>.+))?$",
            )
            .expect("bracketed caption pattern"),
            default_prefix: "figure",
        },
    ]
});

/// A caption candidate: the parsed caption plus the position of the
/// fragment it came from.
struct Candidate {
    bbox: BBox,
    caption: Caption,
}

/// Positional caption associator.
pub struct RuleCaptionMapper {
    distance_threshold: f64,
    below_image_discount: f64,
}

impl RuleCaptionMapper {
    /// Build a mapper from the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            distance_threshold: config.caption_distance_threshold,
            below_image_discount: config.below_image_discount,
        }
    }

    /// Associate every image in the document with at most one caption.
    ///
    /// Output preserves the input image order.
    pub fn associate(&self, doc: &ExtractedDocument) -> Vec<CaptionedImage> {
        let mut processed: Vec<CaptionedImage> = doc
            .images
            .iter()
            .map(|img| CaptionedImage {
                src: img.src.clone(),
                page: img.page,
                bbox: img.bbox,
                caption: None,
            })
            .collect();

        let mut texts_by_page: BTreeMap<u32, Vec<&PageText>> = BTreeMap::new();
        for text in &doc.texts {
            texts_by_page.entry(text.page).or_default().push(text);
        }

        let pages: Vec<u32> = {
            let mut pages: Vec<u32> = processed.iter().map(|i| i.page).collect();
            pages.sort_unstable();
            pages.dedup();
            pages
        };

        for page in pages {
            let candidates: Vec<Candidate> = texts_by_page
                .get(&page)
                .map(|texts| texts.iter().filter_map(|t| parse_candidate(t)).collect())
                .unwrap_or_default();

            for image in processed.iter_mut().filter(|i| i.page == page) {
                image.caption = self.nearest_caption(&image.bbox, &candidates);
            }

            self.unify_caption_groups(&mut processed, page);
        }

        processed
    }

    /// Nearest candidate by discounted center distance, if close enough.
    fn nearest_caption(&self, image: &BBox, candidates: &[Candidate]) -> Option<Caption> {
        candidates
            .iter()
            .map(|candidate| {
                let distance = candidate.bbox.center_distance(image);
                // Captions are expected under figures.
                let weighted = if candidate.bbox.top > image.bottom {
                    distance * self.below_image_discount
                } else {
                    distance
                };
                (candidate, weighted)
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .filter(|(_, distance)| *distance < self.distance_threshold)
            .map(|(candidate, _)| candidate.caption.clone())
    }

    /// Images sharing a `(prefix, number)` key on `page` depict the same
    /// logical figure: give all of them the longest caption text found in
    /// the group.
    fn unify_caption_groups(&self, processed: &mut [CaptionedImage], page: u32) {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, image) in processed.iter().enumerate() {
            if image.page != page {
                continue;
            }
            if let Some(caption) = &image.caption {
                groups.entry(caption.group_key()).or_default().push(idx);
            }
        }

        for members in groups.values().filter(|m| m.len() > 1) {
            let best = members
                .iter()
                .filter_map(|&idx| processed[idx].caption.clone())
                .max_by_key(|caption| caption.text.len());
            if let Some(best) = best {
                for &idx in members {
                    processed[idx].caption = Some(best.clone());
                }
            }
        }
    }
}

/// Parse one text fragment against the ordered pattern list.
fn parse_candidate(text: &PageText) -> Option<Candidate> {
    let trimmed = text.text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in CAPTION_PATTERNS.iter() {
        if let Some(captures) = pattern.regex.captures(trimmed) {
            let prefix = captures
                .name("prefix")
                .map(|m| normalize_prefix(m.as_str()))
                .unwrap_or_else(|| pattern.default_prefix.to_string());
            let number = captures
                .name("num")
                .map(|m| m.as_str().replace('-', ".").parse::<f64>().unwrap_or(0.0))
                .unwrap_or(0.0);
            let caption_text = captures
                .name("text")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            return Some(Candidate {
                bbox: text.bbox,
                caption: Caption { prefix, number, text: caption_text },
            });
        }
    }

    None
}

fn normalize_prefix(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "fig" | "fig." => "figure".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_domain::{PageImage, PageText};

    fn text_at(page: u32, text: &str, top: f64) -> PageText {
        PageText {
            text: text.to_string(),
            page,
            bbox: BBox { x0: 100.0, top, x1: 300.0, bottom: top + 20.0 },
        }
    }

    fn image_at(page: u32, src: &str, top: f64) -> PageImage {
        PageImage {
            src: src.to_string(),
            page,
            bbox: BBox { x0: 100.0, top, x1: 300.0, bottom: top + 200.0 },
        }
    }

    fn mapper() -> RuleCaptionMapper {
        RuleCaptionMapper::new(&PipelineConfig::default())
    }

    #[test]
    fn test_labeled_pattern_parses_prefix_number_text() {
        let candidate = parse_candidate(&text_at(1, "photo 3 trench from the south", 0.0)).unwrap();
        assert_eq!(candidate.caption.prefix, "photo");
        assert_eq!(candidate.caption.number, 3.0);
        assert_eq!(candidate.caption.text, "trench from the south");
    }

    #[test]
    fn test_compound_number_parses_as_fraction() {
        let candidate = parse_candidate(&text_at(1, "drawing 2-1 pit section", 0.0)).unwrap();
        assert_eq!(candidate.caption.number, 2.1);
    }

    #[test]
    fn test_first_match_wins_over_later_patterns() {
        // "table 4 ..." matches both the labeled pattern and the bare
        // pattern; the labeled pattern is checked first.
        let candidate = parse_candidate(&text_at(1, "table 4 artifact counts", 0.0)).unwrap();
        assert_eq!(candidate.caption.prefix, "table");
    }

    #[test]
    fn test_fig_prefix_normalizes_to_figure() {
        let candidate = parse_candidate(&text_at(1, "Fig. 7 site plan", 0.0)).unwrap();
        assert_eq!(candidate.caption.prefix, "figure");
        assert_eq!(candidate.caption.number, 7.0);
    }

    #[test]
    fn test_caption_below_image_is_preferred() {
        let doc = ExtractedDocument {
            texts: vec![
                // Above the image, slightly closer raw distance.
                text_at(1, "photo 1 overview from above", 90.0),
                // Below the image, wins after the 0.8 discount.
                text_at(1, "photo 2 overview from below", 520.0),
            ],
            images: vec![image_at(1, "img.png", 300.0)],
        };
        let result = mapper().associate(&doc);
        // Raw distances: above = |100-400| = 300 (not below, no discount),
        // below = |530-400| = 130 * 0.8 = 104.
        assert_eq!(result[0].caption.as_ref().unwrap().number, 2.0);
    }

    #[test]
    fn test_no_candidate_within_threshold_leaves_image_uncaptioned() {
        let doc = ExtractedDocument {
            texts: vec![text_at(1, "photo 1 far away caption", 2000.0)],
            images: vec![image_at(1, "img.png", 0.0)],
        };
        let result = mapper().associate(&doc);
        assert!(result[0].caption.is_none());
    }

    #[test]
    fn test_candidates_on_other_pages_are_ignored() {
        let doc = ExtractedDocument {
            texts: vec![text_at(2, "photo 1 right next door", 210.0)],
            images: vec![image_at(1, "img.png", 0.0)],
        };
        let result = mapper().associate(&doc);
        assert!(result[0].caption.is_none());
    }

    #[test]
    fn test_shared_group_gets_longest_caption_text() {
        let doc = ExtractedDocument {
            texts: vec![
                text_at(1, "photo 5 short", 210.0),
                text_at(1, "photo 5 the much more detailed caption text", 660.0),
            ],
            images: vec![image_at(1, "left.png", 0.0), image_at(1, "right.png", 450.0)],
        };
        let result = mapper().associate(&doc);

        let left = result[0].caption.as_ref().unwrap();
        let right = result[1].caption.as_ref().unwrap();
        assert_eq!(left.text, "the much more detailed caption text");
        assert_eq!(left, right);
    }

    #[test]
    fn test_plain_prose_is_not_a_candidate() {
        assert!(parse_candidate(&text_at(1, "the excavation continued east", 0.0)).is_none());
    }
}
