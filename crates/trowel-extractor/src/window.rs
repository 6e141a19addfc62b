//! Windowed page walking
//!
//! Both extraction passes traverse the document in fixed-size page windows.
//! The walker owns window arithmetic (advance, truncation retreat, terminal
//! detection) and per-window image selection; the visiting closure owns the
//! model call and decides truncation and boundary.

use crate::error::ExtractError;
use trowel_domain::{CaptionedImage, LabeledImage, PageBlock};

/// One window handed to the visiting closure.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSelection {
    /// First absolute page of the window
    pub start_page: u32,
    /// Last absolute page of the window
    pub end_page: u32,
    /// Joined text of the window's page blocks
    pub text: String,
    /// Images whose caption label appears verbatim in the window text
    pub images: Vec<LabeledImage>,
}

/// What the closure learned from the model about the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowVerdict {
    /// The window's last page ends mid-sentence; re-include it next window
    pub truncated: bool,
    /// The content boundary has been passed; stop walking
    pub boundary_reached: bool,
}

/// Fixed-size window walker over reflowed page blocks.
#[derive(Debug, Clone, Copy)]
pub struct WindowWalker {
    window_pages: u32,
    broad_match_ratio: f64,
}

impl WindowWalker {
    /// A walker with `window_pages` pages per window. `broad_match_ratio`
    /// bounds per-window image selection: when more than that share of all
    /// document images match a window, the selection is discarded as a
    /// false-positive broad match.
    pub fn new(window_pages: u32, broad_match_ratio: f64) -> Self {
        Self { window_pages: window_pages.max(1), broad_match_ratio }
    }

    /// Walk `[start, stop]` inclusive, visiting each non-empty window.
    ///
    /// Truncated windows retreat: the next window starts at the current
    /// window's last page so the cut-off page is read again in full. With a
    /// one-page window truncation is ignored, otherwise the walk would
    /// never advance. Returns the number of windows visited.
    pub fn run<F>(
        &self,
        blocks: &[PageBlock],
        images: &[CaptionedImage],
        start: u32,
        stop: u32,
        mut visit: F,
    ) -> Result<u32, ExtractError>
    where
        F: FnMut(&WindowSelection) -> Result<WindowVerdict, ExtractError>,
    {
        let mut start_page = start.max(1);
        let mut visited = 0;

        while start_page <= stop {
            let end_page = (start_page + self.window_pages - 1).min(stop);
            let text = window_text(blocks, start_page, end_page);

            if text.is_empty() {
                // Image-only or blank page runs carry nothing to extract.
                start_page = end_page + 1;
                continue;
            }

            let selection = WindowSelection {
                start_page,
                end_page,
                images: self.select_images(images, &text),
                text,
            };
            visited += 1;
            let verdict = visit(&selection)?;

            if verdict.boundary_reached || end_page >= stop {
                break;
            }

            start_page = if verdict.truncated && self.window_pages > 1 {
                start_page + self.window_pages - 1
            } else {
                start_page + self.window_pages
            };
        }

        Ok(visited)
    }

    /// Images whose caption label appears verbatim in the window text.
    fn select_images(&self, images: &[CaptionedImage], text: &str) -> Vec<LabeledImage> {
        let matched: Vec<LabeledImage> = images
            .iter()
            .filter(|image| {
                image
                    .caption
                    .as_ref()
                    .is_some_and(|caption| text.contains(&caption.label()))
            })
            .map(LabeledImage::from)
            .collect();

        // A window matching a large share of all document images means the
        // label collided with running text (e.g. a list of figures page).
        if matched.len() as f64 > self.broad_match_ratio * images.len() as f64 {
            return Vec::new();
        }
        matched
    }
}

fn window_text(blocks: &[PageBlock], start_page: u32, end_page: u32) -> String {
    let parts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.page >= start_page && b.page <= end_page)
        .map(|b| b.text.as_str())
        .collect();
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_domain::{BBox, Caption};

    fn blocks(pages: std::ops::RangeInclusive<u32>) -> Vec<PageBlock> {
        pages.map(|p| PageBlock { page: p, text: format!("page {p} text") }).collect()
    }

    fn captioned(src: &str, prefix: &str, number: f64) -> CaptionedImage {
        CaptionedImage {
            src: src.into(),
            page: 1,
            bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
            caption: Some(Caption { prefix: prefix.into(), number, text: String::new() }),
        }
    }

    fn visited_ranges<F>(walker: &WindowWalker, blocks: &[PageBlock], stop: u32, verdicts: F) -> Vec<(u32, u32)>
    where
        F: Fn(u32) -> WindowVerdict,
    {
        let mut ranges = Vec::new();
        walker
            .run(blocks, &[], 1, stop, |w| {
                ranges.push((w.start_page, w.end_page));
                Ok(verdicts(w.start_page))
            })
            .unwrap();
        ranges
    }

    #[test]
    fn test_plain_advance_and_terminal_window() {
        let walker = WindowWalker::new(20, 0.3);
        let ranges = visited_ranges(&walker, &blocks(1..=45), 45, |_| WindowVerdict::default());
        assert_eq!(ranges, vec![(1, 20), (21, 40), (41, 45)]);
    }

    #[test]
    fn test_truncation_retreats_to_reinclude_last_page() {
        let walker = WindowWalker::new(20, 0.3);
        let ranges = visited_ranges(&walker, &blocks(1..=45), 45, |start| WindowVerdict {
            truncated: start == 1,
            boundary_reached: false,
        });
        // Page 20 was cut off, so the second window starts there.
        assert_eq!(ranges, vec![(1, 20), (20, 39), (40, 45)]);
    }

    #[test]
    fn test_one_page_window_ignores_truncation() {
        let walker = WindowWalker::new(1, 0.3);
        let ranges = visited_ranges(&walker, &blocks(1..=3), 3, |_| WindowVerdict {
            truncated: true,
            boundary_reached: false,
        });
        assert_eq!(ranges, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_boundary_stops_the_walk() {
        let walker = WindowWalker::new(2, 0.3);
        let ranges = visited_ranges(&walker, &blocks(1..=10), 10, |start| WindowVerdict {
            truncated: false,
            boundary_reached: start >= 5,
        });
        assert_eq!(ranges, vec![(1, 2), (3, 4), (5, 6)]);
    }

    #[test]
    fn test_empty_pages_are_skipped_without_a_visit() {
        // Only pages 5 and 6 carry text.
        let blocks = vec![
            PageBlock { page: 5, text: "five".into() },
            PageBlock { page: 6, text: "six".into() },
        ];
        let walker = WindowWalker::new(2, 0.3);
        let mut ranges = Vec::new();
        let visited = walker
            .run(&blocks, &[], 1, 6, |w| {
                ranges.push((w.start_page, w.end_page));
                Ok(WindowVerdict::default())
            })
            .unwrap();
        assert_eq!(visited, 1);
        assert_eq!(ranges, vec![(5, 6)]);
    }

    #[test]
    fn test_image_selected_when_label_in_window_text() {
        let images: Vec<CaptionedImage> = (1..=10)
            .map(|n| captioned(&format!("img{n}.png"), "photo", n as f64))
            .collect();
        let blocks = vec![PageBlock { page: 1, text: "as shown in photo 3, the pit".into() }];
        let walker = WindowWalker::new(2, 0.3);
        let mut selected = Vec::new();
        walker
            .run(&blocks, &images, 1, 1, |w| {
                selected = w.images.clone();
                Ok(WindowVerdict::default())
            })
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].src, "img3.png");
    }

    #[test]
    fn test_broad_match_clears_the_selection() {
        let images: Vec<CaptionedImage> = (1..=10)
            .map(|n| captioned(&format!("img{n}.png"), "photo", n as f64))
            .collect();
        // A list-of-figures page mentions every label.
        let listing: String = (1..=10).map(|n| format!("photo {n} ...\n")).collect();
        let blocks = vec![PageBlock { page: 1, text: listing }];
        let walker = WindowWalker::new(2, 0.3);
        let mut selected = vec![LabeledImage { src: "sentinel".into(), caption: None }];
        walker
            .run(&blocks, &images, 1, 1, |w| {
                selected = w.images.clone();
                Ok(WindowVerdict::default())
            })
            .unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_uncaptioned_images_are_never_selected() {
        let mut image = captioned("img.png", "photo", 1.0);
        image.caption = None;
        let blocks = vec![PageBlock { page: 1, text: "photo 1 is mentioned".into() }];
        let walker = WindowWalker::new(2, 0.3);
        let mut selected = vec![LabeledImage { src: "sentinel".into(), caption: None }];
        walker
            .run(&blocks, std::slice::from_ref(&image), 1, 1, |w| {
                selected = w.images.clone();
                Ok(WindowVerdict::default())
            })
            .unwrap();
        assert!(selected.is_empty());
    }
}
