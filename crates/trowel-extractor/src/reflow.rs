//! Text reflow: collapse positioned fragments into one blob per page run

use trowel_domain::{PageBlock, PageText};

/// Join consecutive fragments of the same page into one newline-separated
/// block, preserving document order.
///
/// A new block starts only when the page number changes from the immediately
/// preceding fragment. If the same page number recurs non-contiguously the
/// runs stay separate; callers must not collapse blocks by page number
/// globally.
pub fn reflow_pages(texts: &[PageText]) -> Vec<PageBlock> {
    let mut blocks: Vec<PageBlock> = Vec::new();

    for fragment in texts {
        match blocks.last_mut() {
            Some(last) if last.page == fragment.page => {
                last.text.push('\n');
                last.text.push_str(&fragment.text);
            }
            _ => blocks.push(PageBlock {
                page: fragment.page,
                text: fragment.text.clone(),
            }),
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_domain::BBox;

    fn fragment(page: u32, text: &str) -> PageText {
        PageText {
            text: text.to_string(),
            page,
            bbox: BBox { x0: 0.0, top: 0.0, x1: 1.0, bottom: 1.0 },
        }
    }

    #[test]
    fn test_contiguous_fragments_join_with_newline() {
        let blocks = reflow_pages(&[fragment(1, "a"), fragment(1, "b"), fragment(2, "c")]);
        assert_eq!(
            blocks,
            vec![
                PageBlock { page: 1, text: "a\nb".into() },
                PageBlock { page: 2, text: "c".into() },
            ]
        );
    }

    #[test]
    fn test_recurring_page_number_stays_split() {
        let blocks = reflow_pages(&[fragment(1, "a"), fragment(2, "b"), fragment(1, "c")]);
        assert_eq!(
            blocks,
            vec![
                PageBlock { page: 1, text: "a".into() },
                PageBlock { page: 2, text: "b".into() },
                PageBlock { page: 1, text: "c".into() },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(reflow_pages(&[]).is_empty());
    }

    #[test]
    fn test_single_fragment() {
        let blocks = reflow_pages(&[fragment(4, "only")]);
        assert_eq!(blocks, vec![PageBlock { page: 4, text: "only".into() }]);
    }
}
