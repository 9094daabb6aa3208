use crate::domain::types::{OutlinePage, PageType};

const PAGE_SEPARATOR: &str = "<page>";
const LEGACY_SEPARATOR: &str = "---";

/// Split outline text into pages.
///
/// Pages are separated by `<page>` (any case) or, when no such marker
/// exists, by `---`. Blank chunks are dropped but still count toward the
/// index of later pages. A leading `[tag]` sets the page type.
pub fn parse_outline(text: &str) -> Vec<OutlinePage> {
    split_pages(text)
        .into_iter()
        .enumerate()
        .filter_map(|(index, chunk)| {
            let content = chunk.trim();
            if content.is_empty() {
                return None;
            }
            let page_type = leading_tag(content)
                .map(PageType::from_tag)
                .unwrap_or_default();
            Some(OutlinePage::new(index, page_type, content))
        })
        .collect()
}

fn split_pages(text: &str) -> Vec<&str> {
    // ASCII lowering keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    if !lowered.contains(PAGE_SEPARATOR) {
        return text.split(LEGACY_SEPARATOR).collect();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    for (offset, _) in lowered.match_indices(PAGE_SEPARATOR) {
        chunks.push(&text[start..offset]);
        start = offset + PAGE_SEPARATOR.len();
    }
    chunks.push(&text[start..]);
    chunks
}

/// `[tag]` at the very start, where tag has no whitespace
fn leading_tag(content: &str) -> Option<&str> {
    let inner = content.strip_prefix('[')?;
    let close = inner.find(']')?;
    let tag = &inner[..close];
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return None;
    }
    Some(tag)
}
