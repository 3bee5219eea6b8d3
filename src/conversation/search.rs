//! History filtering and pagination

use crate::conversation::Conversation;

/// Conversations matching `query`, newest first
///
/// The match is a case-insensitive substring test against the title and
/// every message. An empty (or whitespace-only) query matches everything.
pub fn filter_conversations<'a>(
    conversations: &'a [Conversation],
    query: &str,
) -> Vec<&'a Conversation> {
    let lowered = query.trim().to_lowercase();
    let mut matched: Vec<&Conversation> = conversations
        .iter()
        .filter(|c| lowered.is_empty() || c.matches(&lowered))
        .collect();

    // Stable sort keeps collection order (most recent first) for equal dates
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    matched
}

/// One page of a list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Items on this page
    pub items: &'a [T],
    /// 1-based page number actually shown
    pub number: usize,
    /// Total number of pages (at least 1)
    pub total_pages: usize,
    /// Total number of items across pages
    pub total_items: usize,
}

/// Slice `items` into fixed-size pages and return page `number` (1-based)
///
/// Out-of-range page numbers are clamped to the nearest valid page.
///
/// # Examples
///
/// ```
/// use turbopech::conversation::paginate;
///
/// let items: Vec<u32> = (1..=14).collect();
/// let page = paginate(&items, 3, 6);
/// assert_eq!(page.items, &[13, 14]);
/// assert_eq!(page.total_pages, 3);
/// ```
pub fn paginate<T>(items: &[T], number: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = number.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: &items[start.min(total_items)..end],
        number,
        total_pages,
        total_items,
    }
}
