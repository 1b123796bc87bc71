use crate::models::PageView;

/// Slices `items` into the 1-based page `page_index`.
///
/// Out-of-range pages are not errors: they yield an empty slice with
/// `has_next = false`. A page index of 0 is read as page 1 and a page size
/// of 0 as 1.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page_index: usize) -> PageView<T> {
    let page_size = page_size.max(1);
    let current_page = page_index.max(1);
    let total_items = items.len();

    let start = (current_page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total_items);
    let page_items = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    PageView {
        items: page_items,
        current_page,
        total_pages: total_items.div_ceil(page_size),
        total_items,
        has_prev: current_page > 1,
        has_next: current_page.saturating_mul(page_size) < total_items,
    }
}
