use std::ops::Range;

use serde::Serialize;

/// One entry of the page navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageLink {
    Page { number: usize, active: bool },
    Ellipsis,
}

/// Offset pagination over an already filtered list. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    current: usize,
    total_items: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
            total_items: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    /// Record the length of the filtered list. A current page left past the
    /// end moves back to the last page.
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        let last = self.total_pages().max(1);
        if self.current > last {
            self.current = last;
        }
    }

    /// Move to `page`. Pages outside `1..=total_pages` are ignored.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current = page;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.current > 1 && self.go_to(self.current - 1)
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Index range of the current page within the filtered list.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items.get(self.range()).unwrap_or(&[])
    }

    pub fn window(&self, max_visible: usize) -> Vec<PageLink> {
        page_window(self.current, self.total_pages(), max_visible)
    }
}

/// Navigation links showing at most `max_visible` consecutive pages around
/// `current`, with the first and last page pinned behind an ellipsis when
/// the run does not reach them.
pub fn page_window(current: usize, total_pages: usize, max_visible: usize) -> Vec<PageLink> {
    let mut links = Vec::new();
    if total_pages == 0 {
        return links;
    }

    let max_visible = max_visible.max(1);
    let mut start = 1;
    let mut end = total_pages;

    if total_pages > max_visible {
        let half = max_visible / 2;
        start = current.saturating_sub(half).max(1);
        end = (current + half).min(total_pages);

        if current <= half + 1 {
            start = 1;
            end = max_visible;
        } else if current + half >= total_pages {
            start = total_pages - max_visible + 1;
            end = total_pages;
        }
    }

    if start > 1 {
        links.push(PageLink::Page { number: 1, active: current == 1 });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    for number in start..=end {
        links.push(PageLink::Page { number, active: number == current });
    }

    if end < total_pages {
        if end + 1 < total_pages {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page { number: total_pages, active: current == total_pages });
    }

    links
}
