pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Upper bound on page size so a single request cannot scan the whole table.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Normalized listing parameters.
///
/// `page` is 1-indexed and clamped to at least 1; `page_size` is clamped to
/// `1..=MAX_PAGE_SIZE`; an empty search term means "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    search: Option<String>,
    page: u64,
    page_size: u64,
}

impl ListParams {
    pub fn new(search: Option<String>, page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.map_or(DEFAULT_PAGE, |p| p.max(1).unsigned_abs());
        let page_size = page_size.map_or(DEFAULT_PAGE_SIZE, |s| {
            s.clamp(1, MAX_PAGE_SIZE as i64).unsigned_abs()
        });
        let search = search.filter(|s| !s.is_empty());

        Self {
            search,
            page,
            page_size,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of matching rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// ASCII-case-insensitive substring match against name or description.
    pub fn matches(&self, name: &str, description: &str) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let term = term.to_ascii_lowercase();
        name.to_ascii_lowercase().contains(&term)
            || description.to_ascii_lowercase().contains(&term)
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of matching records across all pages.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
