//! Page planning: which listing pages to visit for a run.

/// Average number of listings a page is assumed to yield.
pub const ESTIMATED_LISTINGS_PER_PAGE: usize = 10;

/// Ordered page URLs for one base listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    urls: Vec<String>,
}

impl PagePlan {
    /// Plan the pages needed to reach `max_results`, never exceeding `pages_to_scrape`.
    ///
    /// The first URL is the base URL without trailing slashes; page `n` is
    /// `{base}/page-{n}`. Zero inputs are treated as 1.
    pub fn new(base_url: &str, max_results: usize, pages_to_scrape: usize) -> Self {
        let required = required_pages(max_results, pages_to_scrape);
        let base = base_url.trim_end_matches('/');

        let urls = (1..=required)
            .map(|page| {
                if page == 1 {
                    base.to_string()
                } else {
                    format!("{}/page-{}", base, page)
                }
            })
            .collect();

        Self { urls }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

/// `min(pages_to_scrape, max(1, ceil(max_results / 10)))`.
pub fn required_pages(max_results: usize, pages_to_scrape: usize) -> usize {
    let needed = max_results
        .div_ceil(ESTIMATED_LISTINGS_PER_PAGE)
        .max(1);
    needed.min(pages_to_scrape.max(1))
}
