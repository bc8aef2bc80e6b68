//! Builds a listing base URL from search filters.

/// Category searched when none is given.
pub const DEFAULT_CATEGORY: &str = "Accounts";

/// Search filters for a listing category page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Category name, e.g. "Accounts" or ".NET Development".
    pub category: String,
    /// Work-from-home listings only.
    pub remote: bool,
    /// City for on-site listings.
    pub location: Option<String>,
    pub part_time: bool,
    /// Minimum stipend; only digits are honored.
    pub min_stipend: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            remote: true,
            location: None,
            part_time: false,
            min_stipend: None,
        }
    }
}

impl SearchQuery {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Category as it appears in listing paths.
    pub fn slug(&self) -> String {
        slugify(&self.category)
    }

    /// Base listing URL under `origin`.
    pub fn to_url(&self, origin: &str) -> String {
        let origin = origin.trim_end_matches('/');
        let slug = self.slug();

        let stipend = self
            .min_stipend
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));
        let location = self
            .location
            .as_deref()
            .map(|l| slugify(l.trim()))
            .filter(|l| !l.is_empty());

        match (self.part_time, stipend, self.remote, location) {
            (true, Some(stipend), _, _) => {
                format!("{}/internships/part-time-{}-jobs/stipend-{}/", origin, slug, stipend)
            }
            (true, None, _, _) => format!("{}/internships/part-time-{}-jobs/", origin, slug),
            (false, _, true, _) => {
                format!("{}/internships/work-from-home-{}-internships/", origin, slug)
            }
            (false, _, false, Some(location)) => {
                format!("{}/internships/{}-internship-in-{}/", origin, slug, location)
            }
            (false, _, false, None) => format!("{}/internships/{}-internship/", origin, slug),
        }
    }
}

fn slugify(text: &str) -> String {
    text.to_lowercase().replace('.', "").replace(' ', "-")
}
