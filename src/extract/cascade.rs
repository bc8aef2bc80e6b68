//! Selector cascades: ordered extraction rules evaluated by one interpreter.
//!
//! A cascade is a list of `(matcher, extraction)` rules. Rules are tried in
//! order and, within a rule, matched elements in document order. The first
//! candidate that is non-empty after whitespace normalization and cleanup,
//! and is not the "Not specified" placeholder, wins.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};

/// Placeholder some site revisions render for missing values.
pub const NOT_SPECIFIED: &str = "Not specified";

static ACTIVELY_HIRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)actively\s+hiring").unwrap());

static PLURAL_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(s\)").unwrap());

static LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(duration|stipend|experience)\s*:").unwrap());

/// Collapse whitespace runs to one space and trim.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full text of an element, whitespace-normalized.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_ws(&element.text().collect::<String>())
}

/// Remove "Actively hiring" (any case, any inner whitespace) from company text.
pub fn strip_actively_hiring(text: &str) -> String {
    normalize_ws(&ACTIVELY_HIRING.replace_all(text, " "))
}

/// How a rule matches elements inside a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub css: &'static str,
    /// Only elements whose text contains this literal match.
    pub contains: Option<&'static str>,
    /// Read this attribute instead of the element text.
    pub attr: Option<&'static str>,
}

impl RuleSpec {
    pub const fn text(css: &'static str) -> Self {
        Self {
            css,
            contains: None,
            attr: None,
        }
    }

    pub const fn containing(css: &'static str, needle: &'static str) -> Self {
        Self {
            css,
            contains: Some(needle),
            attr: None,
        }
    }

    pub const fn attr(css: &'static str, attr: &'static str) -> Self {
        Self {
            css,
            contains: None,
            attr: Some(attr),
        }
    }
}

/// Post-processing applied to every candidate value of a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Drop an "Actively hiring" badge that leaked into the text.
    ActivelyHiring,
    /// Drop a leading "Duration:" / "Stipend:" / "Experience:" label.
    LabelPrefix,
    /// Drop "(s)" pluralization markers.
    PluralMarker,
    /// Make a bare relative path root-relative.
    RootPath,
}

impl Cleanup {
    fn apply(self, value: String) -> String {
        match self {
            Cleanup::ActivelyHiring => strip_actively_hiring(&value),
            Cleanup::LabelPrefix => normalize_ws(&LABEL_PREFIX.replace(&value, "")),
            Cleanup::PluralMarker => normalize_ws(&PLURAL_MARKER.replace_all(&value, "")),
            Cleanup::RootPath => {
                if value.starts_with("http") || value.starts_with('/') {
                    value
                } else {
                    format!("/{}", value)
                }
            }
        }
    }
}

#[derive(Debug)]
struct Rule {
    css: &'static str,
    selector: Selector,
    contains: Option<&'static str>,
    attr: Option<&'static str>,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Result<Self> {
        let selector = Selector::parse(spec.css).map_err(|e| ScrapeError::InvalidSelector {
            selector: spec.css.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            css: spec.css,
            selector,
            contains: spec.contains,
            attr: spec.attr,
        })
    }

    fn matches<'a>(&'a self, scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        scope.select(&self.selector).filter(move |el| match self.contains {
            Some(needle) => el.text().collect::<String>().contains(needle),
            None => true,
        })
    }

    fn raw_value(&self, element: ElementRef<'_>) -> Option<String> {
        match self.attr {
            Some(attr) => element.value().attr(attr).map(|v| v.trim().to_string()),
            None => Some(element_text(element)),
        }
    }
}

/// A winning cascade candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub value: String,
    /// `href` of the matched element, if it has one.
    pub href: Option<String>,
    /// Selector of the rule that produced the value.
    pub source: &'static str,
}

/// An ordered, compiled list of rules for one field.
#[derive(Debug)]
pub struct Cascade {
    rules: Vec<Rule>,
    cleanups: Vec<Cleanup>,
}

impl Cascade {
    /// Compile rule specs; fails on the first unparsable selector.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            cleanups: Vec::new(),
        })
    }

    /// Apply these cleanups, in order, to every candidate.
    pub fn with_cleanups(mut self, cleanups: &[Cleanup]) -> Self {
        self.cleanups = cleanups.to_vec();
        self
    }

    /// First usable value within `scope`.
    pub fn first(&self, scope: ElementRef<'_>) -> Option<Hit> {
        for rule in &self.rules {
            for element in rule.matches(scope) {
                let Some(raw) = rule.raw_value(element) else {
                    continue;
                };
                let value = normalize_ws(&raw);
                if value.is_empty() || value == NOT_SPECIFIED {
                    continue;
                }
                let value = self.cleanups.iter().fold(value, |v, c| c.apply(v));
                if value.is_empty() {
                    continue;
                }
                return Some(Hit {
                    value,
                    href: element.value().attr("href").map(str::to_string),
                    source: rule.css,
                });
            }
        }
        None
    }

    /// First usable value, without provenance.
    pub fn value(&self, scope: ElementRef<'_>) -> Option<String> {
        self.first(scope).map(|hit| hit.value)
    }

    /// Whether any rule matches at least one element in `scope`.
    pub fn any_match(&self, scope: ElementRef<'_>) -> bool {
        self.rules.iter().any(|rule| rule.matches(scope).next().is_some())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn card(html: &str) -> Html {
        Html::parse_fragment(html)
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  Data \n\t Analyst  "), "Data Analyst");
        assert_eq!(normalize_ws("\n \t"), "");
    }

    #[test]
    fn test_first_rule_with_value_wins() {
        let doc = card(r#"<div><p class="b">second</p><p class="a">first</p></div>"#);
        let cascade =
            Cascade::compile(&[RuleSpec::text(".a"), RuleSpec::text(".b")]).unwrap();
        let hit = cascade.first(doc.root_element()).unwrap();
        assert_eq!(hit.value, "first");
        assert_eq!(hit.source, ".a");
    }

    #[test]
    fn test_skips_empty_and_placeholder_candidates() {
        let doc = card(
            r#"<div>
                <span class="x">   </span>
                <span class="x">Not specified</span>
                <span class="x"> 3   Months </span>
            </div>"#,
        );
        let cascade = Cascade::compile(&[RuleSpec::text(".x")]).unwrap();
        assert_eq!(cascade.value(doc.root_element()).as_deref(), Some("3 Months"));
    }

    #[test]
    fn test_containing_rule_filters_by_text() {
        let doc = card(r#"<div><span>Location: Pune</span><span>Duration: 2 Months</span></div>"#);
        let cascade = Cascade::compile(&[RuleSpec::containing("span", "Duration")])
            .unwrap()
            .with_cleanups(&[Cleanup::LabelPrefix]);
        assert_eq!(cascade.value(doc.root_element()).as_deref(), Some("2 Months"));
    }

    #[test]
    fn test_attr_rule_reads_attribute() {
        let doc = card(r#"<div class="logo"><img src="static/acme.png"></div>"#);
        let cascade = Cascade::compile(&[RuleSpec::attr(".logo img", "src")])
            .unwrap()
            .with_cleanups(&[Cleanup::RootPath]);
        assert_eq!(
            cascade.value(doc.root_element()).as_deref(),
            Some("/static/acme.png")
        );
    }

    #[test]
    fn test_candidate_empty_after_cleanup_falls_through() {
        let doc = card(
            r#"<div><p class="company-name">Actively hiring</p><p class="company">Acme Inc</p></div>"#,
        );
        let cascade = Cascade::compile(&[
            RuleSpec::text(".company-name"),
            RuleSpec::text(".company"),
        ])
        .unwrap()
        .with_cleanups(&[Cleanup::ActivelyHiring]);
        assert_eq!(cascade.value(doc.root_element()).as_deref(), Some("Acme Inc"));
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        let doc = card(
            r#"<div><a class="title">Data An<em>alyst</em></a><span class="pay">₹ 10,000<b>/month</b></span></div>"#,
        );
        let title = Cascade::compile(&[RuleSpec::text(".title")]).unwrap();
        let pay = Cascade::compile(&[RuleSpec::text(".pay")]).unwrap();
        assert_eq!(title.value(doc.root_element()).as_deref(), Some("Data Analyst"));
        assert_eq!(pay.value(doc.root_element()).as_deref(), Some("₹ 10,000/month"));
    }

    #[test]
    fn test_badge_glued_to_company_is_stripped() {
        let doc = card(r#"<div><p class="company">Acme<span>Actively hiring</span></p></div>"#);
        let cascade = Cascade::compile(&[RuleSpec::text(".company")])
            .unwrap()
            .with_cleanups(&[Cleanup::ActivelyHiring]);
        assert_eq!(cascade.value(doc.root_element()).as_deref(), Some("Acme"));
    }

    #[test]
    fn test_hit_captures_href() {
        let doc = card(r#"<div><a class="job-title-href" href="/internship/detail/1">Designer</a></div>"#);
        let cascade = Cascade::compile(&[RuleSpec::text(".job-title-href")]).unwrap();
        let hit = cascade.first(doc.root_element()).unwrap();
        assert_eq!(hit.href.as_deref(), Some("/internship/detail/1"));
    }

    #[test]
    fn test_cleanups() {
        assert_eq!(strip_actively_hiring("Acme  Actively\n hiring"), "Acme");
        assert_eq!(strip_actively_hiring("ACTIVELY HIRING Acme"), "Acme");
        assert_eq!(
            Cleanup::LabelPrefix.apply("Stipend: ₹ 10,000 /month".to_string()),
            "₹ 10,000 /month"
        );
        assert_eq!(
            Cleanup::PluralMarker.apply("1 year(s)".to_string()),
            "1 year"
        );
        assert_eq!(
            Cleanup::RootPath.apply("https://cdn.example.com/a.png".to_string()),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = Cascade::compile(&[RuleSpec::text("div[")]).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelector { .. }));
    }
}
