//! Selector tables for listing cards.
//!
//! Listing sites ship several markup generations at once, so every field is a
//! list of alternatives tried most specific first.

use super::cascade::RuleSpec;

/// Card container selectors, most specific first.
pub const CARD_SELECTORS: &[&str] = &[
    ".individual_internship",
    ".internship_meta",
    ".internship-container",
    ".container-fluid .internship_list",
    ".internship_list_container .individual_internship",
    ".internship-container .internship",
    ".internships-list .internship-container",
    "div[class*='internship']",
    "div[class*='job']",
    ".internship_list > div",
    ".internships > div",
    ".internship-list > div",
    ".internship_list li",
    ".internships li",
];

/// Token groups for the text heuristic; a block needs one token from each.
pub const CARD_TEXT_GROUPS: &[&[&str]] = &[
    &["internship", "job"],
    &["stipend", "salary", "month"],
    &["duration", "location"],
];

pub const TITLE: &[RuleSpec] = &[
    RuleSpec::text(".job-title-href"),
    RuleSpec::text(".profile"),
    RuleSpec::text("h3.heading"),
    RuleSpec::text(".view_detail_button"),
    RuleSpec::text(".view-detail"),
    RuleSpec::text("a[title]"),
    RuleSpec::text(".heading a"),
    RuleSpec::text(".internship-title"),
];

pub const COMPANY: &[RuleSpec] = &[
    RuleSpec::text(".company-name"),
    RuleSpec::text(".company_name"),
    RuleSpec::text(".company_and_premium"),
    RuleSpec::text(".company-text"),
    RuleSpec::text(".company_text"),
    RuleSpec::text(".company"),
];

pub const LOCATION: &[RuleSpec] = &[
    RuleSpec::text(".locations a"),
    RuleSpec::text(".location_names"),
    RuleSpec::text(".location_link"),
    RuleSpec::text(".location"),
    RuleSpec::text(".location-name"),
    RuleSpec::text(".internship_other_details_container .location_names"),
];

pub const DURATION: &[RuleSpec] = &[
    RuleSpec::text(".ic-16-calendar + span"),
    RuleSpec::text(".duration"),
    RuleSpec::text(".internship_other_details_container span:nth-child(1)"),
    RuleSpec::text(".other_detail_item span"),
    RuleSpec::containing(".internship-detail span", "Duration"),
    RuleSpec::containing("span", "Duration"),
];

pub const STIPEND: &[RuleSpec] = &[
    RuleSpec::text(".stipend"),
    RuleSpec::text(".stipend_container"),
    RuleSpec::text(".internship_other_details_container span:nth-child(2)"),
    RuleSpec::text(".stipend-text"),
    RuleSpec::containing("span", "Stipend"),
    RuleSpec::text(".stipend_text"),
];

pub const EXPERIENCE: &[RuleSpec] = &[
    RuleSpec::text(".ic-16-briefcase + span"),
    RuleSpec::text(".experience"),
    RuleSpec::text(".job-experience"),
    RuleSpec::containing("span", "Experience"),
];

pub const KIND: &[RuleSpec] = &[
    RuleSpec::text(".gray-labels .status-li span"),
    RuleSpec::text(".internship_label"),
    RuleSpec::text(".label_container span"),
    RuleSpec::text(".badge-container span"),
    RuleSpec::text(".label-container span"),
    RuleSpec::text("span.badge"),
];

pub const POSTED: &[RuleSpec] = &[
    RuleSpec::text(".status-inactive span"),
    RuleSpec::text(".posted_by_container"),
    RuleSpec::text(".posted span"),
    RuleSpec::text(".posted-by"),
    RuleSpec::text(".posted_by"),
    RuleSpec::text(".posted-on"),
    RuleSpec::text(".posted_on"),
];

pub const LOGO: &[RuleSpec] = &[
    RuleSpec::attr(".internship_logo img", "src"),
    RuleSpec::attr(".company_logo img", "src"),
    RuleSpec::attr(".logo img", "src"),
    RuleSpec::attr(".company-logo img", "src"),
    RuleSpec::attr(".internship-logo img", "src"),
];

/// Detail/apply links used when the title carries no `href`.
pub const DETAIL_LINK: &[RuleSpec] = &[
    RuleSpec::attr("a.view_detail_button", "href"),
    RuleSpec::attr("a.apply_button", "href"),
    RuleSpec::attr("a.view-detail-button", "href"),
    RuleSpec::attr("a.view-detail", "href"),
    RuleSpec::attr("a.view_detail", "href"),
    RuleSpec::attr(".view-detail a", "href"),
    RuleSpec::attr(".apply a", "href"),
    RuleSpec::attr(".apply_now a", "href"),
    RuleSpec::attr("a.apply_now", "href"),
];

pub const ACTIVELY_HIRING_BADGE: &[RuleSpec] = &[
    RuleSpec::text(".actively-hiring-badge"),
    RuleSpec::text(".actively_hiring_badge"),
    RuleSpec::text(".actively-hiring"),
    RuleSpec::containing("span", "Actively hiring"),
    RuleSpec::text(".badge-actively-hiring"),
    RuleSpec::text(".actively_hiring"),
];

pub const EARLY_APPLICANT_BADGE: &[RuleSpec] = &[
    RuleSpec::text(".early_applicant_wrapper"),
    RuleSpec::text(".early-applicant"),
    RuleSpec::text(".early_applicant"),
    RuleSpec::containing("span", "Be an early applicant"),
];
