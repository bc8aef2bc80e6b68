//! Listing record model and its deduplication fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single job or internship posting extracted from a listing card.
///
/// `title` and `company` are always non-empty; the extractor rejects cards
/// where either cannot be resolved. The two badge flags are always present
/// in serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stipend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Listing type label (e.g. "Part time", "Job offer").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_link: Option<String>,
    #[serde(default)]
    pub actively_hiring: bool,
    #[serde(default)]
    pub early_applicant: bool,
}

impl ListingRecord {
    /// Create a record with only the required fields set.
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: None,
            duration: None,
            stipend: None,
            experience: None,
            kind: None,
            posted: None,
            logo_url: None,
            job_url: None,
            apply_link: None,
            actively_hiring: false,
            early_applicant: false,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the stipend.
    pub fn with_stipend(mut self, stipend: impl Into<String>) -> Self {
        self.stipend = Some(stipend.into());
        self
    }

    /// Deduplication key over title, company and location.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.title, &self.company, self.location.as_deref())
    }

    /// Column names in CSV order.
    pub const COLUMNS: [&'static str; 13] = [
        "title",
        "company",
        "location",
        "duration",
        "stipend",
        "experience",
        "type",
        "posted",
        "logo_url",
        "job_url",
        "apply_link",
        "actively_hiring",
        "early_applicant",
    ];

    /// Field values in [`Self::COLUMNS`] order; absent fields are empty.
    pub fn row(&self) -> [String; 13] {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        [
            self.title.clone(),
            self.company.clone(),
            opt(&self.location),
            opt(&self.duration),
            opt(&self.stipend),
            opt(&self.experience),
            opt(&self.kind),
            opt(&self.posted),
            opt(&self.logo_url),
            opt(&self.job_url),
            opt(&self.apply_link),
            self.actively_hiring.to_string(),
            self.early_applicant.to_string(),
        ]
    }
}

/// SHA-256 fingerprint of a listing's identity fields, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint; a missing location hashes as the empty string.
    pub fn of(title: &str, company: &str, location: Option<&str>) -> Self {
        let key = format!("{}-{}-{}", title, company, location.unwrap_or(""));
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
