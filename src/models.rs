use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::classifier::Classification;

/// Job board a listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Indeed,
    Glassdoor,
    ZipRecruiter,
    Dice,
}

impl JobSource {
    pub const ALL: [JobSource; 4] = [
        JobSource::Indeed,
        JobSource::Glassdoor,
        JobSource::ZipRecruiter,
        JobSource::Dice,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            JobSource::Indeed => "indeed",
            JobSource::Glassdoor => "glassdoor",
            JobSource::ZipRecruiter => "ziprecruiter",
            JobSource::Dice => "dice",
        }
    }

    /// Origin used to resolve relative job links found on result pages.
    pub fn base_url(&self) -> &'static str {
        match self {
            JobSource::Indeed => "https://www.indeed.com",
            JobSource::Glassdoor => "https://www.glassdoor.com",
            JobSource::ZipRecruiter => "https://www.ziprecruiter.com",
            JobSource::Dice => "https://www.dice.com",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobSource::Indeed => "Indeed",
            JobSource::Glassdoor => "Glassdoor",
            JobSource::ZipRecruiter => "ZipRecruiter",
            JobSource::Dice => "Dice",
        };
        f.write_str(name)
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        JobSource::ALL
            .into_iter()
            .find(|site| site.slug() == wanted)
            .ok_or_else(|| format!("unknown job site '{}' (expected one of indeed, glassdoor, ziprecruiter, dice)", s))
    }
}

/// Whether a posting signals H1B sponsorship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SponsorshipStatus {
    Yes,
    No,
    Unknown,
}

impl SponsorshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SponsorshipStatus::Yes => "true",
            SponsorshipStatus::No => "false",
            SponsorshipStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SponsorshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized as a plain string so CSV cells and JSON values read the same.
impl Serialize for SponsorshipStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Unknown,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One posting as it appeared on a result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListingCandidate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: JobSource,
    pub posting_age_text: String,
    pub scraped_at: DateTime<Local>,
}

impl JobListingCandidate {
    /// Candidates without a title or company never reach classification.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.company.trim().is_empty()
    }

    /// Text the classifier looks at.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedJob {
    #[serde(flatten)]
    pub candidate: JobListingCandidate,
    pub sponsors_h1b: SponsorshipStatus,
    pub confidence: Confidence,
    pub keywords_found: Vec<String>,
}

impl ClassifiedJob {
    pub fn new(candidate: JobListingCandidate, classification: Classification) -> Self {
        ClassifiedJob {
            candidate,
            sponsors_h1b: classification.sponsors_h1b,
            confidence: classification.confidence,
            keywords_found: classification.keywords_found,
        }
    }

    pub fn sponsors(&self) -> bool {
        self.sponsors_h1b == SponsorshipStatus::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, company: &str) -> JobListingCandidate {
        JobListingCandidate {
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            description: String::new(),
            url: String::new(),
            source: JobSource::Indeed,
            posting_age_text: "today".to_string(),
            scraped_at: Local::now(),
        }
    }

    #[test]
    fn test_validity_requires_title_and_company() {
        assert!(candidate("SRE", "Acme").is_valid());
        assert!(!candidate("SRE", "").is_valid());
        assert!(!candidate("SRE", "   ").is_valid());
        assert!(!candidate("", "Acme").is_valid());
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("Indeed".parse::<JobSource>(), Ok(JobSource::Indeed));
        assert_eq!(" ziprecruiter ".parse::<JobSource>(), Ok(JobSource::ZipRecruiter));
        assert!("monster".parse::<JobSource>().is_err());
    }

    #[test]
    fn test_sponsorship_serializes_as_tristate_string() {
        let json = serde_json::to_string(&vec![
            SponsorshipStatus::Yes,
            SponsorshipStatus::No,
            SponsorshipStatus::Unknown,
        ])
        .unwrap();
        assert_eq!(json, r#"["true","false","unknown"]"#);
    }
}
