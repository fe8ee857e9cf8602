use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::models::{ClassifiedJob, SponsorshipStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

/// Aggregate view of a run. Grouping keys are taken exactly as stored on the
/// jobs, so "Acme" and "ACME" are counted separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub by_sponsorship: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub top_companies: Vec<CountRow>,
    pub top_sponsoring_companies: Vec<CountRow>,
    pub by_posting_age: Vec<CountRow>,
}

impl Summary {
    pub fn from_jobs(jobs: &[ClassifiedJob], top_n: usize) -> Self {
        let mut by_sponsorship = BTreeMap::new();
        for status in [SponsorshipStatus::Yes, SponsorshipStatus::No, SponsorshipStatus::Unknown] {
            by_sponsorship.insert(status.as_str().to_string(), 0);
        }
        let mut by_source = BTreeMap::new();

        for job in jobs {
            *by_sponsorship.entry(job.sponsors_h1b.as_str().to_string()).or_insert(0) += 1;
            *by_source.entry(job.candidate.source.slug().to_string()).or_insert(0) += 1;
        }

        let top_companies = ranked(jobs.iter().map(|j| j.candidate.company.as_str()), Some(top_n));
        let top_sponsoring_companies = ranked(
            jobs.iter().filter(|j| j.sponsors()).map(|j| j.candidate.company.as_str()),
            Some(top_n),
        );
        let by_posting_age = ranked(jobs.iter().map(|j| j.candidate.posting_age_text.as_str()), None);

        Summary {
            total: jobs.len(),
            by_sponsorship,
            by_source,
            top_companies,
            top_sponsoring_companies,
            by_posting_age,
        }
    }

    pub fn count_for(&self, status: SponsorshipStatus) -> usize {
        self.by_sponsorship.get(status.as_str()).copied().unwrap_or(0)
    }
}

/// Counts keys, most frequent first, ties by key.
fn ranked<'a>(keys: impl Iterator<Item = &'a str>, limit: Option<usize>) -> Vec<CountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(key, count)| CountRow { key: key.to_string(), count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    if let Some(n) = limit {
        rows.truncate(n);
    }
    rows
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "H1B JOB REPORT")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total jobs found: {}", self.total)?;
        writeln!(f, "Likely H1B sponsors: {}", self.count_for(SponsorshipStatus::Yes))?;
        writeln!(f, "No sponsorship: {}", self.count_for(SponsorshipStatus::No))?;
        writeln!(f, "Unknown/Unclear: {}", self.count_for(SponsorshipStatus::Unknown))?;

        if !self.by_posting_age.is_empty() {
            writeln!(f, "\nPosting time distribution:")?;
            for row in &self.by_posting_age {
                let label = if row.key.is_empty() { "(none)" } else { row.key.as_str() };
                writeln!(f, "  {}: {} jobs", label, row.count)?;
            }
        }
        if !self.top_sponsoring_companies.is_empty() {
            writeln!(f, "\nTop companies sponsoring H1B:")?;
            for row in &self.top_sponsoring_companies {
                writeln!(f, "  {}: {} jobs", row.key, row.count)?;
            }
        }
        if !self.top_companies.is_empty() {
            writeln!(f, "\nTop companies overall:")?;
            for row in &self.top_companies {
                writeln!(f, "  {}: {} jobs", row.key, row.count)?;
            }
        }
        if !self.by_source.is_empty() {
            writeln!(f, "\nJobs by source:")?;
            for (source, count) in &self.by_source {
                writeln!(f, "  {}: {} jobs", source, count)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use crate::models::{Confidence, JobListingCandidate, JobSource};
    use chrono::Local;

    fn job(company: &str, source: JobSource, age: &str, status: SponsorshipStatus) -> ClassifiedJob {
        let candidate = JobListingCandidate {
            title: "DevOps Engineer".to_string(),
            company: company.to_string(),
            location: String::new(),
            description: String::new(),
            url: String::new(),
            source,
            posting_age_text: age.to_string(),
            scraped_at: Local::now(),
        };
        ClassifiedJob::new(
            candidate,
            Classification {
                sponsors_h1b: status,
                confidence: Confidence::High,
                keywords_found: vec![],
            },
        )
    }

    #[test]
    fn test_counts_and_rankings() {
        let jobs = vec![
            job("Acme", JobSource::Indeed, "today", SponsorshipStatus::Yes),
            job("Acme", JobSource::Dice, "today", SponsorshipStatus::Unknown),
            job("ACME", JobSource::Indeed, "Just posted", SponsorshipStatus::Yes),
            job("Globex", JobSource::Indeed, "today", SponsorshipStatus::No),
        ];
        let summary = Summary::from_jobs(&jobs, 2);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count_for(SponsorshipStatus::Yes), 2);
        assert_eq!(summary.count_for(SponsorshipStatus::No), 1);
        assert_eq!(summary.count_for(SponsorshipStatus::Unknown), 1);
        assert_eq!(summary.by_source["indeed"], 3);
        assert_eq!(summary.by_source["dice"], 1);

        assert_eq!(
            summary.top_companies,
            vec![
                CountRow { key: "Acme".to_string(), count: 2 },
                CountRow { key: "ACME".to_string(), count: 1 },
            ]
        );
        assert_eq!(summary.top_sponsoring_companies.len(), 2);
        assert_eq!(summary.by_posting_age[0], CountRow { key: "today".to_string(), count: 3 });
    }

    #[test]
    fn test_empty_summary_renders() {
        let summary = Summary::from_jobs(&[], 10);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.count_for(SponsorshipStatus::Unknown), 0);
        let text = summary.to_string();
        assert!(text.contains("Total jobs found: 0"));
        assert!(!text.contains("Jobs by source"));
    }
}
