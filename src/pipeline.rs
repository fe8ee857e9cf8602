use std::collections::HashSet;

use chrono::Local;
use log::{debug, info, warn};

use crate::classifier::{classify, KeywordSet};
use crate::config::ScraperConfig;
use crate::delay_manager::Pacer;
use crate::error::ParseError;
use crate::extractor::Extractor;
use crate::fetcher::PageFetcher;
use crate::models::{ClassifiedJob, JobListingCandidate, JobSource};
use crate::recency::is_recent;

/// Per-run counters, logged at the end of a scrape.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub candidates_seen: usize,
    pub dropped_invalid: usize,
    pub dropped_stale: usize,
    pub dropped_off_target: usize,
    pub duplicates: usize,
}

/// Validation, recency, role filter and classification for extracted candidates.
pub struct Pipeline {
    keywords: KeywordSet,
    window_hours: u32,
}

impl Pipeline {
    pub fn new(keywords: KeywordSet, window_hours: u32) -> Self {
        Pipeline { keywords, window_hours }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Pipeline::new(config.keywords.clone(), config.window_hours)
    }

    /// Pure transform from candidates to classified jobs. Order is preserved.
    pub fn process(&self, candidates: Vec<JobListingCandidate>) -> Vec<ClassifiedJob> {
        let mut stats = RunStats::default();
        self.process_counted(candidates, &mut stats)
    }

    fn process_counted(&self, candidates: Vec<JobListingCandidate>, stats: &mut RunStats) -> Vec<ClassifiedJob> {
        let mut out = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            stats.candidates_seen += 1;
            if !candidate.is_valid() {
                debug!("Dropping listing without title/company: {:?}", candidate.url);
                stats.dropped_invalid += 1;
                continue;
            }
            if !is_recent(&candidate.posting_age_text, self.window_hours) {
                debug!("Dropping '{}' posted '{}'", candidate.title, candidate.posting_age_text);
                stats.dropped_stale += 1;
                continue;
            }
            if !self.keywords.matches_role(&candidate.title, &candidate.description) {
                stats.dropped_off_target += 1;
                continue;
            }
            let classification = classify(&candidate.classification_text(), &self.keywords);
            out.push(ClassifiedJob::new(candidate, classification));
        }
        out
    }

    /// Extract + process a single page already in memory.
    pub fn process_page(
        &self,
        extractor: &Extractor,
        site: JobSource,
        html: &str,
    ) -> Result<Vec<ClassifiedJob>, ParseError> {
        let candidates = extractor.extract(site, html, Local::now())?;
        Ok(self.process(candidates))
    }

    /// Sequential scrape over queries × sites × pages. Fetch and parse
    /// failures are logged and skipped; a blocked site stops paging for the
    /// current query. Results are de-duplicated by URL.
    pub fn scrape(
        &self,
        fetcher: &dyn PageFetcher,
        extractor: &Extractor,
        pacer: &mut Pacer,
        queries: &[String],
        sites: &[JobSource],
        max_pages: u32,
    ) -> (Vec<ClassifiedJob>, RunStats) {
        let mut stats = RunStats::default();
        let mut jobs = Vec::new();

        for query in queries.iter().filter(|q| !q.trim().is_empty()) {
            info!("Searching for: '{}' (last {} hours)", query, self.window_hours);
            for &site in sites {
                let before = jobs.len();
                for page in 0..max_pages {
                    pacer.before_fetch(site);
                    let html = match fetcher.fetch(site, query, page) {
                        Ok(html) => html,
                        Err(e) => {
                            stats.pages_failed += 1;
                            if e.is_blocked() {
                                warn!("{} blocked request on page {}: {}. Skipping remaining pages.", site, page + 1, e);
                                break;
                            }
                            warn!("Failed to fetch {} page {}: {}", site, page + 1, e);
                            continue;
                        }
                    };
                    stats.pages_fetched += 1;

                    match extractor.extract(site, &html, Local::now()) {
                        Ok(candidates) => jobs.extend(self.process_counted(candidates, &mut stats)),
                        Err(e) => {
                            stats.pages_failed += 1;
                            warn!("Could not parse {} page {}: {}", site, page + 1, e);
                        }
                    }
                }
                info!("Found {} relevant jobs from {}", jobs.len() - before, site);
            }
        }

        let jobs = dedup_by_url(jobs, &mut stats);
        info!(
            "Scrape finished: {} jobs kept, {} pages fetched, {} pages failed",
            jobs.len(),
            stats.pages_fetched,
            stats.pages_failed
        );
        (jobs, stats)
    }
}

/// Keeps the first job per URL. Jobs without a URL are all kept.
pub fn dedup_by_url(jobs: Vec<ClassifiedJob>, stats: &mut RunStats) -> Vec<ClassifiedJob> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(jobs.len());
    for job in jobs {
        let url = job.candidate.url.clone();
        if !url.is_empty() && !seen.insert(url) {
            stats.duplicates += 1;
            continue;
        }
        out.push(job);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, SponsorshipStatus};

    fn candidate(title: &str, company: &str, description: &str, age: &str) -> JobListingCandidate {
        JobListingCandidate {
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            description: description.to_string(),
            url: String::new(),
            source: JobSource::Indeed,
            posting_age_text: age.to_string(),
            scraped_at: Local::now(),
        }
    }

    #[test]
    fn test_three_candidate_scenario() {
        let pipeline = Pipeline::new(KeywordSet::default(), 24);
        let jobs = pipeline.process(vec![
            candidate("DevOps Engineer", "Acme", "We sponsor H1B visas", "today"),
            candidate("SRE", "Globex", "No visa sponsorship available", "3 days ago"),
            candidate("Platform Engineer", "Initech", "Great team culture", "today"),
        ]);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].candidate.title, "DevOps Engineer");
        assert_eq!(jobs[0].sponsors_h1b, SponsorshipStatus::Yes);
        assert_eq!(jobs[0].confidence, Confidence::High);
        assert_eq!(jobs[1].candidate.title, "Platform Engineer");
        assert_eq!(jobs[1].sponsors_h1b, SponsorshipStatus::Unknown);
        assert_eq!(jobs[1].confidence, Confidence::Unknown);
    }

    #[test]
    fn test_missing_company_is_dropped_before_classification() {
        let pipeline = Pipeline::new(KeywordSet::default(), 24);
        let mut stats = RunStats::default();
        let jobs = pipeline.process_counted(
            vec![candidate("DevOps Engineer", "", "We sponsor H1B", "today")],
            &mut stats,
        );
        assert!(jobs.is_empty());
        assert_eq!(stats.dropped_invalid, 1);
    }

    #[test]
    fn test_off_target_roles_are_dropped() {
        let pipeline = Pipeline::new(KeywordSet::default(), 24);
        let jobs = pipeline.process(vec![candidate("Accountant", "Acme", "H1B sponsorship", "today")]);
        assert!(jobs.is_empty());

        let open = Pipeline::new(KeywordSet { target_roles: vec![], ..KeywordSet::default() }, 24);
        assert_eq!(open.process(vec![candidate("Accountant", "Acme", "H1B", "today")]).len(), 1);
    }

    #[test]
    fn test_dedup_keeps_first_url() {
        let pipeline = Pipeline::new(KeywordSet::default(), 24);
        let mut a = candidate("SRE", "Acme", "", "today");
        a.url = "https://x/1".to_string();
        let mut b = a.clone();
        b.company = "Other".to_string();
        let c = candidate("SRE", "NoUrl", "", "today");
        let d = c.clone();

        let mut stats = RunStats::default();
        let jobs = dedup_by_url(pipeline.process(vec![a, b, c, d]), &mut stats);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].candidate.company, "Acme");
        assert_eq!(stats.duplicates, 1);
    }
}
