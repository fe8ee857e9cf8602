use std::collections::HashMap;

use chrono::{DateTime, Local};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ParseError;
use crate::models::{JobListingCandidate, JobSource};

/// CSS selectors for one job board. Each field lists fallbacks; the first
/// selector that matches inside a card wins.
struct SiteSelectors {
    card: Vec<Selector>,
    title: Vec<Selector>,
    company: Vec<Selector>,
    location: Vec<Selector>,
    age: Vec<Selector>,
    description: Vec<Selector>,
    link: Vec<Selector>,
}

fn compile(list: &[&str]) -> Result<Vec<Selector>, ParseError> {
    list.iter()
        .map(|s| Selector::parse(s).map_err(|e| ParseError::Selector(format!("{}: {:?}", s, e))))
        .collect()
}

impl SiteSelectors {
    fn for_site(site: JobSource) -> Result<Self, ParseError> {
        let s = match site {
            JobSource::Indeed => SiteSelectors {
                card: compile(&["div.job_seen_beacon"])?,
                title: compile(&["h2.jobTitle"])?,
                company: compile(&["span.companyName", "[data-testid=company-name]"])?,
                location: compile(&["div.companyLocation", "[data-testid=text-location]"])?,
                age: compile(&["span.date", "[data-testid=job-age]", "[data-testid=myJobsStateDate]"])?,
                description: compile(&["div.summary", "div.job-snippet"])?,
                link: compile(&["h2.jobTitle a"])?,
            },
            JobSource::Glassdoor => SiteSelectors {
                card: compile(&["div.react-job-listing", "li[data-test=jobListing]"])?,
                title: compile(&["a[data-test=job-title]", "a.jobLink"])?,
                company: compile(&["div[data-test=employer-name]", "div.employerName"])?,
                location: compile(&["div[data-test=job-location]", "div.loc"])?,
                age: compile(&["div[data-test=job-age]", "div.jobAge"])?,
                description: compile(&["div.jobDescriptionContent"])?,
                link: compile(&["a[data-test=job-title]", "a.jobLink"])?,
            },
            JobSource::ZipRecruiter => SiteSelectors {
                card: compile(&["div.job_content", "article.job_result"])?,
                title: compile(&["h2", "a.job_link"])?,
                company: compile(&["a.company_name", "span.company"])?,
                location: compile(&["span.location"])?,
                age: compile(&["span.posted_time", "time"])?,
                description: compile(&["p.job_snippet", "div.job_description"])?,
                link: compile(&["a.job_link", "h2 a"])?,
            },
            JobSource::Dice => SiteSelectors {
                card: compile(&["div.card-body", "div[data-testid=job-card]"])?,
                title: compile(&["h5", "a[data-testid=job-title]"])?,
                company: compile(&["span.employer-name", "a.employer"])?,
                location: compile(&["span.location"])?,
                age: compile(&["span.posted-date", "[data-testid=posted-date]"])?,
                description: compile(&["div.job-description"])?,
                link: compile(&["a[data-testid=job-title]", "h5 a"])?,
            },
        };
        Ok(s)
    }
}

/// Turns result pages into job listing candidates.
pub struct Extractor {
    sites: HashMap<JobSource, SiteSelectors>,
}

impl Extractor {
    pub fn new() -> Result<Self, ParseError> {
        let mut sites = HashMap::new();
        for site in JobSource::ALL {
            sites.insert(site, SiteSelectors::for_site(site)?);
        }
        Ok(Extractor { sites })
    }

    /// Parses one result page. Missing fields come back empty; validation
    /// happens later in the pipeline.
    pub fn extract(
        &self,
        site: JobSource,
        html: &str,
        scraped_at: DateTime<Local>,
    ) -> Result<Vec<JobListingCandidate>, ParseError> {
        let selectors = &self.sites[&site];
        let document = Html::parse_document(html);

        let cards: Vec<ElementRef> = selectors
            .card
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        if cards.is_empty() {
            return Err(ParseError::NoListings { site });
        }
        debug!("Found {} job cards on {} page", cards.len(), site);

        let base = Url::parse(site.base_url()).ok();
        let candidates = cards
            .into_iter()
            .map(|card| JobListingCandidate {
                title: first_text(&card, &selectors.title),
                company: first_text(&card, &selectors.company),
                location: first_text(&card, &selectors.location),
                description: first_text(&card, &selectors.description),
                url: job_link(&card, selectors, base.as_ref()),
                source: site,
                posting_age_text: first_text(&card, &selectors.age),
                scraped_at,
            })
            .collect();
        Ok(candidates)
    }
}

fn clean_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(card: &ElementRef, selectors: &[Selector]) -> String {
    selectors
        .iter()
        .find_map(|sel| card.select(sel).next())
        .map(|el| clean_text(&el))
        .unwrap_or_default()
}

fn job_link(card: &ElementRef, selectors: &SiteSelectors, base: Option<&Url>) -> String {
    let href = selectors
        .link
        .iter()
        .filter_map(|sel| card.select(sel).next())
        .chain(selectors.title.iter().filter_map(|sel| card.select(sel).next()))
        .find_map(|el| el.value().attr("href"));

    match (href, base) {
        (Some(h), Some(b)) => b.join(h.trim()).map(|u| u.to_string()).unwrap_or_else(|_| h.to_string()),
        (Some(h), None) => h.to_string(),
        (None, _) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEED_PAGE: &str = r#"
        <html><body>
        <div class="job_seen_beacon">
            <h2 class="jobTitle"><a href="/viewjob?jk=abc123">Senior DevOps   Engineer</a></h2>
            <span class="companyName">Acme Cloud</span>
            <div class="companyLocation">Austin, TX</div>
            <div class="summary">We sponsor <b>H1B</b> visas.</div>
            <span class="date">Just posted</span>
        </div>
        <div class="job_seen_beacon">
            <h2 class="jobTitle"><a href="https://example.com/job/2">SRE</a></h2>
            <span data-testid="job-age">3 days ago</span>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_indeed_cards() {
        let extractor = Extractor::new().unwrap();
        let jobs = extractor.extract(JobSource::Indeed, INDEED_PAGE, Local::now()).unwrap();
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "Senior DevOps Engineer");
        assert_eq!(jobs[0].company, "Acme Cloud");
        assert_eq!(jobs[0].location, "Austin, TX");
        assert_eq!(jobs[0].description, "We sponsor H1B visas.");
        assert_eq!(jobs[0].url, "https://www.indeed.com/viewjob?jk=abc123");
        assert_eq!(jobs[0].posting_age_text, "Just posted");
        assert_eq!(jobs[0].source, JobSource::Indeed);

        assert_eq!(jobs[1].company, "");
        assert!(!jobs[1].is_valid());
        assert_eq!(jobs[1].url, "https://example.com/job/2");
        assert_eq!(jobs[1].posting_age_text, "3 days ago");
    }

    #[test]
    fn test_glassdoor_fallback_selectors() {
        let html = r#"
            <ul><li data-test="jobListing">
                <a class="jobLink" href="/job-listing/platform-engineer">Platform Engineer</a>
                <div class="employerName">Globex</div>
                <div class="loc">Remote</div>
                <div class="jobAge">24h</div>
            </li></ul>
        "#;
        let jobs = Extractor::new().unwrap().extract(JobSource::Glassdoor, html, Local::now()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Platform Engineer");
        assert_eq!(jobs[0].company, "Globex");
        assert_eq!(jobs[0].url, "https://www.glassdoor.com/job-listing/platform-engineer");
        assert_eq!(jobs[0].description, "");
    }

    #[test]
    fn test_dice_and_ziprecruiter_cards() {
        let extractor = Extractor::new().unwrap();
        let dice = r#"<div class="card-body"><h5><a href="/job-detail/1">Cloud Engineer</a></h5>
            <span class="employer-name">Initech</span><div class="job-description">visa sponsorship</div></div>"#;
        let jobs = extractor.extract(JobSource::Dice, dice, Local::now()).unwrap();
        assert_eq!(jobs[0].url, "https://www.dice.com/job-detail/1");
        assert_eq!(jobs[0].company, "Initech");

        let zip = r#"<article class="job_result"><h2>SRE</h2><a class="job_link" href="/c/job/9">view</a>
            <span class="company">Hooli</span><p class="job_snippet">no sponsorship</p><time>today</time></article>"#;
        let jobs = extractor.extract(JobSource::ZipRecruiter, zip, Local::now()).unwrap();
        assert_eq!(jobs[0].title, "SRE");
        assert_eq!(jobs[0].url, "https://www.ziprecruiter.com/c/job/9");
        assert_eq!(jobs[0].posting_age_text, "today");
    }

    #[test]
    fn test_page_without_cards_is_parse_error() {
        let err = Extractor::new()
            .unwrap()
            .extract(JobSource::Indeed, "<html><body>Access denied</body></html>", Local::now())
            .unwrap_err();
        assert!(matches!(err, ParseError::NoListings { site: JobSource::Indeed }));
    }
}
