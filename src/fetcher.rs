use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use log::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::JobSource;

/// Source of raw result pages. `page` is zero-based.
pub trait PageFetcher {
    fn fetch(&self, site: JobSource, query: &str, page: u32) -> Result<String, FetchError>;
}

/// Builds the search URL for one result page of `site`.
pub fn search_url(site: JobSource, query: &str, location: &str, page: u32) -> String {
    let q = urlencoding::encode(query);
    let l = urlencoding::encode(location);
    match site {
        JobSource::Indeed => format!(
            "https://www.indeed.com/jobs?q={}&l={}&start={}&fromage=1",
            q, l, page * 10
        ),
        JobSource::Glassdoor => format!(
            "https://www.glassdoor.com/Job/jobs.htm?q={}&l={}&p={}&fromAge=1",
            q, l, page + 1
        ),
        JobSource::ZipRecruiter => format!(
            "https://www.ziprecruiter.com/jobs-search?search={}&location={}&days=1&page={}",
            q, l, page + 1
        ),
        JobSource::Dice => format!(
            "https://www.dice.com/jobs?q={}&location={}&page={}&pageSize=20&filters.postedDate=ONE",
            q, l, page + 1
        ),
    }
}

/// Blocking HTTP fetcher. Sends the same browser user agent on every request.
pub struct HttpFetcher {
    client: Client,
    location: String,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        let ua = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::Network(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, ua);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(HttpFetcher {
            client,
            location: config.location.clone(),
        })
    }

    fn visit_page(&self, url: &str) -> Result<(String, StatusCode), reqwest::Error> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let text = resp.text()?;
        Ok((text, status))
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, site: JobSource, query: &str, page: u32) -> Result<String, FetchError> {
        let url = search_url(site, query, &self.location, page);
        reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        info!("Visiting: {}", url);
        let (html, status) = self.visit_page(&url)?;
        debug!("{} answered {} ({} bytes)", site, status, html.len());

        status_to_result(status, html).map_err(|e| {
            warn!("{} page {} for '{}' failed: {}", site, page + 1, query, e);
            e
        })
    }
}

fn status_to_result(status: StatusCode, body: String) -> Result<String, FetchError> {
    let code = status.as_u16();
    if code == 403 || code == 429 {
        return Err(FetchError::Blocked { status: code });
    }
    if !status.is_success() {
        return Err(FetchError::Status { status: code });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_urls_encode_query_and_page() {
        assert_eq!(
            search_url(JobSource::Indeed, "SRE H1B", "United States", 2),
            "https://www.indeed.com/jobs?q=SRE%20H1B&l=United%20States&start=20&fromage=1"
        );
        assert!(search_url(JobSource::Glassdoor, "devops", "US", 0).contains("&p=1&"));
        assert!(search_url(JobSource::ZipRecruiter, "devops", "US", 1).ends_with("&days=1&page=2"));
        assert!(search_url(JobSource::Dice, "devops", "US", 0).contains("filters.postedDate=ONE"));
    }

    #[test]
    fn test_search_urls_parse() {
        for site in JobSource::ALL {
            assert!(reqwest::Url::parse(&search_url(site, "cloud & platform", "Austin, TX", 4)).is_ok());
        }
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_to_result(StatusCode::FORBIDDEN, String::new()),
            Err(FetchError::Blocked { status: 403 })
        ));
        assert!(matches!(
            status_to_result(StatusCode::TOO_MANY_REQUESTS, String::new()),
            Err(FetchError::Blocked { status: 429 })
        ));
        assert!(matches!(
            status_to_result(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            Err(FetchError::Status { status: 500 })
        ));
        assert_eq!(status_to_result(StatusCode::OK, "<html>".to_string()).unwrap(), "<html>");
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpFetcher::new(&ScraperConfig::default()).is_ok());
    }
}
