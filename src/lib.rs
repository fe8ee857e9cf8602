pub mod classifier;
pub mod config;
pub mod delay_manager;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod recency;
pub mod report;
pub mod sink;

// Exporting types for convenience
pub use classifier::{classify, Classification, KeywordSet};
pub use config::ScraperConfig;
pub use delay_manager::{DelayRange, Pacer};
pub use error::{ConfigError, ExportError, FetchError, ParseError};
pub use extractor::Extractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use models::{ClassifiedJob, Confidence, JobListingCandidate, JobSource, SponsorshipStatus};
pub use pipeline::{Pipeline, RunStats};
pub use recency::is_recent;
pub use report::Summary;
pub use sink::{FileSink, RecordSink};
