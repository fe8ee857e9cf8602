use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;
use serde::Serialize;

use crate::error::ExportError;
use crate::models::ClassifiedJob;
use crate::report::Summary;

/// Persists the outcome of a run.
pub trait RecordSink {
    /// Returns the paths that were written.
    fn persist(&self, jobs: &[ClassifiedJob], summary: &Summary) -> Result<Vec<PathBuf>, ExportError>;
}

#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    company: &'a str,
    location: &'a str,
    description: &'a str,
    url: &'a str,
    source: &'static str,
    posting_age_text: &'a str,
    scraped_at: String,
    sponsors_h1b: &'static str,
    confidence: String,
    keywords_found: String,
}

impl<'a> From<&'a ClassifiedJob> for CsvRow<'a> {
    fn from(job: &'a ClassifiedJob) -> Self {
        let c = &job.candidate;
        CsvRow {
            title: &c.title,
            company: &c.company,
            location: &c.location,
            description: &c.description,
            url: &c.url,
            source: c.source.slug(),
            posting_age_text: &c.posting_age_text,
            scraped_at: c.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            sponsors_h1b: job.sponsors_h1b.as_str(),
            confidence: job.confidence.to_string(),
            keywords_found: job.keywords_found.join("; "),
        }
    }
}

/// Writes CSV + JSON files into a directory, named `<prefix>_<timestamp>`.
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        FileSink { dir: dir.into(), prefix: prefix.into() }
    }

    pub fn persist_with_stamp(
        &self,
        jobs: &[ClassifiedJob],
        summary: &Summary,
        stamp: &str,
    ) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let mut written = Vec::new();

        if !jobs.is_empty() {
            let base = format!("{}_{}", self.prefix, stamp);
            written.extend(self.write_jobs(&base, jobs.iter())?);

            let sponsors: Vec<&ClassifiedJob> = jobs.iter().filter(|j| j.sponsors()).collect();
            if !sponsors.is_empty() {
                let base = format!("{}_sponsors_only_{}", self.prefix, stamp);
                written.extend(self.write_jobs(&base, sponsors.into_iter())?);
            }
        }

        let summary_path = self.dir.join(format!("{}_{}_summary.json", self.prefix, stamp));
        write_json(&summary_path, summary)?;
        written.push(summary_path);

        info!("Results saved to {}", display_paths(&written));
        Ok(written)
    }

    fn write_jobs<'a>(
        &self,
        base: &str,
        jobs: impl Iterator<Item = &'a ClassifiedJob> + Clone,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let csv_path = self.dir.join(format!("{}.csv", base));
        let mut csv_writer = csv::Writer::from_path(&csv_path)?;
        for job in jobs.clone() {
            csv_writer.serialize(CsvRow::from(job))?;
        }
        csv_writer.flush()?;

        let json_path = self.dir.join(format!("{}.json", base));
        let list: Vec<&ClassifiedJob> = jobs.collect();
        write_json(&json_path, &list)?;

        Ok(vec![csv_path, json_path])
    }
}

impl RecordSink for FileSink {
    fn persist(&self, jobs: &[ClassifiedJob], summary: &Summary) -> Result<Vec<PathBuf>, ExportError> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.persist_with_stamp(jobs, summary, &stamp)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
