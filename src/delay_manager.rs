use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::JobSource;

/// Inclusive range, in seconds, of the pause between two requests to one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        DelayRange { min_secs: 2, max_secs: 20 }
    }
}

impl DelayRange {
    pub fn none() -> Self {
        DelayRange { min_secs: 0, max_secs: 0 }
    }

    pub fn is_none(&self) -> bool {
        self.max_secs == 0
    }

    fn sample(&self) -> u64 {
        if self.min_secs >= self.max_secs {
            return self.max_secs;
        }
        rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
    }
}

/// Paces requests: the first fetch to a site goes out immediately, every
/// later one waits a random delay drawn from the range.
pub struct Pacer {
    range: DelayRange,
    visited: HashSet<JobSource>,
}

impl Pacer {
    pub fn new(range: DelayRange) -> Self {
        Pacer { range, visited: HashSet::new() }
    }

    /// Returns the delay that was (or, for a zero range, would have been) slept.
    pub fn before_fetch(&mut self, site: JobSource) -> Duration {
        if self.visited.insert(site) || self.range.is_none() {
            return Duration::ZERO;
        }
        let delay_secs = self.range.sample();
        info!("Waiting for {} seconds before next {} request...", delay_secs, site);
        let delay = Duration::from_secs(delay_secs);
        thread::sleep(delay);
        delay
    }
}
