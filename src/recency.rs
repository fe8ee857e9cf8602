use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_WINDOW_HOURS: u32 = 24;

struct AgePatterns {
    days: Regex,
    hours: Regex,
    minutes: Regex,
}

fn patterns() -> &'static AgePatterns {
    static PATTERNS: OnceLock<AgePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| AgePatterns {
        days: Regex::new(r"(\d+)\+?\s*days?\s+ago").expect("valid days regex"),
        hours: Regex::new(r"(\d+|an?)\+?\s*(?:hours?|hrs?)\s+ago").expect("valid hours regex"),
        minutes: Regex::new(r"(\d+|an?)\+?\s*(?:minutes?|mins?)\s+ago").expect("valid minutes regex"),
    })
}

fn count(cap: &str) -> Option<u64> {
    match cap {
        "a" | "an" => Some(1),
        n => n.parse().ok(),
    }
}

/// Decides whether a site-authored posting age ("today", "3 days ago",
/// "Just posted") falls inside `window_hours`.
///
/// Text that fits none of the known shapes is never recent.
pub fn is_recent(posting_age_text: &str, window_hours: u32) -> bool {
    let text = posting_age_text.trim().to_lowercase();
    if text.is_empty() {
        return false;
    }
    let window = u64::from(window_hours);
    let p = patterns();

    if text.contains("just posted") {
        return true;
    }

    let hours_ago = text.contains("hour ago") || text.contains("hours ago");
    let minutes_ago = text.contains("minute ago") || text.contains("minutes ago");
    if window >= 24 && (text.contains("today") || hours_ago || minutes_ago) {
        return true;
    }

    if let Some(cap) = p.days.captures(&text) {
        return cap[1].parse::<u64>().map_or(false, |days| days.saturating_mul(24) <= window);
    }
    if text.contains("yesterday") {
        return 24 <= window;
    }

    if let Some(cap) = p.hours.captures(&text) {
        return count(&cap[1]).map_or(false, |hours| hours <= window);
    }
    if let Some(cap) = p.minutes.captures(&text) {
        return count(&cap[1]).map_or(false, |minutes| minutes <= window * 60);
    }

    false
}
