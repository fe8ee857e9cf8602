use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::models::{Confidence, SponsorshipStatus};

/// Keyword tiers the classifier matches against. Passed in explicitly so
/// runs (and tests) can use different vocabularies side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSet {
    /// Literal visa-type mentions. Any hit is a high-confidence yes.
    pub strong: Vec<String>,
    /// Generic sponsorship language. A hit without a strong one is a medium yes.
    pub weak: Vec<String>,
    /// Phrases meaning the employer will not sponsor.
    pub negative: Vec<String>,
    /// Role phrases a listing must mention to be kept. Empty keeps everything.
    pub target_roles: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordSet {
    fn default() -> Self {
        KeywordSet {
            strong: strings(&["h1b", "h-1b"]),
            weak: strings(&[
                "visa sponsorship",
                "sponsor visa",
                "visa sponsor",
                "work authorization",
                "immigration sponsor",
                "immigration support",
                "work visa",
                "employment authorization",
                "visa support",
            ]),
            negative: strings(&[
                "no sponsorship",
                "no visa sponsorship",
                "does not sponsor",
                "unable to sponsor",
                "will not sponsor",
                "cannot sponsor",
                "not able to sponsor",
                "no visa support",
                "no h1b",
                "authorized to work without sponsorship",
                "without sponsorship",
                "must be authorized to work",
                "us citizen",
                "permanent resident",
                "green card required",
            ]),
            target_roles: strings(&[
                "devops",
                "dev ops",
                "site reliability",
                "sre",
                "infrastructure engineer",
                "platform engineer",
                "cloud engineer",
                "systems engineer",
                "reliability engineer",
            ]),
        }
    }
}

impl KeywordSet {
    /// True when the title or description mentions one of the target roles.
    pub fn matches_role(&self, title: &str, description: &str) -> bool {
        if self.target_roles.is_empty() {
            return true;
        }
        let text = format!("{} {}", title, description).to_lowercase();
        self.target_roles.iter().any(|role| contains_role(&text, &role.to_lowercase()))
    }
}

// Short acronyms like "sre" need word boundaries or they fire inside "address".
fn contains_role(text: &str, role: &str) -> bool {
    if role.is_empty() {
        return false;
    }
    if role.len() > 3 {
        return text.contains(role);
    }
    match Regex::new(&format!(r"\b{}\b", regex::escape(role))) {
        Ok(re) => re.is_match(text),
        Err(_) => text.contains(role),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub sponsors_h1b: SponsorshipStatus,
    pub confidence: Confidence,
    pub keywords_found: Vec<String>,
}

impl Classification {
    fn unknown() -> Self {
        Classification {
            sponsors_h1b: SponsorshipStatus::Unknown,
            confidence: Confidence::Unknown,
            keywords_found: Vec::new(),
        }
    }
}

/// Classifies `text` (title + description) for H1B sponsorship.
///
/// Positive evidence is checked before negative: a strong keyword anywhere
/// wins over a disclaimer elsewhere in the same text. A weak keyword that only
/// occurs inside a negative phrase ("no visa sponsorship") is not counted.
pub fn classify(text: &str, keywords: &KeywordSet) -> Classification {
    let text = text.to_lowercase();

    let strong = found_in(&text, &keywords.strong);
    let negative_spans = spans_of(&text, &keywords.negative);
    let weak: Vec<String> = normalized(&keywords.weak)
        .into_iter()
        .filter(|kw| {
            occurrences(&text, kw)
                .any(|span| !negative_spans.iter().any(|neg| neg.start <= span.start && span.end <= neg.end))
        })
        .collect();

    if !strong.is_empty() {
        let mut keywords_found = strong;
        push_unique(&mut keywords_found, weak);
        return Classification {
            sponsors_h1b: SponsorshipStatus::Yes,
            confidence: Confidence::High,
            keywords_found,
        };
    }

    if !weak.is_empty() {
        return Classification {
            sponsors_h1b: SponsorshipStatus::Yes,
            confidence: Confidence::Medium,
            keywords_found: weak,
        };
    }

    let negative = found_in(&text, &keywords.negative);
    if !negative.is_empty() {
        return Classification {
            sponsors_h1b: SponsorshipStatus::No,
            confidence: Confidence::High,
            keywords_found: negative,
        };
    }

    Classification::unknown()
}

fn normalized(list: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for kw in list {
        let kw = kw.trim().to_lowercase();
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

fn found_in(text: &str, list: &[String]) -> Vec<String> {
    normalized(list).into_iter().filter(|kw| text.contains(kw.as_str())).collect()
}

fn occurrences<'a>(text: &'a str, needle: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
    text.match_indices(needle).map(|(start, m)| start..start + m.len())
}

fn spans_of(text: &str, list: &[String]) -> Vec<Range<usize>> {
    normalized(list)
        .iter()
        .flat_map(|kw| occurrences(text, kw).collect::<Vec<_>>())
        .collect()
}

fn push_unique(into: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
