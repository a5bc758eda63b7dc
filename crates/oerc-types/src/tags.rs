//! Paper tag helpers used by the upload form and the public research view.

use std::collections::BTreeSet;

use crate::paper::ResearchPaper;

/// Label given to papers uploaded without any tags.
pub const DEFAULT_TAG: &str = "Research";

/// Trim labels, drop empty ones and duplicates, keep first-seen order.
///
/// An empty result becomes `[DEFAULT_TAG]`.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && seen.insert(tag.to_string()) {
            out.push(tag.to_string());
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_TAG.to_string());
    }
    out
}

/// Split a comma-separated tag field.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Papers carrying every selected tag. No selection returns all papers.
pub fn filter_by_tags<'a>(papers: &'a [ResearchPaper], selected: &[String]) -> Vec<&'a ResearchPaper> {
    papers
        .iter()
        .filter(|p| selected.iter().all(|tag| p.has_tag(tag)))
        .collect()
}

/// Every tag in use, deduplicated and sorted.
pub fn available_tags(papers: &[ResearchPaper]) -> Vec<String> {
    papers
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
