//! Mapping raw provider records onto [`Suggestion`]s, the secondary-field
//! filter, and truncation.
//!
//! Nothing here rewrites provider text: titles, creators and years are copied
//! verbatim. Case folding is only used for comparisons.

use std::collections::HashMap;

use mediahint_common::{SearchField, Suggestion};

use super::provider::RawCandidate;

/// Normalize raw candidates for `field`.
///
/// Title mode yields one suggestion per candidate. Creator mode groups
/// candidates by individual creator name (see [`group_by_creator`]).
pub fn normalize(field: SearchField, candidates: Vec<RawCandidate>) -> Vec<Suggestion> {
    match field {
        SearchField::Title => candidates.into_iter().map(to_suggestion).collect(),
        SearchField::Creator => group_by_creator(candidates),
    }
}

/// Map one title-mode candidate onto a [`Suggestion`].
pub fn to_suggestion(candidate: RawCandidate) -> Suggestion {
    let creator = match candidate.creator {
        Some(creator) => creator,
        None => candidate.creators.join(", "),
    };

    Suggestion {
        title: candidate.title,
        creator,
        poster_url: candidate.poster_url.filter(|url| !url.trim().is_empty()),
        year: candidate.year,
        related_works: Vec::new(),
        isbn: candidate.isbn,
    }
}

/// One record per distinct creator, in first-seen order, carrying the works
/// attributed to them.
///
/// Names are matched case-insensitively and the first spelling wins. A
/// candidate listing several creators contributes its work to each of them.
/// Creators left with no works are dropped.
pub fn group_by_creator(candidates: Vec<RawCandidate>) -> Vec<Suggestion> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<Suggestion> = Vec::new();

    for candidate in &candidates {
        let works: Vec<&str> = if candidate.related_works.is_empty() {
            candidate.title.as_deref().into_iter().collect()
        } else {
            candidate.related_works.iter().map(String::as_str).collect()
        };

        for name in candidate.creator_names() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let slot = *index.entry(name.to_lowercase()).or_insert_with(|| {
                grouped.push(Suggestion::creator(name, Vec::new()));
                grouped.len() - 1
            });

            let entry = &mut grouped[slot];
            for work in &works {
                if !entry.related_works.iter().any(|w| w == work) {
                    entry.related_works.push((*work).to_string());
                }
            }
        }
    }

    grouped.retain(|s| !s.related_works.is_empty());
    grouped
}

/// Keep only suggestions whose creator contains the other field's value
/// (case-insensitive). Applies to both search fields; a filter that removes
/// everything is not relaxed.
pub fn retain_matching_secondary(
    suggestions: Vec<Suggestion>,
    secondary: Option<&str>,
) -> Vec<Suggestion> {
    let Some(needle) = secondary.map(str::trim).filter(|s| !s.is_empty()) else {
        return suggestions;
    };
    let needle = needle.to_lowercase();

    suggestions
        .into_iter()
        .filter(|s| s.creator.to_lowercase().contains(&needle))
        .collect()
}

/// Normalize, filter, and cap at `max_results`, preserving provider order.
pub fn shape(
    field: SearchField,
    secondary: Option<&str>,
    candidates: Vec<RawCandidate>,
    max_results: usize,
) -> Vec<Suggestion> {
    let mut suggestions = retain_matching_secondary(normalize(field, candidates), secondary);
    suggestions.truncate(max_results);
    suggestions
}

/// Split an enumerated creator string such as `"Joel Coen, Ethan Coen"`.
pub fn split_creators(raw: &str) -> Vec<String> {
    raw.split([',', '&'])
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "N/A")
        .map(str::to_string)
        .collect()
}
